//! Entity identifiers and id generation.
//!
//! Every catalog entity is addressed by an opaque string id wrapped in a
//! newtype ([`ItemId`], [`MenuId`], [`ModifierId`]) so that an item id can
//! never be passed where a menu id is expected. Ids are immutable once the
//! entity exists.
//!
//! Fresh ids come from an [`IdGenerator`]. Three generators are provided:
//!
//! - [`SequentialIds`]: `item-1`, `item-2`, ... Fully deterministic, used by
//!   tests and demos.
//! - [`SeededIds`]: PCG-backed random suffixes from a fixed seed. Looks like
//!   production ids but reproduces across runs.
//! - [`UuidIds`]: random UUID v4 strings.
//!
//! Generators do not know which ids are already taken; the session retries
//! until it draws an id that is not live or archived. When a session resumes
//! from stored state it hands the stored ids to
//! [`IdGenerator::resume`] so the generator does not replay them.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// The kind of catalog entity an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Item,
    Menu,
    Modifier,
}

impl EntityKind {
    /// Lowercase label, also used as the id prefix by the prefixed generators.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Item => "item",
            EntityKind::Menu => "menu",
            EntityKind::Modifier => "modifier",
        }
    }

    fn slot(self) -> usize {
        match self {
            EntityKind::Item => 0,
            EntityKind::Menu => 1,
            EntityKind::Modifier => 2,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Id newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw id string.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// The raw id string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

string_id! {
    /// Identifier of a sellable [`Item`](crate::model::Item).
    ItemId
}

string_id! {
    /// Identifier of a [`Menu`](crate::model::Menu). Items point at menus
    /// through their `category` field.
    MenuId
}

string_id! {
    /// Identifier of a [`ModifierGroup`](crate::model::ModifierGroup).
    ModifierId
}

// ---------------------------------------------------------------------------
// IdGenerator
// ---------------------------------------------------------------------------

/// Source of fresh entity ids.
///
/// Implementations only need [`next_raw`](Self::next_raw); the typed helpers
/// wrap its output.
pub trait IdGenerator {
    /// Produce the next raw id for an entity of the given kind.
    fn next_raw(&mut self, kind: EntityKind) -> String;

    /// Move past ids that already exist, e.g. after loading a snapshot.
    fn resume(&mut self, _in_use: &[&str]) {}

    fn next_item_id(&mut self) -> ItemId {
        ItemId::new(self.next_raw(EntityKind::Item))
    }

    fn next_menu_id(&mut self) -> MenuId {
        MenuId::new(self.next_raw(EntityKind::Menu))
    }

    fn next_modifier_id(&mut self) -> ModifierId {
        ModifierId::new(self.next_raw(EntityKind::Modifier))
    }
}

/// Monotonic per-kind counters: `item-1`, `menu-1`, `item-2`, ...
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    counters: [u64; 3],
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_raw(&mut self, kind: EntityKind) -> String {
        let counter = &mut self.counters[kind.slot()];
        *counter += 1;
        format!("{}-{}", kind.as_str(), counter)
    }

    /// Raise each counter to the highest `<kind>-<n>` in use.
    fn resume(&mut self, in_use: &[&str]) {
        for raw in in_use {
            for kind in [EntityKind::Item, EntityKind::Menu, EntityKind::Modifier] {
                let number = raw
                    .strip_prefix(kind.as_str())
                    .and_then(|rest| rest.strip_prefix('-'))
                    .and_then(|n| n.parse::<u64>().ok());
                if let Some(number) = number {
                    let counter = &mut self.counters[kind.slot()];
                    *counter = (*counter).max(number);
                }
            }
        }
    }
}

/// PCG-seeded ids of the form `item-3f9a0c1d2e4b5a69`.
///
/// The same seed always yields the same id sequence.
#[derive(Debug, Clone)]
pub struct SeededIds {
    seed: u64,
    rng: Pcg64,
}

impl SeededIds {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg64::seed_from_u64(seed),
        }
    }
}

impl IdGenerator for SeededIds {
    fn next_raw(&mut self, kind: EntityKind) -> String {
        let suffix: u64 = self.rng.gen();
        format!("{}-{:016x}", kind.as_str(), suffix)
    }

    /// Reseed from the configured seed mixed with the ids in use, so equal
    /// stored state resumes the same stream and never the original one.
    fn resume(&mut self, in_use: &[&str]) {
        if in_use.is_empty() {
            return;
        }
        // FNV-1a over the ids, separated so ["ab", "c"] != ["a", "bc"].
        let mut mix: u64 = 0xcbf2_9ce4_8422_2325;
        for raw in in_use {
            for byte in raw.bytes().chain(std::iter::once(0xff)) {
                mix ^= u64::from(byte);
                mix = mix.wrapping_mul(0x0000_0100_0000_01b3);
            }
        }
        self.rng = Pcg64::seed_from_u64(self.seed ^ mix);
    }
}

/// Random UUID v4 ids. Not reproducible; use in production sessions only.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_raw(&mut self, _kind: EntityKind) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

// ---------------------------------------------------------------------------
// IdStrategy
// ---------------------------------------------------------------------------

/// Serializable choice of id generator, used by session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IdStrategy {
    #[default]
    Sequential,
    Seeded {
        seed: u64,
    },
    Uuid,
}

impl IdStrategy {
    /// Build a boxed generator for this strategy.
    pub fn build(&self) -> Box<dyn IdGenerator> {
        match self {
            IdStrategy::Sequential => Box::new(SequentialIds::new()),
            IdStrategy::Seeded { seed } => Box::new(SeededIds::new(*seed)),
            IdStrategy::Uuid => Box::new(UuidIds),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_count_per_kind() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.next_item_id().as_str(), "item-1");
        assert_eq!(ids.next_menu_id().as_str(), "menu-1");
        assert_eq!(ids.next_item_id().as_str(), "item-2");
        assert_eq!(ids.next_modifier_id().as_str(), "modifier-1");
    }

    #[test]
    fn seeded_ids_reproduce_for_same_seed() {
        let mut a = SeededIds::new(42);
        let mut b = SeededIds::new(42);
        let run_a: Vec<_> = (0..5).map(|_| a.next_item_id()).collect();
        let run_b: Vec<_> = (0..5).map(|_| b.next_item_id()).collect();
        assert_eq!(run_a, run_b);
        assert!(run_a[0].as_str().starts_with("item-"));
        assert_eq!(run_a[0].as_str().len(), "item-".len() + 16);
    }

    #[test]
    fn sequential_ids_resume_past_stored_ids() {
        let mut ids = SequentialIds::new();
        ids.resume(&["item-70", "item-3", "menu-2", "latte", "item-x", "modifier-"]);
        assert_eq!(ids.next_item_id().as_str(), "item-71");
        assert_eq!(ids.next_menu_id().as_str(), "menu-3");
        assert_eq!(ids.next_modifier_id().as_str(), "modifier-1");
    }

    #[test]
    fn seeded_ids_resume_off_the_original_stream() {
        let mut original = SeededIds::new(9);
        let stored: Vec<String> = (0..100).map(|_| original.next_raw(EntityKind::Item)).collect();
        let in_use: Vec<&str> = stored.iter().map(String::as_str).collect();

        let mut resumed = SeededIds::new(9);
        resumed.resume(&in_use);
        let next = resumed.next_raw(EntityKind::Item);
        assert!(!stored.contains(&next));

        let mut again = SeededIds::new(9);
        again.resume(&in_use);
        assert_eq!(again.next_raw(EntityKind::Item), next);
    }

    #[test]
    fn seeded_ids_differ_across_seeds() {
        let mut a = SeededIds::new(1);
        let mut b = SeededIds::new(2);
        assert_ne!(a.next_menu_id(), b.next_menu_id());
    }

    #[test]
    fn uuid_ids_are_unique_and_well_formed() {
        let mut ids = UuidIds;
        let first = ids.next_item_id();
        let second = ids.next_item_id();
        assert_ne!(first, second);
        assert!(uuid::Uuid::parse_str(first.as_str()).is_ok());
    }

    #[test]
    fn id_strategy_deserializes_from_tagged_json() {
        let strategy: IdStrategy =
            serde_json::from_str(r#"{"type":"seeded","seed":7}"#).unwrap();
        assert_eq!(strategy, IdStrategy::Seeded { seed: 7 });

        let mut generator = strategy.build();
        let mut reference = SeededIds::new(7);
        assert_eq!(generator.next_item_id(), reference.next_item_id());
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = ItemId::new("item-9");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"item-9\"");
        assert_eq!(id.to_string(), "item-9");
    }
}
