//! Catalog snapshots with BLAKE3 hashing, and the store they are handed to.
//!
//! A [`CatalogSnapshot`] is the full persistent state of a session: the live
//! items, menus and modifier groups in order, the archive, and a version
//! counter, plus a BLAKE3 hex digest of all of it. The session hands a fresh
//! snapshot to its [`CatalogStore`] on every committed command; the store
//! replaces whatever it held before.
//!
//! # What Is NOT Serialized
//!
//! - **Selection** -- UI-transient, starts empty after a restore.
//! - **Journal** -- history from before the snapshot is not carried over.
//! - **Id generator state** -- fresh ids are checked against the restored
//!   ids, so a restarted generator cannot collide.
//!
//! # Usage
//!
//! ```
//! use menuboard_engine::prelude::*;
//!
//! let store = MemoryStore::new();
//! let mut session = CatalogSession::open(EngineConfig::default(), store.clone()).unwrap();
//! session.create_menu("Drinks", MenuStatus::Active).unwrap();
//!
//! let saved = store.latest().unwrap();
//! assert_eq!(saved.hash.len(), 64); // BLAKE3 hex digest
//! assert!(saved.verify().is_ok());
//!
//! // A second session picks up where the first left off.
//! let reopened = CatalogSession::open(EngineConfig::default(), store.clone()).unwrap();
//! assert_eq!(reopened.catalog().menus().len(), 1);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use menuboard_catalog::catalog::Catalog;
use menuboard_catalog::model::{Item, Menu, ModifierGroup};
use menuboard_catalog::CatalogError;
use serde::{Deserialize, Serialize};

use crate::archive::Archive;
use crate::SessionError;

// ---------------------------------------------------------------------------
// CatalogSnapshot
// ---------------------------------------------------------------------------

/// Serializable state of a session at one version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    /// Number of commands committed when the snapshot was taken.
    pub version: u64,
    pub items: Vec<Item>,
    pub menus: Vec<Menu>,
    pub modifiers: Vec<ModifierGroup>,
    pub archive: Archive,
    /// BLAKE3 hex digest (64 lowercase hex chars) of everything above.
    pub hash: String,
}

impl CatalogSnapshot {
    /// Capture the given state and hash it.
    pub fn capture(
        catalog: &Catalog,
        archive: &Archive,
        version: u64,
    ) -> Result<Self, SessionError> {
        let hash = compute_hash(
            catalog.items(),
            catalog.menus(),
            catalog.modifiers(),
            archive,
            version,
        )?;
        Ok(Self {
            version,
            items: catalog.items().to_vec(),
            menus: catalog.menus().to_vec(),
            modifiers: catalog.modifiers().to_vec(),
            archive: archive.clone(),
            hash,
        })
    }

    /// Recompute the hash and compare it with the recorded one.
    pub fn verify(&self) -> Result<(), SessionError> {
        let actual = compute_hash(
            &self.items,
            &self.menus,
            &self.modifiers,
            &self.archive,
            self.version,
        )?;
        if actual != self.hash {
            return Err(SessionError::Integrity {
                expected: self.hash.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// Rebuild the live catalog, checking its invariants.
    pub fn to_catalog(&self) -> Result<Catalog, CatalogError> {
        Catalog::from_parts(
            self.items.clone(),
            self.menus.clone(),
            self.modifiers.clone(),
        )
    }
}

// ---------------------------------------------------------------------------
// Hashing helpers
// ---------------------------------------------------------------------------

/// BLAKE3 hex digest of the canonical JSON encoding of the hashable state.
/// The hash field itself is not included.
fn compute_hash(
    items: &[Item],
    menus: &[Menu],
    modifiers: &[ModifierGroup],
    archive: &Archive,
    version: u64,
) -> Result<String, SessionError> {
    #[derive(Serialize)]
    struct HashableState<'a> {
        version: u64,
        items: &'a [Item],
        menus: &'a [Menu],
        modifiers: &'a [ModifierGroup],
        archive: &'a Archive,
    }

    let json_bytes = serde_json::to_vec(&HashableState {
        version,
        items,
        menus,
        modifiers,
        archive,
    })?;
    Ok(blake3::hash(&json_bytes).to_hex().to_string())
}

// ---------------------------------------------------------------------------
// CatalogStore
// ---------------------------------------------------------------------------

/// Backing store that is replaced wholesale on every committed command.
///
/// Errors are opaque to the session: any failure aborts the command and is
/// surfaced as [`SessionError::Store`].
pub trait CatalogStore {
    /// The most recently stored snapshot, if any.
    fn load(&mut self) -> anyhow::Result<Option<CatalogSnapshot>>;

    /// Replace the stored state with `snapshot`.
    fn replace(&mut self, snapshot: &CatalogSnapshot) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    latest: Option<CatalogSnapshot>,
    writes: usize,
    failing: bool,
}

/// In-memory store. Clones share the same contents, so a caller can keep a
/// handle while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `snapshot`.
    pub fn with_snapshot(snapshot: CatalogSnapshot) -> Self {
        let store = Self::new();
        store.inner.borrow_mut().latest = Some(snapshot);
        store
    }

    pub fn latest(&self) -> Option<CatalogSnapshot> {
        self.inner.borrow().latest.clone()
    }

    /// Number of successful `replace` calls.
    pub fn write_count(&self) -> usize {
        self.inner.borrow().writes
    }

    /// While set, every `replace` fails.
    pub fn set_failing(&self, failing: bool) {
        self.inner.borrow_mut().failing = failing;
    }
}

impl CatalogStore for MemoryStore {
    fn load(&mut self) -> anyhow::Result<Option<CatalogSnapshot>> {
        Ok(self.inner.borrow().latest.clone())
    }

    fn replace(&mut self, snapshot: &CatalogSnapshot) -> anyhow::Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.failing {
            return Err(anyhow::anyhow!(
                "memory store is failing writes (version {})",
                snapshot.version
            ));
        }
        inner.latest = Some(snapshot.clone());
        inner.writes += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use menuboard_catalog::prelude::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-02T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn sample() -> Catalog {
        let mut catalog = Catalog::new();
        let drinks = MenuId::new("drinks");
        catalog
            .push_menu(Menu::new(drinks.clone(), "Drinks", MenuStatus::Active, now()))
            .unwrap();
        catalog
            .push_item(
                NewItem::new("Latte", drinks, vec![PriceOption::single("3.50")])
                    .into_item(ItemId::new("item-1"), now()),
            )
            .unwrap();
        catalog
    }

    // -- 1. Hash stability --------------------------------------------------

    #[test]
    fn equal_state_hashes_equal() {
        let a = CatalogSnapshot::capture(&sample(), &Archive::new(), 3).unwrap();
        let b = CatalogSnapshot::capture(&sample(), &Archive::new(), 3).unwrap();
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.hash.len(), 64);
    }

    #[test]
    fn version_is_part_of_the_hash() {
        let a = CatalogSnapshot::capture(&sample(), &Archive::new(), 1).unwrap();
        let b = CatalogSnapshot::capture(&sample(), &Archive::new(), 2).unwrap();
        assert_ne!(a.hash, b.hash);
    }

    // -- 2. Verification ----------------------------------------------------

    #[test]
    fn verify_detects_tampering() {
        let mut snapshot = CatalogSnapshot::capture(&sample(), &Archive::new(), 1).unwrap();
        snapshot.verify().unwrap();

        snapshot.items[0].name = "Mocha".to_owned();
        match snapshot.verify() {
            Err(SessionError::Integrity { expected, actual }) => {
                assert_eq!(expected, snapshot.hash);
                assert_ne!(expected, actual);
            }
            other => panic!("expected integrity error, got {other:?}"),
        }
    }

    #[test]
    fn json_roundtrip_still_verifies() {
        let snapshot = CatalogSnapshot::capture(&sample(), &Archive::new(), 5).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: CatalogSnapshot = serde_json::from_str(&json).unwrap();
        back.verify().unwrap();
        assert_eq!(back.to_catalog().unwrap(), sample());
    }

    // -- 3. MemoryStore -----------------------------------------------------

    #[test]
    fn memory_store_replaces_and_counts() {
        let store = MemoryStore::new();
        let mut handle = store.clone();
        assert!(handle.load().unwrap().is_none());

        let snapshot = CatalogSnapshot::capture(&sample(), &Archive::new(), 1).unwrap();
        handle.replace(&snapshot).unwrap();
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.latest(), Some(snapshot));
    }

    #[test]
    fn failing_store_keeps_previous_snapshot() {
        let store = MemoryStore::new();
        let mut handle = store.clone();
        let first = CatalogSnapshot::capture(&sample(), &Archive::new(), 1).unwrap();
        handle.replace(&first).unwrap();

        store.set_failing(true);
        let second = CatalogSnapshot::capture(&Catalog::new(), &Archive::new(), 2).unwrap();
        assert!(handle.replace(&second).is_err());
        assert_eq!(store.latest(), Some(first));
        assert_eq!(store.write_count(), 1);
    }
}
