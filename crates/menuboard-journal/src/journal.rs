//! Change journal for tracking every committed catalog mutation.
//!
//! The [`ChangeJournal`] records one [`CatalogChange`] per entity a command
//! touched: what was changed ([`ChangeSubject`]), how ([`ChangeAction`]),
//! and when. Entries carry a monotonically increasing sequence number that
//! survives eviction, so a consumer can poll with [`ChangeJournal::since`]
//! and never see an entry twice.
//!
//! The journal is bounded. Once `capacity` entries are held, recording a new
//! one evicts the oldest.
//!
//! # Query API
//!
//! - **Entity**: [`ChangeJournal::changes_for_entity`]
//! - **Kind**: [`ChangeJournal::changes_for_kind`]
//! - **Sequence**: [`ChangeJournal::since`], [`ChangeJournal::latest`]
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use menuboard_catalog::identity::ItemId;
//! use menuboard_journal::journal::{ChangeAction, ChangeJournal, ChangeSubject, EntityRef};
//!
//! let mut journal = ChangeJournal::new();
//! let latte = ItemId::new("item-1");
//!
//! journal.record(ChangeSubject::item(&latte), ChangeAction::Created, Utc::now());
//! journal.record(ChangeSubject::item(&latte), ChangeAction::Updated, Utc::now());
//!
//! assert_eq!(journal.len(), 2);
//! assert_eq!(journal.changes_for_entity(&EntityRef::item(&latte)).count(), 2);
//! ```

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use menuboard_catalog::identity::{EntityKind, ItemId, MenuId, ModifierId};
use serde::{Deserialize, Serialize};

/// Entries kept when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 1024;

// ---------------------------------------------------------------------------
// Subjects and actions
// ---------------------------------------------------------------------------

/// A single entity, addressed by kind and raw id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn item(id: &ItemId) -> Self {
        Self::new(EntityKind::Item, id.as_str())
    }

    pub fn menu(id: &MenuId) -> Self {
        Self::new(EntityKind::Menu, id.as_str())
    }

    pub fn modifier(id: &ModifierId) -> Self {
        Self::new(EntityKind::Modifier, id.as_str())
    }
}

/// What a change applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "camelCase")]
pub enum ChangeSubject {
    /// One entity.
    Entity(EntityRef),
    /// A whole collection, e.g. after a reorder.
    Collection { kind: EntityKind },
}

impl ChangeSubject {
    pub fn item(id: &ItemId) -> Self {
        ChangeSubject::Entity(EntityRef::item(id))
    }

    pub fn menu(id: &MenuId) -> Self {
        ChangeSubject::Entity(EntityRef::menu(id))
    }

    pub fn modifier(id: &ModifierId) -> Self {
        ChangeSubject::Entity(EntityRef::modifier(id))
    }

    pub fn collection(kind: EntityKind) -> Self {
        ChangeSubject::Collection { kind }
    }

    /// The entity kind this subject belongs to.
    pub fn kind(&self) -> EntityKind {
        match self {
            ChangeSubject::Entity(entity) => entity.kind,
            ChangeSubject::Collection { kind } => *kind,
        }
    }

    pub fn entity(&self) -> Option<&EntityRef> {
        match self {
            ChangeSubject::Entity(entity) => Some(entity),
            ChangeSubject::Collection { .. } => None,
        }
    }
}

/// How the subject changed.
///
/// `Archived` and `Deleted` both remove an entity from the live collection;
/// only the former leaves it recoverable. `Purged` is the permanent removal
/// of an archive entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
    /// Created as a copy of `source`, named with the copy suffix.
    Duplicated { source: String },
    /// Created by a bulk copy of `source` into another menu.
    Copied { source: String },
    /// Refiled from one menu to another.
    Moved { from: MenuId, to: MenuId },
    Reordered,
    Archived,
    Restored,
    Purged,
}

// ---------------------------------------------------------------------------
// CatalogChange
// ---------------------------------------------------------------------------

/// A single recorded change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogChange {
    /// Position in the journal's history, starting at 1. Never reused.
    pub sequence: u64,
    pub subject: ChangeSubject,
    pub action: ChangeAction,
    /// Commit time of the command that produced this change.
    pub at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ChangeJournal
// ---------------------------------------------------------------------------

/// Bounded, ordered history of [`CatalogChange`] entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeJournal {
    changes: VecDeque<CatalogChange>,
    next_sequence: u64,
    capacity: usize,
}

impl Default for ChangeJournal {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ChangeJournal {
    /// Create an empty journal holding up to [`DEFAULT_CAPACITY`] entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty journal holding up to `capacity` entries. A zero
    /// capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            changes: VecDeque::new(),
            next_sequence: 1,
            capacity: capacity.max(1),
        }
    }

    /// Append a change and return its sequence number, evicting the oldest
    /// entry if the journal is full.
    pub fn record(&mut self, subject: ChangeSubject, action: ChangeAction, at: DateTime<Utc>) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        if self.changes.len() == self.capacity {
            if let Some(evicted) = self.changes.pop_front() {
                tracing::trace!(sequence = evicted.sequence, "journal full, evicted oldest change");
            }
        }
        self.changes.push_back(CatalogChange {
            sequence,
            subject,
            action,
            at,
        });
        sequence
    }

    /// Drop every entry. Sequence numbers keep counting from where they were.
    pub fn clear(&mut self) {
        self.changes.clear();
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All retained changes, oldest first.
    pub fn all_changes(&self) -> impl Iterator<Item = &CatalogChange> {
        self.changes.iter()
    }

    /// The most recent change, if any.
    pub fn latest(&self) -> Option<&CatalogChange> {
        self.changes.back()
    }

    /// Retained changes with a sequence number greater than `sequence`.
    pub fn since(&self, sequence: u64) -> impl Iterator<Item = &CatalogChange> {
        self.changes.iter().filter(move |c| c.sequence > sequence)
    }

    /// Changes that applied to the given entity.
    pub fn changes_for_entity<'a>(
        &'a self,
        entity: &'a EntityRef,
    ) -> impl Iterator<Item = &'a CatalogChange> + 'a {
        self.changes
            .iter()
            .filter(move |c| c.subject.entity() == Some(entity))
    }

    /// Changes to entities or collections of the given kind.
    pub fn changes_for_kind(&self, kind: EntityKind) -> impl Iterator<Item = &CatalogChange> {
        self.changes.iter().filter(move |c| c.subject.kind() == kind)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
