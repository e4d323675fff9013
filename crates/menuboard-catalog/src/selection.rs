//! Multi-select state over item ids.
//!
//! The set itself is dumb; the session keeps it consistent by pruning ids of
//! items that leave the live collection inside the same mutation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::identity::ItemId;

/// The item ids currently marked for bulk operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    ids: BTreeSet<ItemId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: ItemId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Replace the selection with exactly `ids`.
    pub fn select_all<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = ItemId>,
    {
        self.ids = ids.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.ids.contains(id)
    }

    pub fn remove(&mut self, id: &ItemId) -> bool {
        self.ids.remove(id)
    }

    /// Keep only ids for which `keep` returns `true`; returns how many were
    /// dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&ItemId) -> bool,
    {
        let before = self.ids.len();
        self.ids.retain(|id| keep(id));
        before - self.ids.len()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.ids.iter()
    }

    pub fn to_vec(&self) -> Vec<ItemId> {
        self.ids.iter().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
