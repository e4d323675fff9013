//! Item commands: add, update, delete, duplicate, reorder, bulk operations
//! and flag toggles.
//!
//! Each command is one [`transact`](CatalogSession::transact) call. The
//! closures below only ever touch the staged state, so returning early with
//! `?` is always safe.

use std::collections::BTreeSet;

use menuboard_catalog::identity::{EntityKind, ItemId, MenuId};
use menuboard_catalog::model::{Item, ItemPatch, NewItem, VisibilitySettings};
use menuboard_catalog::CatalogError;
use menuboard_journal::journal::{ChangeAction, ChangeSubject};

use crate::archive::ArchivedEntity;
use crate::session::{CatalogSession, DeletePolicy, Txn};
use crate::SessionError;

impl CatalogSession {
    /// Create an item from a draft and append it to the collection.
    ///
    /// # Errors
    ///
    /// - `Validation` on an empty name, no price options or a negative price.
    /// - `NotFound` if the draft's category is not a live menu.
    pub fn add_item(&mut self, draft: NewItem) -> Result<Item, SessionError> {
        self.transact("Add item", |txn| {
            draft.validate()?;
            txn.state.catalog.require_menu(&draft.category)?;
            let id = txn.fresh_item_id()?;
            let item = draft.into_item(id, txn.now);
            txn.state.catalog.push_item(item.clone())?;
            txn.record(ChangeSubject::item(&item.id), ChangeAction::Created);
            txn.describe(format!("'{}' added", item.name));
            Ok(item)
        })
    }

    /// Merge `patch` into the item currently being edited.
    ///
    /// `editing` is the caller's edit target; `None` means nothing is being
    /// edited. Fields left as `None` in the patch keep their value.
    ///
    /// # Errors
    ///
    /// - `NoEditTarget` if `editing` is `None`.
    /// - `NotFound` if the target or a new category does not exist.
    /// - `Validation` on an empty name or invalid price options.
    pub fn update_item(
        &mut self,
        editing: Option<&ItemId>,
        patch: ItemPatch,
    ) -> Result<Item, SessionError> {
        self.transact("Update item", |txn| {
            let id = editing.ok_or(CatalogError::NoEditTarget)?;
            txn.state.catalog.require_item(id)?;
            patch.validate()?;
            if let Some(category) = &patch.category {
                txn.state.catalog.require_menu(category)?;
            }
            let now = txn.now;
            let updated = edit_item(txn, id, |item| patch.apply_to(item, now))?;
            txn.record(ChangeSubject::item(id), ChangeAction::Updated);
            txn.describe(format!("'{}' saved", updated.name));
            Ok(updated)
        })
    }

    /// Remove an item from the live collection and the selection.
    pub fn delete_item(&mut self, id: &ItemId, policy: DeletePolicy) -> Result<Item, SessionError> {
        self.transact("Delete item", |txn| {
            let item = txn.state.catalog.remove_item(id)?;
            retire_item(txn, &item, policy);
            txn.describe(match policy {
                DeletePolicy::Archive => format!("'{}' moved to the archive", item.name),
                DeletePolicy::Permanent => format!("'{}' deleted", item.name),
            });
            Ok(item)
        })
    }

    /// Copy an item under a fresh id, with the copy suffix on its name, and
    /// insert it right after the original.
    pub fn duplicate_item(&mut self, id: &ItemId) -> Result<Item, SessionError> {
        self.transact("Duplicate item", |txn| {
            let original = txn.state.catalog.require_item(id)?.clone();
            let position = txn.state.catalog.item_position(id).unwrap_or_default();
            let mut copy = original;
            copy.id = txn.fresh_item_id()?;
            copy.name = txn.copy_name(&copy.name);
            copy.last_modified = txn.now;
            txn.state.catalog.insert_item(position + 1, copy.clone())?;
            txn.record(
                ChangeSubject::item(&copy.id),
                ChangeAction::Duplicated {
                    source: id.to_string(),
                },
            );
            txn.describe(format!("'{}' created", copy.name));
            Ok(copy)
        })
    }

    /// Replace the order of the whole collection (`scope = None`) or of one
    /// menu's items. `order` must be a permutation of the ids in scope.
    pub fn reorder_items(
        &mut self,
        scope: Option<&MenuId>,
        order: &[ItemId],
    ) -> Result<(), SessionError> {
        self.transact("Reorder items", |txn| {
            txn.state.catalog.reorder_items(scope, order)?;
            txn.record(ChangeSubject::collection(EntityKind::Item), ChangeAction::Reordered);
            txn.describe(format!("{} items reordered", order.len()));
            Ok(())
        })
    }

    // -- bulk operations ----------------------------------------------------

    /// Remove every live item whose id is in `ids` and clear the selection.
    /// Ids that are not live are ignored. Returns how many were removed.
    ///
    /// With [`DeletePolicy::Archive`] items are archived in collection order,
    /// so the archive lists them newest-first in reverse of that order.
    pub fn bulk_delete(&mut self, ids: &[ItemId], policy: DeletePolicy) -> Result<usize, SessionError> {
        let wanted: BTreeSet<&ItemId> = ids.iter().collect();
        self.transact("Delete items", |txn| {
            let removed = txn
                .state
                .catalog
                .remove_items_where(|item| wanted.contains(&item.id));
            for item in &removed {
                retire_item(txn, item, policy);
            }
            txn.state.selection.clear();
            txn.describe(format!("{} items deleted", removed.len()));
            Ok(removed.len())
        })
    }

    /// File independent copies of the given items under `target`. Copies
    /// get fresh ids and keep their names; originals are untouched. Clears
    /// the selection.
    pub fn bulk_copy(&mut self, ids: &[ItemId], target: &MenuId) -> Result<Vec<Item>, SessionError> {
        let wanted: BTreeSet<&ItemId> = ids.iter().collect();
        self.transact("Copy items", |txn| {
            let menu_name = txn.state.catalog.require_menu(target)?.name.clone();
            let originals: Vec<Item> = txn
                .state
                .catalog
                .items()
                .iter()
                .filter(|item| wanted.contains(&item.id))
                .cloned()
                .collect();

            let mut copies = Vec::with_capacity(originals.len());
            for original in originals {
                let source = original.id.to_string();
                let mut copy = original;
                copy.id = txn.fresh_item_id()?;
                copy.category = target.clone();
                copy.last_modified = txn.now;
                txn.state.catalog.push_item(copy.clone())?;
                txn.record(ChangeSubject::item(&copy.id), ChangeAction::Copied { source });
                copies.push(copy);
            }
            txn.state.selection.clear();
            txn.describe(format!("{} items copied to '{menu_name}'", copies.len()));
            Ok(copies)
        })
    }

    /// Refile the given items under `target` in place. Clears the selection.
    /// Returns how many items were moved.
    pub fn bulk_move(&mut self, ids: &[ItemId], target: &MenuId) -> Result<usize, SessionError> {
        let wanted: BTreeSet<&ItemId> = ids.iter().collect();
        self.transact("Move items", |txn| {
            let menu_name = txn.state.catalog.require_menu(target)?.name.clone();
            let moving: Vec<(ItemId, MenuId)> = txn
                .state
                .catalog
                .items()
                .iter()
                .filter(|item| wanted.contains(&item.id))
                .map(|item| (item.id.clone(), item.category.clone()))
                .collect();

            for (id, from) in &moving {
                let now = txn.now;
                edit_item(txn, id, |item| {
                    item.category = target.clone();
                    item.last_modified = now;
                })?;
                txn.record(
                    ChangeSubject::item(id),
                    ChangeAction::Moved {
                        from: from.clone(),
                        to: target.clone(),
                    },
                );
            }
            txn.state.selection.clear();
            txn.describe(format!("{} items moved to '{menu_name}'", moving.len()));
            Ok(moving.len())
        })
    }

    // -- flags and visibility -----------------------------------------------

    /// Flip `is_available`.
    pub fn toggle_availability(&mut self, id: &ItemId) -> Result<Item, SessionError> {
        self.toggle_flag("Toggle availability", id, |item| {
            item.is_available = !item.is_available;
        })
    }

    /// Flip `is_sold_out`.
    pub fn toggle_sold_out(&mut self, id: &ItemId) -> Result<Item, SessionError> {
        self.toggle_flag("Toggle sold out", id, |item| {
            item.is_sold_out = !item.is_sold_out;
        })
    }

    /// Flip `is_featured`.
    pub fn toggle_featured(&mut self, id: &ItemId) -> Result<Item, SessionError> {
        self.toggle_flag("Toggle featured", id, |item| {
            item.is_featured = !item.is_featured;
        })
    }

    /// Replace an item's visibility settings; `None` makes it always visible.
    pub fn set_visibility(
        &mut self,
        id: &ItemId,
        visibility: Option<VisibilitySettings>,
    ) -> Result<Item, SessionError> {
        self.toggle_flag("Set visibility", id, move |item| {
            item.visibility = visibility;
        })
    }

    fn toggle_flag<F>(&mut self, title: &str, id: &ItemId, change: F) -> Result<Item, SessionError>
    where
        F: FnOnce(&mut Item),
    {
        self.transact(title, |txn| {
            let now = txn.now;
            let updated = edit_item(txn, id, |item| {
                change(item);
                item.last_modified = now;
            })?;
            txn.record(ChangeSubject::item(id), ChangeAction::Updated);
            txn.describe(format!("'{}' updated", updated.name));
            Ok(updated)
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Apply `change` to a live item and return the result.
fn edit_item<F>(txn: &mut Txn<'_>, id: &ItemId, change: F) -> Result<Item, CatalogError>
where
    F: FnOnce(&mut Item),
{
    let item = txn
        .state
        .catalog
        .item_mut(id)
        .ok_or_else(|| CatalogError::NotFound {
            kind: EntityKind::Item,
            id: id.to_string(),
        })?;
    change(item);
    Ok(item.clone())
}

/// Archive (or not) an item already removed from the live collection and
/// journal its removal.
fn retire_item(txn: &mut Txn<'_>, item: &Item, policy: DeletePolicy) {
    let action = match policy {
        DeletePolicy::Archive => {
            txn.state
                .archive
                .archive(ArchivedEntity::Item { item: item.clone() }, txn.now);
            ChangeAction::Archived
        }
        DeletePolicy::Permanent => ChangeAction::Deleted,
    };
    txn.record(ChangeSubject::item(&item.id), action);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
