//! Menu and modifier group commands.
//!
//! Menus double as the categories items are filed under, so deleting a menu
//! takes its items with it and duplicating a menu duplicates its items.
//! Modifier groups are referenced from items by id only; deleting one leaves
//! those ids in place.

use menuboard_catalog::identity::{EntityKind, MenuId, ModifierId};
use menuboard_catalog::model::{validate_name, Menu, MenuPatch, MenuStatus, ModifierGroup, NewModifier};
use menuboard_catalog::CatalogError;
use menuboard_journal::journal::{ChangeAction, ChangeSubject};

use crate::archive::ArchivedEntity;
use crate::session::{CatalogSession, DeletePolicy};
use crate::SessionError;

impl CatalogSession {
    // -- menus --------------------------------------------------------------

    /// Create an empty menu at the end of the menu list.
    pub fn create_menu(&mut self, name: &str, status: MenuStatus) -> Result<Menu, SessionError> {
        self.transact("Create menu", |txn| {
            validate_name("name", name)?;
            let id = txn.fresh_menu_id()?;
            let menu = Menu::new(id, name.trim(), status, txn.now);
            txn.state.catalog.push_menu(menu.clone())?;
            txn.record(ChangeSubject::menu(&menu.id), ChangeAction::Created);
            txn.describe(format!("'{}' created", menu.name));
            Ok(menu)
        })
    }

    /// Rename a menu or change its status.
    pub fn update_menu(&mut self, id: &MenuId, patch: MenuPatch) -> Result<Menu, SessionError> {
        self.transact("Update menu", |txn| {
            patch.validate()?;
            let now = txn.now;
            let menu = txn
                .state
                .catalog
                .menu_mut(id)
                .ok_or_else(|| CatalogError::NotFound {
                    kind: EntityKind::Menu,
                    id: id.to_string(),
                })?;
            patch.apply_to(menu, now);
            let menu = menu.clone();
            txn.record(ChangeSubject::menu(id), ChangeAction::Updated);
            txn.describe(format!("'{}' saved", menu.name));
            Ok(menu)
        })
    }

    /// Copy a menu, as a draft, together with copies of its items.
    ///
    /// The copy is inserted right after the original; the item copies get
    /// fresh ids and are appended to the item collection.
    pub fn duplicate_menu(&mut self, id: &MenuId) -> Result<Menu, SessionError> {
        self.transact("Duplicate menu", |txn| {
            let original = txn.state.catalog.require_menu(id)?.clone();
            let position = txn
                .state
                .catalog
                .menus()
                .iter()
                .position(|menu| &menu.id == id)
                .unwrap_or_default();
            let copy = Menu::new(
                txn.fresh_menu_id()?,
                txn.copy_name(&original.name),
                MenuStatus::Draft,
                txn.now,
            );
            txn.state.catalog.insert_menu(position + 1, copy.clone())?;
            txn.record(
                ChangeSubject::menu(&copy.id),
                ChangeAction::Duplicated {
                    source: id.to_string(),
                },
            );

            let items: Vec<_> = txn.state.catalog.items_in(id).cloned().collect();
            for item in items {
                let source = item.id.to_string();
                let mut dup = item;
                dup.id = txn.fresh_item_id()?;
                dup.category = copy.id.clone();
                dup.last_modified = txn.now;
                txn.state.catalog.push_item(dup.clone())?;
                txn.record(ChangeSubject::item(&dup.id), ChangeAction::Duplicated { source });
            }
            txn.describe(format!("'{}' created", copy.name));
            Ok(copy)
        })
    }

    /// Replace the menu order. `order` must be a permutation of all menu ids.
    pub fn reorder_menus(&mut self, order: &[MenuId]) -> Result<(), SessionError> {
        self.transact("Reorder menus", |txn| {
            txn.state.catalog.reorder_menus(order)?;
            txn.record(ChangeSubject::collection(EntityKind::Menu), ChangeAction::Reordered);
            txn.describe(format!("{} menus reordered", order.len()));
            Ok(())
        })
    }

    /// Remove a menu and every item filed under it.
    ///
    /// With [`DeletePolicy::Archive`] a single archive entry carries the menu
    /// and its items, and restoring it brings all of them back.
    pub fn delete_menu(&mut self, id: &MenuId, policy: DeletePolicy) -> Result<Menu, SessionError> {
        self.transact("Delete menu", |txn| {
            let (menu, items) = txn.state.catalog.remove_menu(id)?;
            let action = match policy {
                DeletePolicy::Archive => ChangeAction::Archived,
                DeletePolicy::Permanent => ChangeAction::Deleted,
            };
            for item in &items {
                txn.record(ChangeSubject::item(&item.id), action.clone());
            }
            txn.record(ChangeSubject::menu(id), action);
            txn.describe(format!("'{}' and {} items removed", menu.name, items.len()));
            if policy == DeletePolicy::Archive {
                txn.state.archive.archive(
                    ArchivedEntity::Menu {
                        menu: menu.clone(),
                        items,
                    },
                    txn.now,
                );
            }
            Ok(menu)
        })
    }

    // -- modifier groups ----------------------------------------------------

    pub fn create_modifier(&mut self, draft: NewModifier) -> Result<ModifierGroup, SessionError> {
        self.transact("Create modifier", |txn| {
            draft.validate()?;
            let id = txn.fresh_modifier_id()?;
            let modifier = draft.into_modifier(id, txn.now);
            txn.state.catalog.push_modifier(modifier.clone())?;
            txn.record(ChangeSubject::modifier(&modifier.id), ChangeAction::Created);
            txn.describe(format!("'{}' created", modifier.name));
            Ok(modifier)
        })
    }

    /// Copy a modifier group, inserted right after the original.
    pub fn duplicate_modifier(&mut self, id: &ModifierId) -> Result<ModifierGroup, SessionError> {
        self.transact("Duplicate modifier", |txn| {
            let mut copy = txn.state.catalog.require_modifier(id)?.clone();
            let position = txn.state.catalog.modifier_position(id).unwrap_or_default();
            copy.id = txn.fresh_modifier_id()?;
            copy.name = txn.copy_name(&copy.name);
            copy.last_modified = txn.now;
            txn.state.catalog.insert_modifier(position + 1, copy.clone())?;
            txn.record(
                ChangeSubject::modifier(&copy.id),
                ChangeAction::Duplicated {
                    source: id.to_string(),
                },
            );
            txn.describe(format!("'{}' created", copy.name));
            Ok(copy)
        })
    }

    /// Remove a modifier group. Items keep referring to its id.
    pub fn delete_modifier(
        &mut self,
        id: &ModifierId,
        policy: DeletePolicy,
    ) -> Result<ModifierGroup, SessionError> {
        self.transact("Delete modifier", |txn| {
            let modifier = txn.state.catalog.remove_modifier(id)?;
            let action = match policy {
                DeletePolicy::Archive => {
                    txn.state.archive.archive(
                        ArchivedEntity::Modifier {
                            modifier: modifier.clone(),
                        },
                        txn.now,
                    );
                    ChangeAction::Archived
                }
                DeletePolicy::Permanent => ChangeAction::Deleted,
            };
            txn.record(ChangeSubject::modifier(id), action);
            txn.describe(format!("'{}' removed", modifier.name));
            Ok(modifier)
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
