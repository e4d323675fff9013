//! The live entity collection.
//!
//! [`Catalog`] owns the ordered item, menu and modifier lists and enforces
//! the structural invariants on every primitive:
//!
//! - ids are unique across the live collection,
//! - every item's `category` names a live menu,
//! - reorders are exact permutations of the ids in scope.
//!
//! Primitives validate before they touch anything, so a returned error always
//! means the catalog is unchanged. Higher-level commands (archival, selection
//! pruning, journaling) live in the engine crate.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::identity::{EntityKind, ItemId, MenuId, ModifierId};
use crate::model::{Item, Menu, ModifierGroup};
use crate::CatalogError;

/// Ordered collections of items, menus and modifier groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    items: Vec<Item>,
    menus: Vec<Menu>,
    modifiers: Vec<ModifierGroup>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from existing collections, checking every invariant.
    pub fn from_parts(
        items: Vec<Item>,
        menus: Vec<Menu>,
        modifiers: Vec<ModifierGroup>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self {
            items,
            menus,
            modifiers,
        };
        catalog.check_invariants()?;
        Ok(catalog)
    }

    /// Verify id uniqueness and category references.
    pub fn check_invariants(&self) -> Result<(), CatalogError> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let all_ids = self
            .menus
            .iter()
            .map(|m| m.id.as_str())
            .chain(self.items.iter().map(|i| i.id.as_str()))
            .chain(self.modifiers.iter().map(|m| m.id.as_str()));
        for id in all_ids {
            if !seen.insert(id) {
                return Err(CatalogError::invariant(format!("duplicate id '{id}'")));
            }
        }
        for item in &self.items {
            if self.menu(&item.category).is_none() {
                return Err(CatalogError::invariant(format!(
                    "item '{}' is filed under missing menu '{}'",
                    item.id, item.category
                )));
            }
        }
        Ok(())
    }

    // -- read access --------------------------------------------------------

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    pub fn modifiers(&self) -> &[ModifierGroup] {
        &self.modifiers
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn item_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    pub fn item_position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    pub fn menu(&self, id: &MenuId) -> Option<&Menu> {
        self.menus.iter().find(|menu| &menu.id == id)
    }

    pub fn menu_mut(&mut self, id: &MenuId) -> Option<&mut Menu> {
        self.menus.iter_mut().find(|menu| &menu.id == id)
    }

    pub fn modifier(&self, id: &ModifierId) -> Option<&ModifierGroup> {
        self.modifiers.iter().find(|modifier| &modifier.id == id)
    }

    /// Like [`item`](Self::item) but a missing id is a `NotFound` error.
    pub fn require_item(&self, id: &ItemId) -> Result<&Item, CatalogError> {
        self.item(id)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Item, id))
    }

    pub fn require_menu(&self, id: &MenuId) -> Result<&Menu, CatalogError> {
        self.menu(id)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Menu, id))
    }

    pub fn require_modifier(&self, id: &ModifierId) -> Result<&ModifierGroup, CatalogError> {
        self.modifier(id)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Modifier, id))
    }

    /// Whether any live entity, of any kind, uses this raw id.
    pub fn is_id_in_use(&self, raw: &str) -> bool {
        self.items.iter().any(|i| i.id.as_str() == raw)
            || self.menus.iter().any(|m| m.id.as_str() == raw)
            || self.modifiers.iter().any(|m| m.id.as_str() == raw)
    }

    /// Items filed under `menu`, in collection order.
    pub fn items_in<'a>(&'a self, menu: &'a MenuId) -> impl Iterator<Item = &'a Item> + 'a {
        self.items.iter().filter(move |item| &item.category == menu)
    }

    /// Derived item count of a menu.
    pub fn item_count(&self, menu: &MenuId) -> usize {
        self.items_in(menu).count()
    }

    // -- item primitives ----------------------------------------------------

    /// Append an item at the end of the collection.
    pub fn push_item(&mut self, item: Item) -> Result<(), CatalogError> {
        let index = self.items.len();
        self.insert_item(index, item)
    }

    /// Insert an item at `index` (clamped to the collection length).
    pub fn insert_item(&mut self, index: usize, item: Item) -> Result<(), CatalogError> {
        self.check_fresh(item.id.as_str())?;
        self.require_menu(&item.category)?;
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        Ok(())
    }

    /// Remove and return an item.
    pub fn remove_item(&mut self, id: &ItemId) -> Result<Item, CatalogError> {
        let index = self
            .item_position(id)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Item, id))?;
        Ok(self.items.remove(index))
    }

    /// Remove every item matching `predicate`, returning them in collection
    /// order.
    pub fn remove_items_where<F>(&mut self, mut predicate: F) -> Vec<Item>
    where
        F: FnMut(&Item) -> bool,
    {
        let (removed, kept): (Vec<Item>, Vec<Item>) =
            std::mem::take(&mut self.items).into_iter().partition(|item| predicate(item));
        self.items = kept;
        removed
    }

    /// Replace the order of the items in scope.
    ///
    /// With `scope = None` the whole collection is reordered and `order` must
    /// be a permutation of all item ids. With a menu scope, `order` must be a
    /// permutation of that menu's items; they are written back into the
    /// slots they already occupy, so items of other menus do not move.
    pub fn reorder_items(
        &mut self,
        scope: Option<&MenuId>,
        order: &[ItemId],
    ) -> Result<(), CatalogError> {
        if let Some(menu) = scope {
            self.require_menu(menu)?;
        }
        let slots: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| scope.map_or(true, |menu| &item.category == menu))
            .map(|(index, _)| index)
            .collect();
        let current: Vec<&ItemId> = slots.iter().map(|&i| &self.items[i].id).collect();
        check_permutation(&current, order, "item")?;

        let reordered: Vec<Item> = {
            let lookup: HashMap<&ItemId, &Item> =
                slots.iter().map(|&i| (&self.items[i].id, &self.items[i])).collect();
            order
                .iter()
                .filter_map(|id| lookup.get(id).map(|item| (*item).clone()))
                .collect()
        };
        for (slot, item) in slots.into_iter().zip(reordered) {
            self.items[slot] = item;
        }
        Ok(())
    }

    // -- menu primitives ----------------------------------------------------

    pub fn push_menu(&mut self, menu: Menu) -> Result<(), CatalogError> {
        let index = self.menus.len();
        self.insert_menu(index, menu)
    }

    pub fn insert_menu(&mut self, index: usize, menu: Menu) -> Result<(), CatalogError> {
        self.check_fresh(menu.id.as_str())?;
        let index = index.min(self.menus.len());
        self.menus.insert(index, menu);
        Ok(())
    }

    /// Remove a menu together with the items filed under it.
    ///
    /// Returns the menu and its items (in collection order).
    pub fn remove_menu(&mut self, id: &MenuId) -> Result<(Menu, Vec<Item>), CatalogError> {
        let index = self
            .menus
            .iter()
            .position(|menu| &menu.id == id)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Menu, id))?;
        let menu = self.menus.remove(index);
        let items = self.remove_items_where(|item| &item.category == id);
        tracing::debug!(menu = %id, items = items.len(), "removed menu with its items");
        Ok((menu, items))
    }

    /// Replace the menu order with `order`, which must be a permutation of
    /// all menu ids.
    pub fn reorder_menus(&mut self, order: &[MenuId]) -> Result<(), CatalogError> {
        let current: Vec<&MenuId> = self.menus.iter().map(|m| &m.id).collect();
        check_permutation(&current, order, "menu")?;
        let mut by_id: HashMap<MenuId, Menu> = std::mem::take(&mut self.menus)
            .into_iter()
            .map(|menu| (menu.id.clone(), menu))
            .collect();
        self.menus = order.iter().filter_map(|id| by_id.remove(id)).collect();
        Ok(())
    }

    // -- modifier primitives ------------------------------------------------

    pub fn push_modifier(&mut self, modifier: ModifierGroup) -> Result<(), CatalogError> {
        let index = self.modifiers.len();
        self.insert_modifier(index, modifier)
    }

    pub fn insert_modifier(
        &mut self,
        index: usize,
        modifier: ModifierGroup,
    ) -> Result<(), CatalogError> {
        self.check_fresh(modifier.id.as_str())?;
        let index = index.min(self.modifiers.len());
        self.modifiers.insert(index, modifier);
        Ok(())
    }

    pub fn remove_modifier(&mut self, id: &ModifierId) -> Result<ModifierGroup, CatalogError> {
        let index = self
            .modifiers
            .iter()
            .position(|modifier| &modifier.id == id)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Modifier, id))?;
        Ok(self.modifiers.remove(index))
    }

    pub fn modifier_position(&self, id: &ModifierId) -> Option<usize> {
        self.modifiers.iter().position(|modifier| &modifier.id == id)
    }

    // -- internal helpers ---------------------------------------------------

    fn check_fresh(&self, raw: &str) -> Result<(), CatalogError> {
        if self.is_id_in_use(raw) {
            return Err(CatalogError::invariant(format!(
                "id '{raw}' is already in use"
            )));
        }
        Ok(())
    }
}

/// `proposed` must contain exactly the ids of `current`, each once.
fn check_permutation<T>(current: &[&T], proposed: &[T], what: &str) -> Result<(), CatalogError>
where
    T: Ord + Display,
{
    if current.len() != proposed.len() {
        return Err(CatalogError::invariant(format!(
            "{what} reorder must list {} ids, got {}",
            current.len(),
            proposed.len()
        )));
    }
    let known: BTreeSet<&T> = current.iter().copied().collect();
    let mut seen: BTreeSet<&T> = BTreeSet::new();
    for id in proposed {
        if !known.contains(id) {
            return Err(CatalogError::invariant(format!(
                "{what} reorder names '{id}', which is not in scope"
            )));
        }
        if !seen.insert(id) {
            return Err(CatalogError::invariant(format!(
                "{what} reorder lists '{id}' more than once"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
