//! Filtered item views.
//!
//! An [`ItemFilter`] is a plain value (category + free-text query). Applying
//! it walks the collection lazily and yields matches in collection order.
//! Nothing is cached: the view is recomputed on every call, which keeps it
//! trivially consistent with the collection at catalog sizes of tens to a few
//! hundred items.

use crate::identity::{ItemId, MenuId};
use crate::model::Item;

/// Category and text criteria for narrowing the item collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    category: Option<MenuId>,
    /// Lowercased, trimmed, never empty.
    query: Option<String>,
}

impl ItemFilter {
    /// A filter that matches every item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to items filed under `category` (exact match).
    pub fn in_category(mut self, category: MenuId) -> Self {
        self.category = Some(category);
        self
    }

    /// Restrict to items whose name or description contains `query`,
    /// ignoring case. A blank query removes the text criterion.
    pub fn matching(mut self, query: &str) -> Self {
        let trimmed = query.trim();
        self.query = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        };
        self
    }

    pub fn category(&self) -> Option<&MenuId> {
        self.category.as_ref()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Whether a single item passes both criteria.
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(category) = &self.category {
            if &item.category != category {
                return false;
            }
        }
        match &self.query {
            None => true,
            Some(query) => {
                item.name.to_lowercase().contains(query.as_str())
                    || item
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(query.as_str()))
            }
        }
    }

    /// Lazily yield the matching items in collection order.
    pub fn apply<'a>(&'a self, items: &'a [Item]) -> impl Iterator<Item = &'a Item> + 'a {
        items.iter().filter(move |item| self.matches(item))
    }

    /// Ids of the matching items, in collection order.
    pub fn ids(&self, items: &[Item]) -> Vec<ItemId> {
        self.apply(items).map(|item| item.id.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewItem, PriceOption};
    use chrono::Utc;

    fn item(id: &str, name: &str, category: &str, description: Option<&str>) -> Item {
        let mut draft = NewItem::new(name, MenuId::new(category), vec![PriceOption::single(1.0)]);
        draft.description = description.map(str::to_owned);
        draft.into_item(ItemId::new(id), Utc::now())
    }

    fn sample() -> Vec<Item> {
        vec![
            item("1", "Latte", "drinks", Some("Espresso with steamed milk")),
            item("2", "Croissant", "food", None),
            item("3", "Iced Tea", "drinks", None),
            item("4", "Milk Bun", "food", Some("Soft and sweet")),
        ]
    }

    fn names<'a>(it: impl Iterator<Item = &'a Item>) -> Vec<&'a str> {
        it.map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything_in_order() {
        let items = sample();
        let filter = ItemFilter::new();
        assert_eq!(
            names(filter.apply(&items)),
            vec!["Latte", "Croissant", "Iced Tea", "Milk Bun"]
        );
    }

    #[test]
    fn category_is_exact_match() {
        let items = sample();
        let filter = ItemFilter::new().in_category(MenuId::new("drinks"));
        assert_eq!(names(filter.apply(&items)), vec!["Latte", "Iced Tea"]);

        let filter = ItemFilter::new().in_category(MenuId::new("drink"));
        assert_eq!(filter.apply(&items).count(), 0);
    }

    #[test]
    fn text_matches_name_or_description_case_insensitively() {
        let items = sample();
        let filter = ItemFilter::new().matching("MILK");
        assert_eq!(names(filter.apply(&items)), vec!["Latte", "Milk Bun"]);
    }

    #[test]
    fn absent_description_never_matches() {
        let items = sample();
        let filter = ItemFilter::new().matching("sweet");
        assert_eq!(names(filter.apply(&items)), vec!["Milk Bun"]);
        let filter = ItemFilter::new().matching("steamed");
        assert_eq!(names(filter.apply(&items)), vec!["Latte"]);
    }

    #[test]
    fn criteria_compose_with_and() {
        let items = sample();
        let filter = ItemFilter::new()
            .in_category(MenuId::new("food"))
            .matching("milk");
        assert_eq!(names(filter.apply(&items)), vec!["Milk Bun"]);
    }

    #[test]
    fn blank_query_is_ignored() {
        let filter = ItemFilter::new().matching("   ");
        assert_eq!(filter.query(), None);
        assert_eq!(filter.apply(&sample()).count(), 4);
    }

    #[test]
    fn view_is_restartable_and_tracks_collection() {
        let mut items = sample();
        let filter = ItemFilter::new().in_category(MenuId::new("drinks"));
        assert_eq!(filter.ids(&items).len(), 2);
        assert_eq!(filter.ids(&items).len(), 2);

        items.push(item("5", "Mocha", "drinks", None));
        assert_eq!(
            filter.ids(&items),
            vec![ItemId::new("1"), ItemId::new("3"), ItemId::new("5")]
        );
    }
}
