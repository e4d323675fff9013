//! Recoverable holding area for deleted entities.
//!
//! Entries are kept most-recent-first. The [`Archive`] itself only stores
//! and hands back snapshots; moving an entity between the live catalog and
//! the archive is coordinated by the session inside one transaction.
//!
//! Lifecycle of an entity: live -> archived -> restored (live again) or
//! purged (gone for good).

use std::collections::VecDeque;
use std::fmt::Write as _;

use chrono::{DateTime, Duration, Utc};
use menuboard_catalog::identity::EntityKind;
use menuboard_catalog::model::{Item, Menu, ModifierGroup};
use menuboard_catalog::CatalogError;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ArchivedEntity / ArchivedEntry
// ---------------------------------------------------------------------------

/// Snapshot of a deleted entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ArchivedEntity {
    Item {
        item: Item,
    },
    /// A menu together with the items that were filed under it.
    Menu {
        menu: Menu,
        items: Vec<Item>,
    },
    Modifier {
        modifier: ModifierGroup,
    },
}

impl ArchivedEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            ArchivedEntity::Item { .. } => EntityKind::Item,
            ArchivedEntity::Menu { .. } => EntityKind::Menu,
            ArchivedEntity::Modifier { .. } => EntityKind::Modifier,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ArchivedEntity::Item { item } => item.id.as_str(),
            ArchivedEntity::Menu { menu, .. } => menu.id.as_str(),
            ArchivedEntity::Modifier { modifier } => modifier.id.as_str(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ArchivedEntity::Item { item } => &item.name,
            ArchivedEntity::Menu { menu, .. } => &menu.name,
            ArchivedEntity::Modifier { modifier } => &modifier.name,
        }
    }

    /// Whether this snapshot carries `raw` as its own id or as the id of a
    /// nested item.
    fn holds_id(&self, raw: &str) -> bool {
        if self.id() == raw {
            return true;
        }
        match self {
            ArchivedEntity::Menu { items, .. } => items.iter().any(|i| i.id.as_str() == raw),
            _ => false,
        }
    }
}

/// An archived entity and the time it was deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedEntry {
    pub entity: ArchivedEntity,
    pub deleted_at: DateTime<Utc>,
}

impl ArchivedEntry {
    pub fn id(&self) -> &str {
        self.entity.id()
    }
}

// ---------------------------------------------------------------------------
// Archive
// ---------------------------------------------------------------------------

/// Most-recent-first list of archived entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Archive {
    entries: VecDeque<ArchivedEntry>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a snapshot at the front. The caller removes the entity from
    /// the live collection.
    pub fn archive(&mut self, entity: ArchivedEntity, deleted_at: DateTime<Utc>) {
        self.entries.push_front(ArchivedEntry { entity, deleted_at });
    }

    /// Remove and return the entry for `id`, or `None` if it is not
    /// archived.
    pub fn take(&mut self, id: &str) -> Option<ArchivedEntry> {
        let index = self.entries.iter().position(|entry| entry.id() == id)?;
        self.entries.remove(index)
    }

    /// Drop the entry for `id` for good.
    pub fn permanently_delete(&mut self, id: &str) -> Result<ArchivedEntry, CatalogError> {
        self.take(id).ok_or_else(|| CatalogError::NotArchived { id: id.to_owned() })
    }

    /// Drop every entry deleted strictly before `cutoff`; returns them
    /// most-recent-first.
    pub fn purge_older_than(&mut self, cutoff: DateTime<Utc>) -> Vec<ArchivedEntry> {
        let (purged, kept): (VecDeque<_>, VecDeque<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| entry.deleted_at < cutoff);
        self.entries = kept;
        purged.into()
    }

    /// Drop every entry; returns them most-recent-first.
    pub fn clear(&mut self) -> Vec<ArchivedEntry> {
        self.entries.drain(..).collect()
    }

    pub fn get(&self, id: &str) -> Option<&ArchivedEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Whether any entry, or any item nested in a menu entry, uses `raw`.
    pub fn is_id_in_use(&self, raw: &str) -> bool {
        self.entries.iter().any(|entry| entry.entity.holds_id(raw))
    }

    /// Every id the archive holds, including items nested in menu entries.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().flat_map(|entry| {
            let nested: &[Item] = match &entry.entity {
                ArchivedEntity::Menu { items, .. } => items.as_slice(),
                _ => &[],
            };
            std::iter::once(entry.id()).chain(nested.iter().map(|item| item.id.as_str()))
        })
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> impl Iterator<Item = &ArchivedEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Display age
// ---------------------------------------------------------------------------

/// Human-readable age of an archive entry.
///
/// Under an hour (or in the future) is `"just now"`, under a day counts
/// hours, under a week counts days, anything older is the calendar date in
/// `date_format`.
pub fn format_deleted_age(
    deleted_at: DateTime<Utc>,
    now: DateTime<Utc>,
    date_format: &str,
) -> String {
    let elapsed = now - deleted_at;
    if elapsed < Duration::hours(1) {
        return "just now".to_owned();
    }
    if elapsed < Duration::days(1) {
        return plural(elapsed.num_hours(), "hour");
    }
    if elapsed < Duration::days(7) {
        return plural(elapsed.num_days(), "day");
    }
    let mut date = String::new();
    if write!(date, "{}", deleted_at.format(date_format)).is_err() {
        return deleted_at.date_naive().to_string();
    }
    date
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use menuboard_catalog::prelude::*;

    fn at(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    fn item_entity(id: &str) -> ArchivedEntity {
        let item = NewItem::new(id, MenuId::new("drinks"), vec![PriceOption::single(3.0)])
            .into_item(ItemId::new(id), at("2026-03-01T08:00:00Z"));
        ArchivedEntity::Item { item }
    }

    const DATE: &str = "%b %-d, %Y";

    // -- 1. Ordering and take -----------------------------------------------

    #[test]
    fn archive_is_most_recent_first() {
        let mut archive = Archive::new();
        archive.archive(item_entity("a"), at("2026-03-02T09:00:00Z"));
        archive.archive(item_entity("b"), at("2026-03-02T09:01:00Z"));
        let ids: Vec<&str> = archive.entries().map(ArchivedEntry::id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn take_returns_the_snapshot_once() {
        let mut archive = Archive::new();
        let entity = item_entity("a");
        archive.archive(entity.clone(), at("2026-03-02T09:00:00Z"));

        let entry = archive.take("a").unwrap();
        assert_eq!(entry.entity, entity);
        assert!(archive.take("a").is_none());
        assert!(archive.is_empty());
    }

    #[test]
    fn permanently_deleted_entry_is_unrecoverable() {
        let mut archive = Archive::new();
        archive.archive(item_entity("a"), at("2026-03-02T09:00:00Z"));
        archive.permanently_delete("a").unwrap();
        assert!(archive.take("a").is_none());
        assert_eq!(
            archive.permanently_delete("a").unwrap_err(),
            CatalogError::NotArchived { id: "a".to_owned() }
        );
    }

    // -- 2. Bulk purge ------------------------------------------------------

    #[test]
    fn purge_older_than_keeps_recent_entries() {
        let mut archive = Archive::new();
        archive.archive(item_entity("old"), at("2026-01-01T00:00:00Z"));
        archive.archive(item_entity("new"), at("2026-03-01T00:00:00Z"));

        let purged = archive.purge_older_than(at("2026-02-01T00:00:00Z"));
        assert_eq!(purged.len(), 1);
        assert_eq!(purged[0].id(), "old");
        assert!(archive.contains("new"));

        assert_eq!(archive.clear().len(), 1);
        assert!(archive.is_empty());
    }

    #[test]
    fn nested_menu_items_count_as_used_ids() {
        let mut archive = Archive::new();
        let now = at("2026-03-02T09:00:00Z");
        let items = match item_entity("latte") {
            ArchivedEntity::Item { item } => vec![item],
            _ => unreachable!(),
        };
        archive.archive(
            ArchivedEntity::Menu {
                menu: Menu::new(MenuId::new("drinks"), "Drinks", MenuStatus::Active, now),
                items,
            },
            now,
        );
        assert!(archive.is_id_in_use("drinks"));
        assert!(archive.is_id_in_use("latte"));
        assert!(!archive.contains("latte"));
        assert_eq!(archive.ids().collect::<Vec<_>>(), vec!["drinks", "latte"]);
    }

    // -- 3. Display age -----------------------------------------------------

    #[test]
    fn age_boundaries() {
        let now = at("2026-03-10T12:00:00Z");
        let cases = [
            ("2026-03-10T11:30:00Z", "just now"),
            ("2026-03-10T12:30:00Z", "just now"),
            ("2026-03-10T11:00:00Z", "1 hour ago"),
            ("2026-03-10T07:00:00Z", "5 hours ago"),
            ("2026-03-09T12:00:01Z", "23 hours ago"),
            ("2026-03-09T12:00:00Z", "1 day ago"),
            ("2026-03-04T12:00:00Z", "6 days ago"),
            ("2026-03-03T12:00:00Z", "Mar 3, 2026"),
        ];
        for (deleted_at, expected) in cases {
            assert_eq!(
                format_deleted_age(at(deleted_at), now, DATE),
                expected,
                "deleted at {deleted_at}"
            );
        }
    }

    #[test]
    fn date_format_is_configurable() {
        let now = at("2026-03-10T12:00:00Z");
        assert_eq!(
            format_deleted_age(at("2026-01-05T00:00:00Z"), now, "%Y-%m-%d"),
            "2026-01-05"
        );
    }

    #[test]
    fn entry_serializes_with_kind_tag() {
        let entry = ArchivedEntry {
            entity: item_entity("a"),
            deleted_at: at("2026-03-02T09:00:00Z"),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["entity"]["kind"], serde_json::json!("item"));
        assert!(json.get("deletedAt").is_some());
    }
}
