//! The catalog session: owner of all catalog state.
//!
//! A [`CatalogSession`] holds the live [`Catalog`], the [`SelectionSet`],
//! the [`Archive`] and the [`ChangeJournal`]. Reads are plain `&self`
//! methods. Every command goes through one transaction:
//!
//! 1. Clone the state and run the command against the clone.
//! 2. Prune selected ids that no longer name a live item.
//! 3. Capture a [`CatalogSnapshot`] and hand it to the [`CatalogStore`].
//! 4. Swap the clone in and bump the version.
//!
//! A failure at any step drops the clone, so a rejected command leaves
//! nothing behind: not in the catalog, the selection, the archive or the
//! journal. Every outcome is reported to the [`FeedbackSink`].
//!
//! Item and menu commands live in sibling modules; this one holds the
//! transaction machinery, queries, selection and archive commands.

use chrono::{DateTime, Utc};
use menuboard_catalog::catalog::Catalog;
use menuboard_catalog::filter::ItemFilter;
use menuboard_catalog::identity::{EntityKind, IdGenerator, ItemId, MenuId, ModifierId};
use menuboard_catalog::model::{Item, MenuStatus};
use menuboard_catalog::price::{PriceDisplay, PriceResolver};
use menuboard_catalog::selection::SelectionSet;
use menuboard_catalog::visibility::{is_hidden, next_reveal};
use menuboard_catalog::CatalogError;
use menuboard_journal::journal::{ChangeAction, ChangeJournal, ChangeSubject};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::archive::{format_deleted_age, Archive, ArchivedEntity, ArchivedEntry};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::notify::{FeedbackSink, NullSink};
use crate::snapshot::{CatalogSnapshot, CatalogStore, MemoryStore};
use crate::SessionError;

/// Draws per fresh id before giving up on finding an unused one.
const MAX_ID_ATTEMPTS: usize = 64;

// ---------------------------------------------------------------------------
// Public value types
// ---------------------------------------------------------------------------

/// What happens to an entity removed from the live collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Keep a recoverable snapshot in the archive.
    #[default]
    Archive,
    /// Remove with no trace.
    Permanent,
}

/// Aggregate counts over the live items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total: usize,
    pub available: usize,
    pub unavailable: usize,
    pub selected: usize,
    /// Items currently hidden from customers by their visibility settings.
    pub hidden: usize,
    pub featured: usize,
}

/// A menu with its derived item count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSummary {
    pub id: MenuId,
    pub name: String,
    pub status: MenuStatus,
    pub item_count: usize,
}

/// One row of the archive view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveListing {
    pub id: String,
    pub kind: EntityKind,
    pub name: String,
    pub deleted_at: DateTime<Utc>,
    /// e.g. `"3 hours ago"`.
    pub age: String,
}

// ---------------------------------------------------------------------------
// SessionState / Txn
// ---------------------------------------------------------------------------

/// Everything a command may change. Cloned at the start of a transaction.
#[derive(Debug, Clone)]
pub(crate) struct SessionState {
    pub(crate) catalog: Catalog,
    pub(crate) selection: SelectionSet,
    pub(crate) archive: Archive,
    pub(crate) journal: ChangeJournal,
}

impl SessionState {
    fn empty(config: &EngineConfig) -> Self {
        Self {
            catalog: Catalog::new(),
            selection: SelectionSet::new(),
            archive: Archive::new(),
            journal: ChangeJournal::with_capacity(config.journal_capacity),
        }
    }

    /// Move `ids` past every live and archived id.
    fn resume_ids(&self, ids: &mut dyn IdGenerator) {
        let catalog = &self.catalog;
        let in_use: Vec<&str> = catalog
            .items()
            .iter()
            .map(|item| item.id.as_str())
            .chain(catalog.menus().iter().map(|menu| menu.id.as_str()))
            .chain(catalog.modifiers().iter().map(|modifier| modifier.id.as_str()))
            .chain(self.archive.ids())
            .collect();
        ids.resume(&in_use);
    }
}

/// A staged command: the cloned state plus what the command needs to stamp
/// and name new entities.
pub(crate) struct Txn<'a> {
    pub(crate) state: SessionState,
    pub(crate) now: DateTime<Utc>,
    pub(crate) config: &'a EngineConfig,
    ids: &'a mut dyn IdGenerator,
    detail: String,
}

impl Txn<'_> {
    /// Draw ids until one is used by neither a live nor an archived entity.
    fn fresh_raw(&mut self, kind: EntityKind) -> Result<String, CatalogError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let raw = self.ids.next_raw(kind);
            if !self.state.catalog.is_id_in_use(&raw) && !self.state.archive.is_id_in_use(&raw) {
                return Ok(raw);
            }
            debug!(kind = %kind, id = %raw, "generated id already in use, drawing again");
        }
        Err(CatalogError::InvariantViolation {
            message: format!("could not generate an unused {kind} id"),
        })
    }

    pub(crate) fn fresh_item_id(&mut self) -> Result<ItemId, CatalogError> {
        self.fresh_raw(EntityKind::Item).map(ItemId::new)
    }

    pub(crate) fn fresh_menu_id(&mut self) -> Result<MenuId, CatalogError> {
        self.fresh_raw(EntityKind::Menu).map(MenuId::new)
    }

    pub(crate) fn fresh_modifier_id(&mut self) -> Result<ModifierId, CatalogError> {
        self.fresh_raw(EntityKind::Modifier).map(ModifierId::new)
    }

    /// Name with the configured copy suffix appended.
    pub(crate) fn copy_name(&self, name: &str) -> String {
        format!("{name}{}", self.config.copy_suffix)
    }

    pub(crate) fn record(&mut self, subject: ChangeSubject, action: ChangeAction) {
        self.state.journal.record(subject, action, self.now);
    }

    /// Detail line for the success report.
    pub(crate) fn describe(&mut self, detail: impl Into<String>) {
        self.detail = detail.into();
    }
}

// ---------------------------------------------------------------------------
// CatalogSession
// ---------------------------------------------------------------------------

/// Single-writer owner of the catalog state.
pub struct CatalogSession {
    state: SessionState,
    config: EngineConfig,
    resolver: PriceResolver,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
    sink: Box<dyn FeedbackSink>,
    store: Box<dyn CatalogStore>,
    version: u64,
}

impl std::fmt::Debug for CatalogSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSession")
            .field("version", &self.version)
            .field("items", &self.state.catalog.items().len())
            .field("menus", &self.state.catalog.menus().len())
            .field("archived", &self.state.archive.len())
            .finish_non_exhaustive()
    }
}

impl CatalogSession {
    /// An empty session backed by a private [`MemoryStore`].
    pub fn new(config: EngineConfig) -> Result<Self, SessionError> {
        Self::open(config, MemoryStore::new())
    }

    /// Open a session on `store`, resuming from its snapshot if it has one.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Config`] if the configuration is invalid.
    /// - [`SessionError::Store`] if the store cannot be read.
    /// - [`SessionError::Integrity`] if the stored snapshot fails its hash
    ///   check.
    /// - [`SessionError::Catalog`] if the stored collections break an
    ///   invariant.
    pub fn open(
        config: EngineConfig,
        store: impl CatalogStore + 'static,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let mut store: Box<dyn CatalogStore> = Box::new(store);
        let loaded = store.load().map_err(|e| SessionError::Store {
            details: format!("{e:#}"),
        })?;

        let mut state = SessionState::empty(&config);
        let mut version = 0;
        if let Some(snapshot) = loaded {
            snapshot.verify()?;
            state.catalog = snapshot.to_catalog()?;
            state.archive = snapshot.archive;
            version = snapshot.version;
            info!(
                version,
                items = state.catalog.items().len(),
                menus = state.catalog.menus().len(),
                archived = state.archive.len(),
                "resumed catalog session from store"
            );
        }

        let mut ids = config.id_strategy.build();
        state.resume_ids(ids.as_mut());

        Ok(Self {
            state,
            resolver: config.price_resolver(),
            ids,
            config,
            clock: Box::new(SystemClock),
            sink: Box::new(NullSink),
            store,
            version,
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_sink(mut self, sink: impl FeedbackSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replace the id generator. It is resumed past the ids already in use.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self.state.resume_ids(self.ids.as_mut());
        self
    }

    // -- transaction --------------------------------------------------------

    /// Run `op` against a staged copy of the state and commit it only if the
    /// command and the store write both succeed.
    pub(crate) fn transact<T, F>(&mut self, title: &str, op: F) -> Result<T, SessionError>
    where
        F: FnOnce(&mut Txn<'_>) -> Result<T, CatalogError>,
    {
        let mut txn = Txn {
            state: self.state.clone(),
            now: self.clock.now(),
            config: &self.config,
            ids: self.ids.as_mut(),
            detail: String::new(),
        };
        let outcome = op(&mut txn);
        let Txn {
            mut state, detail, ..
        } = txn;

        let value = match outcome {
            Ok(value) => value,
            Err(err) => {
                warn!(command = title, error = %err, "command rejected");
                self.sink.report_failure(title, &err.to_string());
                return Err(err.into());
            }
        };

        let SessionState {
            catalog, selection, ..
        } = &mut state;
        let pruned = selection.retain(|id| catalog.item(id).is_some());
        debug_assert!(state.catalog.check_invariants().is_ok());

        let version = self.version + 1;
        if let Err(err) = self.persist(&state, version) {
            warn!(command = title, version, error = %err, "could not persist staged state");
            self.sink.report_failure(title, &err.to_string());
            return Err(err);
        }

        self.state = state;
        self.version = version;
        debug!(
            command = title,
            version,
            pruned_selection = pruned,
            items = self.state.catalog.items().len(),
            "command committed"
        );
        self.sink.report_success(title, &detail);
        Ok(value)
    }

    fn persist(&mut self, state: &SessionState, version: u64) -> Result<(), SessionError> {
        let snapshot = CatalogSnapshot::capture(&state.catalog, &state.archive, version)?;
        self.store
            .replace(&snapshot)
            .map_err(|e| SessionError::Store {
                details: format!("{e:#}"),
            })
    }

    // -- state access -------------------------------------------------------

    pub fn catalog(&self) -> &Catalog {
        &self.state.catalog
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.state.selection
    }

    pub fn archive(&self) -> &Archive {
        &self.state.archive
    }

    pub fn journal(&self) -> &ChangeJournal {
        &self.state.journal
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of commands committed, including those of earlier sessions on
    /// the same store.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // -- derived views ------------------------------------------------------

    /// Items passing `filter`, lazily, in collection order.
    pub fn filtered<'a>(&'a self, filter: &'a ItemFilter) -> impl Iterator<Item = &'a Item> + 'a {
        filter.apply(self.state.catalog.items())
    }

    /// Display price of a live item.
    pub fn price_of(&self, id: &ItemId) -> Result<PriceDisplay, SessionError> {
        let item = self.state.catalog.require_item(id)?;
        Ok(self.price_display(item))
    }

    /// Display price of any item value, using the configured currency.
    pub fn price_display(&self, item: &Item) -> PriceDisplay {
        self.resolver.resolve(&item.price_options)
    }

    /// Whether a live item is hidden from customers right now.
    pub fn is_item_hidden(&self, id: &ItemId) -> Result<bool, SessionError> {
        let item = self.state.catalog.require_item(id)?;
        Ok(is_hidden(item.visibility.as_ref(), self.clock.now()))
    }

    /// When a live item hidden until a set time becomes visible.
    pub fn reveal_time(&self, id: &ItemId) -> Result<Option<DateTime<Utc>>, SessionError> {
        let item = self.state.catalog.require_item(id)?;
        Ok(next_reveal(item.visibility.as_ref(), self.clock.now()))
    }

    pub fn stats(&self) -> CatalogStats {
        let now = self.clock.now();
        let items = self.state.catalog.items();
        let available = items.iter().filter(|i| i.is_available).count();
        CatalogStats {
            total: items.len(),
            available,
            unavailable: items.len() - available,
            selected: self.state.selection.len(),
            hidden: items
                .iter()
                .filter(|i| is_hidden(i.visibility.as_ref(), now))
                .count(),
            featured: items.iter().filter(|i| i.is_featured).count(),
        }
    }

    /// Derived item count of a live menu.
    pub fn menu_item_count(&self, id: &MenuId) -> Result<usize, SessionError> {
        self.state.catalog.require_menu(id)?;
        Ok(self.state.catalog.item_count(id))
    }

    /// Every menu, in order, with its item count.
    pub fn menu_summaries(&self) -> Vec<MenuSummary> {
        let catalog = &self.state.catalog;
        catalog
            .menus()
            .iter()
            .map(|menu| MenuSummary {
                id: menu.id.clone(),
                name: menu.name.clone(),
                status: menu.status,
                item_count: catalog.item_count(&menu.id),
            })
            .collect()
    }

    /// The archive, most recent first, with display ages.
    pub fn archive_listing(&self) -> Vec<ArchiveListing> {
        let now = self.clock.now();
        self.state
            .archive
            .entries()
            .map(|entry| ArchiveListing {
                id: entry.id().to_owned(),
                kind: entry.entity.kind(),
                name: entry.entity.name().to_owned(),
                deleted_at: entry.deleted_at,
                age: format_deleted_age(entry.deleted_at, now, &self.config.date_format),
            })
            .collect()
    }

    // -- snapshots ----------------------------------------------------------

    /// Capture the current state.
    pub fn snapshot(&self) -> Result<CatalogSnapshot, SessionError> {
        CatalogSnapshot::capture(&self.state.catalog, &self.state.archive, self.version)
    }

    /// Replace the whole state with a verified snapshot.
    ///
    /// The selection is cleared and the journal starts over. The restored
    /// state is committed as the next version, so the store never sees a
    /// version go backwards; if the store write fails nothing changes.
    pub fn restore_from_snapshot(&mut self, snapshot: &CatalogSnapshot) -> Result<(), SessionError> {
        const TITLE: &str = "Restore snapshot";
        let staged = snapshot.verify().and_then(|()| {
            Ok(SessionState {
                catalog: snapshot.to_catalog()?,
                archive: snapshot.archive.clone(),
                ..SessionState::empty(&self.config)
            })
        });
        let version = self.version + 1;
        let state = match staged.and_then(|state| self.persist(&state, version).map(|()| state)) {
            Ok(state) => state,
            Err(err) => {
                warn!(command = TITLE, version, error = %err, "snapshot rejected");
                self.sink.report_failure(TITLE, &err.to_string());
                return Err(err);
            }
        };

        self.state = state;
        self.version = version;
        self.state.resume_ids(self.ids.as_mut());
        info!(
            version,
            from_version = snapshot.version,
            "restored catalog session from snapshot"
        );
        self.sink.report_success(
            TITLE,
            &format!("catalog from version {} restored", snapshot.version),
        );
        Ok(())
    }

    // -- selection ----------------------------------------------------------

    /// Flip selection of a live item. Returns whether it is now selected.
    pub fn toggle_selection(&mut self, id: &ItemId) -> Result<bool, SessionError> {
        self.state.catalog.require_item(id)?;
        Ok(self.state.selection.toggle(id.clone()))
    }

    /// Replace the selection with the given ids; ids that are not live are
    /// skipped. Returns the new selection size.
    pub fn select_all<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = ItemId>,
    {
        let catalog = &self.state.catalog;
        self.state
            .selection
            .select_all(ids.into_iter().filter(|id| catalog.item(id).is_some()));
        self.state.selection.len()
    }

    /// Replace the selection with the items passing `filter`.
    pub fn select_filtered(&mut self, filter: &ItemFilter) -> usize {
        let ids = filter.ids(self.state.catalog.items());
        self.state.selection.select_all(ids);
        self.state.selection.len()
    }

    pub fn clear_selection(&mut self) {
        self.state.selection.clear();
    }

    // -- archive commands ---------------------------------------------------

    /// Move an archived entity back into the live collection.
    ///
    /// Items and modifiers are appended; a menu comes back with its items.
    ///
    /// # Errors
    ///
    /// - `NotArchived` if nothing with this id is archived.
    /// - `NotFound` if an archived item's menu is no longer live.
    /// - `InvariantViolation` if the id has been reused by a live entity.
    ///
    /// On error the entry stays archived.
    pub fn restore(&mut self, id: &str) -> Result<ArchivedEntity, SessionError> {
        self.transact("Restore", |txn| {
            let entry = txn
                .state
                .archive
                .take(id)
                .ok_or_else(|| CatalogError::NotArchived { id: id.to_owned() })?;
            let catalog = &mut txn.state.catalog;
            match &entry.entity {
                ArchivedEntity::Item { item } => catalog.push_item(item.clone())?,
                ArchivedEntity::Menu { menu, items } => {
                    catalog.push_menu(menu.clone())?;
                    for item in items {
                        catalog.push_item(item.clone())?;
                    }
                }
                ArchivedEntity::Modifier { modifier } => catalog.push_modifier(modifier.clone())?,
            }

            if let ArchivedEntity::Menu { items, .. } = &entry.entity {
                for item in items {
                    txn.record(ChangeSubject::item(&item.id), ChangeAction::Restored);
                }
            }
            txn.record(subject_of(&entry), ChangeAction::Restored);
            txn.describe(format!("'{}' is back", entry.entity.name()));
            Ok(entry.entity)
        })
    }

    /// Remove an archive entry for good.
    pub fn permanently_delete(&mut self, id: &str) -> Result<ArchivedEntry, SessionError> {
        self.transact("Delete permanently", |txn| {
            let entry = txn.state.archive.permanently_delete(id)?;
            txn.record(subject_of(&entry), ChangeAction::Purged);
            txn.describe(format!("'{}' can no longer be restored", entry.entity.name()));
            Ok(entry)
        })
    }

    /// Permanently delete every entry archived before `cutoff`. Returns how
    /// many were removed.
    pub fn purge_archive_older_than(&mut self, cutoff: DateTime<Utc>) -> Result<usize, SessionError> {
        self.transact("Purge archive", |txn| {
            let purged = txn.state.archive.purge_older_than(cutoff);
            for entry in &purged {
                txn.record(subject_of(entry), ChangeAction::Purged);
            }
            txn.describe(format!("{} archived entries removed", purged.len()));
            Ok(purged.len())
        })
    }

    /// Permanently delete every archive entry. Returns how many were removed.
    pub fn clear_archive(&mut self) -> Result<usize, SessionError> {
        self.transact("Empty archive", |txn| {
            let purged = txn.state.archive.clear();
            for entry in &purged {
                txn.record(subject_of(entry), ChangeAction::Purged);
            }
            txn.describe(format!("{} archived entries removed", purged.len()));
            Ok(purged.len())
        })
    }
}

fn subject_of(entry: &ArchivedEntry) -> ChangeSubject {
    match &entry.entity {
        ArchivedEntity::Item { item } => ChangeSubject::item(&item.id),
        ArchivedEntity::Menu { menu, .. } => ChangeSubject::menu(&menu.id),
        ArchivedEntity::Modifier { modifier } => ChangeSubject::modifier(&modifier.id),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notify::{Outcome, RecordingSink};
    use chrono::Duration;
    use menuboard_catalog::prelude::*;

    fn start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-02T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn session() -> (CatalogSession, ManualClock, RecordingSink) {
        let clock = ManualClock::new(start());
        let sink = RecordingSink::new();
        let session = CatalogSession::new(EngineConfig::default())
            .unwrap()
            .with_clock(clock.clone())
            .with_sink(sink.clone());
        (session, clock, sink)
    }

    fn latte(menu: &MenuId) -> NewItem {
        NewItem::new("Latte", menu.clone(), vec![PriceOption::single("3.50")])
    }

    // -- 1. Transactions ----------------------------------------------------

    #[test]
    fn failed_command_leaves_no_trace() {
        let (mut session, _, sink) = session();
        let drinks = session.create_menu("Drinks", MenuStatus::Active).unwrap();
        let before_journal = session.journal().len();
        let before_version = session.version();

        let mut bad = latte(&drinks.id);
        bad.name = "  ".to_owned();
        let err = session.add_item(bad).unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::Validation));
        assert_eq!(session.catalog().items().len(), 0);
        assert_eq!(session.journal().len(), before_journal);
        assert_eq!(session.version(), before_version);
        assert_eq!(sink.last().unwrap().outcome, Outcome::Failure);
    }

    #[test]
    fn store_failure_aborts_command() {
        let store = MemoryStore::new();
        let mut session = CatalogSession::open(EngineConfig::default(), store.clone()).unwrap();
        let drinks = session.create_menu("Drinks", MenuStatus::Active).unwrap();
        let saved = store.latest();

        store.set_failing(true);
        let err = session.add_item(latte(&drinks.id)).unwrap_err();
        assert!(matches!(err, SessionError::Store { .. }));
        assert!(session.catalog().items().is_empty());
        assert_eq!(store.latest(), saved);

        store.set_failing(false);
        session.add_item(latte(&drinks.id)).unwrap();
        assert_eq!(store.latest().unwrap().items.len(), 1);
    }

    #[test]
    fn generated_ids_skip_loaded_ids() {
        let (mut session, _, _) = session();
        // Sequential ids would hand out "menu-1" again after a reload.
        let first = session.create_menu("Drinks", MenuStatus::Active).unwrap();
        let snapshot = session.snapshot().unwrap();

        let mut reopened =
            CatalogSession::open(EngineConfig::default(), MemoryStore::with_snapshot(snapshot))
                .unwrap();
        let second = reopened.create_menu("Food", MenuStatus::Active).unwrap();
        assert_eq!(first.id.as_str(), "menu-1");
        assert_eq!(second.id.as_str(), "menu-2");
    }

    #[test]
    fn reopened_large_catalog_can_still_create() {
        for strategy in [IdStrategy::Sequential, IdStrategy::Seeded { seed: 11 }] {
            let config = EngineConfig {
                id_strategy: strategy.clone(),
                ..EngineConfig::default()
            };
            let store = MemoryStore::new();
            let mut session = CatalogSession::open(config.clone(), store.clone()).unwrap();
            let drinks = session.create_menu("Drinks", MenuStatus::Active).unwrap();
            for _ in 0..120 {
                session.add_item(latte(&drinks.id)).unwrap();
            }

            let mut reopened = CatalogSession::open(config, store.clone()).unwrap();
            let added = reopened.add_item(latte(&drinks.id)).unwrap();
            assert_eq!(reopened.stats().total, 121, "{strategy:?}");
            assert!(session.catalog().item(&added.id).is_none(), "{strategy:?}");
            reopened.duplicate_menu(&drinks.id).unwrap();
            assert_eq!(reopened.stats().total, 242, "{strategy:?}");
        }
    }

    // -- 2. Views -----------------------------------------------------------

    #[test]
    fn stats_count_flags_and_visibility() {
        let (mut session, clock, _) = session();
        let drinks = session.create_menu("Drinks", MenuStatus::Active).unwrap();
        let a = session.add_item(latte(&drinks.id)).unwrap();
        let b = session.add_item(latte(&drinks.id).featured()).unwrap();
        session.toggle_availability(&a.id).unwrap();
        session
            .set_visibility(
                &b.id,
                Some(VisibilitySettings::HiddenUntil {
                    until: start() + Duration::hours(2),
                }),
            )
            .unwrap();
        session.toggle_selection(&a.id).unwrap();

        let stats = session.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.available, 1);
        assert_eq!(stats.unavailable, 1);
        assert_eq!(stats.selected, 1);
        assert_eq!(stats.featured, 1);
        assert_eq!(stats.hidden, 1);
        assert_eq!(
            session.reveal_time(&b.id).unwrap(),
            Some(start() + Duration::hours(2))
        );

        clock.advance(Duration::hours(3));
        assert_eq!(session.stats().hidden, 0);
        assert!(!session.is_item_hidden(&b.id).unwrap());
    }

    #[test]
    fn archive_listing_shows_ages() {
        let (mut session, clock, _) = session();
        let drinks = session.create_menu("Drinks", MenuStatus::Active).unwrap();
        let item = session.add_item(latte(&drinks.id)).unwrap();
        session.delete_item(&item.id, DeletePolicy::Archive).unwrap();

        clock.advance(Duration::hours(5));
        let listing = session.archive_listing();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].name, "Latte");
        assert_eq!(listing[0].kind, EntityKind::Item);
        assert_eq!(listing[0].age, "5 hours ago");
    }

    // -- 3. Selection -------------------------------------------------------

    #[test]
    fn toggle_selection_requires_live_item() {
        let (mut session, _, _) = session();
        let err = session.toggle_selection(&ItemId::new("ghost")).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn select_all_skips_unknown_ids() {
        let (mut session, _, _) = session();
        let drinks = session.create_menu("Drinks", MenuStatus::Active).unwrap();
        let item = session.add_item(latte(&drinks.id)).unwrap();
        let count = session.select_all(vec![item.id.clone(), ItemId::new("ghost")]);
        assert_eq!(count, 1);
        assert!(session.selection().contains(&item.id));
    }

    // -- 4. Archive commands ------------------------------------------------

    #[test]
    fn restore_unknown_id_is_not_archived() {
        let (mut session, _, _) = session();
        let err = session.restore("item-42").unwrap_err();
        assert!(matches!(
            err.as_catalog(),
            Some(CatalogError::NotArchived { .. })
        ));
    }

    #[test]
    fn restore_item_without_menu_keeps_entry() {
        let (mut session, _, _) = session();
        let drinks = session.create_menu("Drinks", MenuStatus::Active).unwrap();
        let item = session.add_item(latte(&drinks.id)).unwrap();
        session.delete_item(&item.id, DeletePolicy::Archive).unwrap();
        session.delete_menu(&drinks.id, DeletePolicy::Permanent).unwrap();

        let err = session.restore(item.id.as_str()).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
        assert!(session.archive().contains(item.id.as_str()));
    }

    #[test]
    fn purge_and_clear_archive() {
        let (mut session, clock, _) = session();
        let drinks = session.create_menu("Drinks", MenuStatus::Active).unwrap();
        let old = session.add_item(latte(&drinks.id)).unwrap();
        session.delete_item(&old.id, DeletePolicy::Archive).unwrap();
        clock.advance(Duration::days(10));
        let recent = session.add_item(latte(&drinks.id)).unwrap();
        session.delete_item(&recent.id, DeletePolicy::Archive).unwrap();

        let purged = session
            .purge_archive_older_than(session.now() - Duration::days(7))
            .unwrap();
        assert_eq!(purged, 1);
        assert!(session.archive().contains(recent.id.as_str()));

        assert_eq!(session.clear_archive().unwrap(), 1);
        assert!(session.archive().is_empty());
    }

    // -- 5. Snapshots -------------------------------------------------------

    #[test]
    fn restore_from_snapshot_resets_selection_and_journal() {
        let store = MemoryStore::new();
        let sink = RecordingSink::new();
        let mut session = CatalogSession::open(EngineConfig::default(), store.clone())
            .unwrap()
            .with_sink(sink.clone());
        let drinks = session.create_menu("Drinks", MenuStatus::Active).unwrap();
        let snapshot = session.snapshot().unwrap();

        let item = session.add_item(latte(&drinks.id)).unwrap();
        session.toggle_selection(&item.id).unwrap();
        let before = session.version();

        session.restore_from_snapshot(&snapshot).unwrap();
        assert!(session.catalog().items().is_empty());
        assert!(session.selection().is_empty());
        assert!(session.journal().is_empty());

        // The restore is a new commit, not a rewind.
        assert_eq!(session.version(), before + 1);
        let saved = store.latest().unwrap();
        saved.verify().unwrap();
        assert_eq!(saved.version, before + 1);
        let last = sink.last().unwrap();
        assert_eq!(last.outcome, Outcome::Success);
        assert_eq!(last.title, "Restore snapshot");

        // The restored item id is not handed out again.
        let again = session.add_item(latte(&drinks.id)).unwrap();
        assert_ne!(again.id, item.id);
    }

    #[test]
    fn tampered_snapshot_is_rejected_on_restore() {
        let (mut session, _, sink) = session();
        session.create_menu("Drinks", MenuStatus::Active).unwrap();
        let mut snapshot = session.snapshot().unwrap();
        snapshot.menus[0].name = "Tampered".to_owned();
        let version = session.version();

        let err = session.restore_from_snapshot(&snapshot).unwrap_err();
        assert!(matches!(err, SessionError::Integrity { .. }));
        assert_eq!(session.version(), version);
        assert_eq!(session.catalog().menus()[0].name, "Drinks");
        assert_eq!(sink.last().unwrap().outcome, Outcome::Failure);
    }

    #[test]
    fn tampered_snapshot_is_rejected_on_open() {
        let (mut session, _, _) = session();
        session.create_menu("Drinks", MenuStatus::Active).unwrap();
        let mut snapshot = session.snapshot().unwrap();
        snapshot.menus[0].name = "Tampered".to_owned();

        let err = CatalogSession::open(EngineConfig::default(), MemoryStore::with_snapshot(snapshot))
            .unwrap_err();
        assert!(matches!(err, SessionError::Integrity { .. }));
    }
}
