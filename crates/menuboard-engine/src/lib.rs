//! Menuboard Engine -- the catalog session: mutations, archive and snapshots.
//!
//! This crate builds on [`menuboard_catalog`] to provide the stateful side of
//! the catalog: a [`CatalogSession`](session::CatalogSession) that owns the
//! live collection, the selection, the archive and the change journal, and
//! applies every command as a single all-or-nothing transaction.
//!
//! # Quick Start
//!
//! ```
//! use menuboard_engine::prelude::*;
//!
//! let mut session = CatalogSession::new(EngineConfig::default()).unwrap();
//! let drinks = session.create_menu("Drinks", MenuStatus::Active).unwrap();
//!
//! let latte = session
//!     .add_item(NewItem::new("Latte", drinks.id.clone(), vec![PriceOption::single("3.50")]))
//!     .unwrap();
//! assert_eq!(session.price_of(&latte.id).unwrap().display, "$3.50");
//!
//! session.delete_item(&latte.id, DeletePolicy::Archive).unwrap();
//! assert_eq!(session.stats().total, 0);
//! assert_eq!(session.archive().len(), 1);
//!
//! session.restore(latte.id.as_str()).unwrap();
//! assert_eq!(session.stats().total, 1);
//! ```

#![deny(unsafe_code)]

pub mod archive;
pub mod clock;
pub mod config;
mod menus;
mod mutator;
pub mod notify;
pub mod session;
pub mod snapshot;

use menuboard_catalog::{CatalogError, ErrorKind};

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the catalog crate for convenience.
pub use menuboard_catalog;

/// Re-export the journal crate for convenience.
pub use menuboard_journal;

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Errors returned by session commands.
///
/// Whatever the variant, the session state is exactly what it was before the
/// command.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The command was rejected by a catalog rule.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The backing store refused the new snapshot.
    #[error("store rejected the snapshot: {details}")]
    Store { details: String },

    /// A loaded snapshot does not match its recorded hash.
    #[error("snapshot hash mismatch: recorded {expected} but recomputed {actual}")]
    Integrity { expected: String, actual: String },

    /// The configuration cannot be used.
    #[error("invalid configuration: {details}")]
    Config { details: String },

    /// State could not be serialized or parsed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SessionError {
    /// The catalog classification of this error, if it came from a catalog
    /// rule.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            SessionError::Catalog(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// The wrapped catalog error, if any.
    pub fn as_catalog(&self) -> Option<&CatalogError> {
        match self {
            SessionError::Catalog(err) => Some(err),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common session usage.
pub mod prelude {
    pub use menuboard_catalog::prelude::*;

    pub use crate::archive::{format_deleted_age, Archive, ArchivedEntity, ArchivedEntry};
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::config::EngineConfig;
    pub use crate::notify::{FeedbackSink, NullSink, RecordingSink, TracingSink};
    pub use crate::session::{
        ArchiveListing, CatalogSession, CatalogStats, DeletePolicy, MenuSummary,
    };
    pub use crate::snapshot::{CatalogSnapshot, CatalogStore, MemoryStore};
    pub use crate::SessionError;

    pub use menuboard_journal::journal::{
        CatalogChange, ChangeAction, ChangeJournal, ChangeSubject, EntityRef,
    };
}
