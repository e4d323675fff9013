//! Menuboard Journal -- an ordered record of applied catalog changes.
//!
//! The session records one [`CatalogChange`](journal::CatalogChange) per
//! entity touched by a committed command, so a UI or an audit tool can ask
//! "what happened to this item" without diffing snapshots.
//!
//! # Modules
//!
//! - [`journal`]: the bounded [`ChangeJournal`](journal::ChangeJournal) and
//!   its entry types, with queries by entity, by kind and by sequence.

#![deny(unsafe_code)]

pub mod journal;

pub use journal::{CatalogChange, ChangeAction, ChangeJournal, ChangeSubject, EntityRef};
