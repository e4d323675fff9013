//! Menuboard Catalog -- data model and derived views for a restaurant menu.
//!
//! This crate holds everything about the catalog that does not depend on a
//! session: the entity types ([`Item`](model::Item), [`Menu`](model::Menu),
//! [`ModifierGroup`](model::ModifierGroup)), id generation, the
//! invariant-checked [`Catalog`](catalog::Catalog) collection, and the pure
//! derived views (price display, visibility, filtering, selection).
//!
//! # Quick Start
//!
//! ```
//! use menuboard_catalog::prelude::*;
//!
//! let drinks = MenuId::new("drinks");
//! let mut catalog = Catalog::new();
//! catalog
//!     .push_menu(Menu::new(drinks.clone(), "Drinks", MenuStatus::Active, chrono::Utc::now()))
//!     .unwrap();
//!
//! let latte = NewItem::new("Latte", drinks.clone(), vec![PriceOption::single("3.50")]);
//! catalog
//!     .push_item(latte.into_item(ItemId::new("item-1"), chrono::Utc::now()))
//!     .unwrap();
//!
//! let price = PriceResolver::default().resolve(&catalog.items()[0].price_options);
//! assert_eq!(price.display, "$3.50");
//! assert!(!price.is_range);
//!
//! let filter = ItemFilter::new().in_category(drinks).matching("LAT");
//! assert_eq!(filter.apply(catalog.items()).count(), 1);
//! ```

#![deny(unsafe_code)]

pub mod catalog;
pub mod filter;
pub mod identity;
pub mod model;
pub mod price;
pub mod selection;
pub mod visibility;

use identity::EntityKind;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Broad classification of a [`CatalogError`].
///
/// Callers use this to decide how to surface a failure: validation and
/// not-found errors are user-facing, invariant violations are programming
/// errors in the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required field is missing or invalid.
    Validation,
    /// A referenced id does not exist in the expected collection.
    NotFound,
    /// The request would break a collection invariant.
    InvariantViolation,
}

/// Errors produced by catalog operations.
///
/// Every operation that returns one of these leaves the catalog untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    /// A required field is missing or holds an invalid value.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The referenced entity is not in the live collection.
    #[error("{kind} '{id}' does not exist")]
    NotFound { kind: EntityKind, id: String },

    /// An update was requested while no item is designated for editing.
    #[error("no item is currently being edited")]
    NoEditTarget,

    /// The id is not present in the archive.
    #[error("'{id}' is not in the archive")]
    NotArchived { id: String },

    /// The request would break a collection invariant (duplicate id,
    /// non-permutation reorder, dangling reference).
    #[error("invariant violated: {message}")]
    InvariantViolation { message: String },
}

impl CatalogError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Validation { .. } => ErrorKind::Validation,
            CatalogError::NotFound { .. }
            | CatalogError::NoEditTarget
            | CatalogError::NotArchived { .. } => ErrorKind::NotFound,
            CatalogError::InvariantViolation { .. } => ErrorKind::InvariantViolation,
        }
    }

    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        CatalogError::Validation {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(kind: EntityKind, id: impl std::fmt::Display) -> Self {
        CatalogError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        CatalogError::InvariantViolation {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::catalog::Catalog;
    pub use crate::filter::ItemFilter;
    pub use crate::identity::{
        EntityKind, IdGenerator, IdStrategy, ItemId, MenuId, ModifierId, SeededIds,
        SequentialIds, UuidIds,
    };
    pub use crate::model::{
        Item, ItemPatch, Menu, MenuPatch, MenuStatus, ModifierGroup, NewItem, NewModifier, Price,
        PriceOption, VisibilitySettings, VisibilityWindow,
    };
    pub use crate::price::{PriceDisplay, PriceResolver};
    pub use crate::selection::SelectionSet;
    pub use crate::visibility::{is_hidden, next_reveal};
    pub use crate::{CatalogError, ErrorKind};
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
