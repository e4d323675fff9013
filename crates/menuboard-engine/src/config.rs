//! Session configuration.
//!
//! [`EngineConfig`] collects the few knobs a [`CatalogSession`] needs. Every
//! field has a default, so a partial JSON document (or `{}`) is a valid
//! configuration:
//!
//! ```
//! use menuboard_engine::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "currencySymbol": "€" }"#).unwrap();
//! assert_eq!(config.currency_symbol, "€");
//! assert_eq!(config.copy_suffix, " (Copy)");
//! ```
//!
//! [`CatalogSession`]: crate::session::CatalogSession

use chrono::format::{Item, StrftimeItems};
use menuboard_catalog::identity::IdStrategy;
use menuboard_catalog::price::PriceResolver;
use serde::{Deserialize, Serialize};

use crate::SessionError;

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`CatalogSession`](crate::session::CatalogSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Prefix for displayed prices.
    pub currency_symbol: String,
    /// Appended to the name of duplicated items, menus and modifiers.
    pub copy_suffix: String,
    /// `chrono` format for archive ages of a week or more.
    pub date_format: String,
    /// Maximum number of journal entries kept in memory.
    pub journal_capacity: usize,
    /// How fresh entity ids are generated.
    pub id_strategy: IdStrategy,
}

impl Default for EngineConfig {
    /// `$` prices, `" (Copy)"` suffix, `"Mar 2, 2026"` dates, 1024 journal
    /// entries, sequential ids.
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_owned(),
            copy_suffix: " (Copy)".to_owned(),
            date_format: "%b %-d, %Y".to_owned(),
            journal_capacity: menuboard_journal::journal::DEFAULT_CAPACITY,
            id_strategy: IdStrategy::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, SessionError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the session cannot work with.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.copy_suffix.is_empty() {
            return Err(SessionError::Config {
                details: "copySuffix must not be empty".to_owned(),
            });
        }
        if self.journal_capacity == 0 {
            return Err(SessionError::Config {
                details: "journalCapacity must be at least 1".to_owned(),
            });
        }
        let malformed = StrftimeItems::new(&self.date_format).any(|item| item == Item::Error);
        if self.date_format.trim().is_empty() || malformed {
            return Err(SessionError::Config {
                details: format!("dateFormat '{}' is not a valid date format", self.date_format),
            });
        }
        Ok(())
    }

    /// A price resolver using the configured currency symbol.
    pub fn price_resolver(&self) -> PriceResolver {
        PriceResolver::new(self.currency_symbol.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn id_strategy_is_read_from_json() {
        let config =
            EngineConfig::from_json_str(r#"{ "idStrategy": { "type": "seeded", "seed": 9 } }"#)
                .unwrap();
        assert_eq!(config.id_strategy, IdStrategy::Seeded { seed: 9 });
    }

    #[test]
    fn empty_copy_suffix_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "copySuffix": "" }"#).unwrap_err();
        assert!(matches!(err, SessionError::Config { .. }));
    }

    #[test]
    fn zero_journal_capacity_is_rejected() {
        let config = EngineConfig {
            journal_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn broken_date_format_is_rejected() {
        let config = EngineConfig {
            date_format: "%Q".to_owned(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = EngineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SessionError::Serialization(_)));
    }

    #[test]
    fn resolver_uses_currency_symbol() {
        let config = EngineConfig {
            currency_symbol: "£".to_owned(),
            ..Default::default()
        };
        assert_eq!(config.price_resolver().format(2.0), "£2.00");
    }
}
