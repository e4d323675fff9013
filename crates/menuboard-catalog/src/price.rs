//! Display price derivation.
//!
//! An item never stores an effective price. The [`PriceResolver`] derives one
//! from the item's price options: the single price when there is only one
//! distinct valid value, or the minimum flagged as a range ("from $3.00")
//! when the valid values differ.

use serde::Serialize;

use crate::model::PriceOption;

/// The derived price shown for an item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDisplay {
    /// Formatted amount, e.g. `"$3.50"`.
    pub display: String,
    /// `true` when the options span more than one price; callers render a
    /// "starting from" affordance.
    pub is_range: bool,
    /// The numeric amount behind `display` (0.0 for the fallback).
    pub amount: f64,
}

/// Derives [`PriceDisplay`] values using a fixed currency symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceResolver {
    currency_symbol: String,
}

impl Default for PriceResolver {
    fn default() -> Self {
        Self::new("$")
    }
}

impl PriceResolver {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    /// Resolve the display price for a list of options.
    ///
    /// Options whose price is not a finite number greater than zero are
    /// ignored. With nothing left, the zero amount is shown.
    pub fn resolve(&self, options: &[PriceOption]) -> PriceDisplay {
        let prices = valid_prices(options);
        match (prices.first(), prices.last()) {
            (Some(&min), Some(&max)) => PriceDisplay {
                display: self.format(min),
                is_range: min != max,
                amount: min,
            },
            _ => PriceDisplay {
                display: self.format(0.0),
                is_range: false,
                amount: 0.0,
            },
        }
    }

    /// Format an amount with two decimals, e.g. `$3.00`.
    pub fn format(&self, amount: f64) -> String {
        format!("{}{:.2}", self.currency_symbol, amount)
    }
}

/// Finite, strictly positive prices in ascending order.
pub fn valid_prices(options: &[PriceOption]) -> Vec<f64> {
    let mut prices: Vec<f64> = options
        .iter()
        .map(|option| option.price.value())
        .filter(|value| value.is_finite() && *value > 0.0)
        .collect();
    prices.sort_by(|a, b| a.total_cmp(b));
    prices
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(price: impl Into<crate::model::Price>) -> PriceOption {
        PriceOption::new("o", "", price)
    }

    #[test]
    fn single_string_price() {
        let display = PriceResolver::default().resolve(&[opt("3.50")]);
        assert_eq!(display.display, "$3.50");
        assert!(!display.is_range);
        assert_eq!(display.amount, 3.5);
    }

    #[test]
    fn two_distinct_prices_form_a_range() {
        let display = PriceResolver::default().resolve(&[opt(5.0), opt(3.0)]);
        assert_eq!(display.display, "$3.00");
        assert!(display.is_range);
    }

    #[test]
    fn equal_prices_are_not_a_range() {
        let display = PriceResolver::default().resolve(&[opt(4.0), opt("4.00"), opt(4.0)]);
        assert_eq!(display.display, "$4.00");
        assert!(!display.is_range);
    }

    #[test]
    fn no_valid_price_falls_back_to_zero() {
        let resolver = PriceResolver::default();
        for options in [
            vec![],
            vec![opt(0.0)],
            vec![opt("abc"), opt(-2.0)],
            vec![opt(f64::NAN), opt("inf")],
        ] {
            let display = resolver.resolve(&options);
            assert_eq!(display.display, "$0.00");
            assert!(!display.is_range);
        }
    }

    #[test]
    fn invalid_options_are_ignored_not_fatal() {
        let display = PriceResolver::default().resolve(&[opt("n/a"), opt(0.0), opt("2.5")]);
        assert_eq!(display.display, "$2.50");
        assert!(!display.is_range);
    }

    #[test]
    fn custom_currency_symbol() {
        let display = PriceResolver::new("€").resolve(&[opt(12.0), opt(9.5)]);
        assert_eq!(display.display, "€9.50");
        assert!(display.is_range);
    }

    #[test]
    fn valid_prices_sorted_ascending() {
        assert_eq!(
            valid_prices(&[opt(9.0), opt("1.5"), opt(-1.0), opt(4.0)]),
            vec![1.5, 4.0, 9.0]
        );
    }
}
