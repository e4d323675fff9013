//! Property tests for the derived views and collection primitives.
//!
//! These tests use `proptest` to generate price lists, reorder permutations
//! and selection sequences, and check the invariants that must hold for all
//! of them.

use chrono::{DateTime, Utc};
use menuboard_catalog::prelude::*;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-02T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// A catalog with one menu and `count` items `item-0..item-n`.
fn catalog_with(count: usize) -> Catalog {
    let menu_id = MenuId::new("menu");
    let mut catalog = Catalog::new();
    catalog
        .push_menu(Menu::new(menu_id.clone(), "Menu", MenuStatus::Active, fixed_now()))
        .unwrap();
    for i in 0..count {
        let item = NewItem::new(
            format!("Item {i}"),
            menu_id.clone(),
            vec![PriceOption::single(1.0)],
        )
        .into_item(ItemId::new(format!("item-{i}")), fixed_now());
        catalog.push_item(item).unwrap();
    }
    catalog
}

fn current_ids(catalog: &Catalog) -> Vec<ItemId> {
    catalog.items().iter().map(|i| i.id.clone()).collect()
}

/// A list of `len` indices shuffled by proptest.
fn permutation(len: usize) -> impl Strategy<Value = Vec<usize>> {
    Just((0..len).collect::<Vec<_>>()).prop_shuffle()
}

fn price_option_strategy() -> impl Strategy<Value = PriceOption> {
    prop_oneof![
        (-50.0f64..500.0).prop_map(|p| PriceOption::new("n", "", p)),
        (0u32..100_000).prop_map(|cents| {
            PriceOption::new("t", "", format!("{}.{:02}", cents / 100, cents % 100).as_str())
        }),
        Just(PriceOption::new("bad", "", "n/a")),
        Just(PriceOption::new("zero", "", 0.0)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Any list with a valid positive price never shows the fallback, and the
    /// displayed amount is the minimum valid price.
    #[test]
    fn price_never_falls_back_when_a_valid_price_exists(
        options in prop::collection::vec(price_option_strategy(), 0..8)
    ) {
        let resolver = PriceResolver::default();
        let display = resolver.resolve(&options);
        let valid: Vec<f64> = options
            .iter()
            .map(|o| o.price.value())
            .filter(|v| v.is_finite() && *v > 0.0)
            .collect();

        if valid.is_empty() {
            prop_assert_eq!(display.display.as_str(), "$0.00");
            prop_assert!(!display.is_range);
        } else {
            let min = valid.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = valid.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(display.amount, min);
            prop_assert_eq!(display.display, resolver.format(min));
            prop_assert_eq!(display.is_range, min != max);
        }
    }

    /// Two distinct positive prices always form a range shown at the minimum.
    #[test]
    fn distinct_prices_form_range(a in 1u32..10_000, b in 1u32..10_000) {
        prop_assume!(a != b);
        let options = vec![
            PriceOption::new("a", "", a as f64 / 100.0),
            PriceOption::new("b", "", b as f64 / 100.0),
        ];
        let display = PriceResolver::default().resolve(&options);
        prop_assert!(display.is_range);
        prop_assert_eq!(display.amount, a.min(b) as f64 / 100.0);
    }

    /// Reorder preserves the id multiset, and two reorders in sequence equal
    /// the composed permutation applied once.
    #[test]
    fn reorders_compose(first in permutation(8), second in permutation(8)) {
        let mut stepwise = catalog_with(8);
        let base = current_ids(&stepwise);

        let order_one: Vec<ItemId> = first.iter().map(|&i| base[i].clone()).collect();
        stepwise.reorder_items(None, &order_one).unwrap();
        let after_one = current_ids(&stepwise);
        let order_two: Vec<ItemId> = second.iter().map(|&i| after_one[i].clone()).collect();
        stepwise.reorder_items(None, &order_two).unwrap();

        let composed: Vec<ItemId> = second.iter().map(|&i| base[first[i]].clone()).collect();
        let mut once = catalog_with(8);
        once.reorder_items(None, &composed).unwrap();

        prop_assert_eq!(current_ids(&stepwise), current_ids(&once));

        let mut sorted_after = current_ids(&stepwise);
        sorted_after.sort();
        let mut sorted_base = base.clone();
        sorted_base.sort();
        prop_assert_eq!(sorted_after, sorted_base);
    }

    /// A reorder that drops, repeats or invents an id is rejected and leaves
    /// the order untouched.
    #[test]
    fn broken_permutations_are_rejected(perm in permutation(6), victim in 0usize..6) {
        let mut catalog = catalog_with(6);
        let base = current_ids(&catalog);
        let mut order: Vec<ItemId> = perm.iter().map(|&i| base[i].clone()).collect();
        order[victim] = ItemId::new("item-999");

        let err = catalog.reorder_items(None, &order).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        prop_assert_eq!(current_ids(&catalog), base);
    }

    /// select_all followed by clear is always empty, whatever was toggled.
    #[test]
    fn select_all_then_clear_is_empty(
        toggles in prop::collection::vec(0usize..10, 0..20),
        all in prop::collection::vec(0usize..10, 0..10),
    ) {
        let mut selection = SelectionSet::new();
        for t in toggles {
            selection.toggle(ItemId::new(format!("item-{t}")));
        }
        selection.select_all(all.iter().map(|i| ItemId::new(format!("item-{i}"))));
        selection.clear();
        prop_assert!(selection.is_empty());
    }
}
