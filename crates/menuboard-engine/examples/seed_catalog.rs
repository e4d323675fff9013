//! Seed a small cafe catalog and walk through the editing workflow.
//!
//! Run with:
//!   cargo run --example seed_catalog -p menuboard-engine
//!
//! Set `RUST_LOG=info` to see the session's feedback and persistence logs.

use chrono::Duration;
use menuboard_engine::prelude::*;

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

const DRINKS: &[(&str, &[(&str, f64)])] = &[
    ("Espresso", &[("Single", 2.5), ("Double", 3.2)]),
    ("Latte", &[("Regular", 3.5)]),
    ("Cold Brew", &[("Small", 3.0), ("Large", 4.5)]),
    ("Mint Tea", &[("Pot", 2.8)]),
];

const FOOD: &[(&str, &[(&str, f64)])] = &[
    ("Croissant", &[("Each", 2.9)]),
    ("Avocado Toast", &[("Half", 5.5), ("Full", 8.0)]),
    ("Granola Bowl", &[("Bowl", 6.25)]),
];

fn seed_menu(
    session: &mut CatalogSession,
    name: &str,
    rows: &[(&str, &[(&str, f64)])],
) -> Result<(MenuId, Vec<ItemId>), SessionError> {
    let menu = session.create_menu(name, MenuStatus::Active)?;
    let mut ids = Vec::with_capacity(rows.len());
    for (item_name, prices) in rows {
        let options = prices
            .iter()
            .enumerate()
            .map(|(n, (label, amount))| PriceOption::new(format!("p{n}"), *label, *amount))
            .collect();
        ids.push(session.add_item(NewItem::new(*item_name, menu.id.clone(), options))?.id);
    }
    Ok((menu.id, ids))
}

fn print_board(session: &CatalogSession, filter: &ItemFilter) -> Result<(), SessionError> {
    for item in session.filtered(filter) {
        let price = session.price_of(&item.id)?;
        let from = if price.is_range { "from " } else { "" };
        let marker = if session.selection().contains(&item.id) { "*" } else { " " };
        println!("  {marker} {:<16} {from}{}", item.name, price.display);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let store = MemoryStore::new();
    let clock = ManualClock::new(chrono::Utc::now());
    let mut session = CatalogSession::open(EngineConfig::default(), store.clone())?
        .with_clock(clock.clone())
        .with_sink(TracingSink);

    let (drinks, drink_ids) = seed_menu(&mut session, "Drinks", DRINKS)?;
    let (food, _) = seed_menu(&mut session, "Food", FOOD)?;
    session.toggle_featured(&drink_ids[1])?;
    session.toggle_sold_out(&drink_ids[3])?;

    println!("Drinks:");
    print_board(&session, &ItemFilter::new().in_category(drinks.clone()))?;

    // Select every drink, then look at the food board; the selection stays.
    session.select_filtered(&ItemFilter::new().in_category(drinks.clone()));
    println!("Food ({} drinks still selected):", session.selection().len());
    print_board(&session, &ItemFilter::new().in_category(food.clone()))?;

    // Copy two drinks onto a brunch menu, then archive the originals.
    let (brunch, _) = seed_menu(&mut session, "Brunch", &[])?;
    let picked = [drink_ids[0].clone(), drink_ids[2].clone()];
    session.bulk_copy(&picked, &brunch)?;
    session.bulk_delete(&picked, DeletePolicy::Archive)?;

    clock.advance(Duration::hours(3));
    session.duplicate_menu(&food)?;
    session.delete_item(&drink_ids[3], DeletePolicy::Archive)?;
    clock.advance(Duration::days(2));

    println!("Search 'latte':");
    print_board(&session, &ItemFilter::new().matching("latte"))?;

    println!("Menus:");
    for summary in session.menu_summaries() {
        println!(
            "  {:<16} {:?} ({} items)",
            summary.name, summary.status, summary.item_count
        );
    }

    println!("Archive:");
    for entry in session.archive_listing() {
        println!("  {:<16} {:<8} {}", entry.name, entry.kind.to_string(), entry.age);
    }

    let restored = session.restore(drink_ids[0].as_str())?;
    println!("Restored '{}'", restored.name());

    let stats = session.stats();
    println!(
        "{} items, {} available, {} featured, {} archived",
        stats.total,
        stats.available,
        stats.featured,
        session.archive().len()
    );

    let saved = store
        .latest()
        .ok_or_else(|| anyhow::anyhow!("store holds no snapshot"))?;
    saved.verify()?;
    println!("Snapshot v{} hash {}", saved.version, saved.hash);
    Ok(())
}
