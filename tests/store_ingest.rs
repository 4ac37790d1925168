// tests/store_ingest.rs
// Idempotent upsert semantics: one history record per observed price,
// refreshed last-seen on every sighting, nothing ever deleted.

use chrono::Utc;
use reality_radar::{CleanListing, Cleaner, IngestionStore, RawListing};

fn raw(id: i64, title: &str, price: &str) -> RawListing {
    RawListing {
        external_id: id,
        title: title.to_string(),
        price_raw: price.to_string(),
        area_raw: "50".to_string(),
        location_raw: "Praha 4 - Nusle".to_string(),
        layout_raw: "2+kk".to_string(),
        category_main: 1,
        category_sub: 4,
        detail_url: format!("https://www.sreality.cz/detail/prodej/byt/2+kk/praha/{id}"),
        scraped_at: Utc::now(),
    }
}

fn pair(id: i64, title: &str, price: &str) -> (RawListing, CleanListing) {
    let r = raw(id, title, price);
    let c = Cleaner::new().process(&r);
    (r, c)
}

#[test]
fn first_sight_writes_property_and_history_together() {
    let store = IngestionStore::open_in_memory().unwrap();
    let outcome = store
        .process_batch(&[pair(12345, "Test Flat", "5000000")])
        .unwrap();

    assert_eq!(outcome.new, 1);
    assert_eq!(outcome.updated, 0);

    let prop = store.property(12345).unwrap().expect("property persisted");
    assert_eq!(prop.current_price, 5_000_000);
    assert_eq!(prop.floor_area, Some(50));
    assert_eq!(prop.first_seen_at, prop.last_seen_at);

    let history = store.price_history(12345).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].price, 5_000_000);
}

#[test]
fn resight_with_unchanged_price_keeps_single_history_record() {
    let store = IngestionStore::open_in_memory().unwrap();
    store
        .process_batch(&[pair(12345, "Test Flat", "5000000")])
        .unwrap();
    let outcome = store
        .process_batch(&[pair(12345, "Test Flat Renamed", "5000000")])
        .unwrap();

    assert_eq!(outcome.new, 0);
    assert_eq!(outcome.updated, 1);
    assert_eq!(outcome.price_changed, 0);

    let prop = store.property(12345).unwrap().unwrap();
    // Title and last-seen refresh on every sighting.
    assert_eq!(prop.title, "Test Flat Renamed");
    assert!(prop.last_seen_at >= prop.first_seen_at);

    assert_eq!(store.price_history(12345).unwrap().len(), 1);
}

#[test]
fn price_change_appends_second_history_record() {
    let store = IngestionStore::open_in_memory().unwrap();
    store
        .process_batch(&[pair(12345, "Test Flat", "5000000")])
        .unwrap();
    let outcome = store
        .process_batch(&[pair(12345, "Test Flat", "4500000")])
        .unwrap();

    assert_eq!(outcome.price_changed, 1);

    let prop = store.property(12345).unwrap().unwrap();
    assert_eq!(prop.current_price, 4_500_000);

    let history = store.price_history(12345).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].price, 5_000_000);
    assert_eq!(history[1].price, 4_500_000);
}

#[test]
fn batch_mixes_new_and_resighted() {
    let store = IngestionStore::open_in_memory().unwrap();
    store.process_batch(&[pair(1, "A", "3000000")]).unwrap();

    let outcome = store
        .process_batch(&[
            pair(1, "A", "2900000"),
            pair(2, "B", "4000000"),
            pair(3, "C", "cena dohodou"),
        ])
        .unwrap();

    assert_eq!(outcome.new, 2);
    assert_eq!(outcome.updated, 1);
    assert_eq!(outcome.price_changed, 1);
    assert_eq!(store.property_count().unwrap(), 3);

    // Unknown price persists as 0 and still gets its initial record.
    let c = store.property(3).unwrap().unwrap();
    assert_eq!(c.current_price, 0);
    assert_eq!(store.price_history(3).unwrap().len(), 1);
}

#[test]
fn reopened_database_keeps_properties_and_history() {
    // Na disku, ne in-memory: přes restart musí vše přežít.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("radar.db");
    let path = path.to_str().unwrap();

    {
        let store = IngestionStore::open(path).unwrap();
        store.process_batch(&[pair(42, "Persistent", "6000000")]).unwrap();
        store.process_batch(&[pair(42, "Persistent", "5800000")]).unwrap();
    }

    let store = IngestionStore::open(path).unwrap();
    assert_eq!(store.property_count().unwrap(), 1);
    assert_eq!(store.property(42).unwrap().unwrap().current_price, 5_800_000);
    assert_eq!(store.price_history(42).unwrap().len(), 2);
}

#[test]
fn unparsed_price_then_real_price_counts_as_change() {
    let store = IngestionStore::open_in_memory().unwrap();
    store.process_batch(&[pair(7, "X", "cena dohodou")]).unwrap();
    store.process_batch(&[pair(7, "X", "2500000")]).unwrap();

    let history = store.price_history(7).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].price, 0);
    assert_eq!(history[1].price, 2_500_000);
}
