// src/store/models.rs

/// One unique listing as persisted; mutated on every re-sighting.
#[derive(Debug, Clone)]
pub struct PersistedProperty {
    pub external_id: i64,
    pub source: String,
    pub title: String,
    pub location_raw: String,
    pub category_main: u32,
    pub category_sub: u32,
    pub current_price: i64,
    pub floor_area: Option<i64>,
    pub first_seen_at: String,
    pub last_seen_at: String,
}

/// One observed price point. Append-only: a record is written on first
/// sight and on every detected change, never updated or deleted.
#[derive(Debug, Clone)]
pub struct PriceHistoryRecord {
    pub id: i64,
    pub property_id: i64,
    pub price: i64,
    pub detected_at: String,
}
