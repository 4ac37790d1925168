// src/store/mod.rs
//! # Ingestion Store
//! Idempotent persistence of harvested listings with append-only price
//! history.
//!
//! Upserts are keyed by the catalog's external id. First sight inserts
//! the property row together with its initial history record; every
//! re-sighting refreshes `last_seen_at` and the title, and appends a
//! history record only when the price moved. Nothing is ever deleted:
//! a listing that stops appearing upstream stays "seen at least once".
//!
//! Writes are serialized: the connection sits behind a mutex and each
//! batch runs in a single transaction, so concurrent batches touching
//! the same id cannot lose a history append.

pub mod models;
pub mod queries;
pub mod sqlite;

use std::sync::Mutex;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use rusqlite::Result;
use tracing::info;

use crate::cleaner::CleanListing;
use crate::harvest::types::RawListing;
use sqlite::Database;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_new_total", "Properties seen for the first time.");
        describe_counter!("ingest_updated_total", "Re-sighted properties refreshed.");
        describe_counter!(
            "ingest_price_changes_total",
            "Price changes appended to history."
        );
    });
}

/// Per-batch upsert totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub new: usize,
    pub updated: usize,
    pub price_changed: usize,
}

pub struct IngestionStore {
    db: Mutex<Database>,
}

impl IngestionStore {
    pub fn open(path: &str) -> Result<Self> {
        ensure_metrics_described();
        Ok(Self {
            db: Mutex::new(Database::open(path)?),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        ensure_metrics_described();
        Ok(Self {
            db: Mutex::new(Database::open_in_memory()?),
        })
    }

    /// Upsert a harvested batch as one transaction. A property row and its
    /// first history record land together or not at all.
    pub fn process_batch(&self, batch: &[(RawListing, CleanListing)]) -> Result<BatchOutcome> {
        let now = chrono::Utc::now().to_rfc3339();
        let mut db = self.db.lock().unwrap();
        let tx = db.connection_mut().transaction()?;

        let mut outcome = BatchOutcome::default();
        for (raw, clean) in batch {
            queries::upsert_listing(&tx, raw, clean, &now, &mut outcome)?;
        }
        tx.commit()?;

        counter!("ingest_new_total").increment(outcome.new as u64);
        counter!("ingest_updated_total").increment(outcome.updated as u64);
        counter!("ingest_price_changes_total").increment(outcome.price_changed as u64);
        info!(
            new = outcome.new,
            updated = outcome.updated,
            price_changed = outcome.price_changed,
            "ingestion batch committed"
        );
        Ok(outcome)
    }

    pub fn property(&self, external_id: i64) -> Result<Option<models::PersistedProperty>> {
        let db = self.db.lock().unwrap();
        queries::find_property(db.connection(), external_id)
    }

    pub fn price_history(&self, external_id: i64) -> Result<Vec<models::PriceHistoryRecord>> {
        let db = self.db.lock().unwrap();
        queries::price_history(db.connection(), external_id)
    }

    pub fn property_count(&self) -> Result<i64> {
        let db = self.db.lock().unwrap();
        db.connection()
            .query_row("SELECT COUNT(*) FROM property", [], |row| row.get(0))
    }
}
