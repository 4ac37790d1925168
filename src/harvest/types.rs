// src/harvest/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resolve::SearchQuery;

/// Raw listing as harvested from the catalog; immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub external_id: i64,
    pub title: String,
    /// Display price text; numeric parsing happens downstream.
    pub price_raw: String,
    /// Area fragment extracted from the title; empty when absent.
    pub area_raw: String,
    pub location_raw: String,
    /// Floor-plan shorthand extracted from the title; empty when absent.
    pub layout_raw: String,
    pub category_main: u32,
    pub category_sub: u32,
    pub detail_url: String,
    pub scraped_at: DateTime<Utc>,
}

/// Harvesting contract. The direct-API engine is the canonical
/// implementation; a browser-automation fallback lives behind the same
/// trait as an external collaborator, as do test mocks.
///
/// Implementations never propagate transport or parse failures: a failed
/// harvest returns whatever was collected so far (possibly nothing).
#[async_trait::async_trait]
pub trait ListingSource: Send + Sync {
    async fn search(&self, query: &SearchQuery, limit: usize) -> Vec<RawListing>;
    fn name(&self) -> &'static str;
}
