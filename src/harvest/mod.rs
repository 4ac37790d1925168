// src/harvest/mod.rs
//! # Harvest Engine
//! Executes a [`SearchQuery`](crate::resolve::SearchQuery) against the
//! catalog's listings endpoint, paginating until the requested limit or
//! the end of results.
//!
//! Failure semantics: a transport or parse error on any page aborts the
//! loop and returns what was already collected; callers never see an
//! error. There are no per-page retries.

pub mod catalog;
pub mod types;

use chrono::Utc;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::resolve::SearchQuery;
use catalog::{EstateItem, HttpFetcher, PageFetcher, PageRequest};
use types::{ListingSource, RawListing};

/// Largest page the listings endpoint serves efficiently.
pub const PAGE_SIZE: u32 = 60;

/// Pause between pages on multi-page harvests, to stay polite upstream.
const PAGE_DELAY: Duration = Duration::from_millis(100);

/// One-time metrics registration (so series carry descriptions wherever
/// a recorder is installed).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("harvest_pages_total", "Catalog pages fetched.");
        describe_counter!("harvest_items_total", "Listings collected from the catalog.");
        describe_counter!(
            "harvest_errors_total",
            "Transport/parse failures that ended a harvest early."
        );
    });
}

/// Direct-API harvesting engine; canonical implementation of
/// [`ListingSource`].
pub struct CatalogEngine {
    fetcher: Box<dyn PageFetcher>,
    per_page: u32,
}

impl CatalogEngine {
    /// Engine talking to the real listings endpoint.
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self::with_fetcher(Box::new(HttpFetcher::new(base_url)?)))
    }

    /// Engine over an arbitrary transport (tests use an in-memory one).
    pub fn with_fetcher(fetcher: Box<dyn PageFetcher>) -> Self {
        ensure_metrics_described();
        Self {
            fetcher,
            per_page: PAGE_SIZE,
        }
    }

    async fn run(&self, query: &SearchQuery, limit: usize) -> Vec<RawListing> {
        let mut collected: Vec<RawListing> = Vec::new();
        let mut page: u32 = 1;

        while collected.len() < limit {
            let request = PageRequest::from_query(query, page, self.per_page);
            debug!(page, fetched = collected.len(), limit, "catalog page fetch");

            let envelope = match self.fetcher.fetch_page(&request).await {
                Ok(env) => env,
                Err(e) => {
                    // Partial results are the contract; the failed page is
                    // not retried.
                    warn!(error = ?e, page, "catalog fetch failed, returning partial harvest");
                    counter!("harvest_errors_total").increment(1);
                    break;
                }
            };

            let items = envelope.embedded.estates;
            if items.is_empty() {
                break; // end of results
            }
            counter!("harvest_pages_total").increment(1);

            // A short page is not terminal by itself; only an empty one is.
            for item in items {
                if collected.len() >= limit {
                    break;
                }
                collected.push(map_item(item));
            }

            page += 1;

            if limit as u32 > self.per_page {
                tokio::time::sleep(PAGE_DELAY).await;
            }
        }

        counter!("harvest_items_total").increment(collected.len() as u64);
        info!(total = collected.len(), pages = page, "harvest finished");
        collected
    }
}

#[async_trait::async_trait]
impl ListingSource for CatalogEngine {
    async fn search(&self, query: &SearchQuery, limit: usize) -> Vec<RawListing> {
        self.run(query, limit).await
    }

    fn name(&self) -> &'static str {
        "sreality"
    }
}

/// Floor area embedded in the listing title ("Prodej bytu 2+kk 55 m²").
fn extract_area(title: &str) -> Option<&str> {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s*(?:m²|m2)").unwrap());
    re.captures(title).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Floor-plan shorthand in the title; several spellings occur.
fn extract_layout(title: &str) -> Option<&str> {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i)(\d\+kk|\d\+1|\d\+0|garsoniera)").unwrap());
    re.captures(title).and_then(|c| c.get(1)).map(|m| m.as_str())
}

fn map_item(item: EstateItem) -> RawListing {
    let area_raw = extract_area(&item.name).unwrap_or_default().to_string();
    let layout_raw = extract_layout(&item.name).unwrap_or_default().to_string();
    let detail_url = catalog::detail_url(&item);

    RawListing {
        external_id: item.hash_id,
        title: item.name,
        price_raw: item.price.to_string(),
        area_raw,
        location_raw: item.locality,
        layout_raw,
        category_main: item.seo.category_main_cb,
        category_sub: item.seo.category_sub_cb,
        detail_url,
        scraped_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::SeoMeta;

    fn item(title: &str) -> EstateItem {
        EstateItem {
            name: title.to_string(),
            locality: "Brno".into(),
            price: 4_000_000,
            hash_id: 7,
            seo: SeoMeta::default(),
        }
    }

    #[test]
    fn area_from_title_variants() {
        assert_eq!(extract_area("Prodej bytu 2+kk 55 m²"), Some("55"));
        assert_eq!(extract_area("Prodej bytu 3+1 82m2"), Some("82"));
        assert_eq!(extract_area("Prodej pozemku"), None);
    }

    #[test]
    fn layout_from_title_variants() {
        assert_eq!(extract_layout("Prodej bytu 2+kk 55 m²"), Some("2+kk"));
        assert_eq!(extract_layout("Byt 3+1, Brno"), Some("3+1"));
        assert_eq!(extract_layout("Prodej garsoniera 21 m²"), Some("garsoniera"));
        assert_eq!(extract_layout("Prodej pozemku 800 m²"), None);
    }

    #[test]
    fn mapped_item_keeps_missing_area_empty() {
        let raw = map_item(item("Prodej chaty"));
        assert_eq!(raw.area_raw, "");
        assert_eq!(raw.layout_raw, "");
        assert_eq!(raw.price_raw, "4000000");
    }
}
