// tests/harvest_pagination.rs
// Pagination loop behavior against an in-memory page fetcher: limits,
// end-of-results, and the partial-results failure contract.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use reality_radar::harvest::catalog::{
    Embedded, Envelope, EstateItem, PageFetcher, PageRequest, SeoMeta,
};
use reality_radar::harvest::CatalogEngine;
use reality_radar::resolve::{LocationFilter, PropertyCategory, SearchQuery};
use reality_radar::ListingSource;

fn corpus(n: usize) -> Vec<EstateItem> {
    (0..n)
        .map(|i| EstateItem {
            name: format!("Prodej bytu 2+kk {} m²", 40 + (i % 40)),
            locality: "Brno - Líšeň".to_string(),
            price: 3_000_000 + (i as u64) * 10_000,
            hash_id: i as i64 + 1,
            seo: SeoMeta::default(),
        })
        .collect()
}

/// Serves slices of a fixed corpus; optionally blows up on one page.
struct CorpusFetcher {
    corpus: Vec<EstateItem>,
    fail_on_page: Option<u32>,
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl PageFetcher for CorpusFetcher {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Envelope> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if Some(request.page) == self.fail_on_page {
            anyhow::bail!("simulated transport failure");
        }
        let start = ((request.page - 1) * request.per_page) as usize;
        let end = (start + request.per_page as usize).min(self.corpus.len());
        let estates = if start < self.corpus.len() {
            self.corpus[start..end].to_vec()
        } else {
            Vec::new()
        };
        Ok(Envelope {
            embedded: Embedded { estates },
        })
    }
}

fn engine(
    corpus_size: usize,
    fail_on_page: Option<u32>,
) -> (CatalogEngine, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let fetcher = CorpusFetcher {
        corpus: corpus(corpus_size),
        fail_on_page,
        calls: calls.clone(),
    };
    (CatalogEngine::with_fetcher(Box::new(fetcher)), calls)
}

fn any_query() -> SearchQuery {
    SearchQuery {
        location: LocationFilter::Unrestricted,
        min_price: None,
        max_price: None,
        layouts: Vec::new(),
        category: PropertyCategory::Apartment,
    }
}

#[tokio::test]
async fn corpus_smaller_than_one_page_terminates_cleanly() {
    let (engine, calls) = engine(10, None);
    let results = engine.search(&any_query(), 60).await;
    assert_eq!(results.len(), 10);
    // A short page is not terminal; the following empty page is.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn stops_exactly_at_requested_limit() {
    let (engine, calls) = engine(300, None);
    let results = engine.search(&any_query(), 90).await;
    assert_eq!(results.len(), 90);
    // 60 + 30 of the second page; page three is never requested.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_page_returns_partial_harvest() {
    let (engine, _) = engine(300, Some(2));
    let results = engine.search(&any_query(), 150).await;
    assert_eq!(results.len(), 60);
}

#[tokio::test]
async fn failure_on_first_page_yields_empty_not_error() {
    let (engine, _) = engine(300, Some(1));
    let results = engine.search(&any_query(), 60).await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn empty_upstream_is_fine() {
    let (engine, calls) = engine(0, None);
    let results = engine.search(&any_query(), 60).await;
    assert!(results.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn items_carry_extracted_area_and_layout() {
    let (engine, _) = engine(3, None);
    let results = engine.search(&any_query(), 60).await;
    let first = &results[0];
    assert_eq!(first.external_id, 1);
    assert_eq!(first.area_raw, "40");
    assert_eq!(first.layout_raw, "2+kk");
    assert!(first.detail_url.ends_with("/1"));
    assert_eq!(first.price_raw, "3000000");
}
