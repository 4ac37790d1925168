// src/engine.rs
//! # Search Pipeline
//! Wires the stages together: prompt → [`SearchQuery`](crate::resolve::SearchQuery)
//! → harvest → normalize → enrich → yield scoring, ranked by descending
//! gross yield.
//!
//! Every stage degrades instead of failing: an unresolvable prompt becomes
//! an unrestricted query, a broken harvest returns partials, and a
//! persistence error is logged without touching the in-flight response.
//! Total failure surfaces as an empty result set, never an error.

use tracing::{info, warn};

use crate::analysis::{YieldAnalyst, YieldMetrics};
use crate::cleaner::Cleaner;
use crate::enrich::{EnrichedListing, LocationEnricher};
use crate::harvest::types::ListingSource;
use crate::resolve::QueryResolver;
use crate::store::IngestionStore;

/// One ranked result.
#[derive(Debug, Clone)]
pub struct ScoredListing {
    pub listing: EnrichedListing,
    pub metrics: YieldMetrics,
}

pub struct SearchPipeline {
    resolver: QueryResolver,
    source: Box<dyn ListingSource>,
    enricher: Box<dyn LocationEnricher>,
    analyst: YieldAnalyst,
    store: Option<IngestionStore>,
}

impl SearchPipeline {
    pub fn new(
        source: Box<dyn ListingSource>,
        enricher: Box<dyn LocationEnricher>,
        analyst: YieldAnalyst,
    ) -> Self {
        Self {
            resolver: QueryResolver::new(),
            source,
            enricher,
            analyst,
            store: None,
        }
    }

    /// Attach a store; without one the pipeline is search-only.
    pub fn with_store(mut self, store: IngestionStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn store(&self) -> Option<&IngestionStore> {
        self.store.as_ref()
    }

    /// The core inbound operation: resolve the prompt, harvest up to
    /// `limit` listings, and return them scored and sorted by descending
    /// gross yield.
    pub async fn resolve_and_search(&self, prompt: &str, limit: usize) -> Vec<ScoredListing> {
        let query = self.resolver.resolve(prompt);
        info!(
            prompt,
            location = ?query.location,
            max_price = ?query.max_price,
            layouts = ?query.layouts,
            "prompt resolved"
        );

        let raw = self.source.search(&query, limit).await;
        if raw.is_empty() {
            return Vec::new();
        }

        let cleaner = Cleaner::new();
        let batch: Vec<_> = raw
            .into_iter()
            .map(|r| {
                let clean = cleaner.process(&r);
                (r, clean)
            })
            .collect();

        // Persistence is batch-scoped and must not abort the response.
        if let Some(store) = &self.store {
            if let Err(e) = store.process_batch(&batch) {
                warn!(error = %e, "ingestion failed, continuing with in-flight results");
            }
        }

        let mut results = Vec::with_capacity(batch.len());
        for (_, clean) in batch {
            let enriched = self.enricher.enrich(clean).await;
            let metrics = self.analyst.evaluate(&enriched);
            results.push(ScoredListing {
                listing: enriched,
                metrics,
            });
        }

        results.sort_by(|a, b| {
            b.metrics
                .gross_yield_percent
                .total_cmp(&a.metrics.gross_yield_percent)
        });
        results
    }
}
