// src/enrich.rs
//! Location-enrichment boundary. The real geocoding provider is an
//! external collaborator; the core only depends on this contract.

use serde::Serialize;

use crate::cleaner::CleanListing;

/// A listing with whatever location context the enricher could add.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedListing {
    pub listing: CleanListing,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub district: Option<String>,
    pub dist_center_km: Option<f64>,
}

impl From<CleanListing> for EnrichedListing {
    fn from(listing: CleanListing) -> Self {
        Self {
            listing,
            latitude: None,
            longitude: None,
            district: None,
            dist_center_km: None,
        }
    }
}

/// Contract: enrichment never fails the pipeline. On provider error an
/// implementation returns the input unchanged (the `From` conversion).
#[async_trait::async_trait]
pub trait LocationEnricher: Send + Sync {
    async fn enrich(&self, listing: CleanListing) -> EnrichedListing;
    fn name(&self) -> &'static str;
}

/// Default no-op implementation; passes every listing through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughEnricher;

#[async_trait::async_trait]
impl LocationEnricher for PassthroughEnricher {
    async fn enrich(&self, listing: CleanListing) -> EnrichedListing {
        listing.into()
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}
