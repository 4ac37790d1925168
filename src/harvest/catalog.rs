// src/harvest/catalog.rs
//! Wire-level pieces of the catalog API: request parameters, the JSON
//! response envelope, and canonical detail-link reconstruction.
//!
//! The catalog is consumed through its listings endpoint
//! (`GET {base}/cs/v2/estates`); responses embed the listing array under
//! `_embedded.estates`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::resolve::gazetteer::RegionKind;
use crate::resolve::{LocationFilter, SearchQuery};

pub const DEFAULT_BASE_URL: &str = "https://www.sreality.cz/api";
const DETAIL_BASE: &str = "https://www.sreality.cz/detail/prodej";

/// Sale listings only; the rental side of the catalog is out of scope.
const CATEGORY_TYPE_SALE: u32 = 1;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Per-request timeout; a page that exceeds it ends the harvest early.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One page worth of query parameters.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub category_main: u32,
    pub layouts: Vec<u32>,
    pub price_range: Option<String>,
    pub location: LocationFilter,
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn from_query(query: &SearchQuery, page: u32, per_page: u32) -> Self {
        Self {
            category_main: query.category.main_code(),
            layouts: query.layouts.clone(),
            price_range: price_range(query.min_price, query.max_price),
            location: query.location.clone(),
            page,
            per_page,
        }
    }

    /// Flatten into URL query pairs the listings endpoint understands.
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("category_main_cb".into(), self.category_main.to_string()),
            ("category_type_cb".into(), CATEGORY_TYPE_SALE.to_string()),
            ("per_page".into(), self.per_page.to_string()),
            ("page".into(), self.page.to_string()),
        ];

        if let Some(range) = &self.price_range {
            params.push(("czk_price_summary_order2".into(), range.clone()));
        }

        if !self.layouts.is_empty() {
            let joined = self
                .layouts
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join("|");
            params.push(("category_sub_cb".into(), joined));
        }

        match &self.location {
            LocationFilter::Unrestricted => {}
            LocationFilter::FreeText(text) => {
                params.push(("region".into(), text.clone()));
            }
            LocationFilter::Region { id, kind } => {
                let key = match kind {
                    RegionKind::Region => "locality_region_id",
                    RegionKind::District => "locality_district_id",
                };
                params.push((key.into(), id.to_string()));
            }
        }

        params
    }
}

/// Price bounds encoded as "low|high"; empty high means unlimited.
/// No bound at all means no parameter.
pub fn price_range(min: Option<u64>, max: Option<u64>) -> Option<String> {
    if min.is_none() && max.is_none() {
        return None;
    }
    let low = min.unwrap_or(0);
    let high = max.map(|v| v.to_string()).unwrap_or_default();
    Some(format!("{low}|{high}"))
}

// ── Response envelope ────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    #[serde(rename = "_embedded", default)]
    pub embedded: Embedded,
}

#[derive(Debug, Default, Deserialize)]
pub struct Embedded {
    #[serde(default)]
    pub estates: Vec<EstateItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EstateItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub locality: String,
    #[serde(default)]
    pub price: u64,
    pub hash_id: i64,
    #[serde(default)]
    pub seo: SeoMeta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeoMeta {
    pub locality: Option<String>,
    #[serde(default = "default_category_main")]
    pub category_main_cb: u32,
    #[serde(default = "default_category_sub")]
    pub category_sub_cb: u32,
}

impl Default for SeoMeta {
    fn default() -> Self {
        Self {
            locality: None,
            category_main_cb: default_category_main(),
            category_sub_cb: default_category_sub(),
        }
    }
}

fn default_category_main() -> u32 {
    1
}

fn default_category_sub() -> u32 {
    1
}

// ── Canonical detail links ───────────────────────────────────────

/// Apartment layout codes map to individual slugs; unknown codes fall back
/// to the catch-all "vse".
const APARTMENT_LAYOUT_SLUGS: &[(u32, &str)] = &[
    (2, "1+kk"),
    (3, "1+1"),
    (4, "2+kk"),
    (5, "2+1"),
    (6, "3+kk"),
    (7, "3+1"),
    (8, "4+kk"),
    (9, "4+1"),
];

fn category_slug(main: u32) -> &'static str {
    match main {
        2 => "dum",
        3 => "pozemek",
        4 => "rekreace",
        5 => "komercni",
        _ => "byt",
    }
}

/// Non-apartment categories each use one fixed, known-good sub-slug; the
/// catalog redirects to the exact page as long as the slugs are valid.
fn sub_slug(main: u32, sub: u32) -> &'static str {
    match main {
        1 => APARTMENT_LAYOUT_SLUGS
            .iter()
            .find(|(code, _)| *code == sub)
            .map(|(_, slug)| *slug)
            .unwrap_or("vse"),
        2 => "rodinny",
        3 => "bydleni",
        4 => "chata",
        5 => "kancelare",
        _ => "ostatni",
    }
}

/// Rebuild the canonical detail URL from category slugs, the upstream
/// locality slug (placeholder when absent), and the external id.
pub fn detail_url(item: &EstateItem) -> String {
    let main = item.seo.category_main_cb;
    let locality = item.seo.locality.as_deref().unwrap_or("unknown");
    format!(
        "{DETAIL_BASE}/{}/{}/{}/{}",
        category_slug(main),
        sub_slug(main, item.seo.category_sub_cb),
        locality,
        item.hash_id
    )
}

// ── Page fetching seam ───────────────────────────────────────────

/// Transport seam between the pagination loop and the wire. The HTTP
/// implementation is canonical; tests drive the loop with an in-memory one.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Envelope>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("building catalog http client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Envelope> {
        let url = format!("{}/cs/v2/estates", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&request.query_params())
            .send()
            .await
            .context("catalog page request")?
            .error_for_status()
            .context("catalog page status")?;
        resp.json::<Envelope>().await.context("catalog page body")
    }
}
