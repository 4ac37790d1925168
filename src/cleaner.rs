// src/cleaner.rs
//! Normalization of raw listing fields into typed numeric values.
//!
//! The catalog serves prices as display strings ("7 500 000 Kč") and floor
//! areas as unit-suffixed fragments ("55 m²"). Parsing keeps the distinction
//! between a confirmed zero and a value that could not be read: failures
//! yield `None`, never `0`.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::harvest::types::RawListing;

/// Listing-side classification derived from the catalog's main category code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    House,
    Land,
    Recreation,
    Commercial,
    Unknown,
}

impl PropertyType {
    pub fn from_category_main(code: u32) -> Self {
        match code {
            1 => Self::Apartment,
            2 => Self::House,
            3 => Self::Land,
            4 => Self::Recreation,
            5 => Self::Commercial,
            _ => Self::Unknown,
        }
    }
}

/// Standardized listing data ready for enrichment and analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanListing {
    pub external_id: i64,
    pub title: String,
    pub locality: String,
    pub detail_url: String,
    pub category_main: u32,
    pub category_sub: u32,
    /// Sale price in CZK; `None` when the raw text did not parse.
    pub price: Option<u64>,
    /// Floor area in m²; `None` when the raw text did not parse.
    pub area: Option<u64>,
    /// Derived price/m², rounded. Set only when price and area are both
    /// known and area > 0.
    pub price_per_m2: Option<u64>,
    pub layout: Option<String>,
    pub property_type: PropertyType,
}

/// Keep ASCII digits, drop everything else, then parse.
/// `"7 500 000 Kč"` → `Some(7_500_000)`; `"cena dohodou"` → `None`.
pub fn parse_numeric(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Decode HTML entities and collapse whitespace (titles arrive with
/// `&nbsp;` and hard spaces baked in).
pub fn tidy_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&decoded, " ").trim().to_string()
}

#[derive(Debug, Clone, Default)]
pub struct Cleaner;

impl Cleaner {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, raw: &RawListing) -> CleanListing {
        let price = parse_numeric(&raw.price_raw);
        let area = parse_numeric(&raw.area_raw);

        let price_per_m2 = match (price, area) {
            (Some(p), Some(a)) if a > 0 => Some(((p as f64) / (a as f64)).round() as u64),
            _ => None,
        };

        let layout = {
            let t = raw.layout_raw.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        };

        CleanListing {
            external_id: raw.external_id,
            title: tidy_text(&raw.title),
            locality: tidy_text(&raw.location_raw),
            detail_url: raw.detail_url.clone(),
            category_main: raw.category_main,
            category_sub: raw.category_sub,
            price,
            area,
            price_per_m2,
            layout,
            property_type: PropertyType::from_category_main(raw.category_main),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spaced_price_with_currency() {
        assert_eq!(parse_numeric("7 500 000 Kč"), Some(7_500_000));
    }

    #[test]
    fn parses_area_with_unit() {
        assert_eq!(parse_numeric("55 m²"), Some(55));
    }

    #[test]
    fn unparseable_is_unknown_not_zero() {
        assert_eq!(parse_numeric("cena dohodou"), None);
        assert_eq!(parse_numeric(""), None);
        // Confirmed zero stays zero.
        assert_eq!(parse_numeric("0"), Some(0));
    }

    #[test]
    fn tidy_decodes_entities_and_collapses_ws() {
        assert_eq!(
            tidy_text("Prodej bytu 2+kk&nbsp;&nbsp; 55 m²"),
            "Prodej bytu 2+kk 55 m²"
        );
    }

    #[test]
    fn category_codes_map_to_types() {
        assert_eq!(PropertyType::from_category_main(1), PropertyType::Apartment);
        assert_eq!(PropertyType::from_category_main(5), PropertyType::Commercial);
        assert_eq!(PropertyType::from_category_main(42), PropertyType::Unknown);
    }
}
