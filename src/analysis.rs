// src/analysis.rs
//! # Yield Analyst
//! Scores a listing's investment potential against a static table of
//! market comparables (monthly rent per m² and sale price per m²).
//!
//! Lookup order mirrors how coarse the table is: city-name substring
//! match first, then region-name substring, then the system default.
//! All computation is a pure function of the listing and the table; the
//! table is an injected read-only snapshot, not ambient state.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

use crate::enrich::EnrichedListing;
use crate::resolve::fold;

/// Listings priced below this are placeholders ("price on request" rows
/// carry 0 or 1 CZK); yield is not computed for them.
const PRICE_SANITY_FLOOR: u64 = 100_000;

/// Same guard for the derived price/m² before computing undervaluation.
const PRICE_PER_M2_SANITY_FLOOR: u64 = 1_000;

pub const DEFAULT_YIELD_TARGET: f64 = 4.0;

/// Market comparables for one locality: CZK per m².
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MarketComparable {
    /// Achievable monthly rent per m².
    pub rent: f64,
    /// Typical sale price per m².
    pub sale: f64,
}

fn default_comparable() -> MarketComparable {
    MarketComparable {
        rent: 200.0,
        sale: 60_000.0,
    }
}

/// Static comparables table. Keys are diacritic-folded lowercase names and
/// are matched as substrings of the listing's folded locality.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketTable {
    #[serde(default = "default_comparable")]
    pub default: MarketComparable,
    #[serde(default)]
    pub cities: BTreeMap<String, MarketComparable>,
    #[serde(default)]
    pub regions: BTreeMap<String, MarketComparable>,
}

static EMBEDDED_TABLE: Lazy<MarketTable> = Lazy::new(|| {
    let raw = include_str!("../config/market_data.json");
    serde_json::from_str(raw).expect("valid embedded market table")
});

impl Default for MarketTable {
    fn default() -> Self {
        EMBEDDED_TABLE.clone()
    }
}

impl MarketTable {
    /// Load from a JSON file, falling back to the embedded snapshot when
    /// the file is missing or malformed.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!(error = %e, path = %path.as_ref().display(), "bad market table, using embedded");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// City substring → region substring → default.
    pub fn comparables_for(&self, locality: &str) -> MarketComparable {
        if locality.is_empty() {
            return self.default;
        }
        let folded = fold(locality);

        for (city, data) in &self.cities {
            if folded.contains(city.as_str()) {
                return *data;
            }
        }
        for (region, data) in &self.regions {
            if folded.contains(region.as_str()) {
                return *data;
            }
        }
        self.default
    }
}

/// Financial metrics for one listing; zeros where a guard suppressed the
/// computation.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct YieldMetrics {
    pub gross_yield_percent: f64,
    pub estimated_annual_rent: f64,
    pub market_rent_per_m2: f64,
    pub market_sale_per_m2: f64,
    /// Positive = priced below the market comparable.
    pub undervaluation_percent: f64,
    pub is_good_deal: bool,
}

#[derive(Debug, Clone)]
pub struct YieldAnalyst {
    table: MarketTable,
    yield_target: f64,
}

impl YieldAnalyst {
    pub fn new(table: MarketTable, yield_target: f64) -> Self {
        Self {
            table,
            yield_target,
        }
    }

    pub fn evaluate(&self, ad: &EnrichedListing) -> YieldMetrics {
        let listing = &ad.listing;
        let market = self.table.comparables_for(&listing.locality);

        // Estimated rent from the floor area; zero when the area is unknown.
        let monthly_rent = listing.area.map(|a| a as f64 * market.rent).unwrap_or(0.0);
        let annual_rent = monthly_rent * 12.0;

        let gross_yield = match listing.price {
            Some(price) if price > PRICE_SANITY_FLOOR => (annual_rent / price as f64) * 100.0,
            _ => 0.0,
        };

        let undervaluation = match listing.price_per_m2 {
            Some(ppm2) if ppm2 > PRICE_PER_M2_SANITY_FLOOR && market.sale > 0.0 => {
                (market.sale - ppm2 as f64) / market.sale * 100.0
            }
            _ => 0.0,
        };

        YieldMetrics {
            gross_yield_percent: round_to(gross_yield, 2),
            estimated_annual_rent: annual_rent.round(),
            market_rent_per_m2: market.rent,
            market_sale_per_m2: market.sale,
            undervaluation_percent: round_to(undervaluation, 1),
            is_good_deal: gross_yield >= self.yield_target,
        }
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::{CleanListing, PropertyType};

    fn table() -> MarketTable {
        let mut cities = BTreeMap::new();
        cities.insert(
            "praha".to_string(),
            MarketComparable {
                rent: 300.0,
                sale: 80_000.0,
            },
        );
        let mut regions = BTreeMap::new();
        regions.insert(
            "jihomoravsky".to_string(),
            MarketComparable {
                rent: 250.0,
                sale: 70_000.0,
            },
        );
        MarketTable {
            default: default_comparable(),
            cities,
            regions,
        }
    }

    fn listing(locality: &str, price: Option<u64>, area: Option<u64>) -> EnrichedListing {
        let price_per_m2 = match (price, area) {
            (Some(p), Some(a)) if a > 0 => Some(((p as f64) / (a as f64)).round() as u64),
            _ => None,
        };
        CleanListing {
            external_id: 1,
            title: "Byt".into(),
            locality: locality.into(),
            detail_url: String::new(),
            category_main: 1,
            category_sub: 4,
            price,
            area,
            price_per_m2,
            layout: Some("2+kk".into()),
            property_type: PropertyType::Apartment,
        }
        .into()
    }

    #[test]
    fn reference_yield_case() {
        // area 50 × rent 300 → 15 000/month, 180 000/year; at 5 000 000
        // that is 3.6 % gross, under the 4.0 target.
        let analyst = YieldAnalyst::new(table(), DEFAULT_YIELD_TARGET);
        let m = analyst.evaluate(&listing("Praha 4", Some(5_000_000), Some(50)));
        assert_eq!(m.estimated_annual_rent, 180_000.0);
        assert_eq!(m.gross_yield_percent, 3.6);
        assert!(!m.is_good_deal);
    }

    #[test]
    fn undervaluation_against_market_sale() {
        // 64 000/m² against an 80 000 market → 20 % under.
        let analyst = YieldAnalyst::new(table(), DEFAULT_YIELD_TARGET);
        let m = analyst.evaluate(&listing("Praha", Some(3_200_000), Some(50)));
        assert_eq!(m.undervaluation_percent, 20.0);
    }

    #[test]
    fn placeholder_price_suppresses_yield() {
        let analyst = YieldAnalyst::new(table(), DEFAULT_YIELD_TARGET);
        let m = analyst.evaluate(&listing("Praha", Some(1), Some(50)));
        assert_eq!(m.gross_yield_percent, 0.0);
        assert!(!m.is_good_deal);
    }

    #[test]
    fn lookup_falls_back_city_region_default() {
        let t = table();
        assert_eq!(t.comparables_for("Praha 5 - Smíchov").rent, 300.0);
        assert_eq!(t.comparables_for("Jihomoravský kraj").rent, 250.0);
        assert_eq!(t.comparables_for("Horní Lhota").rent, 200.0);
        assert_eq!(t.comparables_for("").rent, 200.0);
    }

    #[test]
    fn good_deal_at_target() {
        // area 60 × 300 × 12 = 216 000; price 5.4M → exactly 4.0 %.
        let analyst = YieldAnalyst::new(table(), 4.0);
        let m = analyst.evaluate(&listing("Praha", Some(5_400_000), Some(60)));
        assert_eq!(m.gross_yield_percent, 4.0);
        assert!(m.is_good_deal);
    }
}
