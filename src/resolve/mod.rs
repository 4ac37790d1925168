// src/resolve/mod.rs
//! # Query Resolver
//! Turns a free-text prompt ("byt 2+kk v Brně do 5 mil") into a structured
//! [`SearchQuery`]. Pure and deterministic, no I/O, and it never fails:
//! anything it cannot resolve defaults to "unrestricted".
//!
//! Location resolution is layered:
//! 1. capital-city district suffix ("praha 5") via regex,
//! 2. static gazetteer, longest phrase wins,
//! 3. fuzzy match against the municipality list,
//! 4. remaining significant tokens as a free-text region filter,
//! 5. nothing left → nationwide.
//!
//! Price, layout, and category extraction run independently of location.

pub mod filters;
pub mod fuzzy;
pub mod gazetteer;

use serde::Serialize;

use gazetteer::{Gazetteer, GazetteerTarget, RegionKind};

/// Query-side property category; maps to the catalog's main category code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCategory {
    Apartment,
    House,
    Land,
    Recreation,
    Commercial,
}

impl PropertyCategory {
    pub fn main_code(self) -> u32 {
        match self {
            Self::Apartment => 1,
            Self::House => 2,
            Self::Land => 3,
            Self::Recreation => 4,
            Self::Commercial => 5,
        }
    }
}

/// Resolved location intent. `FreeText` is used only when no catalog id was
/// resolved; the whole-country sentinel collapses to `Unrestricted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LocationFilter {
    Unrestricted,
    Region { id: u32, kind: RegionKind },
    FreeText(String),
}

/// Structured search request produced by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchQuery {
    pub location: LocationFilter,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    /// Catalog layout codes (e.g. 4 = "2+kk"), deduplicated, ascending.
    pub layouts: Vec<u32>,
    pub category: PropertyCategory,
}

/// Fold Czech diacritics and lowercase. Mirrors the NFKD/ascii slugging the
/// catalog itself uses for locality slugs.
pub fn fold(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' => 'a',
            'č' => 'c',
            'ď' => 'd',
            'é' | 'ě' => 'e',
            'í' => 'i',
            'ň' => 'n',
            'ó' => 'o',
            'ř' => 'r',
            'š' => 's',
            'ť' => 't',
            'ú' | 'ů' => 'u',
            'ý' => 'y',
            'ž' => 'z',
            other => other,
        })
        .collect()
}

/// Diacritic-stripped, lowercased, hyphen-joined form of the prompt.
/// Gazetteer phrases are matched as substrings of this slug, so multi-word
/// phrases use the same separator.
pub fn slug(s: &str) -> String {
    fold(s).split_whitespace().collect::<Vec<_>>().join("-")
}

#[derive(Debug, Clone)]
pub struct QueryResolver {
    gazetteer: Gazetteer,
}

impl Default for QueryResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryResolver {
    pub fn new() -> Self {
        Self {
            gazetteer: Gazetteer::seed(),
        }
    }

    pub fn resolve(&self, prompt: &str) -> SearchQuery {
        let folded = fold(prompt);
        let prompt_slug = slug(prompt);

        // `None` = not yet resolved; `Some(Unrestricted)` = explicitly
        // nationwide (sentinel hit). The two must stay distinct so the
        // sentinel does not fall through to fuzzy matching.
        let mut location: Option<LocationFilter> = None;

        // 1) Numbered capital district ("praha 5" → district id 5005).
        if let Some(GazetteerTarget::Mapped { id, kind }) = gazetteer::capital_district(&folded) {
            location = Some(LocationFilter::Region { id, kind });
        }

        // 2) Gazetteer, longest phrase first.
        if location.is_none() {
            location = match self.gazetteer.lookup(&prompt_slug) {
                Some(GazetteerTarget::Nationwide) => Some(LocationFilter::Unrestricted),
                Some(GazetteerTarget::Mapped { id, kind }) => {
                    Some(LocationFilter::Region { id, kind })
                }
                None => None,
            };
        }

        // 3) Fuzzy municipality pass over significant tokens.
        if location.is_none() {
            let tokens = fuzzy::significant_tokens(&folded, &self.gazetteer);
            if let Some(name) = fuzzy::match_municipality(&tokens) {
                location = Some(LocationFilter::FreeText(name.to_string()));
            } else if !tokens.is_empty() {
                // 4) No fuzzy hit: hand the tokens to the catalog verbatim.
                location = Some(LocationFilter::FreeText(tokens.join(" ")));
            }
        }

        // 5) Nothing resolved at all → nationwide.
        let location = location.unwrap_or(LocationFilter::Unrestricted);

        SearchQuery {
            location,
            min_price: None,
            max_price: filters::extract_max_price(&folded),
            layouts: filters::extract_layouts(&folded),
            category: filters::detect_category(&folded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_strips_czech_diacritics() {
        assert_eq!(fold("Ústí nad Labem"), "usti nad labem");
        assert_eq!(fold("Plzeň"), "plzen");
        assert_eq!(fold("Žďár"), "zdar");
    }

    #[test]
    fn slug_joins_with_hyphens() {
        assert_eq!(slug("Česká  republika"), "ceska-republika");
        assert_eq!(slug("Byt v Praze"), "byt-v-praze");
    }

    #[test]
    fn resolver_is_deterministic() {
        let r = QueryResolver::new();
        let a = r.resolve("byt 2+kk Brno do 5 mil");
        let b = r.resolve("byt 2+kk Brno do 5 mil");
        assert_eq!(a, b);
    }
}
