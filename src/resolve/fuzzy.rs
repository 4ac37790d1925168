// src/resolve/fuzzy.rs
//! Fuzzy municipality matching for prompts the gazetteer does not cover.
//!
//! Tokens survive the pass only if they are at least three characters long
//! and not a stop-word; tokens already covered by a gazetteer phrase are
//! skipped so major city names are not handled twice. Surviving tokens are
//! compared against the embedded municipality list with
//! `strsim::normalized_levenshtein`; the first hit at or above
//! [`SIMILARITY_THRESHOLD`] wins and yields the canonical name.

use once_cell::sync::Lazy;
use strsim::normalized_levenshtein;

use super::fold;
use super::gazetteer::Gazetteer;

/// Fixed acceptance threshold for a fuzzy hit.
pub const SIMILARITY_THRESHOLD: f64 = 0.85;

/// Prompt words that never name a place.
const STOP_WORDS: &[&str] = &[
    "byt", "dum", "v", "na", "u", "prodej", "pronajem", "okres", "kraj", "do", "cena", "max",
    "mil", "milionu",
];

/// (canonical name, folded form), loaded once from the embedded list.
static MUNICIPALITIES: Lazy<Vec<(String, String)>> = Lazy::new(|| {
    let raw = include_str!("../../config/municipalities.json");
    let names: Vec<String> = serde_json::from_str(raw).expect("valid municipality list");
    names
        .into_iter()
        .map(|name| {
            let folded = fold(&name);
            (name, folded)
        })
        .collect()
});

/// Tokens worth matching: ≥ 3 chars, not a stop-word, not already covered
/// by the gazetteer.
pub fn significant_tokens(folded_prompt: &str, gazetteer: &Gazetteer) -> Vec<String> {
    folded_prompt
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 3)
        .filter(|t| !STOP_WORDS.contains(t))
        .filter(|t| !gazetteer.covers_token(t))
        .map(str::to_string)
        .collect()
}

/// First token that fuzzily matches a municipality name; returns the
/// canonical (diacritic-bearing) name.
pub fn match_municipality(tokens: &[String]) -> Option<&'static str> {
    for token in tokens {
        for (canonical, folded) in MUNICIPALITIES.iter() {
            if normalized_levenshtein(token, folded) >= SIMILARITY_THRESHOLD {
                return Some(canonical.as_str());
            }
        }
    }
    None
}
