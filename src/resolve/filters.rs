// src/resolve/filters.rs
//! Price, layout, and category extraction. These run independently of
//! location resolution and never fail; an unmatched filter stays
//! unrestricted.

use once_cell::sync::OnceCell;
use regex::Regex;

use super::PropertyCategory;

/// Layout shorthand → catalog layout code. Keys are checked as substrings
/// of the squeezed prompt, so both "2+kk" and the sloppy "2kk" hit.
const LAYOUT_CODES: &[(&str, u32)] = &[
    ("1+kk", 2),
    ("1kk", 2),
    ("1+1", 3),
    ("2+kk", 4),
    ("2kk", 4),
    ("2+1", 5),
    ("3+kk", 6),
    ("3kk", 6),
    ("3+1", 7),
    ("4+kk", 8),
    ("4kk", 8),
    ("4+1", 9),
];

/// First-match category keywords; apartments are the default.
const CATEGORY_KEYWORDS: &[(&str, PropertyCategory)] = &[
    ("byt", PropertyCategory::Apartment),
    ("garsonka", PropertyCategory::Apartment),
    ("dum", PropertyCategory::House),
    ("domu", PropertyCategory::House),
    ("domek", PropertyCategory::House),
    ("rodinny", PropertyCategory::House),
    ("vila", PropertyCategory::House),
    ("pozemek", PropertyCategory::Land),
    ("parcela", PropertyCategory::Land),
    ("chata", PropertyCategory::Recreation),
    ("chalupa", PropertyCategory::Recreation),
    ("rekreace", PropertyCategory::Recreation),
    ("komercni", PropertyCategory::Commercial),
    ("kancelar", PropertyCategory::Commercial),
];

const MILLION: u64 = 1_000_000;

/// Whitespace squeezed out so "do 5 mil" and "do5mil" read the same.
fn squeeze(folded_prompt: &str) -> String {
    folded_prompt
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect()
}

/// Max-price bound: "do"/"max" prefix, digits, optional million suffix.
/// "do 5 mil" → 5_000_000; "max4200000" → 4_200_000.
pub fn extract_max_price(folded_prompt: &str) -> Option<u64> {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| Regex::new(r"(?:do|max)(\d+)(mil|m)?").unwrap());

    let squeezed = squeeze(folded_prompt);
    let caps = re.captures(&squeezed)?;
    let base: u64 = caps.get(1)?.as_str().parse().ok()?;
    if caps.get(2).is_some() {
        Some(base * MILLION)
    } else {
        Some(base)
    }
}

/// Zero or more layout codes via substring lookup; deduplicated, ascending.
pub fn extract_layouts(folded_prompt: &str) -> Vec<u32> {
    let squeezed = squeeze(folded_prompt);
    let mut codes: Vec<u32> = LAYOUT_CODES
        .iter()
        .filter(|(key, _)| squeezed.contains(key))
        .map(|(_, code)| *code)
        .collect();
    codes.sort_unstable();
    codes.dedup();
    codes
}

/// First keyword hit decides the category; no hit means apartments.
pub fn detect_category(folded_prompt: &str) -> PropertyCategory {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(kw, _)| folded_prompt.contains(kw))
        .map(|(_, cat)| *cat)
        .unwrap_or(PropertyCategory::Apartment)
}
