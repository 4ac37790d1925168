// src/resolve/gazetteer.rs
//! Static gazetteer of known place-name phrases → catalog region ids.
//!
//! Phrases are matched as substrings of the hyphen-joined prompt slug and
//! evaluated longest-first, so "praha-vychod" wins over the "praha" it
//! contains. The ordering is explicit (sorted at construction), not an
//! artifact of map iteration.
//!
//! The id ↔ kind mapping is fixed here as the one authoritative table;
//! upstream location identifiers are not re-guessed from id ranges.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Serialize;

/// Administrative granularity of a catalog location id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Region,
    District,
}

/// What a gazetteer phrase resolves to. `Nationwide` is the whole-country
/// sentinel: the region is explicitly unset, which is not the same as
/// "not yet resolved".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GazetteerTarget {
    Nationwide,
    Mapped { id: u32, kind: RegionKind },
}

const fn region(id: u32) -> GazetteerTarget {
    GazetteerTarget::Mapped {
        id,
        kind: RegionKind::Region,
    }
}

const fn district(id: u32) -> GazetteerTarget {
    GazetteerTarget::Mapped {
        id,
        kind: RegionKind::District,
    }
}

/// Seed table: region phrases cover the 14 kraje plus their capitals;
/// hyphenated compounds must use the slug separator.
const SEED: &[(&str, GazetteerTarget)] = &[
    // Whole-country sentinels.
    ("ceska-republika", GazetteerTarget::Nationwide),
    ("cesko", GazetteerTarget::Nationwide),
    ("cr", GazetteerTarget::Nationwide),
    ("cz", GazetteerTarget::Nationwide),
    // The two districts ringing the capital have no own catalog id; treat
    // them as unset rather than mislabeling them as the capital proper.
    ("praha-vychod", GazetteerTarget::Nationwide),
    ("praha-zapad", GazetteerTarget::Nationwide),
    // Regions and their anchor cities.
    ("jihocesky", region(1)),
    ("budejovice", region(1)),
    ("plzensky", region(2)),
    ("plzen", region(2)),
    ("karlovarsky", region(3)),
    ("vary", region(3)),
    ("ustecky", region(4)),
    ("usti", region(4)),
    ("liberecky", region(5)),
    ("liberec", region(5)),
    ("kralovehradecky", region(6)),
    ("hradec", region(6)),
    ("pardubicky", region(7)),
    ("pardubice", region(7)),
    ("olomoucky", region(8)),
    ("olomouc", region(8)),
    ("zlinsky", region(9)),
    ("zlin", region(9)),
    ("praha", region(10)),
    ("stredocesky", region(11)),
    ("moravskoslezsky", region(12)),
    ("ostrava", region(12)),
    ("vysocina", region(13)),
    ("jihlava", region(13)),
    ("jihomoravsky", region(14)),
    // Brno is served by its city district, not the surrounding region.
    ("brno", district(72)),
];

/// Capital districts occupy a reserved id block right above 5000.
const CAPITAL_DISTRICT_BASE: u32 = 5000;

/// Detect a numbered capital district ("praha 5", "praha5"). Only suffixes
/// 1–10 map to the reserved block; anything else falls through to general
/// matching.
pub fn capital_district(folded_prompt: &str) -> Option<GazetteerTarget> {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| Regex::new(r"praha\s*(\d+)").unwrap());

    let caps = re.captures(folded_prompt)?;
    let n: u32 = caps.get(1)?.as_str().parse().ok()?;
    if (1..=10).contains(&n) {
        Some(district(CAPITAL_DISTRICT_BASE + n))
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct Gazetteer {
    /// (phrase, target), sorted by descending phrase length.
    entries: Vec<(&'static str, GazetteerTarget)>,
}

impl Gazetteer {
    pub fn seed() -> Self {
        let mut entries = SEED.to_vec();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
        Self { entries }
    }

    /// First (longest) phrase contained in the slug wins.
    pub fn lookup(&self, prompt_slug: &str) -> Option<GazetteerTarget> {
        self.entries
            .iter()
            .find(|(phrase, _)| prompt_slug.contains(phrase))
            .map(|(_, target)| *target)
    }

    /// Whether a token is already accounted for by a gazetteer phrase; the
    /// fuzzy pass skips those to avoid double handling of major city names.
    pub fn covers_token(&self, token: &str) -> bool {
        self.entries
            .iter()
            .any(|(phrase, _)| phrase.contains(token) || token.contains(phrase))
    }
}
