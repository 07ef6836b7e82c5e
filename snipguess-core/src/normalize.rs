//! Title normalization for guess matching
//!
//! Canonicalizes song titles and user guesses so that surface variations
//! ("Lucid Dreams (Remix)", "Righteous!!", "All Girls Are The Same V2")
//! compare equal to the base title. The pipeline is applied once, in order,
//! not iterated to fixpoint: parenthesized segments go first, then trailing
//! version markers, then one trailing qualifier word, then punctuation and
//! whitespace cleanup.

use once_cell::sync::Lazy;
use regex::Regex;

/// Parenthesized segments anywhere in the title: "(Remix)", "(feat. X)"
static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\([^)]*\)").unwrap());

/// Trailing version marker: "V2", "v13"
static TRAILING_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\bv\d+\s*$").unwrap());

/// Trailing literal "2.0" (re-release convention, e.g. "TPNE 2.0")
static TRAILING_TWO_POINT_OH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*2\.0\s*$").unwrap());

/// One trailing qualifier word. Mid-title qualifiers are left alone.
static TRAILING_QUALIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*\b(?:extended|outro|intro|alternate|alt|demo|og|leak|snippet)\s*$").unwrap()
});

/// Everything that is neither alphanumeric nor whitespace
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());

/// Whitespace runs, collapsed to a single space
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Canonicalize a title or guess for equality comparison.
///
/// Deterministic and pure; idempotent on already-normalized input.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut result = lowered.trim().to_string();

    result = PARENTHETICAL.replace_all(&result, "").to_string();
    result = TRAILING_VERSION.replace(&result, "").to_string();
    result = TRAILING_TWO_POINT_OH.replace(&result, "").to_string();
    result = TRAILING_QUALIFIER.replace(&result, "").to_string();
    result = NON_WORD.replace_all(&result, "").to_string();
    result = MULTI_SPACE.replace_all(&result, " ").to_string();

    result.trim().to_string()
}
