//! Display-name comparison.
//!
//! Students rarely spell the same concept identically: casing, spacing and
//! small typos differ. Names are normalized first and then compared both
//! character-wise and token-wise, keeping the better of the two.

use std::collections::HashSet;

use similar::TextDiff;

/// Lowercases, trims and collapses internal whitespace.
pub fn normalize(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Similarity of two display names in `[0, 1]`.
///
/// Two empty names are identical; an empty name never matches a non-empty
/// one.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);

    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }
    if a == b {
        return 1.0;
    }

    let chars = f64::from(TextDiff::from_chars(a.as_str(), b.as_str()).ratio());
    chars.max(token_overlap(&a, &b)).clamp(0.0, 1.0)
}

/// Jaccard overlap of the alphanumeric tokens of two normalized names.
fn token_overlap(a: &str, b: &str) -> f64 {
    let a_tokens = tokens(a);
    let b_tokens = tokens(b);

    let union = a_tokens.union(&b_tokens).count();
    if union == 0 {
        return 0.0;
    }
    a_tokens.intersection(&b_tokens).count() as f64 / union as f64
}

fn tokens(name: &str) -> HashSet<&str> {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect()
}
