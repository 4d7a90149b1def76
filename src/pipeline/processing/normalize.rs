//! Canonicalization of free-text roster fields prior to comparison.
//!
//! Every string that participates in blocking or similarity scoring passes
//! through [`normalize`] exactly once at load time, so the comparison layers
//! never see raw casing, stray whitespace, or punctuation noise.

/// Canonicalize a free-text field for comparison.
///
/// Lower-cases, trims, collapses internal whitespace, and strips punctuation
/// except hyphens joining two word characters (so "smith-jones" survives but
/// a dangling "-" does not). Deterministic and idempotent; empty input yields
/// empty output.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let chars: Vec<char> = lowered.chars().collect();
    let mut cleaned = String::with_capacity(lowered.len());

    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() || c.is_whitespace() {
            cleaned.push(c);
        } else if c == '-' {
            // Keep hyphens only when they join two word characters
            let joins_words = i > 0
                && chars[i - 1].is_alphanumeric()
                && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
            if joins_words {
                cleaned.push('-');
            }
        }
    }

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
