//! Fuzzy name scoring between normalized full names.
//!
//! The default scorer is a token-set ratio: both names are tokenized into
//! word sets and the sorted intersection is compared against each side's
//! intersection-plus-remainder string. This tolerates word reordering and
//! token-subset relationships, so "dave shah" scores high against
//! "david h shah" even though the raw strings diverge.

use std::collections::BTreeSet;

/// Pluggable similarity capability over normalized name strings.
///
/// Implementations must be symmetric and return 100 for identical inputs.
/// Scores are integers in [0, 100].
pub trait Similarity {
    fn score(&self, a: &str, b: &str) -> u8;
}

/// Default token-set scorer.
#[derive(Debug, Clone, Default)]
pub struct TokenSetSimilarity;

impl TokenSetSimilarity {
    pub fn new() -> Self {
        Self
    }
}

impl Similarity for TokenSetSimilarity {
    fn score(&self, a: &str, b: &str) -> u8 {
        token_set_ratio(a, b)
    }
}

/// Levenshtein similarity ratio in [0.0, 1.0] over character counts.
fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let distance = strsim::levenshtein(a, b) as f64;
    let length_sum = (a.chars().count() + b.chars().count()) as f64;
    (length_sum - distance) / length_sum
}

/// Token-set ratio in [0, 100].
///
/// Builds three comparison strings from the sorted token intersection and
/// each side's leftover tokens, and returns the best pairwise ratio among
/// them. Identical inputs short-cut to 100 before any float math.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    if a == b {
        return 100;
    }

    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    // A tokenless side shares nothing with the other; without this guard
    // the empty intersection would compare "" against "" and score 100
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    // BTreeSet iteration is already sorted, so the joined strings are the
    // sorted-intersection-padded forms
    let base = intersection.join(" ");
    let padded_a = join_nonempty(&base, &only_a.join(" "));
    let padded_b = join_nonempty(&base, &only_b.join(" "));

    let best = ratio(&base, &padded_a)
        .max(ratio(&base, &padded_b))
        .max(ratio(&padded_a, &padded_b));

    (best * 100.0).round() as u8
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (_, true) => head.to_string(),
        (true, false) => tail.to_string(),
        (false, false) => format!("{head} {tail}"),
    }
}
