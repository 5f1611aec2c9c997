//! Partial-ratio string similarity.
//!
//! Scores are percentages in `[0, 100]` based on the indel distance
//! (insertions and deletions only). The partial ratio aligns the shorter
//! string against every window of the longer one, including windows that
//! hang off either end, and keeps the best score.

use rapidfuzz::distance::indel;

/// Minimum partial ratio for a fuzzy name match.
pub const FUZZY_MATCH_THRESHOLD: f64 = 80.0;

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    let distance = indel::distance(a.iter().copied(), b.iter().copied());
    100.0 * (total - distance) as f64 / total as f64
}

/// Normalized indel similarity of two strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best [`ratio`] of the shorter string against any window of the longer.
///
/// Strings of equal length are aligned both ways and the higher score wins,
/// so the result does not depend on argument order.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len() == b.len() {
        return best_window(&a, &b).max(best_window(&b, &a));
    }
    if a.len() < b.len() {
        best_window(&a, &b)
    } else {
        best_window(&b, &a)
    }
}

/// Align `needle` against every window of `haystack`, which is at least as long.
fn best_window(needle: &[char], haystack: &[char]) -> f64 {
    if needle.is_empty() {
        return if haystack.is_empty() { 100.0 } else { 0.0 };
    }

    let m = needle.len();
    let n = haystack.len();
    let mut best: f64 = 0.0;

    // Windows overlapping the start of the haystack.
    for end in 1..m {
        best = best.max(ratio_chars(needle, &haystack[..end]));
    }
    for start in 0..=(n - m) {
        best = best.max(ratio_chars(needle, &haystack[start..start + m]));
        if best >= 100.0 {
            return 100.0;
        }
    }
    // Windows overlapping the end.
    for start in (n - m + 1)..n {
        best = best.max(ratio_chars(needle, &haystack[start..]));
    }

    best
}

/// Case-insensitive fuzzy match of a search term against a file name.
pub fn fuzzy_matches(term: &str, name: &str, threshold: f64) -> bool {
    partial_ratio(&term.to_lowercase(), &name.to_lowercase()) >= threshold
}
