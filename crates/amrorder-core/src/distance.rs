//! Distance model — positional displacement of aligned tokens
//!
//! The cost of an ordered token list is how far each aligned token sits from
//! where its sentence position says it should sit. Two adjacent siblings are
//! swapped only when the swap *strictly* lowers the combined cost; ties keep
//! the original order, which is what makes the reorder deterministic.

use crate::align::AlignedToken;

/// Total displacement of a token list relative to sentence order
///
/// Unaligned tokens are dropped before scoring; positions are shifted so the
/// minimum becomes 0, then each token pays `|position - index|` within the
/// filtered list. A list with no aligned tokens costs 0.
pub fn displacement(tokens: &[AlignedToken]) -> i64 {
    let positions: Vec<i64> = tokens.iter().filter_map(|t| t.pos).collect();
    let min = match positions.iter().min() {
        Some(m) => *m,
        None => return 0,
    };
    positions
        .iter()
        .enumerate()
        .map(|(idx, pos)| ((pos - min) - idx as i64).abs())
        .sum()
}

/// Should adjacent siblings `a` and `b` trade places?
pub fn should_swap(a: &[AlignedToken], b: &[AlignedToken]) -> bool {
    let current: Vec<AlignedToken> = a.iter().chain(b.iter()).cloned().collect();
    let swapped: Vec<AlignedToken> = b.iter().chain(a.iter()).cloned().collect();
    displacement(&current) > displacement(&swapped)
}
