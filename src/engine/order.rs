// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Visiting order for the giver positions of one attempt.
//!
//! Givers with the fewest static candidates are placed first. Only the head
//! of that ordering is shuffled, so every attempt starts differently while
//! the tightly constrained tail keeps its position.

use rand::seq::SliceRandom;
use rand::Rng;

/// The shuffled head is `ceil(n / HEAD_SHUFFLE_DIVISOR)` givers long.
pub const HEAD_SHUFFLE_DIVISOR: usize = 3;

/// Length of the shuffled head for `n` givers, at least one.
pub fn head_len(n: usize) -> usize {
    n.div_ceil(HEAD_SHUFFLE_DIVISOR).max(1).min(n)
}

/// Giver indices sorted most-constrained-first, head shuffled.
///
/// `candidate_counts[g]` is the size of giver `g`'s static candidate set.
/// The sort is stable, so ties keep input order before the shuffle.
pub fn visiting_order<R: Rng + ?Sized>(candidate_counts: &[usize], rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..candidate_counts.len()).collect();
    order.sort_by_key(|&giver| candidate_counts[giver]);
    let head = head_len(order.len());
    order[..head].shuffle(rng);
    order
}
