// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Randomized backtracking search for a Secret Santa draw.
//!
//! The engine looks for a derangement of the participants in which nobody
//! gives to their partner and no giver/receiver pair repeats a forbidden one.
//!
//! # Architecture
//!
//! Construction precomputes everything that does not change between
//! attempts:
//! - Each giver's static candidates: everyone but themselves and their partner
//! - The forbidden pairs, resolved to participant indices
//!
//! Each attempt then:
//! 1. Builds a most-constrained-first visiting order with a shuffled head
//!    (see [`order`])
//! 2. Runs a depth-first search over that order using an explicit stack of
//!    frames, one per placed giver
//! 3. Returns the first complete assignment, or reports exhaustion
//!
//! An exhausted attempt is retried from scratch with a new order, up to the
//! retry budget. Running out of budget means "none found", not "none exists".
//!
//! # Example
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use secret_santa::engine::assign;
//! use secret_santa::model::{ForbiddenPairs, Partners};
//!
//! let people = vec!["Alice".to_string(), "Bob".to_string()];
//! let mut rng = StdRng::seed_from_u64(7);
//! let assignment = assign(&people, &Partners::new(), &ForbiddenPairs::new(), 200, &mut rng)
//!     .expect("two singles always have a draw");
//! assert_eq!(assignment.receiver_of("Alice"), Some("Bob"));
//! assert_eq!(assignment.receiver_of("Bob"), Some("Alice"));
//! ```

pub mod order;

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::model::{Assignment, ForbiddenPairs, Pair, Partners};

/// Retry budget used when the caller has no opinion.
pub const DEFAULT_MAX_TRIES: usize = 200;

/// One placed giver on the search stack.
#[derive(Debug)]
struct Frame {
    /// Position in the visiting order.
    position: usize,

    /// Receivers still to try, already shuffled and filtered.
    choices: Vec<usize>,

    /// Next entry of `choices` to try.
    next_choice: usize,

    /// Receiver currently held by this frame, released on retry.
    current: Option<usize>,
}

/// Counters describing the work done by the last search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Attempts started, at most the retry budget.
    pub attempts: u64,

    /// Tentative giver -> receiver placements.
    pub placements: u64,

    /// Frames abandoned after running out of receivers.
    pub backtracks: u64,
}

/// Search engine for one roster.
///
/// Holds the precomputed candidate and forbidden tables. The same engine can
/// be searched repeatedly; each search owns fresh state.
#[derive(Debug)]
pub struct AssignmentEngine<'a> {
    people: &'a [String],

    /// Static candidates per giver index.
    candidates: Vec<Vec<usize>>,

    /// Forbidden (giver, receiver) index pairs.
    forbidden: HashSet<(usize, usize)>,

    /// The roster is two partners: nothing to search.
    impossible: bool,

    max_tries: usize,

    statistics: Statistics,
}

impl<'a> AssignmentEngine<'a> {
    /// Precompute the search tables for `people`.
    ///
    /// Names in `forbidden` that are not in `people` are ignored. `people`
    /// must not contain duplicates.
    pub fn new(
        people: &'a [String],
        partners: &Partners,
        forbidden: &ForbiddenPairs,
        max_tries: usize,
    ) -> Self {
        let index: HashMap<&str, usize> = people
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let candidates: Vec<Vec<usize>> = people
            .iter()
            .enumerate()
            .map(|(giver, name)| {
                let partner = partners.partner_of(name).and_then(|p| index.get(p).copied());
                (0..people.len())
                    .filter(|&receiver| receiver != giver && Some(receiver) != partner)
                    .collect()
            })
            .collect();

        let forbidden: HashSet<(usize, usize)> = forbidden
            .iter()
            .filter_map(|(giver, receiver)| Some((*index.get(giver)?, *index.get(receiver)?)))
            .collect();

        let impossible = people.len() == 2 && partners.are_partners(&people[0], &people[1]);

        Self {
            people,
            candidates,
            forbidden,
            impossible,
            max_tries,
            statistics: Statistics::default(),
        }
    }

    /// Search for a draw, trying at most `max_tries` fresh attempts.
    ///
    /// Returns `None` when no attempt completed. Statistics are reset at the
    /// start of every search.
    pub fn search<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Assignment> {
        self.statistics = Statistics::default();

        if self.people.len() < 2 {
            debug!(people = self.people.len(), "too few people to draw");
            return None;
        }
        if self.impossible {
            debug!("the only two people are partners");
            return None;
        }

        let counts: Vec<usize> = self.candidates.iter().map(Vec::len).collect();
        for attempt in 0..self.max_tries {
            self.statistics.attempts += 1;
            let visiting = order::visiting_order(&counts, rng);
            if let Some(receiver_of) = self.attempt(&visiting, rng) {
                info!(
                    attempts = self.statistics.attempts,
                    placements = self.statistics.placements,
                    backtracks = self.statistics.backtracks,
                    "draw found"
                );
                return Some(self.build(&receiver_of));
            }
            debug!(attempt, "attempt exhausted");
        }

        warn!(
            max_tries = self.max_tries,
            placements = self.statistics.placements,
            "no draw found within the retry budget"
        );
        None
    }

    /// One exhaustive depth-first pass over a fixed visiting order.
    ///
    /// Returns receiver indices by giver index on success.
    fn attempt<R: Rng + ?Sized>(&mut self, visiting: &[usize], rng: &mut R) -> Option<Vec<usize>> {
        let n = visiting.len();
        let mut taken = vec![false; n];
        let mut stack: Vec<Frame> = Vec::with_capacity(n);
        stack.push(self.open_frame(0, visiting, &taken, rng));

        loop {
            let Some(frame) = stack.last_mut() else {
                return None; // Backtracked past the first giver.
            };

            if let Some(previous) = frame.current.take() {
                taken[previous] = false;
            }

            if frame.next_choice >= frame.choices.len() {
                stack.pop();
                self.statistics.backtracks += 1;
                continue;
            }

            let receiver = frame.choices[frame.next_choice];
            frame.next_choice += 1;
            frame.current = Some(receiver);
            taken[receiver] = true;
            self.statistics.placements += 1;

            let position = frame.position + 1;
            if position == n {
                let mut receiver_of = vec![0; n];
                for frame in &stack {
                    if let Some(receiver) = frame.current {
                        receiver_of[visiting[frame.position]] = receiver;
                    }
                }
                return Some(receiver_of);
            }
            let next = self.open_frame(position, visiting, &taken, rng);
            stack.push(next);
        }
    }

    /// Frame for the giver at `position`: free, allowed receivers in random order.
    ///
    /// Receivers freed later by backtracking belong to deeper frames, so the
    /// set taken at open time stays valid for the life of the frame.
    fn open_frame<R: Rng + ?Sized>(
        &self,
        position: usize,
        visiting: &[usize],
        taken: &[bool],
        rng: &mut R,
    ) -> Frame {
        let giver = visiting[position];
        let mut choices: Vec<usize> = self.candidates[giver]
            .iter()
            .copied()
            .filter(|&receiver| !taken[receiver])
            .collect();
        choices.shuffle(rng);
        choices.retain(|&receiver| !self.forbidden.contains(&(giver, receiver)));
        Frame {
            position,
            choices,
            next_choice: 0,
            current: None,
        }
    }

    fn build(&self, receiver_of: &[usize]) -> Assignment {
        let pairs = self
            .people
            .iter()
            .zip(receiver_of)
            .map(|(giver, &receiver)| Pair {
                giver: giver.clone(),
                receiver: self.people[receiver].clone(),
            })
            .collect();
        Assignment::from_pairs(pairs)
    }

    /// Work done by the last search.
    pub fn statistics(&self) -> Statistics {
        self.statistics
    }
}

/// Draw a Secret Santa assignment.
///
/// Convenience wrapper around [`AssignmentEngine`]. Returns `None` if no
/// valid draw was found within `max_tries` attempts, or immediately when the
/// only two people are partners.
pub fn assign<R: Rng + ?Sized>(
    people: &[String],
    partners: &Partners,
    forbidden: &ForbiddenPairs,
    max_tries: usize,
    rng: &mut R,
) -> Option<Assignment> {
    AssignmentEngine::new(people, partners, forbidden, max_tries).search(rng)
}
