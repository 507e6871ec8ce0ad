// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Couples-aware Secret Santa draws.
//!
//! Everybody gives one present and receives one. Nobody draws themselves or
//! their partner, and pairs drawn in earlier years are not repeated.
//!
//! # Architecture
//!
//! The only component with real algorithmic content is the
//! [`engine`]: a randomized, retrying backtracking search for a constrained
//! derangement. It is a pure function of its inputs and an injected random
//! source; it never touches the disk or the network.
//!
//! Everything else is plumbing around it:
//!
//! - [`roster`] validates a TOML roster of couples and singles into the
//!   engine inputs (names, partner relation, address book)
//! - [`history`] is an append-only JSON Lines log of accepted draws, read
//!   back as the set of forbidden pairs
//! - [`notify`] composes one message per giver and sends them over SMTPS
//! - [`config`] reads the environment (and `.env`)
//!
//! # Data flow
//!
//! ```text
//! roster.toml ──► roster ──► people, partners ──┐
//!                                               ├──► engine ──► Assignment ──► history (append)
//! history.jsonl ──► history ──► forbidden ──────┘                    │
//!                                                                    └──► notify (with emails)
//! ```
//!
//! A search that runs out of attempts returns `None`. That is a normal
//! outcome: the caller should suggest more people, a different mix, or
//! ignoring the history.

pub mod config;
pub mod engine;
pub mod history;
pub mod model;
pub mod notify;
pub mod roster;

// Re-export commonly used types
pub use engine::{assign, AssignmentEngine, Statistics};
pub use history::HistoryStore;
pub use model::{AddressBook, Assignment, ForbiddenPairs, Partners};
pub use roster::{Participants, Roster};
