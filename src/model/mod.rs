// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Plain data handed between the collector, the engine and its consumers.
//!
//! Participants are identified by their display name only. Names are
//! case-sensitive and compared exactly.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Symmetric partner relation.
///
/// A name that is absent from the relation is single.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partners {
    partner_of: HashMap<String, String>,
}

impl Partners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a raw name -> partner map.
    ///
    /// The map is taken as given. A one-sided entry is not repaired.
    pub fn from_map(partner_of: HashMap<String, String>) -> Self {
        Self { partner_of }
    }

    /// Record `a` and `b` as a couple, in both directions.
    pub fn couple(&mut self, a: impl Into<String>, b: impl Into<String>) {
        let (a, b) = (a.into(), b.into());
        self.partner_of.insert(a.clone(), b.clone());
        self.partner_of.insert(b, a);
    }

    pub fn partner_of(&self, name: &str) -> Option<&str> {
        self.partner_of.get(name).map(String::as_str)
    }

    /// True if `a` lists `b` as partner and `b` lists `a`.
    pub fn are_partners(&self, a: &str, b: &str) -> bool {
        self.partner_of(a) == Some(b) && self.partner_of(b) == Some(a)
    }

    pub fn is_empty(&self) -> bool {
        self.partner_of.is_empty()
    }
}

/// Ordered (giver, receiver) pairs that must not be drawn again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForbiddenPairs {
    by_giver: HashMap<String, HashSet<String>>,
}

impl ForbiddenPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, giver: impl Into<String>, receiver: impl Into<String>) -> bool {
        self.by_giver
            .entry(giver.into())
            .or_default()
            .insert(receiver.into())
    }

    pub fn contains(&self, giver: &str, receiver: &str) -> bool {
        self.by_giver
            .get(giver)
            .is_some_and(|receivers| receivers.contains(receiver))
    }

    /// Forbid every pair of a previous draw.
    pub fn extend_from(&mut self, assignment: &Assignment) {
        for (giver, receiver) in assignment.iter() {
            self.insert(giver, receiver);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_giver.iter().flat_map(|(giver, receivers)| {
            receivers
                .iter()
                .map(move |receiver| (giver.as_str(), receiver.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.by_giver.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<G: Into<String>, R: Into<String>> FromIterator<(G, R)> for ForbiddenPairs {
    fn from_iter<I: IntoIterator<Item = (G, R)>>(iter: I) -> Self {
        let mut pairs = ForbiddenPairs::new();
        for (giver, receiver) in iter {
            pairs.insert(giver, receiver);
        }
        pairs
    }
}

/// One giver -> receiver line of a draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub giver: String,
    pub receiver: String,
}

/// A complete draw: every participant gives to exactly one other.
///
/// Pairs are kept in the order participants were supplied. There is no
/// mutating API; an assignment is final once the engine returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pairs: Vec<Pair>,
}

impl Assignment {
    pub(crate) fn from_pairs(pairs: Vec<Pair>) -> Self {
        Self { pairs }
    }

    /// Who `giver` buys a present for.
    pub fn receiver_of(&self, giver: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|pair| pair.giver == giver)
            .map(|pair| pair.receiver.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|pair| (pair.giver.as_str(), pair.receiver.as_str()))
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Giver -> receiver as an owned map.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.pairs
            .iter()
            .map(|pair| (pair.giver.clone(), pair.receiver.clone()))
            .collect()
    }
}

/// Name -> e-mail address. May be empty when nobody entered an address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBook {
    addresses: HashMap<String, String>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, address: impl Into<String>) {
        self.addresses.insert(name.into(), address.into());
    }

    pub fn address_of(&self, name: &str) -> Option<&str> {
        self.addresses.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
