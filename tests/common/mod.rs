// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::collections::HashSet;

use secret_santa::{Assignment, ForbiddenPairs, Partners};

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Panic unless `assignment` is a valid draw for the given inputs.
pub fn assert_valid_draw(
    assignment: &Assignment,
    people: &[String],
    partners: &Partners,
    forbidden: &ForbiddenPairs,
) {
    let domain: HashSet<&str> = people.iter().map(String::as_str).collect();
    let givers: Vec<&str> = assignment.iter().map(|(giver, _)| giver).collect();
    let receivers: Vec<&str> = assignment.iter().map(|(_, receiver)| receiver).collect();

    assert_eq!(givers.len(), people.len(), "every person gives");
    assert_eq!(givers.iter().copied().collect::<HashSet<_>>(), domain, "givers are the roster");
    assert_eq!(
        receivers.iter().copied().collect::<HashSet<_>>(),
        domain,
        "receivers are the roster"
    );
    assert_eq!(receivers.len(), domain.len(), "nobody receives twice");

    for (giver, receiver) in assignment.iter() {
        assert_ne!(giver, receiver, "{giver} draws themselves");
        assert_ne!(partners.partner_of(giver), Some(receiver), "{giver} draws their partner");
        assert!(!forbidden.contains(giver, receiver), "{giver} -> {receiver} is forbidden");
    }
}
