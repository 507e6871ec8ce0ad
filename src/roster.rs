// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Participant collection.
//!
//! Reads a TOML roster of couples and singles and turns it into the plain
//! inputs of the engine: an ordered name list, the partner relation and an
//! address book.
//!
//! ```toml
//! [[couples]]
//! first = { name = "Alice", email = "alice@example.com" }
//! second = { name = "Bob", email = "bob@example.com" }
//!
//! [[singles]]
//! name = "Carol"
//! email = "carol@example.com"
//! ```
//!
//! E-mail addresses are all-or-nothing: a roster without any address is
//! accepted and simply cannot be mailed, but once one address is entered
//! every participant needs a valid one.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::model::{AddressBook, Partners};

/// Pragmatic address pattern, not RFC 5322.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// Reasons a roster cannot be turned into a draw.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("could not read roster {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse roster: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("complete all names of couples (no empty fields)")]
    EmptyCoupleName,

    #[error("the two members of a couple must have different names, got \"{0}\" twice")]
    SameCoupleNames(String),

    #[error("complete all names of singles (no empty fields)")]
    EmptySingleName,

    #[error("use a valid email address for \"{0}\" (or leave all emails blank)")]
    InvalidEmail(String),

    #[error("each name must be unique, duplicates found: {}", .0.join(", "))]
    DuplicateNames(Vec<String>),

    #[error("at least 2 people are required, got {0}")]
    TooFewPeople(usize),
}

/// One name field with an optional address, as typed.
///
/// A missing name reads as empty so validation, not parsing, reports it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Entry {
    fn name(&self) -> &str {
        self.name.trim()
    }

    fn email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Couple {
    #[serde(default)]
    pub first: Entry,
    #[serde(default)]
    pub second: Entry,
}

/// Raw roster as read from disk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub couples: Vec<Couple>,
    #[serde(default)]
    pub singles: Vec<Entry>,
}

/// Validated engine inputs plus the address book.
#[derive(Debug, Clone)]
pub struct Participants {
    /// Couples first, then singles, in roster order.
    pub people: Vec<String>,
    pub partners: Partners,
    /// Empty when no address was entered.
    pub emails: AddressBook,
}

impl Roster {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RosterError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, RosterError> {
        Ok(toml::from_str(text)?)
    }

    fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.couples
            .iter()
            .flat_map(|couple| [&couple.first, &couple.second])
            .chain(self.singles.iter())
    }

    /// Validate the roster and produce the engine inputs.
    pub fn collect(&self) -> Result<Participants, RosterError> {
        let with_email = self.entries().any(|entry| entry.email().is_some());

        let mut people = Vec::new();
        let mut partners = Partners::new();
        let mut emails = AddressBook::new();

        for couple in &self.couples {
            let (a, b) = (couple.first.name(), couple.second.name());
            if a.is_empty() || b.is_empty() {
                return Err(RosterError::EmptyCoupleName);
            }
            if a == b {
                return Err(RosterError::SameCoupleNames(a.to_string()));
            }
            if with_email {
                for entry in [&couple.first, &couple.second] {
                    emails.insert(entry.name(), checked_email(entry)?);
                }
            }
            people.push(a.to_string());
            people.push(b.to_string());
            partners.couple(a, b);
        }

        for single in &self.singles {
            let name = single.name();
            if name.is_empty() {
                return Err(RosterError::EmptySingleName);
            }
            if with_email {
                emails.insert(name, checked_email(single)?);
            }
            people.push(name.to_string());
        }

        let mut seen = HashSet::new();
        let mut duplicates: Vec<String> = people
            .iter()
            .filter(|name| !seen.insert(name.as_str()))
            .cloned()
            .collect();
        if !duplicates.is_empty() {
            duplicates.sort();
            duplicates.dedup();
            return Err(RosterError::DuplicateNames(duplicates));
        }
        if people.len() < 2 {
            return Err(RosterError::TooFewPeople(people.len()));
        }

        Ok(Participants {
            people,
            partners,
            emails,
        })
    }
}

fn checked_email(entry: &Entry) -> Result<&str, RosterError> {
    entry
        .email()
        .filter(|email| EMAIL_RE.is_match(email))
        .ok_or_else(|| RosterError::InvalidEmail(entry.name().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str) -> Result<Participants, RosterError> {
        Roster::from_toml_str(text)?.collect()
    }

    #[test]
    fn test_couples_then_singles() {
        let participants = collect(
            r#"
            [[couples]]
            first = { name = " Alice ", email = "alice@example.com" }
            second = { name = "Bob", email = " bob@example.com " }

            [[singles]]
            name = "Carol"
            email = "carol@example.org"
            "#,
        )
        .unwrap();
        assert_eq!(participants.people, vec!["Alice", "Bob", "Carol"]);
        assert!(participants.partners.are_partners("Alice", "Bob"));
        assert_eq!(participants.partners.partner_of("Carol"), None);
        assert_eq!(participants.emails.address_of("Bob"), Some("bob@example.com"));
        assert_eq!(participants.emails.len(), 3);
    }

    #[test]
    fn test_no_emails_at_all_is_fine() {
        let participants = collect(
            r#"
            [[singles]]
            name = "A"
            [[singles]]
            name = "B"
            email = "   "
            "#,
        )
        .unwrap();
        assert!(participants.emails.is_empty());
        assert_eq!(participants.people.len(), 2);
    }

    #[test]
    fn test_one_email_requires_all() {
        let err = collect(
            r#"
            [[singles]]
            name = "A"
            email = "a@example.com"
            [[singles]]
            name = "B"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, RosterError::InvalidEmail(name) if name == "B"));
    }

    #[test]
    fn test_malformed_email_rejected() {
        let err = collect(
            r#"
            [[couples]]
            first = { name = "A", email = "a@example" }
            second = { name = "B", email = "b@example.com" }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, RosterError::InvalidEmail(name) if name == "A"));
    }

    #[test]
    fn test_empty_names() {
        let err = collect(
            r#"
            [[couples]]
            first = { name = "A" }
            second = { name = "  " }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, RosterError::EmptyCoupleName));

        let err = collect("[[singles]]\nname = \"\"\n[[singles]]\nname = \"B\"\n").unwrap_err();
        assert!(matches!(err, RosterError::EmptySingleName));
    }

    #[test]
    fn test_missing_names() {
        let err = collect("[[singles]]\nemail = \"a@example.com\"\n").unwrap_err();
        assert!(matches!(err, RosterError::EmptySingleName));

        let err = collect(
            r#"
            [[couples]]
            first = { name = "A" }
            second = { email = "b@example.com" }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, RosterError::EmptyCoupleName));

        let err = collect("[[couples]]\nfirst = { name = \"A\" }\n").unwrap_err();
        assert!(matches!(err, RosterError::EmptyCoupleName));
    }

    #[test]
    fn test_couple_with_same_name() {
        let err = collect(
            r#"
            [[couples]]
            first = { name = "Sam" }
            second = { name = "Sam" }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, RosterError::SameCoupleNames(name) if name == "Sam"));
    }

    #[test]
    fn test_duplicates_across_roster() {
        let err = collect(
            r#"
            [[couples]]
            first = { name = "Sam" }
            second = { name = "Kim" }
            [[singles]]
            name = "Kim"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, RosterError::DuplicateNames(names) if names == vec!["Kim"]));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let participants = collect("[[singles]]\nname = \"kim\"\n[[singles]]\nname = \"Kim\"\n").unwrap();
        assert_eq!(participants.people, vec!["kim", "Kim"]);
    }

    #[test]
    fn test_too_few_people() {
        let err = collect("[[singles]]\nname = \"Solo\"\n").unwrap_err();
        assert!(matches!(err, RosterError::TooFewPeople(1)));
        let err = collect("").unwrap_err();
        assert!(matches!(err, RosterError::TooFewPeople(0)));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(collect("[[singles]]\nname = 3\n"), Err(RosterError::Parse(_))));
    }
}
