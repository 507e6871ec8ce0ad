// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Telling every giver who they draw.
//!
//! Messages are composed here and handed to a [`Notifier`] as one batch.
//! Givers without an address are skipped without complaint; a roster may
//! legitimately mix mailed and unmailed participants.

pub mod smtp;

use thiserror::Error;
use tracing::info;

use crate::model::{AddressBook, Assignment};

pub use smtp::SmtpNotifier;

pub const SUBJECT: &str = "Secret Santa";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("missing SMTP settings: {}", .0.join(", "))]
    MissingSettings(Vec<&'static str>),

    #[error("invalid address \"{address}\": {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("could not build message for {giver}: {source}")]
    Message {
        giver: String,
        #[source]
        source: lettre::error::Error,
    },

    #[error("SMTP transport: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Where and as whom messages are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
    pub sender_name: Option<String>,
}

impl SmtpSettings {
    /// `Name <address>` when a display name is configured.
    pub fn from_header(&self) -> String {
        match &self.sender_name {
            Some(name) => format!("{} <{}>", name, self.sender),
            None => self.sender.clone(),
        }
    }
}

/// A ready-to-send message for one giver.
///
/// The sender is a property of the transport, not of the envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub giver: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers a batch of messages.
pub trait Notifier {
    fn send(&mut self, envelopes: &[Envelope]) -> Result<(), NotifyError>;
}

/// Upper-case the first letter, lower-case the rest.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn body(giver: &str, receiver: &str) -> String {
    format!(
        "Hey {},\n\n\
         Santa told me that this year you get to pick something nice for {}!\n\n\
         Be original, and keep it to yourself!\n\n\
         Cheers,\n\
         The Super Secret Santa Elf Committee",
        capitalize(giver),
        capitalize(receiver)
    )
}

/// One envelope per giver with an address, in assignment order.
pub fn compose(assignment: &Assignment, emails: &AddressBook) -> Vec<Envelope> {
    assignment
        .iter()
        .filter_map(|(giver, receiver)| {
            let to = emails.address_of(giver)?;
            Some(Envelope {
                giver: giver.to_string(),
                to: to.to_string(),
                subject: SUBJECT.to_string(),
                body: body(giver, receiver),
            })
        })
        .collect()
}

/// Compose and, unless `dry_run`, send the messages for a draw.
///
/// Returns the (giver, address) pairs that were sent, or would have been.
pub fn dispatch<N: Notifier + ?Sized>(
    assignment: &Assignment,
    emails: &AddressBook,
    notifier: &mut N,
    dry_run: bool,
) -> Result<Vec<(String, String)>, NotifyError> {
    let envelopes = compose(assignment, emails);
    let attempted = envelopes
        .iter()
        .map(|envelope| (envelope.giver.clone(), envelope.to.clone()))
        .collect();

    if dry_run {
        info!(messages = envelopes.len(), "dry run, nothing sent");
        return Ok(attempted);
    }
    notifier.send(&envelopes)?;
    info!(messages = envelopes.len(), "messages sent");
    Ok(attempted)
}
