// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! SMTP delivery over an implicitly encrypted submission connection.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use tracing::debug;

use super::{Envelope, Notifier, NotifyError, SmtpSettings};

fn parse_address(address: &str) -> Result<Address, NotifyError> {
    address.parse().map_err(|source| NotifyError::Address {
        address: address.to_string(),
        source,
    })
}

/// Sends each envelope as its own message over one SMTPS session.
pub struct SmtpNotifier {
    sender: Mailbox,
    transport: SmtpTransport,
}

impl SmtpNotifier {
    /// Prepare a transport for `settings`. No connection is made yet.
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotifyError> {
        let sender = Mailbox::new(settings.sender_name.clone(), parse_address(&settings.sender)?);
        let transport = SmtpTransport::relay(&settings.host)?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();
        Ok(Self { sender, transport })
    }

    fn message(&self, envelope: &Envelope) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.sender.clone())
            .to(Mailbox::new(None, parse_address(&envelope.to)?))
            .subject(envelope.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(envelope.body.clone())
            .map_err(|source| NotifyError::Message {
                giver: envelope.giver.clone(),
                source,
            })
    }
}

impl Notifier for SmtpNotifier {
    fn send(&mut self, envelopes: &[Envelope]) -> Result<(), NotifyError> {
        // Build everything first so a bad address sends nothing.
        let messages = envelopes
            .iter()
            .map(|envelope| self.message(envelope))
            .collect::<Result<Vec<_>, _>>()?;

        for (envelope, message) in envelopes.iter().zip(&messages) {
            self.transport.send(message)?;
            debug!(giver = %envelope.giver, "message sent");
        }
        Ok(())
    }
}
