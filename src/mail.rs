#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Delivery of rendered reports.

use std::time::Duration;

use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use secrecy::ExposeSecret;
use serde::Serialize;
use tabled::Tabled;
use thiserror::Error;

use crate::{credentials::Credential, grade::RenderedEmail};

/// Errors raised while sending.
#[derive(Debug, Error)]
pub enum MailError {
    /// An address could not be parsed.
    #[error("Invalid email address `{0}`.")]
    InvalidAddress(String),
    /// The message could not be assembled.
    #[error("Could not build the message: {0}")]
    Build(String),
    /// The SMTP session failed.
    #[error("SMTP error: {0}")]
    Smtp(String),
}

/// Sends one rendered report. Implementations make a single attempt.
pub trait Mailer {
    /// Delivers `email` to its recipient.
    fn send(&self, email: &RenderedEmail) -> Result<(), MailError>;
}

/// SMTP mailer over STARTTLS.
pub struct SmtpMailer {
    /// Authenticated transport.
    transport: SmtpTransport,
    /// Sender mailbox.
    from:      Mailbox,
}

impl SmtpMailer {
    /// Prepares a session for `credential` and checks that the server
    /// accepts the connection.
    pub fn connect(credential: &Credential, timeout: Duration) -> Result<Self, MailError> {
        let from: Mailbox = credential
            .address
            .parse()
            .map_err(|_| MailError::InvalidAddress(credential.address.clone()))?;

        let transport = SmtpTransport::starttls_relay(credential.provider.host())
            .map_err(|e| MailError::Smtp(e.to_string()))?
            .port(credential.provider.port())
            .timeout(Some(timeout))
            .credentials(Credentials::new(
                credential.address.clone(),
                credential.secret.expose_secret().to_owned(),
            ))
            .build();

        tracing::info!("Connecting to {}...", credential.provider);
        let reachable = transport
            .test_connection()
            .map_err(|e| MailError::Smtp(e.to_string()))?;
        if !reachable {
            return Err(MailError::Smtp(format!(
                "{} did not accept the connection",
                credential.provider
            )));
        }

        Ok(Self { transport, from })
    }
}

/// Builds a `multipart/alternative` message (plain text and HTML).
pub fn build_message(from: &Mailbox, email: &RenderedEmail) -> Result<Message, MailError> {
    let to = Mailbox::new(
        Some(email.recipient_name.clone()),
        email
            .recipient
            .parse()
            .map_err(|_| MailError::InvalidAddress(email.recipient.clone()))?,
    );

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject.clone())
        .multipart(MultiPart::alternative_plain_html(email.text.clone(), email.html.clone()))
        .map_err(|e| MailError::Build(e.to_string()))
}

impl Mailer for SmtpMailer {
    fn send(&self, email: &RenderedEmail) -> Result<(), MailError> {
        let message = build_message(&self.from, email)?;
        self.transport
            .send(&message)
            .map_err(|e| MailError::Smtp(e.to_string()))?;
        Ok(())
    }
}

/// One recipient that could not be reached.
#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize)]
pub struct DeliveryFailure {
    #[tabled(rename = "Student")]
    /// Recipient display name.
    pub name:      String,
    #[tabled(rename = "Email")]
    /// Recipient address.
    pub recipient: String,
    #[tabled(rename = "Error")]
    /// Error text.
    pub error:     String,
}

/// Outcome of sending a batch. Successes and failures are tallied
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DeliveryReport {
    /// Addresses that accepted the message, in send order.
    pub sent:   Vec<String>,
    /// Recipients that failed, in send order.
    pub failed: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    /// Number of messages delivered.
    pub fn sent_count(&self) -> usize {
        self.sent.len()
    }

    /// Number of messages that failed.
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Number of attempts made.
    pub fn attempted(&self) -> usize {
        self.sent_count() + self.failed_count()
    }
}

/// Sends each email once, in order. A failure is recorded and the next
/// email is still attempted.
pub fn deliver_all<'a, M, I>(mailer: &M, emails: I) -> DeliveryReport
where
    M: Mailer + ?Sized,
    I: IntoIterator<Item = &'a RenderedEmail>,
{
    let mut report = DeliveryReport::default();
    for email in emails {
        match mailer.send(email) {
            Ok(()) => {
                tracing::info!("[OK] Sent to {} ({})", email.recipient_name, email.recipient);
                report.sent.push(email.recipient.clone());
            }
            Err(e) => {
                tracing::warn!("[FAILED] Failed to send to {}: {e}", email.recipient_name);
                report.failed.push(DeliveryFailure {
                    name:      email.recipient_name.clone(),
                    recipient: email.recipient.clone(),
                    error:     e.to_string(),
                });
            }
        }
    }
    report
}
