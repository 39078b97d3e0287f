//! Email alerts for high-confidence fake news detections.
//!
//! Delivery problems never reach the caller as errors: [`AlertNotifier::notify`]
//! logs them and reports an [`AlertOutcome`] so the check that triggered the
//! alert carries on regardless.

use crate::config::AlertSettings;
use crate::models::{Label, Prediction};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt;
use thiserror::Error;
use tracing::{info, instrument, warn};

pub const ALERT_SUBJECT: &str = "High Confidence Fake News Alert";

/// Alerts fire strictly above this confidence percentage.
pub const ALERT_THRESHOLD: f64 = 90.0;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build email: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Whether a prediction is worth waking someone up for.
pub fn should_alert(prediction: &Prediction) -> bool {
    prediction.label == Label::Fake && prediction.confidence > ALERT_THRESHOLD
}

/// Plain-text alert body for a flagged text.
pub fn compose_alert(text: &str, confidence: f64) -> String {
    format!("⚠️ Fake News Detected!\n\nText: {text}\nConfidence: {confidence:.2}%")
}

/// Something that can deliver an alert message.
pub trait AlertTransport {
    async fn deliver(&self, subject: &str, body: &str) -> Result<(), AlertError>;
}

/// SMTP over implicit TLS, authenticated as the sender.
pub struct SmtpAlertTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl fmt::Debug for SmtpAlertTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpAlertTransport")
            .field("from", &self.from.to_string())
            .field("to", &self.to.to_string())
            .finish()
    }
}

impl SmtpAlertTransport {
    /// Validate addresses and set up the transport. Nothing is sent yet.
    pub fn from_settings(settings: &AlertSettings) -> Result<Self, AlertError> {
        let from: Mailbox = settings.sender.parse()?;
        let to: Mailbox = settings.receiver.parse()?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)?
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.sender.clone(),
                settings.password.clone(),
            ))
            .build();
        Ok(Self { mailer, from, to })
    }
}

impl AlertTransport for SmtpAlertTransport {
    #[instrument(level = "info", skip_all, fields(to = %self.to))]
    async fn deliver(&self, subject: &str, body: &str) -> Result<(), AlertError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        self.mailer.send(email).await?;
        Ok(())
    }
}

/// What happened to an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertOutcome {
    Sent,
    /// Delivery failed; the reason is shown to the user as a warning.
    Failed(String),
    /// No alert credentials are configured.
    Disabled,
}

/// Fire-and-report wrapper around an optional [`AlertTransport`].
#[derive(Debug)]
pub struct AlertNotifier<T> {
    transport: Option<T>,
}

impl<T: AlertTransport> AlertNotifier<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    pub fn disabled() -> Self {
        Self { transport: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Try to send `message`. Never fails; see [`AlertOutcome`].
    pub async fn notify(&self, message: &str) -> AlertOutcome {
        let Some(transport) = &self.transport else {
            info!("Alert skipped, no alert recipient configured");
            return AlertOutcome::Disabled;
        };
        match transport.deliver(ALERT_SUBJECT, message).await {
            Ok(()) => {
                info!("Fake news alert sent");
                AlertOutcome::Sent
            }
            Err(e) => {
                warn!(error = %e, "Email alert failed");
                AlertOutcome::Failed(e.to_string())
            }
        }
    }
}
