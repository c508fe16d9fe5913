//! Emailing terms - Sends a plain-text copy of terms documents to an address.
//!
//! Delivery is delegated to a [`TermsMailer`] supplied by the host. A delivery
//! failure is reported as [`EmailOutcome::Failed`] so the caller can show a
//! message; it never touches acceptance state.

use crate::{
    config::terms::TermsSettings,
    entities::terms,
    errors::{Error, Result},
};
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

const DOCUMENT_SEPARATOR: &str = "\n----------------------------------------\n\n";

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermsEmail {
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

/// Delivers rendered terms emails.
#[async_trait]
pub trait TermsMailer: Send + Sync {
    /// Sends `email`, returning `Error::NotificationFailed` if delivery fails.
    async fn send(&self, email: &TermsEmail) -> Result<()>;
}

/// What happened to an emailed copy of the terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailOutcome {
    /// The mailer accepted the message
    Sent,
    /// The mailer reported a failure
    Failed {
        /// Mailer-provided detail, for logs rather than end users
        reason: String,
    },
}

impl EmailOutcome {
    /// Message suitable for showing to the person who requested the email.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Sent => "Terms and Conditions Sent.",
            Self::Failed { .. } => "An Error Occurred Sending Your Message.",
        }
    }
}

/// Loose syntactic check for a deliverable address: `local@domain.tld`, no spaces.
#[must_use]
pub fn is_valid_email(address: &str) -> bool {
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !address.chars().any(char::is_whitespace)
}

/// Renders `terms` as a plain-text body, one block per document.
#[must_use]
pub fn render_terms_email(terms: &[terms::Model]) -> String {
    let mut body = String::new();
    for (index, document) in terms.iter().enumerate() {
        if index > 0 {
            body.push_str(DOCUMENT_SEPARATOR);
        }
        body.push_str(&format!(
            "{}\nVersion {}\n",
            document.name, document.version_number
        ));
        if let Some(date_active) = document.date_active {
            body.push_str(&format!("Effective {}\n", date_active.format("%Y-%m-%d")));
        }
        if let Some(info) = document.info.as_deref().filter(|info| !info.is_empty()) {
            body.push_str(&format!("\n{info}\n"));
        }
        if let Some(text) = document.text.as_deref() {
            body.push_str(&format!("\n{text}\n"));
        }
    }
    body
}

/// Emails `terms` to `address` through `mailer`.
///
/// `subject` falls back to the configured default.
///
/// # Errors
/// Returns `Error::InvalidEmail` if `address` is not a plausible email address.
/// Delivery failures are reported through [`EmailOutcome::Failed`] instead.
#[instrument(skip(mailer, settings, terms))]
pub async fn email_terms(
    mailer: &dyn TermsMailer,
    settings: &TermsSettings,
    terms: &[terms::Model],
    address: &str,
    subject: Option<&str>,
) -> Result<EmailOutcome> {
    let address = address.trim();
    if !is_valid_email(address) {
        debug!("Rejected email terms request for '{}'", address);
        return Err(Error::InvalidEmail {
            address: address.to_string(),
        });
    }

    let email = TermsEmail {
        from: settings.default_from_email.clone(),
        to: address.to_string(),
        subject: subject
            .filter(|subject| !subject.trim().is_empty())
            .unwrap_or(&settings.email_subject)
            .to_string(),
        body: render_terms_email(terms),
    };
    debug!("Email terms body:\n{}", email.body);

    match mailer.send(&email).await {
        Ok(()) => {
            info!("Sent {} terms document(s) to {}", terms.len(), email.to);
            Ok(EmailOutcome::Sent)
        }
        Err(e) => {
            warn!("Failed to send terms to {}: {}", email.to, e);
            Ok(EmailOutcome::Failed {
                reason: e.to_string(),
            })
        }
    }
}
