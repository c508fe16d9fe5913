//! Unified error type for the terms tracker.

use thiserror::Error;

/// Errors produced by the catalog, acceptance ledger, caches and mailers.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Any failure reported by the database layer
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A slug, version or id did not resolve to a terms row
    #[error("Terms not found: {reference}")]
    TermsNotFound {
        /// The lookup that failed, e.g. `"site-terms"` or `"site-terms v2"`
        reference: String,
    },

    /// Administrator input for a new terms version was rejected
    #[error("Invalid terms: {message}")]
    InvalidTerms {
        /// Why the input was rejected
        message: String,
    },

    /// The cache backend could not serve the request
    #[error("Cache unavailable: {message}")]
    CacheUnavailable {
        /// Backend-specific detail
        message: String,
    },

    /// The destination address for emailed terms is not usable
    #[error("Invalid Email Address: {address}")]
    InvalidEmail {
        /// The rejected address
        address: String,
    },

    /// The mailer collaborator failed to deliver
    #[error("Notification failed: {message}")]
    NotificationFailed {
        /// Transport-specific detail
        message: String,
    },

    /// Filesystem failure while loading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
