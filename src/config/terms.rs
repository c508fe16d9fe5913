//! Terms configuration loading from config.toml
//!
//! The `[settings]` table tunes caching, IP capture and outgoing email. Each
//! `[[documents]]` entry describes a terms version that should exist in the
//! catalog; they are seeded on startup when missing.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Runtime settings
    #[serde(default)]
    pub settings: TermsSettings,
    /// Terms documents to seed
    #[serde(default)]
    pub documents: Vec<TermsDocumentConfig>,
}

/// Tunables for caching, IP capture and emailing terms
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TermsSettings {
    /// Lifetime of a cached not-agreed set, in seconds
    pub cache_seconds: u64,
    /// Whether the client address is stored with each acceptance
    pub store_ip_address: bool,
    /// Request header or meta key the host reads the client address from
    pub ip_header_name: String,
    /// Sender address for emailed terms
    pub default_from_email: String,
    /// Subject used when the caller does not supply one
    pub email_subject: String,
}

impl Default for TermsSettings {
    fn default() -> Self {
        Self {
            cache_seconds: 30,
            store_ip_address: true,
            ip_header_name: "REMOTE_ADDR".to_string(),
            default_from_email: "webmaster@localhost".to_string(),
            email_subject: "Terms".to_string(),
        }
    }
}

impl TermsSettings {
    /// Cache lifetime as a [`Duration`].
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_seconds)
    }
}

/// Configuration for a single terms version
#[derive(Debug, Deserialize, Clone)]
pub struct TermsDocumentConfig {
    /// Slug grouping the versions of this document
    pub slug: String,
    /// Human-readable name
    pub name: String,
    /// Version number, unique per slug
    pub version_number: f64,
    /// Full text
    #[serde(default)]
    pub text: Option<String>,
    /// Short summary
    #[serde(default)]
    pub info: Option<String>,
    /// RFC 3339 activation time; omit to leave the version unscheduled
    #[serde(default)]
    pub date_active: Option<DateTime<Utc>>,
}

/// Loads terms configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read (`Error::Io`)
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref())?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads terms configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_terms_config() {
        let toml_str = r#"
            [settings]
            cache_seconds = 60
            store_ip_address = false
            ip_header_name = "HTTP_X_FORWARDED_FOR"

            [[documents]]
            slug = "site-terms"
            name = "Site Terms"
            version_number = 1.0
            text = "Be nice."
            date_active = "2020-01-01T00:00:00Z"

            [[documents]]
            slug = "privacy"
            name = "Privacy Policy"
            version_number = 2.5
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.settings.cache_seconds, 60);
        assert!(!config.settings.store_ip_address);
        assert_eq!(config.settings.ip_header_name, "HTTP_X_FORWARDED_FOR");
        // Unset keys keep their defaults
        assert_eq!(config.settings.email_subject, "Terms");

        assert_eq!(config.documents.len(), 2);
        assert_eq!(config.documents[0].slug, "site-terms");
        assert_eq!(
            config.documents[0].date_active,
            Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(config.documents[1].version_number, 2.5);
        assert!(config.documents[1].date_active.is_none());
        assert!(config.documents[1].text.is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.settings.cache_seconds, 30);
        assert!(config.settings.store_ip_address);
        assert_eq!(config.settings.ip_header_name, "REMOTE_ADDR");
        assert_eq!(config.settings.cache_ttl(), Duration::from_secs(30));
        assert!(config.documents.is_empty());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("definitely/not/here/config.toml");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_load_config_reads_file_and_rejects_bad_toml() {
        let dir = std::env::temp_dir().join(format!("terms-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let good = dir.join("good.toml");
        std::fs::write(&good, "[settings]\ncache_seconds = 5\n").unwrap();
        assert_eq!(load_config(&good).unwrap().settings.cache_seconds, 5);

        let bad = dir.join("bad.toml");
        std::fs::write(&bad, "[settings\n").unwrap();
        assert!(matches!(load_config(&bad), Err(Error::Config { message: _ })));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
