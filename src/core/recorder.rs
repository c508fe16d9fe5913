//! Acceptance recording - Persists a batch of accepted terms for one user.
//!
//! Each submitted id is handled independently: unknown ids are skipped, ids the
//! user already accepted are reported as such, and only database failures abort
//! the batch. Once the batch is done the user's not-agreed cache entry is
//! invalidated and immediately recomputed so the next prompt check sees the new
//! acceptances without waiting for the entry to expire.

use crate::{
    config::terms::TermsSettings,
    core::{
        acceptance::{self, RecordOutcome},
        catalog,
        not_agreed::NotAgreedResolver,
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::hash::BuildHasher;
use tracing::{info, instrument, warn};

/// Per-id outcome of [`accept_all`], each list in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptanceResult {
    /// Ids newly recorded as accepted
    pub accepted: Vec<i64>,
    /// Ids the user had already accepted
    pub already_accepted: Vec<i64>,
    /// Ids that matched no terms version and were skipped
    pub not_found: Vec<i64>,
}

/// Extracts the address to record from a raw client-address value.
///
/// Forwarded-for style lists keep only their first entry. A missing value, or
/// `store_ip_address = false`, yields an empty string.
#[must_use]
pub fn client_ip(settings: &TermsSettings, raw_address: Option<&str>) -> String {
    if !settings.store_ip_address {
        return String::new();
    }
    raw_address
        .and_then(|raw| raw.split(',').next())
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

/// Looks up the client address under the configured `ip_header_name` in the
/// host's request metadata and extracts it with [`client_ip`].
#[must_use]
pub fn client_ip_from_meta<S: BuildHasher>(
    settings: &TermsSettings,
    meta: &HashMap<String, String, S>,
) -> String {
    client_ip(settings, meta.get(&settings.ip_header_name).map(String::as_str))
}

/// Records acceptance of every id in `terms_ids` for `user_id`.
///
/// # Errors
/// Returns an error if a database query fails. Unknown ids and repeat
/// acceptances are reported in the result, never as errors.
#[instrument(skip(db, resolver))]
pub async fn accept_all(
    db: &DatabaseConnection,
    resolver: &NotAgreedResolver,
    user_id: &str,
    terms_ids: &[i64],
    ip_address: &str,
) -> Result<AcceptanceResult> {
    let mut result = AcceptanceResult::default();

    for &terms_id in terms_ids {
        if catalog::get_by_id(db, terms_id).await?.is_none() {
            warn!("Skipping unknown terms id {} for '{}'", terms_id, user_id);
            result.not_found.push(terms_id);
            continue;
        }

        match acceptance::record(db, user_id, terms_id, ip_address).await? {
            RecordOutcome::Recorded => result.accepted.push(terms_id),
            RecordOutcome::AlreadyAccepted => result.already_accepted.push(terms_id),
        }
    }

    resolver.invalidate(user_id).await;
    // The entry was just dropped, so a failed recompute only costs a later miss
    if let Err(e) = resolver.refresh(db, user_id).await {
        warn!("Failed to refresh not-agreed terms for '{}': {}", user_id, e);
    }

    info!(
        "Acceptance batch for '{}': {} accepted, {} already accepted, {} not found",
        user_id,
        result.accepted.len(),
        result.already_accepted.len(),
        result.not_found.len()
    );
    Ok(result)
}
