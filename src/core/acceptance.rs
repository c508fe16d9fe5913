//! Acceptance ledger - Records which user accepted which terms version.
//!
//! A user accepts a given version at most once. The unique index on
//! `(user_id, terms_id)` arbitrates duplicate and concurrent submissions: the
//! insert uses `ON CONFLICT DO NOTHING` and a zero row count is reported as
//! [`RecordOutcome::AlreadyAccepted`] rather than as an error.

use crate::{
    core::catalog,
    entities::{UserTerms, user_terms},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Outcome of recording one acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new acceptance row was written
    Recorded,
    /// The user had already accepted this version; nothing was written
    AlreadyAccepted,
}

/// Whether `user_id` has accepted the terms version `terms_id`.
pub async fn has_accepted(db: &DatabaseConnection, user_id: &str, terms_id: i64) -> Result<bool> {
    let acceptance = UserTerms::find()
        .filter(user_terms::Column::UserId.eq(user_id))
        .filter(user_terms::Column::TermsId.eq(terms_id))
        .one(db)
        .await?;
    Ok(acceptance.is_some())
}

/// Records that `user_id` accepted `terms_id` from `ip_address`.
///
/// An empty `ip_address` is stored as `NULL`. The caller is expected to have
/// checked that the terms version exists.
///
/// # Errors
/// Returns an error only if the database rejects the insert for a reason other
/// than the acceptance already existing.
#[instrument(skip(db))]
pub async fn record(
    db: &DatabaseConnection,
    user_id: &str,
    terms_id: i64,
    ip_address: &str,
) -> Result<RecordOutcome> {
    let acceptance = user_terms::ActiveModel {
        user_id: Set(user_id.to_string()),
        terms_id: Set(terms_id),
        ip_address: Set((!ip_address.is_empty()).then(|| ip_address.to_string())),
        date_accepted: Set(Utc::now()),
        ..Default::default()
    };

    let rows_inserted = UserTerms::insert(acceptance)
        .on_conflict(
            OnConflict::columns([user_terms::Column::UserId, user_terms::Column::TermsId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    if rows_inserted == 0 {
        debug!("User '{}' had already accepted terms {}", user_id, terms_id);
        Ok(RecordOutcome::AlreadyAccepted)
    } else {
        info!("User '{}' accepted terms {}", user_id, terms_id);
        Ok(RecordOutcome::Recorded)
    }
}

/// Ids of every terms version `user_id` has accepted.
pub async fn get_accepted_terms_ids(db: &DatabaseConnection, user_id: &str) -> Result<HashSet<i64>> {
    let accepted = UserTerms::find()
        .filter(user_terms::Column::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|acceptance| acceptance.terms_id)
        .collect();
    Ok(accepted)
}

/// Whether `user_id` has accepted the currently active version of `slug`.
///
/// A slug with no active version has nothing to accept, so this returns `false`.
pub async fn has_accepted_latest(db: &DatabaseConnection, user_id: &str, slug: &str) -> Result<bool> {
    match catalog::get_active(db, slug).await {
        Ok(active) => has_accepted(db, user_id, active.id).await,
        Err(Error::TermsNotFound { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}
