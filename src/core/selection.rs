//! Terms selection - Picks which terms to show from optional slug and version
//! parameters supplied by the caller.

use crate::{
    core::{catalog, not_agreed::NotAgreedResolver},
    entities::terms,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing::instrument;

/// Resolves the terms a caller asked for.
///
/// - slug and version: that exact version, active or not
/// - slug only: the active version of the slug
/// - neither: the caller's not-agreed set
///
/// A version given without a slug is ignored.
///
/// # Errors
/// Returns `Error::TermsNotFound` when a slug or slug/version pair does not resolve.
#[instrument(skip(db, resolver))]
pub async fn select_terms(
    db: &DatabaseConnection,
    resolver: &NotAgreedResolver,
    user_id: Option<&str>,
    slug: Option<&str>,
    version_number: Option<f64>,
) -> Result<Vec<terms::Model>> {
    match (slug, version_number) {
        (Some(slug), Some(version_number)) => {
            Ok(vec![catalog::get_by_slug_and_version(db, slug, version_number).await?])
        }
        (Some(slug), None) => Ok(vec![catalog::get_active(db, slug).await?]),
        (None, _) => resolver.resolve_cached(db, user_id).await,
    }
}
