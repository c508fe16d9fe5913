//! Terms catalog - Handles versioned terms documents and active-version resolution.
//!
//! A slug groups every version of one document. The active version of a slug is the
//! one with the latest `date_active` that is not in the future; versions with no
//! `date_active` are never active. Activation is resolved in Rust rather than in SQL
//! so the same rule applies to every backend regardless of how it stores timestamps.

use crate::{
    config::terms::TermsDocumentConfig,
    entities::{Terms, terms},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Administrator input for a new terms version.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTerms {
    /// Slug grouping the versions of this document
    pub slug: String,
    /// Human-readable name
    pub name: String,
    /// Version number, unique per slug
    pub version_number: f64,
    /// Full text
    pub text: Option<String>,
    /// Short summary
    pub info: Option<String>,
    /// Activation time; `None` leaves the version unscheduled
    pub date_active: Option<DateTimeUtc>,
}

impl From<&TermsDocumentConfig> for NewTerms {
    fn from(document: &TermsDocumentConfig) -> Self {
        Self {
            slug: document.slug.clone(),
            name: document.name.clone(),
            version_number: document.version_number,
            text: document.text.clone(),
            info: document.info.clone(),
            date_active: document.date_active,
        }
    }
}

/// Picks the active version of every slug present in `versions`, as of `now`.
///
/// The result is ordered by slug ascending. Ties on `date_active` go to the
/// higher id, i.e. the row created last.
pub fn active_versions_as_of<I>(versions: I, now: DateTimeUtc) -> Vec<terms::Model>
where
    I: IntoIterator<Item = terms::Model>,
{
    let mut active: BTreeMap<String, terms::Model> = BTreeMap::new();
    for version in versions {
        let Some(date_active) = version.date_active else {
            continue;
        };
        if date_active > now {
            continue;
        }
        let newer = active
            .get(&version.slug)
            .is_none_or(|current| (current.date_active, current.id) < (version.date_active, version.id));
        if newer {
            active.insert(version.slug.clone(), version);
        }
    }
    active.into_values().collect()
}

/// Returns the active version for `slug`.
///
/// # Errors
/// Returns `Error::TermsNotFound` if the slug has no version active yet, or an
/// error if the database query fails.
#[instrument(skip(db))]
pub async fn get_active(db: &DatabaseConnection, slug: &str) -> Result<terms::Model> {
    let versions = Terms::find()
        .filter(terms::Column::Slug.eq(slug))
        .filter(terms::Column::DateActive.is_not_null())
        .all(db)
        .await?;

    active_versions_as_of(versions, Utc::now())
        .into_iter()
        .next()
        .ok_or_else(|| Error::TermsNotFound {
            reference: slug.to_string(),
        })
}

/// Returns the active version of every slug, ordered by slug ascending.
///
/// Slugs without an active version are simply absent from the result.
pub async fn get_active_all(db: &DatabaseConnection) -> Result<Vec<terms::Model>> {
    let versions = Terms::find()
        .filter(terms::Column::DateActive.is_not_null())
        .order_by_asc(terms::Column::Slug)
        .all(db)
        .await?;

    let active = active_versions_as_of(versions, Utc::now());
    debug!("Resolved {} active terms", active.len());
    Ok(active)
}

/// Exact lookup of one version, whether or not it is active.
///
/// If several rows share `(slug, version_number)` the one with the latest
/// `date_active` wins.
///
/// # Errors
/// Returns `Error::TermsNotFound` if no row matches.
#[instrument(skip(db))]
pub async fn get_by_slug_and_version(
    db: &DatabaseConnection,
    slug: &str,
    version_number: f64,
) -> Result<terms::Model> {
    Terms::find()
        .filter(terms::Column::Slug.eq(slug))
        .filter(terms::Column::VersionNumber.eq(version_number))
        .all(db)
        .await?
        .into_iter()
        .max_by_key(|version| (version.date_active, version.id))
        .ok_or_else(|| Error::TermsNotFound {
            reference: format!("{slug} v{version_number}"),
        })
}

/// Retrieves a specific terms version by its primary key.
pub async fn get_by_id(db: &DatabaseConnection, terms_id: i64) -> Result<Option<terms::Model>> {
    Terms::find_by_id(terms_id).one(db).await.map_err(Into::into)
}

/// Creates a new terms version after validating the input.
///
/// # Errors
/// Returns an error if:
/// - The slug or name is empty or whitespace-only
/// - The version number is negative or not finite
/// - A version with the same slug and number already exists
/// - The database insert operation fails
pub async fn create_terms(db: &DatabaseConnection, new_terms: NewTerms) -> Result<terms::Model> {
    let slug = new_terms.slug.trim();
    if slug.is_empty() {
        return Err(Error::InvalidTerms {
            message: "Terms slug cannot be empty".to_string(),
        });
    }

    let name = new_terms.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidTerms {
            message: "Terms name cannot be empty".to_string(),
        });
    }

    if !new_terms.version_number.is_finite() || new_terms.version_number < 0.0 {
        return Err(Error::InvalidTerms {
            message: format!("Invalid version number {}", new_terms.version_number),
        });
    }

    let existing = Terms::find()
        .filter(terms::Column::Slug.eq(slug))
        .filter(terms::Column::VersionNumber.eq(new_terms.version_number))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::InvalidTerms {
            message: format!(
                "Version {} of '{}' already exists",
                new_terms.version_number, slug
            ),
        });
    }

    let version = terms::ActiveModel {
        slug: Set(slug.to_string()),
        name: Set(name.to_string()),
        version_number: Set(new_terms.version_number),
        text: Set(new_terms.text),
        info: Set(new_terms.info),
        date_active: Set(new_terms.date_active),
        date_created: Set(Utc::now()),
        ..Default::default()
    };
    let created = version.insert(db).await?;
    info!(
        "Created terms '{}' version {} (ID: {})",
        created.slug, created.version_number, created.id
    );
    Ok(created)
}

/// Inserts every configured document whose `(slug, version_number)` is not yet
/// in the catalog. Returns how many versions were created.
pub async fn seed_terms(db: &DatabaseConnection, documents: &[TermsDocumentConfig]) -> Result<usize> {
    let mut created = 0;
    for document in documents {
        match get_by_slug_and_version(db, &document.slug, document.version_number).await {
            Ok(_) => {
                debug!(
                    "Terms '{}' version {} already present, skipping",
                    document.slug, document.version_number
                );
            }
            Err(Error::TermsNotFound { .. }) => {
                create_terms(db, NewTerms::from(document)).await?;
                created += 1;
            }
            Err(e) => return Err(e),
        }
    }
    info!("Seeded {} of {} configured terms", created, documents.len());
    Ok(created)
}
