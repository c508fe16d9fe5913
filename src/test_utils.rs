//! Shared test utilities for the terms tracker.
//!
//! This module provides common helper functions for setting up test databases
//! and creating terms versions with sensible defaults.

use crate::{
    cache::MemoryCache,
    core::{
        catalog::{self, NewTerms},
        not_agreed::NotAgreedResolver,
    },
    entities::terms,
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Midnight UTC on the given day.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Input for a terms version named after its slug.
pub fn new_terms(slug: &str, version_number: f64, date_active: Option<DateTime<Utc>>) -> NewTerms {
    NewTerms {
        slug: slug.to_string(),
        name: format!("{slug} terms"),
        version_number,
        text: Some(format!("Text of {slug} v{version_number}")),
        info: None,
        date_active,
    }
}

/// Creates a terms version in the database.
pub async fn create_test_terms(
    db: &DatabaseConnection,
    slug: &str,
    version_number: f64,
    date_active: Option<DateTime<Utc>>,
) -> Result<terms::Model> {
    catalog::create_terms(db, new_terms(slug, version_number, date_active)).await
}

/// Builds a terms model without touching a database, for mocks and pure functions.
pub fn terms_model(
    id: i64,
    slug: &str,
    version_number: f64,
    date_active: Option<DateTime<Utc>>,
) -> terms::Model {
    terms::Model {
        id,
        slug: slug.to_string(),
        name: format!("{slug} terms"),
        version_number,
        text: None,
        info: None,
        date_active,
        date_created: date(2019, 1, 1),
    }
}

/// Resolver over a fresh in-memory cache with the default 30 second lifetime.
pub fn memory_resolver() -> NotAgreedResolver {
    NotAgreedResolver::new(Arc::new(MemoryCache::new()), Duration::from_secs(30))
}

/// Sets up a database holding one active version of `"site-terms"`.
/// Returns (db, terms) for common test scenarios.
pub async fn setup_with_terms() -> Result<(DatabaseConnection, terms::Model)> {
    let db = setup_test_db().await?;
    let terms = create_test_terms(&db, "site-terms", 1.0, Some(date(2020, 1, 1))).await?;
    Ok((db, terms))
}
