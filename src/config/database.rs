//! Database configuration module for the terms tracker.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`.
//! The composite unique index on acceptances is not expressible on the entity itself,
//! so it is built here with `sea_query` and created together with the tables.

use crate::entities::{Terms, UserTerms, user_terms};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/terms.sqlite?mode=rwc";

/// Name of the unique index that makes a user accept a given version at most once.
pub const UNIQUE_ACCEPTANCE_INDEX: &str = "idx_user_terms_user_id_terms_id";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
#[instrument]
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the terms and acceptance tables plus the unique acceptance index.
///
/// Every statement uses `IF NOT EXISTS`, so this is safe to call on every startup.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut terms_table = schema.create_table_from_entity(Terms);
    terms_table.if_not_exists();
    let mut user_terms_table = schema.create_table_from_entity(UserTerms);
    user_terms_table.if_not_exists();

    let unique_acceptance = Index::create()
        .name(UNIQUE_ACCEPTANCE_INDEX)
        .table(UserTerms)
        .col(user_terms::Column::UserId)
        .col(user_terms::Column::TermsId)
        .unique()
        .if_not_exists()
        .to_owned();

    db.execute(builder.build(&terms_table)).await?;
    db.execute(builder.build(&user_terms_table)).await?;
    db.execute(builder.build(&unique_acceptance)).await?;

    info!("Terms tables ensured");
    Ok(())
}
