//! Terms entity - One version of a terms and conditions document.
//!
//! Versions of the same document share a `slug`. A version becomes active once its
//! `date_active` has passed; new revisions are always new rows, never edits.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Terms and conditions database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "terms_and_conditions")]
pub struct Model {
    /// Unique identifier for this version
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Stable identifier grouping all versions of one document (e.g. `"site-terms"`)
    pub slug: String,
    /// Human-readable document name
    pub name: String,
    /// Version number, unique per slug
    pub version_number: f64,
    /// Full text of the terms
    #[sea_orm(column_type = "Text", nullable)]
    pub text: Option<String>,
    /// Short summary shown alongside the text
    #[sea_orm(column_type = "Text", nullable)]
    pub info: Option<String>,
    /// When this version takes effect; `None` means not scheduled yet
    pub date_active: Option<DateTimeUtc>,
    /// When the row was created
    pub date_created: DateTimeUtc,
}

/// Defines relationships between Terms and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One terms version has many acceptances
    #[sea_orm(has_many = "super::user_terms::Entity")]
    UserTerms,
}

impl Related<super::user_terms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserTerms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
