//! User terms entity - A durable record that a user accepted one terms version.
//!
//! `(user_id, terms_id)` is unique; the index is created alongside the table in
//! `config::database::create_tables`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Acceptance database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_terms_and_conditions")]
pub struct Model {
    /// Unique identifier for the acceptance
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity of the accepting user
    pub user_id: String,
    /// ID of the accepted terms version
    pub terms_id: i64,
    /// Client address captured at acceptance time, if stored
    pub ip_address: Option<String>,
    /// When the acceptance was recorded
    pub date_accepted: DateTimeUtc,
}

/// Defines relationships between `UserTerms` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each acceptance belongs to one terms version
    #[sea_orm(
        belongs_to = "super::terms::Entity",
        from = "Column::TermsId",
        to = "super::terms::Column::Id"
    )]
    Terms,
}

impl Related<super::terms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Terms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
