//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the terms catalog and the acceptance ledger.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod terms;
pub mod user_terms;

// Re-export specific types to avoid conflicts
pub use terms::{Column as TermsColumn, Entity as Terms, Model as TermsModel};
pub use user_terms::{Column as UserTermsColumn, Entity as UserTerms, Model as UserTermsModel};
