//! Core business logic - framework-agnostic terms catalog, acceptance ledger and
//! not-agreed resolution. Every function takes the database connection explicitly
//! so it can be called from any transport layer.

pub mod acceptance;
pub mod catalog;
pub mod email;
pub mod not_agreed;
pub mod recorder;
pub mod selection;
