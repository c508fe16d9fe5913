/// Database configuration and connection management
pub mod database;

/// Terms settings and seed documents loaded from config.toml
pub mod terms;
