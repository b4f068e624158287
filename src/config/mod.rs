/// Database configuration and connection management
pub mod database;

/// Seed accounts and categories from config.toml
pub mod seed;
