/// Database configuration and connection management
pub mod database;

/// Catalog seeding from catalog.toml
pub mod catalog;

/// Process settings read from environment variables
pub mod settings;
