//! Process settings loaded from environment variables.
//!
//! Values usually come from a `.env` file loaded with `dotenvy` before
//! [`Settings::from_env`] runs. Every setting has a default.

use crate::{
    config::database::get_database_url,
    core::popularity::DEFAULT_POPULAR_LIMIT,
    errors::{Error, Result},
};
use std::path::PathBuf;

/// Default location of the catalog seed file.
pub const DEFAULT_CATALOG_PATH: &str = "catalog.toml";

/// Settings for the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Connection string passed to `SeaORM`
    pub database_url: String,
    /// Catalog file seeded on startup when it exists
    pub catalog_path: PathBuf,
    /// Number of entries in the popularity ranking
    pub popular_limit: u64,
}

impl Settings {
    /// Reads `DATABASE_URL`, `CATALOG_PATH` and `POPULAR_LIMIT`.
    ///
    /// # Errors
    /// Returns `Config` if `POPULAR_LIMIT` is set but is not a positive integer.
    pub fn from_env() -> Result<Self> {
        let popular_limit = match std::env::var("POPULAR_LIMIT") {
            Ok(raw) => parse_limit(&raw)?,
            Err(_) => DEFAULT_POPULAR_LIMIT,
        };

        Ok(Self {
            database_url: get_database_url(),
            catalog_path: std::env::var("CATALOG_PATH")
                .map_or_else(|_| PathBuf::from(DEFAULT_CATALOG_PATH), PathBuf::from),
            popular_limit,
        })
    }
}

fn parse_limit(raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(Error::Config {
            message: format!("POPULAR_LIMIT must be a positive integer, got {raw:?}"),
        }),
    }
}
