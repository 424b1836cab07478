//! Unified error type for the restaurant products crate.
//!
//! Every fallible operation returns [`Result`]. Errors carry enough structure for an
//! outer transport layer to pick a response class through [`Error::category`].

use crate::core::validation::ValidationErrors;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before reaching the store
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The store refused the write because of a constraint (unique, foreign key)
    #[error("Constraint violation: {message}")]
    Constraint {
        /// Message reported by the store
        message: String,
    },

    /// Any other store failure
    #[error("Database error: {0}")]
    Database(DbErr),

    /// No product row matched the identifier
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Identifier that was looked up
        id: i64,
    },

    /// No restaurant row matched the identifier
    #[error("Restaurant not found: {id}")]
    RestaurantNotFound {
        /// Identifier that was looked up
        id: i64,
    },

    /// Order line with a non-positive quantity
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// Offending quantity
        quantity: i32,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },
}

/// Coarse classification of an [`Error`], mirroring 422 / 404 / 500 responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input or a store-level constraint violation
    Rejected,
    /// The addressed record does not exist
    NotFound,
    /// Unexpected failure on our side
    ServerFault,
}

impl Error {
    /// Returns the response class for this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) | Self::Constraint { .. } | Self::InvalidQuantity { .. } => {
                ErrorCategory::Rejected
            }
            Self::ProductNotFound { .. } | Self::RestaurantNotFound { .. } => {
                ErrorCategory::NotFound
            }
            Self::Database(_) | Self::Config { .. } => ErrorCategory::ServerFault,
        }
    }
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(
                SqlErr::UniqueConstraintViolation(message)
                | SqlErr::ForeignKeyConstraintViolation(message),
            ) => Self::Constraint { message },
            _ => Self::Database(err),
        }
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::restaurant::create_category, test_utils::*};

    #[test]
    fn test_generic_db_error_is_server_fault() {
        let err = Error::from(DbErr::Custom("disk on fire".to_string()));
        assert!(matches!(err, Error::Database(_)));
        assert_eq!(err.category(), ErrorCategory::ServerFault);
    }

    #[test]
    fn test_not_found_category() {
        assert_eq!(
            Error::ProductNotFound { id: 7 }.category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            Error::RestaurantNotFound { id: 7 }.category(),
            ErrorCategory::NotFound
        );
    }

    #[test]
    fn test_validation_is_rejected() {
        let mut errors = ValidationErrors::default();
        errors.push("name", "must not be empty");
        let err = Error::from(errors);
        assert_eq!(err.category(), ErrorCategory::Rejected);
        assert_eq!(err.to_string(), "Validation failed: name: must not be empty");
    }

    #[tokio::test]
    async fn test_store_constraint_violations_are_rejected() -> Result<()> {
        let db = setup_test_db().await?;

        // Foreign key: restaurant 999 does not exist
        let Err(err) = insert_product(&db, "Orphan", 1.0, 999).await else {
            panic!("expected foreign key violation");
        };
        assert!(matches!(err, Error::Constraint { .. }), "got {err:?}");
        assert_eq!(err.category(), ErrorCategory::Rejected);

        // Unique: category names
        create_category(&db, "Dup").await?;
        let Err(err) = create_category(&db, "Dup").await else {
            panic!("expected unique violation");
        };
        assert!(matches!(err, Error::Constraint { .. }), "got {err:?}");
        assert_eq!(err.category(), ErrorCategory::Rejected);
        Ok(())
    }
}
