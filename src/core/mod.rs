//! Core business logic - framework-agnostic operations over an injected database connection.

/// Restaurant inexpensiveness classification
pub mod inexpensiveness;
/// Top-selling products ranking
pub mod popularity;
/// Product CRUD operations
pub mod product;
/// Background worker recomputing the inexpensiveness flag
pub mod reclassifier;
/// Restaurant, category and order operations
pub mod restaurant;
/// Input validation for product payloads
pub mod validation;
