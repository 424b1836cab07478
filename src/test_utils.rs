//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::restaurant::{self, NewRestaurant},
    entities::{self, Restaurant},
    errors::Result,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, Set, prelude::*};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// The pool is pinned to one connection so every handle sees the same database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a restaurant category named "Test Category".
pub async fn create_test_category(
    db: &DatabaseConnection,
) -> Result<entities::restaurant_category::Model> {
    restaurant::create_category(db, "Test Category").await
}

/// Creates a restaurant with sensible defaults, in its own category.
///
/// # Defaults
/// * `address`: `"Test Street 1"`
/// * `postal_code`: `"29010"`
/// * `shipping_costs`: 2.5
pub async fn create_test_restaurant(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::restaurant::Model> {
    let category = restaurant::create_category(db, &format!("{name} category")).await?;
    let mut input = NewRestaurant::new(name, category.id);
    input.address = "Test Street 1".to_string();
    input.postal_code = "29010".to_string();
    input.shipping_costs = 2.5;
    restaurant::create_restaurant(db, input).await
}

/// Inserts a product directly, without scheduling any reclassification.
pub async fn insert_product(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
    restaurant_id: i64,
) -> Result<entities::product::Model> {
    let now = chrono::Utc::now().naive_utc();
    entities::product::ActiveModel {
        name: Set(name.to_string()),
        description: Set(None),
        price: Set(price),
        image: Set(None),
        availability: Set(true),
        restaurant_id: Set(restaurant_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Overwrites the stored inexpensiveness flag.
pub async fn set_inexpensive_flag(
    db: &DatabaseConnection,
    restaurant_id: i64,
    value: bool,
) -> Result<()> {
    let mut restaurant: entities::restaurant::ActiveModel = Restaurant::find_by_id(restaurant_id)
        .one(db)
        .await?
        .ok_or(crate::errors::Error::RestaurantNotFound { id: restaurant_id })?
        .into();
    restaurant.is_inexpensive = Set(value);
    restaurant.update(db).await?;
    Ok(())
}

/// Sets up a database holding one category.
pub async fn setup_with_category() -> Result<(
    DatabaseConnection,
    entities::restaurant_category::Model,
)> {
    let db = setup_test_db().await?;
    let category = create_test_category(&db).await?;
    Ok((db, category))
}

/// Sets up a database holding one restaurant.
/// Returns (db, restaurant) for product-related tests.
pub async fn setup_with_restaurant() -> Result<(DatabaseConnection, entities::restaurant::Model)> {
    let db = setup_test_db().await?;
    let restaurant = create_test_restaurant(&db, "Test Restaurant").await?;
    Ok((db, restaurant))
}
