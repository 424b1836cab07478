//! Product business logic - Handles menu item operations.
//!
//! This module provides functions for listing, creating, updating and deleting the
//! products of a restaurant. Creating a product schedules a recomputation of the
//! restaurant's inexpensiveness flag on the [`Reclassifier`] without waiting for it.
//! All functions are async and return Result types for proper error handling.

use crate::{
    core::{
        reclassifier::Reclassifier,
        restaurant::get_restaurant_by_id,
        validation::{ValidationErrors, check_id, check_name, check_price},
    },
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Payload for creating a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    /// Menu name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price
    pub price: f64,
    /// Image path from the payload, replaced by an uploaded asset when present
    #[serde(default)]
    pub image: Option<String>,
    /// Defaults to available
    #[serde(default)]
    pub availability: Option<bool>,
    /// Restaurant offering the product
    pub restaurant_id: i64,
}

impl NewProduct {
    /// Product payload with only the required fields set.
    #[must_use]
    pub fn new(name: &str, price: f64, restaurant_id: i64) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            price,
            image: None,
            availability: None,
            restaurant_id,
        }
    }

    /// Checks the payload, collecting every failed rule.
    pub fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_name(&mut errors, &self.name);
        check_price(&mut errors, self.price);
        check_id(&mut errors, "restaurantId", self.restaurant_id);
        errors.into_result()
    }
}

/// Partial update of a product. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    /// New name, trimmed before storing
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New unit price
    pub price: Option<f64>,
    /// New image path, ignored when a file was uploaded
    pub image: Option<String>,
    /// Whether the product can be ordered
    pub availability: Option<bool>,
}

impl ProductUpdate {
    /// Checks the fields that are present.
    pub fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.name {
            check_name(&mut errors, name);
        }
        if let Some(price) = self.price {
            check_price(&mut errors, price);
        }
        errors.into_result()
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Exactly one row was removed
    Deleted,
    /// Nothing matched; not an error
    NotDeleted,
}

impl DeleteOutcome {
    /// Message reported back to the client.
    #[must_use]
    pub fn message(self, product_id: i64) -> String {
        match self {
            Self::Deleted => format!("Successfully deleted product id.{product_id}"),
            Self::NotDeleted => "Could not delete product.".to_string(),
        }
    }
}

/// Retrieves every product of a restaurant, ordered by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_products_by_restaurant<C>(
    db: &C,
    restaurant_id: i64,
) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::RestaurantId.eq(restaurant_id))
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a product and schedules the reclassification of its restaurant.
///
/// `uploaded_image` is the path of an asset already written by the file storage; it
/// takes precedence over `input.image`. The reclassification runs in the background
/// and its outcome never affects this call.
///
/// # Errors
/// Returns an error if:
/// - The payload fails validation or the restaurant does not exist (`Validation`)
/// - The store rejects the row (`Constraint`)
/// - The database insert fails (`Database`)
#[instrument(skip(db, reclassifier, input), fields(restaurant_id = input.restaurant_id))]
pub async fn create_product(
    db: &DatabaseConnection,
    reclassifier: &Reclassifier,
    input: NewProduct,
    uploaded_image: Option<String>,
) -> Result<product::Model> {
    input.validate()?;

    if get_restaurant_by_id(db, input.restaurant_id).await?.is_none() {
        let mut errors = ValidationErrors::default();
        errors.push("restaurantId", "restaurant does not exist");
        return Err(Error::Validation(errors));
    }

    let now = chrono::Utc::now().naive_utc();
    let product = product::ActiveModel {
        name: Set(input.name.trim().to_string()),
        description: Set(input.description),
        price: Set(input.price),
        image: Set(uploaded_image.or(input.image)),
        availability: Set(input.availability.unwrap_or(true)),
        restaurant_id: Set(input.restaurant_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(product_id = product.id, "Product created");
    reclassifier.schedule(product.restaurant_id);

    Ok(product)
}

/// Applies a partial update to a product and returns the stored row.
///
/// # Errors
/// Returns an error if:
/// - The payload fails validation
/// - No product has this id (`ProductNotFound`)
/// - The database update fails
#[instrument(skip(db, changes))]
pub async fn update_product<C>(
    db: &C,
    product_id: i64,
    changes: ProductUpdate,
    uploaded_image: Option<String>,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    changes.validate()?;

    let mut product: product::ActiveModel = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?
        .into();

    if let Some(name) = changes.name {
        product.name = Set(name.trim().to_string());
    }
    if let Some(description) = changes.description {
        product.description = Set(Some(description));
    }
    if let Some(price) = changes.price {
        product.price = Set(price);
    }
    if let Some(image) = uploaded_image.or(changes.image) {
        product.image = Set(Some(image));
    }
    if let Some(availability) = changes.availability {
        product.availability = Set(availability);
    }
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    // The row can vanish between the lookup and the write
    let updated = product.update(db).await.map_err(|e| match e {
        DbErr::RecordNotUpdated => Error::ProductNotFound { id: product_id },
        other => other.into(),
    })?;
    debug!("Product updated");
    Ok(updated)
}

/// Deletes a product by id.
///
/// # Errors
/// Returns an error only if the database delete fails; a missing product yields
/// [`DeleteOutcome::NotDeleted`].
#[instrument(skip(db))]
pub async fn delete_product<C>(db: &C, product_id: i64) -> Result<DeleteOutcome>
where
    C: ConnectionTrait,
{
    let result = Product::delete_by_id(product_id).exec(db).await?;
    let outcome = if result.rows_affected == 1 {
        DeleteOutcome::Deleted
    } else {
        DeleteOutcome::NotDeleted
    };
    debug!(?outcome, "Product delete finished");
    Ok(outcome)
}
