//! Catalog seeding from catalog.toml
//!
//! This module loads an initial catalog of restaurant categories, restaurants and
//! products from a TOML file and inserts whatever is missing. Products go through
//! [`create_product`] so each restaurant is reclassified as its menu arrives.

use crate::{
    core::{
        product::{NewProduct, create_product, list_products_by_restaurant},
        reclassifier::Reclassifier,
        restaurant::{
            NewRestaurant, create_category, create_restaurant, get_category_by_name,
            get_restaurant_by_name,
        },
    },
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Configuration structure representing the entire catalog.toml file
#[derive(Debug, Deserialize)]
pub struct Catalog {
    /// Restaurant categories to create
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    /// Restaurants with their menus
    #[serde(default)]
    pub restaurants: Vec<RestaurantConfig>,
}

/// Configuration for a single restaurant category
#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    /// Category name, unique
    pub name: String,
}

/// Configuration for a single restaurant
#[derive(Debug, Deserialize, Clone)]
pub struct RestaurantConfig {
    /// Restaurant name, used to detect already seeded restaurants
    pub name: String,
    /// Name of the category; created when missing
    pub category: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Street address
    #[serde(default)]
    pub address: String,
    /// Postal code
    #[serde(default)]
    pub postal_code: String,
    /// Flat shipping costs, 0 when omitted
    #[serde(default)]
    pub shipping_costs: f64,
    /// Contact email
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone
    #[serde(default)]
    pub phone: Option<String>,
    /// Menu of the restaurant
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// Configuration for a single product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    /// Product name, used to detect already seeded products
    pub name: String,
    /// Unit price
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Counts of rows inserted by [`seed_catalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Categories created
    pub categories: usize,
    /// Restaurants created
    pub restaurants: usize,
    /// Products created
    pub products: usize,
}

/// Loads a catalog from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let path_ref = path.as_ref();
    debug!("Attempting to load catalog from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file {path_ref:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog file {path_ref:?}: {e}"),
    })
}

async fn ensure_category(
    db: &DatabaseConnection,
    name: &str,
    report: &mut SeedReport,
) -> Result<i64> {
    if let Some(existing) = get_category_by_name(db, name).await? {
        return Ok(existing.id);
    }
    report.categories += 1;
    Ok(create_category(db, name).await?.id)
}

/// Inserts every category, restaurant and product of `catalog` that does not exist yet.
///
/// Rows are matched by name; existing rows are never modified, so seeding twice is a no-op.
///
/// # Errors
/// Returns an error if a product fails validation or any database call fails.
#[instrument(skip_all)]
pub async fn seed_catalog(
    db: &DatabaseConnection,
    reclassifier: &Reclassifier,
    catalog: &Catalog,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for category in &catalog.categories {
        ensure_category(db, &category.name, &mut report).await?;
    }

    for config in &catalog.restaurants {
        let category_id = ensure_category(db, &config.category, &mut report).await?;

        let restaurant = if let Some(existing) = get_restaurant_by_name(db, &config.name).await? {
            existing
        } else {
            report.restaurants += 1;
            create_restaurant(
                db,
                NewRestaurant {
                    name: config.name.clone(),
                    address: config.address.clone(),
                    postal_code: config.postal_code.clone(),
                    shipping_costs: config.shipping_costs,
                    restaurant_category_id: category_id,
                    description: config.description.clone(),
                    email: config.email.clone(),
                    phone: config.phone.clone(),
                    status: None,
                },
            )
            .await?
        };

        let existing = list_products_by_restaurant(db, restaurant.id).await?;
        for product in &config.products {
            if existing.iter().any(|p| p.name == product.name) {
                continue;
            }
            let mut input = NewProduct::new(&product.name, product.price, restaurant.id);
            input.description.clone_from(&product.description);
            input.image.clone_from(&product.image);
            create_product(db, reclassifier, input, None).await?;
            report.products += 1;
        }
    }

    info!(
        categories = report.categories,
        restaurants = report.restaurants,
        products = report.products,
        "Catalog seeded"
    );
    Ok(report)
}
