//! Restaurant entity - A venue publishing a menu of products.
//!
//! `is_inexpensive` is derived from product prices and is never set by users.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Restaurant database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restaurants")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the restaurant
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Street address
    pub address: String,
    /// Postal code
    pub postal_code: String,
    /// Website
    pub url: Option<String>,
    /// Flat shipping costs applied to each order
    pub shipping_costs: f64,
    /// Average minutes to serve an order
    pub average_service_minutes: Option<f64>,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Logo asset path
    pub logo: Option<String>,
    /// Hero image asset path
    pub hero_image: Option<String>,
    /// Publication status (e.g., "online", "offline")
    pub status: String,
    /// Category this restaurant belongs to
    pub restaurant_category_id: i64,
    /// Derived flag - average product price below the other restaurants' average
    pub is_inexpensive: bool,
    /// When the restaurant was created
    pub created_at: DateTime,
    /// When the restaurant was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Restaurant and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each restaurant belongs to one category
    #[sea_orm(
        belongs_to = "super::restaurant_category::Entity",
        from = "Column::RestaurantCategoryId",
        to = "super::restaurant_category::Column::Id"
    )]
    RestaurantCategory,
    /// One restaurant has many products
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
}

impl Related<super::restaurant_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RestaurantCategory.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
