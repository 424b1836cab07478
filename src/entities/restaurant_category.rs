//! Restaurant category entity (e.g., "Pizza", "Sushi").

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Restaurant category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restaurant_categories")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Category name
    #[sea_orm(unique)]
    pub name: String,
    /// When the category was created
    pub created_at: DateTime,
    /// When the category was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between `RestaurantCategory` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category groups many restaurants
    #[sea_orm(has_many = "super::restaurant::Entity")]
    Restaurants,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
