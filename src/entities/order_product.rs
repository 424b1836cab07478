//! Order line entity - Join relation between orders and products carrying the quantity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order line database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_products")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Order this line belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_id: i64,
    /// Product ordered
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: i64,
    /// Number of units ordered
    pub quantity: i32,
    /// Product price at the time of the order
    pub unit_price: f64,
}

/// Defines relationships between `OrderProduct` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    /// Each line references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
