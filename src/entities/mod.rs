//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod order;
pub mod order_product;
pub mod product;
pub mod restaurant;
pub mod restaurant_category;

// Re-export specific types to avoid conflicts
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use order_product::{
    Column as OrderProductColumn, Entity as OrderProduct, Model as OrderProductModel,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use restaurant::{Column as RestaurantColumn, Entity as Restaurant, Model as RestaurantModel};
pub use restaurant_category::{
    Column as RestaurantCategoryColumn, Entity as RestaurantCategory,
    Model as RestaurantCategoryModel,
};
