//! Restaurant, category and order operations.
//!
//! These support the product logic: restaurants own products, categories are embedded
//! in popularity results, and orders carry the quantities the ranking sums up.

use crate::{
    entities::{
        Order, Product, Restaurant, RestaurantCategory, order, order_product, product, restaurant,
        restaurant_category,
    },
    core::validation::{ValidationErrors, check_name},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

/// Payload for creating a restaurant.
#[derive(Debug, Clone)]
pub struct NewRestaurant {
    /// Display name
    pub name: String,
    /// Street address
    pub address: String,
    /// Postal code
    pub postal_code: String,
    /// Flat shipping costs
    pub shipping_costs: f64,
    /// Category the restaurant is listed under
    pub restaurant_category_id: i64,
    /// Optional description
    pub description: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Publication status, `"online"` when `None`
    pub status: Option<String>,
}

impl NewRestaurant {
    /// Minimal restaurant payload with every optional field unset.
    #[must_use]
    pub fn new(name: &str, restaurant_category_id: i64) -> Self {
        Self {
            name: name.to_string(),
            address: String::new(),
            postal_code: String::new(),
            shipping_costs: 0.0,
            restaurant_category_id,
            description: None,
            email: None,
            phone: None,
            status: None,
        }
    }
}

/// One line of an order to be placed.
#[derive(Debug, Clone, Copy)]
pub struct OrderLine {
    /// Product ordered
    pub product_id: i64,
    /// Number of units, at least 1
    pub quantity: i32,
}

/// Creates a restaurant category.
///
/// # Errors
/// Returns an error if the name is blank or the insert fails.
pub async fn create_category<C>(db: &C, name: &str) -> Result<restaurant_category::Model>
where
    C: ConnectionTrait,
{
    let mut errors = ValidationErrors::default();
    check_name(&mut errors, name);
    errors.into_result()?;

    let now = chrono::Utc::now().naive_utc();
    let category = restaurant_category::ActiveModel {
        name: Set(name.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    category.insert(db).await.map_err(Into::into)
}

/// Finds a category by exact name.
pub async fn get_category_by_name<C>(
    db: &C,
    name: &str,
) -> Result<Option<restaurant_category::Model>>
where
    C: ConnectionTrait,
{
    RestaurantCategory::find()
        .filter(restaurant_category::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a restaurant. The inexpensiveness flag starts out false.
///
/// # Errors
/// Returns an error if the name is blank or the insert fails.
pub async fn create_restaurant<C>(db: &C, input: NewRestaurant) -> Result<restaurant::Model>
where
    C: ConnectionTrait,
{
    let mut errors = ValidationErrors::default();
    check_name(&mut errors, &input.name);
    errors.into_result()?;

    let now = chrono::Utc::now().naive_utc();
    let restaurant = restaurant::ActiveModel {
        name: Set(input.name.trim().to_string()),
        description: Set(input.description),
        address: Set(input.address),
        postal_code: Set(input.postal_code),
        url: Set(None),
        shipping_costs: Set(input.shipping_costs),
        average_service_minutes: Set(None),
        email: Set(input.email),
        phone: Set(input.phone),
        logo: Set(None),
        hero_image: Set(None),
        status: Set(input.status.unwrap_or_else(|| "online".to_string())),
        restaurant_category_id: Set(input.restaurant_category_id),
        is_inexpensive: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    restaurant.insert(db).await.map_err(Into::into)
}

/// Retrieves a restaurant by its ID.
pub async fn get_restaurant_by_id<C>(db: &C, restaurant_id: i64) -> Result<Option<restaurant::Model>>
where
    C: ConnectionTrait,
{
    Restaurant::find_by_id(restaurant_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a restaurant by exact name.
pub async fn get_restaurant_by_name<C>(db: &C, name: &str) -> Result<Option<restaurant::Model>>
where
    C: ConnectionTrait,
{
    Restaurant::find()
        .filter(restaurant::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all restaurants ordered by name.
pub async fn list_restaurants<C>(db: &C) -> Result<Vec<restaurant::Model>>
where
    C: ConnectionTrait,
{
    Restaurant::find()
        .order_by_asc(restaurant::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Places an order and its lines atomically.
///
/// The order price is the sum of `quantity * price` over the lines plus the
/// shipping costs. Each line snapshots the product price into `unit_price`.
/// Lines naming the same product are merged into one line with the summed quantity.
///
/// # Errors
/// Returns an error if a quantity is below 1, a product does not exist, or any
/// insert fails. Nothing is written in that case.
#[instrument(skip(db, lines), fields(lines = lines.len()))]
pub async fn create_order(
    db: &DatabaseConnection,
    address: &str,
    shipping_costs: f64,
    lines: &[OrderLine],
) -> Result<order::Model> {
    if let Some(line) = lines.iter().find(|l| l.quantity < 1) {
        return Err(Error::InvalidQuantity {
            quantity: line.quantity,
        });
    }

    let mut quantities: BTreeMap<i64, i32> = BTreeMap::new();
    for line in lines {
        let quantity = quantities.entry(line.product_id).or_default();
        *quantity = quantity
            .checked_add(line.quantity)
            .ok_or(Error::InvalidQuantity {
                quantity: line.quantity,
            })?;
    }

    let txn = db.begin().await?;

    let ids: Vec<i64> = quantities.keys().copied().collect();
    let prices: HashMap<i64, f64> = Product::find()
        .filter(product::Column::Id.is_in(ids))
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p.price))
        .collect();

    let mut total = shipping_costs;
    for (&product_id, &quantity) in &quantities {
        let price = prices
            .get(&product_id)
            .ok_or(Error::ProductNotFound { id: product_id })?;
        total += price * f64::from(quantity);
    }

    let order = order::ActiveModel {
        address: Set(address.to_string()),
        price: Set(total),
        shipping_costs: Set(shipping_costs),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for (product_id, quantity) in quantities {
        order_product::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            unit_price: Set(prices.get(&product_id).copied().unwrap_or_default()),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    debug!(order_id = order.id, total, "Order placed");

    Ok(order)
}

/// Retrieves an order by its ID.
pub async fn get_order_by_id<C>(db: &C, order_id: i64) -> Result<Option<order::Model>>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id).one(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{errors::ErrorCategory, test_utils::*};

    #[tokio::test]
    async fn test_create_restaurant_defaults() -> Result<()> {
        let (db, category) = setup_with_category().await?;

        let restaurant = create_restaurant(&db, NewRestaurant::new("Casa Pepe", category.id)).await?;

        assert_eq!(restaurant.name, "Casa Pepe");
        assert_eq!(restaurant.status, "online");
        assert!(!restaurant.is_inexpensive);
        assert_eq!(restaurant.restaurant_category_id, category.id);

        let found = get_restaurant_by_id(&db, restaurant.id).await?.unwrap();
        assert_eq!(found, restaurant);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_restaurant_rejects_blank_name() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        let result = create_restaurant(&db, NewRestaurant::new("  ", category.id)).await;
        let err = result.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Rejected);
        let Error::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.has_field("name"));
        assert!(list_restaurants(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_category_rejects_blank_name() -> Result<()> {
        let db = setup_test_db().await?;
        let Err(Error::Validation(errors)) = create_category(&db, "").await else {
            panic!("expected validation error");
        };
        assert!(errors.has_field("name"));
        assert!(RestaurantCategory::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_restaurants_alphabetical() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        create_restaurant(&db, NewRestaurant::new("Zeta", category.id)).await?;
        create_restaurant(&db, NewRestaurant::new("Alpha", category.id)).await?;

        let names: Vec<String> = list_restaurants(&db)
            .await?
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Alpha".to_string(), "Zeta".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_totals_lines() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let pizza = insert_product(&db, "Pizza", 10.0, restaurant.id).await?;
        let soda = insert_product(&db, "Soda", 2.5, restaurant.id).await?;

        let order = create_order(
            &db,
            "Calle Falsa 123",
            3.0,
            &[
                OrderLine { product_id: pizza.id, quantity: 2 },
                OrderLine { product_id: soda.id, quantity: 4 },
            ],
        )
        .await?;

        assert_eq!(order.price, 33.0);
        assert_eq!(order.shipping_costs, 3.0);

        let lines = crate::entities::OrderProduct::find()
            .filter(order_product::Column::OrderId.eq(order.id))
            .all(&db)
            .await?;
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().any(|l| l.product_id == soda.id && l.unit_price == 2.5));

        let found = get_order_by_id(&db, order.id).await?.unwrap();
        assert_eq!(found.id, order.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_merges_repeated_product() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let pizza = insert_product(&db, "Pizza", 10.0, restaurant.id).await?;
        let soda = insert_product(&db, "Soda", 2.0, restaurant.id).await?;

        let order = create_order(
            &db,
            "Calle Larios 5",
            1.0,
            &[
                OrderLine { product_id: pizza.id, quantity: 1 },
                OrderLine { product_id: soda.id, quantity: 1 },
                OrderLine { product_id: pizza.id, quantity: 2 },
            ],
        )
        .await?;
        assert_eq!(order.price, 33.0);

        let lines = crate::entities::OrderProduct::find()
            .filter(order_product::Column::OrderId.eq(order.id))
            .filter(order_product::Column::ProductId.eq(pizza.id))
            .all(&db)
            .await?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].unit_price, 10.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_rejects_zero_quantity() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let pizza = insert_product(&db, "Pizza", 10.0, restaurant.id).await?;

        let result = create_order(
            &db,
            "Somewhere",
            0.0,
            &[OrderLine { product_id: pizza.id, quantity: 0 }],
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity: 0 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_unknown_product_writes_nothing() -> Result<()> {
        let (db, _restaurant) = setup_with_restaurant().await?;

        let result = create_order(
            &db,
            "Somewhere",
            0.0,
            &[OrderLine { product_id: 999, quantity: 1 }],
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ProductNotFound { id: 999 }
        ));
        assert_eq!(Order::find().all(&db).await?.len(), 0);
        Ok(())
    }
}
