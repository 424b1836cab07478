//! Popularity ranking - the best-selling products across all restaurants.
//!
//! Sold quantities are summed by the database over a LEFT JOIN with the order lines,
//! so products that were never ordered rank with a count of zero. Equal counts are
//! ordered by ascending product id to keep results stable.

use crate::{
    entities::{
        OrderProduct, Product, Restaurant, RestaurantCategory, order_product, product, restaurant,
        restaurant_category,
    },
    errors::Result,
};
use sea_orm::{
    JoinType, QueryOrder, QuerySelect, RelationTrait,
    prelude::*,
    sea_query::{Expr, Func, SimpleExpr},
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Number of products returned when no limit is configured.
pub const DEFAULT_POPULAR_LIMIT: u64 = 3;

const SOLD_PRODUCT_COUNT: &str = "sold_product_count";

/// Restaurant fields embedded in a ranked product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSummary {
    /// Restaurant id
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
    /// Flat shipping costs
    pub shipping_costs: f64,
    /// Average preparation and delivery time in minutes
    pub average_service_minutes: Option<f64>,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Logo image path
    pub logo: Option<String>,
    /// Hero image path
    pub hero_image: Option<String>,
    /// Publication status
    pub status: String,
    /// Category id
    pub restaurant_category_id: i64,
    /// Category of the restaurant, when it still exists
    pub restaurant_category: Option<restaurant_category::Model>,
}

impl RestaurantSummary {
    fn new(r: restaurant::Model, restaurant_category: Option<restaurant_category::Model>) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            address: r.address,
            postal_code: r.postal_code,
            url: r.url,
            shipping_costs: r.shipping_costs,
            average_service_minutes: r.average_service_minutes,
            email: r.email,
            phone: r.phone,
            logo: r.logo,
            hero_image: r.hero_image,
            status: r.status,
            restaurant_category_id: r.restaurant_category_id,
            restaurant_category,
        }
    }
}

/// A product together with its total sold quantity and owning restaurant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    /// The product row
    #[serde(flatten)]
    pub product: product::Model,
    /// Sum of `quantity` over all order lines of this product
    pub sold_product_count: i64,
    /// Restaurant offering the product
    pub restaurant: RestaurantSummary,
}

/// Returns product ids with their sold quantity, best sellers first.
async fn ranked_product_ids<C>(db: &C, limit: u64) -> Result<Vec<(i64, i64)>>
where
    C: ConnectionTrait,
{
    let sold: SimpleExpr = Func::coalesce([
        Func::sum(Expr::col((OrderProduct, order_product::Column::Quantity))).into(),
        Expr::value(0),
    ])
    .into();

    Product::find()
        .select_only()
        .column(product::Column::Id)
        .column_as(sold, SOLD_PRODUCT_COUNT)
        .join(JoinType::LeftJoin, product::Relation::OrderProducts.def())
        .group_by(product::Column::Id)
        .order_by_desc(Expr::cust(SOLD_PRODUCT_COUNT))
        .order_by_asc(product::Column::Id)
        .limit(limit)
        .into_tuple::<(i64, i64)>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns the `limit` best-selling products with their restaurant and category.
///
/// The result is sorted by sold quantity, highest first, and holds
/// `min(limit, number of products)` entries.
///
/// # Errors
/// Returns an error if any of the queries fail.
#[instrument(skip(db))]
pub async fn top_products<C>(db: &C, limit: u64) -> Result<Vec<ProductSummary>>
where
    C: ConnectionTrait,
{
    let ranking = ranked_product_ids(db, limit).await?;
    if ranking.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = ranking.iter().map(|(id, _)| *id).collect();
    let mut products: HashMap<i64, (product::Model, Option<restaurant::Model>)> = Product::find()
        .filter(product::Column::Id.is_in(ids))
        .find_also_related(Restaurant)
        .all(db)
        .await?
        .into_iter()
        .map(|(p, r)| (p.id, (p, r)))
        .collect();

    let category_ids: Vec<i64> = products
        .values()
        .filter_map(|(_, r)| r.as_ref().map(|r| r.restaurant_category_id))
        .collect();
    let categories: HashMap<i64, restaurant_category::Model> = RestaurantCategory::find()
        .filter(restaurant_category::Column::Id.is_in(category_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let summaries: Vec<ProductSummary> = ranking
        .into_iter()
        .filter_map(|(id, sold_product_count)| {
            // Rows deleted between the two queries drop out of the result
            let (product, restaurant) = products.remove(&id)?;
            let restaurant = restaurant?;
            let category = categories.get(&restaurant.restaurant_category_id).cloned();
            Some(ProductSummary {
                product,
                sold_product_count,
                restaurant: RestaurantSummary::new(restaurant, category),
            })
        })
        .collect();

    debug!(count = summaries.len(), "Top products computed");
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::restaurant::{OrderLine, create_order},
        test_utils::*,
    };

    #[tokio::test]
    async fn test_ranks_by_summed_quantity() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let pizza = insert_product(&db, "Pizza", 10.0, restaurant.id).await?;
        let pasta = insert_product(&db, "Pasta", 9.0, restaurant.id).await?;
        let salad = insert_product(&db, "Salad", 7.0, restaurant.id).await?;
        let soup = insert_product(&db, "Soup", 5.0, restaurant.id).await?;

        create_order(
            &db,
            "addr",
            0.0,
            &[
                OrderLine { product_id: pasta.id, quantity: 3 },
                OrderLine { product_id: salad.id, quantity: 1 },
            ],
        )
        .await?;
        create_order(
            &db,
            "addr",
            0.0,
            &[
                OrderLine { product_id: pasta.id, quantity: 2 },
                OrderLine { product_id: pizza.id, quantity: 4 },
            ],
        )
        .await?;

        let top = top_products(&db, DEFAULT_POPULAR_LIMIT).await?;
        let ranked: Vec<(i64, i64)> = top
            .iter()
            .map(|s| (s.product.id, s.sold_product_count))
            .collect();
        assert_eq!(ranked, vec![(pasta.id, 5), (pizza.id, 4), (salad.id, 1)]);
        assert!(top.iter().all(|s| s.product.id != soup.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_products_without_orders_count_as_zero() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let first = insert_product(&db, "First", 1.0, restaurant.id).await?;
        let second = insert_product(&db, "Second", 2.0, restaurant.id).await?;
        let third = insert_product(&db, "Third", 3.0, restaurant.id).await?;
        create_order(
            &db,
            "addr",
            0.0,
            &[OrderLine { product_id: third.id, quantity: 1 }],
        )
        .await?;

        let top = top_products(&db, 3).await?;
        let ranked: Vec<(i64, i64)> = top
            .iter()
            .map(|s| (s.product.id, s.sold_product_count))
            .collect();
        // Ties on zero fall back to ascending id
        assert_eq!(ranked, vec![(third.id, 1), (first.id, 0), (second.id, 0)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_fewer_products_than_limit() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        insert_product(&db, "Only", 4.0, restaurant.id).await?;

        let top = top_products(&db, 3).await?;
        assert_eq!(top.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_catalog() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(top_products(&db, 3).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_sorted_non_increasing_across_restaurants() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_restaurant(&db, "A").await?;
        let b = create_test_restaurant(&db, "B").await?;
        let mut lines = Vec::new();
        for (i, restaurant_id) in [a.id, b.id, a.id, b.id, a.id].into_iter().enumerate() {
            let p = insert_product(&db, &format!("p{i}"), 1.0, restaurant_id).await?;
            lines.push(OrderLine {
                product_id: p.id,
                quantity: i32::try_from((i * 7) % 5 + 1).unwrap(),
            });
        }
        create_order(&db, "addr", 0.0, &lines).await?;

        let top = top_products(&db, 4).await?;
        assert_eq!(top.len(), 4);
        assert!(
            top.windows(2)
                .all(|w| w[0].sold_product_count >= w[1].sold_product_count)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_embeds_restaurant_and_category() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let product = insert_product(&db, "Dish", 8.0, restaurant.id).await?;

        let top = top_products(&db, 1).await?;
        let summary = &top[0];
        assert_eq!(summary.product, product);
        assert_eq!(summary.restaurant.id, restaurant.id);
        assert_eq!(summary.restaurant.name, restaurant.name);
        let category = summary.restaurant.restaurant_category.as_ref().unwrap();
        assert_eq!(category.id, restaurant.restaurant_category_id);
        Ok(())
    }
}
