//! Inexpensiveness classification.
//!
//! A restaurant is inexpensive when the mean price of its products is strictly below
//! the mean price of every other restaurant's products. Both means are computed by the
//! database with `AVG`. The flag is only rewritten when both sides have products, so
//! a restaurant is never downgraded on insufficient data.
//!
//! The two reads and the update are separate statements. A concurrent product write
//! can make the result reflect a slightly stale snapshot; the next recomputation
//! corrects it.

use crate::{
    entities::{Product, Restaurant, product, restaurant},
    errors::{Error, Result},
};
use sea_orm::{
    QuerySelect,
    prelude::*,
    sea_query::{Expr, Func, SimpleExpr},
};
use tracing::{debug, info, instrument};

fn average_price_expr() -> SimpleExpr {
    Func::avg(Expr::col((Product, product::Column::Price))).into()
}

/// Mean price of the products of `restaurant_id`, `None` when it has none.
pub async fn average_price_of_restaurant<C>(db: &C, restaurant_id: i64) -> Result<Option<f64>>
where
    C: ConnectionTrait,
{
    let avg = Product::find()
        .select_only()
        .column_as(average_price_expr(), "avg_price")
        .filter(product::Column::RestaurantId.eq(restaurant_id))
        .into_tuple::<Option<f64>>()
        .one(db)
        .await?;
    Ok(avg.flatten())
}

/// Mean price of the products of every restaurant except `restaurant_id`,
/// `None` when there are none.
pub async fn average_price_excluding_restaurant<C>(
    db: &C,
    restaurant_id: i64,
) -> Result<Option<f64>>
where
    C: ConnectionTrait,
{
    let avg = Product::find()
        .select_only()
        .column_as(average_price_expr(), "avg_price")
        .filter(product::Column::RestaurantId.ne(restaurant_id))
        .into_tuple::<Option<f64>>()
        .one(db)
        .await?;
    Ok(avg.flatten())
}

/// Recomputes and stores the inexpensiveness flag of `restaurant_id`.
///
/// Returns `Some(flag)` with the stored value, or `None` when either average is
/// unavailable and the stored flag was left untouched.
///
/// # Errors
/// Returns an error if any of the queries fail.
#[instrument(skip(db))]
pub async fn recompute_inexpensiveness<C>(db: &C, restaurant_id: i64) -> Result<Option<bool>>
where
    C: ConnectionTrait,
{
    let avg_other = average_price_excluding_restaurant(db, restaurant_id).await?;
    let avg_self = average_price_of_restaurant(db, restaurant_id).await?;

    let (Some(avg_self), Some(avg_other)) = (avg_self, avg_other) else {
        debug!("Not enough products to classify, keeping stored flag");
        return Ok(None);
    };

    let is_inexpensive = avg_self < avg_other;
    Restaurant::update_many()
        .col_expr(restaurant::Column::IsInexpensive, Expr::value(is_inexpensive))
        .filter(restaurant::Column::Id.eq(restaurant_id))
        .exec(db)
        .await?;

    info!(avg_self, avg_other, is_inexpensive, "Restaurant reclassified");
    Ok(Some(is_inexpensive))
}

/// Reads the stored inexpensiveness flag.
///
/// # Errors
/// Returns `RestaurantNotFound` if the restaurant does not exist.
pub async fn is_inexpensive<C>(db: &C, restaurant_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    Restaurant::find_by_id(restaurant_id)
        .one(db)
        .await?
        .map(|r| r.is_inexpensive)
        .ok_or(Error::RestaurantNotFound { id: restaurant_id })
}
