use dotenvy::dotenv;
use restaurant_products::{
    config::{
        catalog::{load_catalog, seed_catalog},
        database::{create_connection, create_tables},
        settings::Settings,
    },
    core::{popularity::top_products, reclassifier::Reclassifier, restaurant::list_restaurants},
    errors::Result,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Settings from the environment
    let settings = Settings::from_env().inspect_err(|e| error!("Invalid settings: {}", e))?;
    info!(?settings, "Settings loaded");

    // 4. Connect and make sure the schema exists
    let db = Arc::new(
        create_connection(&settings.database_url)
            .await
            .inspect_err(|e| error!("Failed to connect to database: {}", e))?,
    );
    create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    let reclassifier = Reclassifier::spawn(Arc::clone(&db));

    // 5. Seed the catalog when a file is present
    if settings.catalog_path.exists() {
        let catalog = load_catalog(&settings.catalog_path)?;
        seed_catalog(&db, &reclassifier, &catalog)
            .await
            .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
    } else {
        warn!(path = ?settings.catalog_path, "No catalog file, skipping seeding");
    }

    // 6. Let pending reclassifications finish before reporting
    let stats = reclassifier.shutdown().await;
    info!(processed = stats.processed, failed = stats.failed, "Reclassification done");

    for restaurant in list_restaurants(db.as_ref()).await? {
        info!(
            restaurant = %restaurant.name,
            is_inexpensive = restaurant.is_inexpensive,
            "Restaurant"
        );
    }

    for (rank, summary) in top_products(db.as_ref(), settings.popular_limit)
        .await?
        .iter()
        .enumerate()
    {
        info!(
            rank = rank + 1,
            product = %summary.product.name,
            restaurant = %summary.restaurant.name,
            sold = summary.sold_product_count,
            "Top product"
        );
    }

    Ok(())
}
