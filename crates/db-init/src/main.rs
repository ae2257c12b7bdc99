//! Prepares the database for the API process.
//!
//! Reads `DATABASE_URL` (and the optional pool settings) from the
//! environment or a `.env` file, creates any missing tables, makes sure the
//! settings row exists, then closes the pool.

use database::{system_settings, user, Database, DatabaseConfig};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = DatabaseConfig::from_env()?;
    info!(url = %config.url, pool_size = config.max_connections, "Preparing database");

    let db = Database::connect(&config).await?;
    db.migrate().await?;

    let mut uow = db.unit_of_work().await?;
    let settings = system_settings::get_settings(&mut uow).await?;
    let users = user::count_users(&mut uow).await?;
    uow.commit().await?;

    info!(
        users,
        providers = settings.api_keys.len(),
        active_models = settings.active_models.len(),
        "Database ready"
    );

    db.close().await;
    Ok(())
}
