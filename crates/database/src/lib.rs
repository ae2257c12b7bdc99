//! SQLite persistence layer for document collections and model comparisons.
//!
//! This crate owns the connection pool, the table layout with its cascade
//! rules, and async data-access functions for users, collections, documents,
//! chats, votes and the system settings row, using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{collection, user, Database, DatabaseConfig, NewUser};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and materialize the schema
//!     let db = Database::connect(&DatabaseConfig::from_env()?).await?;
//!     db.migrate().await?;
//!
//!     // One unit of work per request
//!     let mut uow = db.unit_of_work().await?;
//!     let owner = user::create_user(
//!         &mut uow,
//!         &NewUser {
//!             email: "ada@example.com".to_string(),
//!             hashed_password: "$argon2id$...".to_string(),
//!             is_admin: false,
//!         },
//!     )
//!     .await?;
//!     collection::create_collection(&mut uow, owner.id, "Papers").await?;
//!     uow.commit().await?;
//!
//!     db.close().await;
//!     Ok(())
//! }
//! ```

pub mod chat_history;
pub mod collection;
pub mod config;
pub mod document;
pub mod error;
pub mod models;
pub mod system_settings;
pub mod user;
pub mod validation;
pub mod vote;

pub use config::{Backend, DatabaseConfig};
pub use error::{DatabaseError, Result};
pub use models::{
    ChatHistory, Collection, Document, DocumentStatus, ModelResponses, NewChat, NewDocument,
    NewUser, ProviderKeys, SystemSettings, User, Vote,
};
pub use validation::ValidationError;

/// JSON column wrapper used by the entity types.
pub use sqlx::types::Json;

use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

/// Database connection wrapper.
///
/// Built once at process start and shared by reference (or cheap clone) with
/// every request handler.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect using a [`DatabaseConfig`].
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        match config.backend()? {
            Backend::Sqlite => {
                Self::connect_sqlite(&config.url, config.max_connections, config.acquire_timeout)
                    .await
            }
        }
    }

    /// Connect to a SQLite database with default pool settings.
    ///
    /// The URL should be in the format `sqlite://path/to/db.sqlite`; the file
    /// is created if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect_url("sqlite://./sql_app.db").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect_url("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect_url(url: &str) -> Result<Self> {
        Self::connect(&DatabaseConfig::new(url)).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let config = DatabaseConfig {
            max_connections: pool_size,
            ..DatabaseConfig::new(url)
        };
        Self::connect(&config).await
    }

    async fn connect_sqlite(url: &str, pool_size: u32, acquire_timeout: Duration) -> Result<Self> {
        // Cascading deletes depend on foreign key enforcement being on for
        // every pooled connection.
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Create every table and index that is not present yet.
    ///
    /// Safe to call on each process start; already-applied migrations are
    /// skipped. Do not run it concurrently with itself.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Begin a unit of work for one request.
    ///
    /// Writes become visible when [`UnitOfWork::commit`] is called. Dropping
    /// the unit of work on any other path rolls back and returns the
    /// connection to the pool.
    pub async fn unit_of_work(&self) -> Result<UnitOfWork> {
        let tx = self.pool.begin().await?;
        Ok(UnitOfWork { tx })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}

/// A request-scoped transaction drawn from the shared pool.
///
/// Dereferences to [`SqliteConnection`], so it can be passed to every
/// data-access function in this crate.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    /// Make the writes of this unit of work durable.
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Discard the writes of this unit of work.
    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

impl Deref for UnitOfWork {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}

impl DerefMut for UnitOfWork {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.tx
    }
}
