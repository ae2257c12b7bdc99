//! Database error types.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Foreign-key, not-null or check constraint rejected the write
    #[error("{entity} violates a storage constraint: {message}")]
    Constraint { entity: &'static str, message: String },

    /// Connection string names a backend this crate cannot open
    #[error("unsupported database backend: {0}")]
    UnsupportedBackend(String),

    /// Configuration value could not be parsed
    #[error("invalid value for {key}: {value}")]
    InvalidConfig { key: &'static str, value: String },

    /// Input rejected before it reached the store
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl DatabaseError {
    /// Translate a write error, mapping constraint failures onto typed variants.
    ///
    /// `id` names the conflicting key for unique violations.
    pub(crate) fn from_write(err: sqlx::Error, entity: &'static str, id: impl Into<String>) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity,
                    id: id.into(),
                };
            }
            if db_err.is_foreign_key_violation()
                || db_err.is_check_violation()
                || matches!(db_err.kind(), sqlx::error::ErrorKind::NotNullViolation)
            {
                return DatabaseError::Constraint {
                    entity,
                    message: db_err.message().to_string(),
                };
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
