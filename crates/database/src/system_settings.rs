//! The system settings row: provider API keys and the active model list.
//!
//! Keys are stored as an open provider → key mapping so a new provider needs
//! no schema change.

use sqlx::types::Json;
use sqlx::SqliteConnection;

use crate::models::{ProviderKeys, SystemSettings};
use crate::validation::validate_model_id;
use crate::Result;

/// Get the settings row, creating an empty one on first access.
pub async fn get_settings(conn: &mut SqliteConnection) -> Result<SystemSettings> {
    sqlx::query(
        r#"
        INSERT INTO system_settings (id)
        VALUES (?)
        ON CONFLICT(id) DO NOTHING
        "#,
    )
    .bind(SystemSettings::SINGLETON_ID)
    .execute(&mut *conn)
    .await?;

    let settings = sqlx::query_as::<_, SystemSettings>(
        r#"
        SELECT id, api_keys, active_models
        FROM system_settings
        WHERE id = ?
        "#,
    )
    .bind(SystemSettings::SINGLETON_ID)
    .fetch_one(&mut *conn)
    .await?;

    Ok(settings)
}

/// Overwrite the fields that are provided; `None` leaves a field as is.
///
/// A provided `api_keys` map replaces the stored map wholesale.
pub async fn update_settings(
    conn: &mut SqliteConnection,
    api_keys: Option<&ProviderKeys>,
    active_models: Option<&[String]>,
) -> Result<SystemSettings> {
    if let Some(models) = active_models {
        for model in models {
            validate_model_id(model)?;
        }
    }

    let current = get_settings(&mut *conn).await?;
    let api_keys = api_keys.unwrap_or(&current.api_keys.0);
    let active_models = active_models.unwrap_or(current.active_models.0.as_slice());

    let updated = sqlx::query_as::<_, SystemSettings>(
        r#"
        UPDATE system_settings
        SET api_keys = ?, active_models = ?
        WHERE id = ?
        RETURNING id, api_keys, active_models
        "#,
    )
    .bind(Json(api_keys))
    .bind(Json(active_models))
    .bind(SystemSettings::SINGLETON_ID)
    .fetch_one(&mut *conn)
    .await?;

    tracing::info!(
        providers = updated.api_keys.len(),
        active_models = updated.active_models.len(),
        "Updated system settings"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_first_read_creates_empty_singleton() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let settings = get_settings(&mut conn).await.unwrap();
        assert_eq!(settings.id, SystemSettings::SINGLETON_ID);
        assert!(settings.api_keys.is_empty());
        assert!(settings.active_models.is_empty());

        // Reading again does not add a row
        get_settings(&mut conn).await.unwrap();
        let rows = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM system_settings")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_partial_updates() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let mut keys = ProviderKeys::new();
        keys.insert("google".to_string(), "g-key".to_string());
        let models = vec!["gemini-1.5-flash".to_string(), "gemini-1.5-pro".to_string()];

        update_settings(&mut conn, Some(&keys), Some(models.as_slice())).await.unwrap();

        // A provider nobody has seen before is just another key.
        keys.insert("mistral".to_string(), "m-key".to_string());
        let updated = update_settings(&mut conn, Some(&keys), None).await.unwrap();
        assert_eq!(updated.api_keys.0, keys);
        assert_eq!(updated.active_models.0, models);

        let updated = update_settings(&mut conn, None, Some(Vec::new().as_slice())).await.unwrap();
        assert_eq!(updated.api_keys.0, keys);
        assert!(updated.active_models.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_model_leaves_settings_untouched() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let bad = vec!["".to_string()];
        assert!(update_settings(&mut conn, None, Some(bad.as_slice())).await.is_err());
        assert!(get_settings(&mut conn).await.unwrap().active_models.is_empty());
    }

    #[tokio::test]
    async fn test_singleton_enforced_by_table() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let raw = sqlx::query("INSERT INTO system_settings (id) VALUES (2)")
            .execute(&mut *conn)
            .await;
        assert!(raw.is_err());
    }
}
