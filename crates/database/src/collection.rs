//! Collection storage.

use sqlx::SqliteConnection;

use crate::error::{DatabaseError, Result};
use crate::models::Collection;
use crate::validation::validate_name;

/// Create a collection owned by `user_id`.
pub async fn create_collection(
    conn: &mut SqliteConnection,
    user_id: i64,
    name: &str,
) -> Result<Collection> {
    validate_name("name", name)?;

    let collection = sqlx::query_as::<_, Collection>(
        r#"
        INSERT INTO collections (name, user_id)
        VALUES (?, ?)
        RETURNING id, name, user_id, created_at
        "#,
    )
    .bind(name.trim())
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| DatabaseError::from_write(e, "Collection", name))?;

    tracing::debug!(collection_id = collection.id, user_id, "Created collection");
    Ok(collection)
}

/// Get a collection by ID.
pub async fn get_collection(conn: &mut SqliteConnection, id: i64) -> Result<Collection> {
    sqlx::query_as::<_, Collection>(
        r#"
        SELECT id, name, user_id, created_at
        FROM collections
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Collection",
        id: id.to_string(),
    })
}

/// Get a collection only if `user_id` owns it.
///
/// Another user's collection is reported as not found.
pub async fn get_collection_for_user(
    conn: &mut SqliteConnection,
    id: i64,
    user_id: i64,
) -> Result<Collection> {
    sqlx::query_as::<_, Collection>(
        r#"
        SELECT id, name, user_id, created_at
        FROM collections
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Collection",
        id: id.to_string(),
    })
}

/// List a user's collections, newest first.
pub async fn list_collections_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<Collection>> {
    let rows = sqlx::query_as::<_, Collection>(
        r#"
        SELECT id, name, user_id, created_at
        FROM collections
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

/// Rename a collection.
pub async fn rename_collection(conn: &mut SqliteConnection, id: i64, name: &str) -> Result<()> {
    validate_name("name", name)?;

    let result = sqlx::query(
        r#"
        UPDATE collections
        SET name = ?
        WHERE id = ?
        "#,
    )
    .bind(name.trim())
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Collection",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Delete a collection.
///
/// Its documents, chats and their votes go with it. The owner and the
/// owner's other collections are untouched.
pub async fn delete_collection(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM collections
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Collection",
            id: id.to_string(),
        });
    }

    tracing::debug!(collection_id = id, "Deleted collection and its documents and chats");
    Ok(())
}
