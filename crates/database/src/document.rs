//! Document records. Status changes are driven by the ingestion pipeline.

use sqlx::SqliteConnection;

use crate::error::{DatabaseError, Result};
use crate::models::{Document, DocumentStatus, NewDocument};
use crate::validation::validate_name;

/// Insert a document in the `pending` state.
///
/// The filename is stored trimmed, like collection names.
pub async fn create_document(conn: &mut SqliteConnection, doc: &NewDocument) -> Result<Document> {
    validate_name("filename", &doc.filename)?;
    let filename = doc.filename.trim();

    let created = sqlx::query_as::<_, Document>(
        r#"
        INSERT INTO documents (filename, file_type, status, user_id, collection_id)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, filename, file_type, status, user_id, collection_id
        "#,
    )
    .bind(filename)
    .bind(&doc.file_type)
    .bind(DocumentStatus::default().as_str())
    .bind(doc.user_id)
    .bind(doc.collection_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| DatabaseError::from_write(e, "Document", filename))?;

    tracing::debug!(
        document_id = created.id,
        user_id = doc.user_id,
        collection_id = ?doc.collection_id,
        "Created document"
    );
    Ok(created)
}

/// Get a document by ID.
pub async fn get_document(conn: &mut SqliteConnection, id: i64) -> Result<Document> {
    sqlx::query_as::<_, Document>(
        r#"
        SELECT id, filename, file_type, status, user_id, collection_id
        FROM documents
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Document",
        id: id.to_string(),
    })
}

/// List every document a user uploaded, with or without a collection.
pub async fn list_documents_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<Document>> {
    let rows = sqlx::query_as::<_, Document>(
        r#"
        SELECT id, filename, file_type, status, user_id, collection_id
        FROM documents
        WHERE user_id = ?
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

/// List the documents in a collection.
pub async fn list_documents_for_collection(
    conn: &mut SqliteConnection,
    collection_id: i64,
) -> Result<Vec<Document>> {
    let rows = sqlx::query_as::<_, Document>(
        r#"
        SELECT id, filename, file_type, status, user_id, collection_id
        FROM documents
        WHERE collection_id = ?
        ORDER BY id
        "#,
    )
    .bind(collection_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

/// Move a document to a new ingestion status.
pub async fn update_document_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: DocumentStatus,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE documents
        SET status = ?
        WHERE id = ?
        "#,
    )
    .bind(status.as_str())
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Document",
            id: id.to_string(),
        });
    }

    tracing::debug!(document_id = id, status = %status, "Updated document status");
    Ok(())
}

/// Delete a document by ID.
pub async fn delete_document(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM documents
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Document",
            id: id.to_string(),
        });
    }

    Ok(())
}
