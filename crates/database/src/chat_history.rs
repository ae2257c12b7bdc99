//! Chat history: questions, per-model answers and the selected answer.

use sqlx::types::Json;
use sqlx::SqliteConnection;

use crate::error::{DatabaseError, Result};
use crate::models::{ChatHistory, ModelResponses, NewChat};

/// Record a question asked against a collection.
pub async fn create_chat(conn: &mut SqliteConnection, chat: &NewChat) -> Result<ChatHistory> {
    let created = sqlx::query_as::<_, ChatHistory>(
        r#"
        INSERT INTO chat_history (user_id, collection_id, question, context)
        VALUES (?, ?, ?, ?)
        RETURNING id, user_id, collection_id, question, context, llm_responses,
                  final_answer, timestamp
        "#,
    )
    .bind(chat.user_id)
    .bind(chat.collection_id)
    .bind(&chat.question)
    .bind(&chat.context)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| DatabaseError::from_write(e, "ChatHistory", chat.collection_id.to_string()))?;

    tracing::debug!(
        chat_id = created.id,
        collection_id = chat.collection_id,
        "Recorded question"
    );
    Ok(created)
}

/// Get a chat record by ID.
pub async fn get_chat(conn: &mut SqliteConnection, id: i64) -> Result<ChatHistory> {
    sqlx::query_as::<_, ChatHistory>(
        r#"
        SELECT id, user_id, collection_id, question, context, llm_responses,
               final_answer, timestamp
        FROM chat_history
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "ChatHistory",
        id: id.to_string(),
    })
}

/// List the chats asked against a collection, oldest first.
pub async fn list_chats_for_collection(
    conn: &mut SqliteConnection,
    collection_id: i64,
) -> Result<Vec<ChatHistory>> {
    let rows = sqlx::query_as::<_, ChatHistory>(
        r#"
        SELECT id, user_id, collection_id, question, context, llm_responses,
               final_answer, timestamp
        FROM chat_history
        WHERE collection_id = ?
        ORDER BY timestamp, id
        "#,
    )
    .bind(collection_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

/// List a user's most recent chats across all collections.
pub async fn list_chats_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
    limit: i64,
) -> Result<Vec<ChatHistory>> {
    let rows = sqlx::query_as::<_, ChatHistory>(
        r#"
        SELECT id, user_id, collection_id, question, context, llm_responses,
               final_answer, timestamp
        FROM chat_history
        WHERE user_id = ?
        ORDER BY timestamp DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

/// Store the answers gathered from every model, replacing any earlier set.
pub async fn record_llm_responses(
    conn: &mut SqliteConnection,
    id: i64,
    responses: &ModelResponses,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE chat_history
        SET llm_responses = ?
        WHERE id = ?
        "#,
    )
    .bind(Json(responses))
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "ChatHistory",
            id: id.to_string(),
        });
    }

    tracing::debug!(chat_id = id, models = responses.len(), "Recorded model responses");
    Ok(())
}

/// Set the selected answer for a chat.
pub async fn set_final_answer(conn: &mut SqliteConnection, id: i64, answer: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE chat_history
        SET final_answer = ?
        WHERE id = ?
        "#,
    )
    .bind(answer)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "ChatHistory",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Delete a chat and its vote.
pub async fn delete_chat(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM chat_history
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "ChatHistory",
            id: id.to_string(),
        });
    }

    Ok(())
}
