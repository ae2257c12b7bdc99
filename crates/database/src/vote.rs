//! Votes on which model gave the best answer to a chat.
//!
//! The `votes.chat_id` column is unique, so a chat never has more than one
//! vote. [`cast_vote`] replaces an earlier vote; [`insert_vote`] refuses to.

use sqlx::SqliteConnection;

use crate::error::{DatabaseError, Result};
use crate::models::Vote;
use crate::validation::validate_model_id;

/// Record `winner` for a chat, replacing any earlier vote on it.
pub async fn cast_vote(
    conn: &mut SqliteConnection,
    chat_id: i64,
    user_id: i64,
    winner: &str,
) -> Result<Vote> {
    validate_model_id(winner)?;

    let vote = sqlx::query_as::<_, Vote>(
        r#"
        INSERT INTO votes (chat_id, winner, user_id)
        VALUES (?, ?, ?)
        ON CONFLICT(chat_id) DO UPDATE SET
            winner = excluded.winner,
            user_id = excluded.user_id
        RETURNING id, chat_id, winner, user_id
        "#,
    )
    .bind(chat_id)
    .bind(winner.trim())
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| DatabaseError::from_write(e, "Vote", chat_id.to_string()))?;

    tracing::debug!(chat_id, user_id, winner = %vote.winner, "Recorded vote");
    Ok(vote)
}

/// Record `winner` for a chat that has no vote yet.
///
/// Fails with [`DatabaseError::AlreadyExists`] if the chat was voted on.
pub async fn insert_vote(
    conn: &mut SqliteConnection,
    chat_id: i64,
    user_id: i64,
    winner: &str,
) -> Result<Vote> {
    validate_model_id(winner)?;

    let vote = sqlx::query_as::<_, Vote>(
        r#"
        INSERT INTO votes (chat_id, winner, user_id)
        VALUES (?, ?, ?)
        RETURNING id, chat_id, winner, user_id
        "#,
    )
    .bind(chat_id)
    .bind(winner.trim())
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| DatabaseError::from_write(e, "Vote", chat_id.to_string()))?;

    Ok(vote)
}

/// Get the vote cast on a chat, if any.
pub async fn get_vote_for_chat(conn: &mut SqliteConnection, chat_id: i64) -> Result<Option<Vote>> {
    let vote = sqlx::query_as::<_, Vote>(
        r#"
        SELECT id, chat_id, winner, user_id
        FROM votes
        WHERE chat_id = ?
        "#,
    )
    .bind(chat_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(vote)
}

/// Count wins per model id, most wins first.
pub async fn count_votes_by_winner(conn: &mut SqliteConnection) -> Result<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT winner, COUNT(*) as count
        FROM votes
        GROUP BY winner
        ORDER BY count DESC, winner
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}
