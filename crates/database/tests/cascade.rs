//! Ownership cascades across users, collections, documents, chats and votes.

use database::{
    chat_history, collection, document, user, vote, Database, DatabaseError, NewChat,
    NewDocument, NewUser,
};
use sqlx::SqliteConnection;

async fn test_db() -> Database {
    let db = Database::connect_with_pool_size("sqlite::memory:", 1)
        .await
        .unwrap();
    db.migrate().await.unwrap();
    db
}

async fn count(conn: &mut SqliteConnection, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&mut *conn)
        .await
        .unwrap()
}

struct Seeded {
    user_id: i64,
    collection_id: i64,
    chat_id: i64,
}

/// A user with one collection holding a document, a loose document, and a
/// voted chat.
async fn seed(conn: &mut SqliteConnection, email: &str, collection_name: &str) -> Seeded {
    let user_id = user::create_user(
        &mut *conn,
        &NewUser {
            email: email.to_string(),
            hashed_password: "hash".to_string(),
            is_admin: false,
        },
    )
    .await
    .unwrap()
    .id;

    let collection_id = collection::create_collection(&mut *conn, user_id, collection_name)
        .await
        .unwrap()
        .id;

    for target in [Some(collection_id), None] {
        document::create_document(
            &mut *conn,
            &NewDocument {
                filename: "paper.pdf".to_string(),
                file_type: Some("pdf".to_string()),
                user_id,
                collection_id: target,
            },
        )
        .await
        .unwrap();
    }

    let chat_id = chat_history::create_chat(
        &mut *conn,
        &NewChat {
            user_id,
            collection_id,
            question: "Which model explains it best?".to_string(),
            context: Some("supporting text".to_string()),
        },
    )
    .await
    .unwrap()
    .id;

    vote::cast_vote(&mut *conn, chat_id, user_id, "gemini-1.5-flash")
        .await
        .unwrap();

    Seeded {
        user_id,
        collection_id,
        chat_id,
    }
}

#[tokio::test]
async fn deleting_a_user_removes_everything_they_own() {
    let db = test_db().await;
    let mut uow = db.unit_of_work().await.unwrap();

    let doomed = seed(&mut uow, "doomed@example.com", "Mine").await;
    let survivor = seed(&mut uow, "survivor@example.com", "Theirs").await;
    uow.commit().await.unwrap();

    let mut uow = db.unit_of_work().await.unwrap();
    user::delete_user(&mut uow, doomed.user_id).await.unwrap();
    uow.commit().await.unwrap();

    let mut conn = db.pool().acquire().await.unwrap();
    assert_eq!(count(&mut conn, "users").await, 1);
    assert_eq!(count(&mut conn, "collections").await, 1);
    assert_eq!(count(&mut conn, "documents").await, 2);
    assert_eq!(count(&mut conn, "chat_history").await, 1);
    assert_eq!(count(&mut conn, "votes").await, 1);

    assert!(document::list_documents_for_user(&mut conn, doomed.user_id)
        .await
        .unwrap()
        .is_empty());
    assert!(matches!(
        chat_history::get_chat(&mut conn, doomed.chat_id).await,
        Err(DatabaseError::NotFound { .. })
    ));
    assert!(vote::get_vote_for_chat(&mut conn, survivor.chat_id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn deleting_a_collection_keeps_owner_and_siblings() {
    let db = test_db().await;
    let mut conn = db.pool().acquire().await.unwrap();

    let seeded = seed(&mut conn, "owner@example.com", "Doomed").await;
    let sibling = collection::create_collection(&mut conn, seeded.user_id, "Sibling")
        .await
        .unwrap();

    collection::delete_collection(&mut conn, seeded.collection_id)
        .await
        .unwrap();

    assert!(user::get_user(&mut conn, seeded.user_id).await.is_ok());
    assert_eq!(
        collection::list_collections_for_user(&mut conn, seeded.user_id)
            .await
            .unwrap(),
        vec![sibling]
    );
    assert!(document::list_documents_for_collection(&mut conn, seeded.collection_id)
        .await
        .unwrap()
        .is_empty());
    assert!(chat_history::list_chats_for_collection(&mut conn, seeded.collection_id)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(count(&mut conn, "votes").await, 0);

    // The document uploaded without a collection is still there.
    let remaining = document::list_documents_for_user(&mut conn, seeded.user_id)
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(remaining[0].collection_id.is_none());
}

#[tokio::test]
async fn deleting_a_chat_removes_its_vote() {
    let db = test_db().await;
    let mut conn = db.pool().acquire().await.unwrap();

    let seeded = seed(&mut conn, "owner@example.com", "Arena").await;
    chat_history::delete_chat(&mut conn, seeded.chat_id).await.unwrap();

    assert!(vote::get_vote_for_chat(&mut conn, seeded.chat_id)
        .await
        .unwrap()
        .is_none());
    assert!(collection::get_collection(&mut conn, seeded.collection_id)
        .await
        .is_ok());
}

#[tokio::test]
async fn deleting_a_voter_removes_their_vote_but_not_the_chat() {
    let db = test_db().await;
    let mut conn = db.pool().acquire().await.unwrap();

    let asker = user::create_user(
        &mut conn,
        &NewUser {
            email: "asker@example.com".to_string(),
            hashed_password: "hash".to_string(),
            is_admin: false,
        },
    )
    .await
    .unwrap();
    let voter = user::create_user(
        &mut conn,
        &NewUser {
            email: "voter@example.com".to_string(),
            hashed_password: "hash".to_string(),
            is_admin: false,
        },
    )
    .await
    .unwrap();

    let collection_id = collection::create_collection(&mut conn, asker.id, "Shared")
        .await
        .unwrap()
        .id;
    let chat_id = chat_history::create_chat(
        &mut conn,
        &NewChat {
            user_id: asker.id,
            collection_id,
            question: "Who answered best?".to_string(),
            context: None,
        },
    )
    .await
    .unwrap()
    .id;

    vote::cast_vote(&mut conn, chat_id, voter.id, "gpt-4o").await.unwrap();
    user::delete_user(&mut conn, voter.id).await.unwrap();

    assert!(vote::get_vote_for_chat(&mut conn, chat_id)
        .await
        .unwrap()
        .is_none());
    assert!(chat_history::get_chat(&mut conn, chat_id).await.is_ok());
    assert!(user::get_user(&mut conn, asker.id).await.is_ok());
}

#[tokio::test]
async fn rolled_back_delete_leaves_rows_in_place() {
    let db = test_db().await;

    let mut uow = db.unit_of_work().await.unwrap();
    let seeded = seed(&mut uow, "owner@example.com", "Kept").await;
    uow.commit().await.unwrap();

    {
        let mut uow = db.unit_of_work().await.unwrap();
        user::delete_user(&mut uow, seeded.user_id).await.unwrap();
        // Dropped without commit.
    }

    let mut conn = db.pool().acquire().await.unwrap();
    assert_eq!(count(&mut conn, "users").await, 1);
    assert_eq!(count(&mut conn, "documents").await, 2);
    assert_eq!(count(&mut conn, "votes").await, 1);
}
