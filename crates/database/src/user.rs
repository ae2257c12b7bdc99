//! User CRUD operations.

use sqlx::SqliteConnection;

use crate::error::{DatabaseError, Result};
use crate::models::{NewUser, User};
use crate::validation::{normalize_email, validate_email};

/// Create a new user.
///
/// The email is stored in its normalized form, so addresses that differ only
/// in domain case collide. Fails with [`DatabaseError::AlreadyExists`] when
/// the email is taken.
pub async fn create_user(conn: &mut SqliteConnection, user: &NewUser) -> Result<User> {
    validate_email(&user.email)?;
    let email = normalize_email(&user.email);

    let created = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, hashed_password, is_admin)
        VALUES (?, ?, ?)
        RETURNING id, email, hashed_password, is_admin
        "#,
    )
    .bind(&email)
    .bind(&user.hashed_password)
    .bind(user.is_admin)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| DatabaseError::from_write(e, "User", email.as_str()))?;

    tracing::debug!(user_id = created.id, "Created user");
    Ok(created)
}

/// Get a user by ID.
pub async fn get_user(conn: &mut SqliteConnection, id: i64) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, hashed_password, is_admin
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// Get a user by email.
pub async fn get_user_by_email(conn: &mut SqliteConnection, email: &str) -> Result<User> {
    let email = normalize_email(email);
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, hashed_password, is_admin
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(&email)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: email.clone(),
    })
}

/// Grant or revoke admin rights.
pub async fn set_admin(conn: &mut SqliteConnection, id: i64, is_admin: bool) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET is_admin = ?
        WHERE id = ?
        "#,
    )
    .bind(is_admin)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Replace a user's password hash.
pub async fn update_password_hash(
    conn: &mut SqliteConnection,
    id: i64,
    hashed_password: &str,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET hashed_password = ?
        WHERE id = ?
        "#,
    )
    .bind(hashed_password)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Delete a user by ID.
///
/// The store cascades the delete to the user's collections, documents,
/// chats and votes.
pub async fn delete_user(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    tracing::debug!(user_id = id, "Deleted user and owned records");
    Ok(())
}

/// List all users.
pub async fn list_users(conn: &mut SqliteConnection) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, hashed_password, is_admin
        FROM users
        ORDER BY email
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(users)
}

/// Count total users.
pub async fn count_users(conn: &mut SqliteConnection) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users
        "#,
    )
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
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

    fn alice() -> NewUser {
        NewUser {
            email: "alice@example.com".to_string(),
            hashed_password: "$argon2id$v=19$hash".to_string(),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_user_crud() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        // Create
        let user = create_user(&mut conn, &alice()).await.unwrap();
        assert!(!user.is_admin);

        // Read
        let fetched = get_user(&mut conn, user.id).await.unwrap();
        assert_eq!(fetched.email, "alice@example.com");
        let by_email = get_user_by_email(&mut conn, "alice@example.com").await.unwrap();
        assert_eq!(by_email.id, user.id);

        // Update
        set_admin(&mut conn, user.id, true).await.unwrap();
        update_password_hash(&mut conn, user.id, "new-hash").await.unwrap();
        let fetched = get_user(&mut conn, user.id).await.unwrap();
        assert!(fetched.is_admin);
        assert_eq!(fetched.hashed_password, "new-hash");

        // List
        let users = list_users(&mut conn).await.unwrap();
        assert_eq!(users.len(), 1);

        // Delete
        delete_user(&mut conn, user.id).await.unwrap();
        let result = get_user(&mut conn, user.id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_by_store() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        create_user(&mut conn, &alice()).await.unwrap();

        // Bypass the data-access layer to show the constraint lives in the table.
        let raw = sqlx::query("INSERT INTO users (email, hashed_password) VALUES (?, ?)")
            .bind("alice@example.com")
            .bind("other")
            .execute(&mut *conn)
            .await
            .unwrap_err();
        assert!(matches!(raw, sqlx::Error::Database(ref e) if e.is_unique_violation()));

        let err = create_user(&mut conn, &alice()).await.unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::AlreadyExists { entity: "User", ref id } if id == "alice@example.com"
        ));
        assert_eq!(count_users(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_domain_case_does_not_create_second_account() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let first = create_user(
            &mut conn,
            &NewUser {
                email: "ada@example.com".to_string(),
                ..alice()
            },
        )
        .await
        .unwrap();

        let err = create_user(
            &mut conn,
            &NewUser {
                email: "ada@EXAMPLE.COM".to_string(),
                ..alice()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::AlreadyExists { entity: "User", ref id } if id == "ada@example.com"
        ));
        assert_eq!(count_users(&mut conn).await.unwrap(), 1);

        let found = get_user_by_email(&mut conn, " ada@Example.Com").await.unwrap();
        assert_eq!(found.id, first.id);
    }

    #[tokio::test]
    async fn test_create_user_rejects_malformed_email() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let bad = NewUser {
            email: "not-an-email".to_string(),
            ..alice()
        };
        let err = create_user(&mut conn, &bad).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
        assert_eq!(count_users(&mut conn).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_user_operations() {
        let db = test_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        assert!(matches!(
            set_admin(&mut conn, 42, true).await,
            Err(DatabaseError::NotFound { entity: "User", .. })
        ));
        assert!(matches!(
            delete_user(&mut conn, 42).await,
            Err(DatabaseError::NotFound { entity: "User", .. })
        ));
        assert!(matches!(
            get_user_by_email(&mut conn, "nobody@example.com").await,
            Err(DatabaseError::NotFound { .. })
        ));
    }
}
