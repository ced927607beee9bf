//! Chat storage.

use sqlx::SqlitePool;

use crate::models::{Chat, Visibility};
use crate::timestamp;
use crate::Result;

/// Insert a new chat.
pub async fn save_chat(pool: &SqlitePool, chat: &Chat) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO chat (id, user_id, title, visibility, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&chat.id)
    .bind(&chat.user_id)
    .bind(&chat.title)
    .bind(chat.visibility)
    .bind(&chat.created_at)
    .bind(&chat.updated_at)
    .execute(pool)
    .await
    .map_err(|e| crate::error::map_unique(e, "Chat", &chat.id))?;

    Ok(())
}

/// Get a chat by id.
pub async fn get_chat(pool: &SqlitePool, id: &str) -> Result<Option<Chat>> {
    let chat = sqlx::query_as::<_, Chat>(
        r#"
        SELECT id, user_id, title, visibility, created_at, updated_at
        FROM chat
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(chat)
}

/// List a user's chats, newest first.
pub async fn list_chats_by_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<Chat>> {
    let chats = sqlx::query_as::<_, Chat>(
        r#"
        SELECT id, user_id, title, visibility, created_at, updated_at
        FROM chat
        WHERE user_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(chats)
}

/// Delete a chat together with its votes and messages.
///
/// Returns true if the chat existed.
pub async fn delete_chat(pool: &SqlitePool, id: &str) -> Result<bool> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM vote WHERE chat_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM message WHERE chat_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM chat WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}

/// Change who can see a chat. Returns false if the chat does not exist.
pub async fn update_chat_visibility(
    pool: &SqlitePool,
    id: &str,
    visibility: Visibility,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE chat
        SET visibility = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(visibility)
    .bind(timestamp::now())
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{profile, Database, DatabaseError};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        profile::ensure_profile(db.pool(), "u1", "u1@example.com")
            .await
            .unwrap();
        db
    }

    fn chat(id: &str, created_at: &str) -> Chat {
        Chat {
            id: id.to_string(),
            user_id: "u1".to_string(),
            title: format!("Chat {}", id),
            visibility: Visibility::Private,
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_and_get_chat() {
        let db = test_db().await;
        let c = chat("c1", "2026-01-01T00:00:00.000000Z");
        save_chat(db.pool(), &c).await.unwrap();

        assert_eq!(get_chat(db.pool(), "c1").await.unwrap(), Some(c.clone()));
        assert!(get_chat(db.pool(), "missing").await.unwrap().is_none());

        let dup = save_chat(db.pool(), &c).await;
        assert!(matches!(dup, Err(DatabaseError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = test_db().await;
        save_chat(db.pool(), &chat("old", "2026-01-01T00:00:00.000000Z"))
            .await
            .unwrap();
        save_chat(db.pool(), &chat("new", "2026-01-02T00:00:00.000000Z"))
            .await
            .unwrap();

        let chats = list_chats_by_user(db.pool(), "u1").await.unwrap();
        let ids: Vec<_> = chats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["new", "old"]);
        assert!(list_chats_by_user(db.pool(), "u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_visibility() {
        let db = test_db().await;
        save_chat(db.pool(), &chat("c1", "2026-01-01T00:00:00.000000Z"))
            .await
            .unwrap();

        assert!(update_chat_visibility(db.pool(), "c1", Visibility::Public)
            .await
            .unwrap());
        let c = get_chat(db.pool(), "c1").await.unwrap().unwrap();
        assert_eq!(c.visibility, Visibility::Public);

        assert!(!update_chat_visibility(db.pool(), "nope", Visibility::Public)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_delete_chat() {
        let db = test_db().await;
        save_chat(db.pool(), &chat("c1", "2026-01-01T00:00:00.000000Z"))
            .await
            .unwrap();

        assert!(delete_chat(db.pool(), "c1").await.unwrap());
        assert!(get_chat(db.pool(), "c1").await.unwrap().is_none());
        assert!(!delete_chat(db.pool(), "c1").await.unwrap());
    }
}
