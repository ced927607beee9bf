//! Message storage.
//!
//! Messages are never updated. History edits delete trailing messages and
//! append new ones.

use sqlx::SqlitePool;

use crate::models::Message;
use crate::Result;

/// Insert a batch of messages in one transaction.
pub async fn save_messages(pool: &SqlitePool, messages: &[Message]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for message in messages {
        sqlx::query(
            r#"
            INSERT INTO message (id, chat_id, role, content, user_id, tokens, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&message.id)
        .bind(&message.chat_id)
        .bind(&message.role)
        .bind(&message.content)
        .bind(&message.user_id)
        .bind(message.tokens)
        .bind(&message.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| crate::error::map_unique(e, "Message", &message.id))?;
    }

    tx.commit().await?;

    tracing::debug!(count = messages.len(), "Saved messages");
    Ok(())
}

/// Messages of a chat, newest first.
///
/// Rows with equal timestamps come back in reverse insertion order.
pub async fn get_messages_by_chat(pool: &SqlitePool, chat_id: &str) -> Result<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, chat_id, role, content, user_id, tokens, created_at
        FROM message
        WHERE chat_id = ?
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(chat_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

pub async fn get_message(pool: &SqlitePool, id: &str) -> Result<Option<Message>> {
    let message = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, chat_id, role, content, user_id, tokens, created_at
        FROM message
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(message)
}

/// Delete every message of a chat created strictly after `timestamp`, along
/// with votes on those messages. Returns the number of messages removed.
pub async fn delete_messages_after(
    pool: &SqlitePool,
    chat_id: &str,
    timestamp: &str,
) -> Result<u64> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM vote
        WHERE chat_id = ?
          AND message_id IN (
            SELECT id FROM message WHERE chat_id = ? AND created_at > ?
          )
        "#,
    )
    .bind(chat_id)
    .bind(chat_id)
    .bind(timestamp)
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query(
        r#"
        DELETE FROM message
        WHERE chat_id = ? AND created_at > ?
        "#,
    )
    .bind(chat_id)
    .bind(timestamp)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(result.rows_affected())
}
