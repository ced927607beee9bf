//! Message votes.

use sqlx::SqlitePool;

use crate::models::Vote;
use crate::Result;

/// Record an up or down vote; a second vote on the same message replaces
/// the first.
pub async fn vote_message(
    pool: &SqlitePool,
    chat_id: &str,
    message_id: &str,
    is_upvoted: bool,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO vote (chat_id, message_id, is_upvoted)
        VALUES (?, ?, ?)
        ON CONFLICT(chat_id, message_id) DO UPDATE SET
            is_upvoted = excluded.is_upvoted
        "#,
    )
    .bind(chat_id)
    .bind(message_id)
    .bind(is_upvoted)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_votes_by_chat(pool: &SqlitePool, chat_id: &str) -> Result<Vec<Vote>> {
    let votes = sqlx::query_as::<_, Vote>(
        r#"
        SELECT chat_id, message_id, is_upvoted
        FROM vote
        WHERE chat_id = ?
        "#,
    )
    .bind(chat_id)
    .fetch_all(pool)
    .await?;

    Ok(votes)
}
