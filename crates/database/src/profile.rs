//! Profile storage.

use sqlx::SqlitePool;

use crate::models::Profile;
use crate::timestamp;
use crate::Result;

/// Get a profile by id.
pub async fn get_profile(pool: &SqlitePool, id: &str) -> Result<Option<Profile>> {
    let record = sqlx::query_as::<_, Profile>(
        r#"
        SELECT id, email, created_at
        FROM profile
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Make sure a profile exists for an authenticated user.
///
/// Creates it on first sight and keeps the email current afterwards.
pub async fn ensure_profile(pool: &SqlitePool, id: &str, email: &str) -> Result<Profile> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profile (id, email, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            email = excluded.email
        RETURNING id, email, created_at
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(timestamp::now())
    .fetch_one(pool)
    .await?;

    Ok(profile)
}
