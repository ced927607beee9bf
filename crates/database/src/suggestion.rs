//! Suggestions made against document versions.

use sqlx::SqlitePool;

use crate::models::Suggestion;
use crate::Result;

/// Insert a batch of suggestions in one transaction.
pub async fn save_suggestions(pool: &SqlitePool, suggestions: &[Suggestion]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for suggestion in suggestions {
        sqlx::query(
            r#"
            INSERT INTO suggestion (
                id, document_id, document_created_at, original_text, suggested_text,
                description, is_resolved, user_id, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&suggestion.id)
        .bind(&suggestion.document_id)
        .bind(&suggestion.document_created_at)
        .bind(&suggestion.original_text)
        .bind(&suggestion.suggested_text)
        .bind(&suggestion.description)
        .bind(suggestion.is_resolved)
        .bind(&suggestion.user_id)
        .bind(&suggestion.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| crate::error::map_unique(e, "Suggestion", &suggestion.id))?;
    }

    tx.commit().await?;
    Ok(())
}

/// Suggestions for any version of a document, oldest first.
pub async fn get_suggestions_by_document(
    pool: &SqlitePool,
    document_id: &str,
) -> Result<Vec<Suggestion>> {
    let suggestions = sqlx::query_as::<_, Suggestion>(
        r#"
        SELECT id, document_id, document_created_at, original_text, suggested_text,
               description, is_resolved, user_id, created_at
        FROM suggestion
        WHERE document_id = ?
        ORDER BY created_at ASC
        "#,
    )
    .bind(document_id)
    .fetch_all(pool)
    .await?;

    Ok(suggestions)
}
