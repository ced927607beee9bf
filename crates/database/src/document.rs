//! Versioned document storage.

use sqlx::SqlitePool;

use crate::models::Document;
use crate::Result;

/// Insert a document version.
pub async fn save_document(pool: &SqlitePool, document: &Document) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO document (id, created_at, title, content, kind, user_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&document.id)
    .bind(&document.created_at)
    .bind(&document.title)
    .bind(&document.content)
    .bind(document.kind)
    .bind(&document.user_id)
    .execute(pool)
    .await
    .map_err(|e| crate::error::map_unique(e, "Document", &document.id))?;

    tracing::debug!(id = %document.id, kind = document.kind.as_str(), "Saved document version");
    Ok(())
}

/// All versions of a document, oldest first.
pub async fn get_documents_by_id(pool: &SqlitePool, id: &str) -> Result<Vec<Document>> {
    let documents = sqlx::query_as::<_, Document>(
        r#"
        SELECT id, created_at, title, content, kind, user_id
        FROM document
        WHERE id = ?
        ORDER BY created_at ASC
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(documents)
}

/// The latest version of a document.
pub async fn get_document(pool: &SqlitePool, id: &str) -> Result<Option<Document>> {
    let document = sqlx::query_as::<_, Document>(
        r#"
        SELECT id, created_at, title, content, kind, user_id
        FROM document
        WHERE id = ?
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(document)
}

/// Drop every version newer than `timestamp`, together with the
/// suggestions made against those versions. Returns the number of versions
/// removed.
pub async fn delete_documents_after(pool: &SqlitePool, id: &str, timestamp: &str) -> Result<u64> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM suggestion
        WHERE document_id = ? AND document_created_at > ?
        "#,
    )
    .bind(id)
    .bind(timestamp)
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query(
        r#"
        DELETE FROM document
        WHERE id = ? AND created_at > ?
        "#,
    )
    .bind(id)
    .bind(timestamp)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentKind;
    use crate::{profile, Database};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        profile::ensure_profile(db.pool(), "u1", "u1@example.com")
            .await
            .unwrap();
        db
    }

    fn version(created_at: &str, content: &str) -> Document {
        Document {
            id: "d1".to_string(),
            created_at: created_at.to_string(),
            title: "Essay".to_string(),
            content: Some(content.to_string()),
            kind: DocumentKind::Text,
            user_id: "u1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_versions_and_latest() {
        let db = test_db().await;
        assert!(get_document(db.pool(), "d1").await.unwrap().is_none());

        save_document(db.pool(), &version("2026-01-01T00:00:01.000000Z", "v1"))
            .await
            .unwrap();
        save_document(db.pool(), &version("2026-01-01T00:00:02.000000Z", "v2"))
            .await
            .unwrap();

        let versions = get_documents_by_id(db.pool(), "d1").await.unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].content.as_deref(), Some("v1"));

        let latest = get_document(db.pool(), "d1").await.unwrap().unwrap();
        assert_eq!(latest.content.as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_same_version_twice_rejected() {
        let db = test_db().await;
        let doc = version("2026-01-01T00:00:01.000000Z", "v1");
        save_document(db.pool(), &doc).await.unwrap();
        assert!(save_document(db.pool(), &doc).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_after_timestamp() {
        let db = test_db().await;
        for (ts, content) in [
            ("2026-01-01T00:00:01.000000Z", "v1"),
            ("2026-01-01T00:00:02.000000Z", "v2"),
            ("2026-01-01T00:00:03.000000Z", "v3"),
        ] {
            save_document(db.pool(), &version(ts, content)).await.unwrap();
        }

        let removed = delete_documents_after(db.pool(), "d1", "2026-01-01T00:00:01.000000Z")
            .await
            .unwrap();
        assert_eq!(removed, 2);

        let latest = get_document(db.pool(), "d1").await.unwrap().unwrap();
        assert_eq!(latest.content.as_deref(), Some("v1"));
    }
}
