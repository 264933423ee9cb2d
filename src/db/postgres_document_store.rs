use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::document_store::DocumentStore;

/// JSONB-backed store. Expects:
///
/// ```sql
/// CREATE TABLE documents (
///     collection  TEXT        NOT NULL,
///     id          UUID        NOT NULL,
///     data        JSONB       NOT NULL,
///     created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
///     updated_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
///     PRIMARY KEY (collection, id)
/// );
/// ```
pub struct PostgresDocumentStore {
    pub pool: PgPool,
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Value>, sqlx::Error> {
        sqlx::query_scalar::<_, Value>(
            r#"
            SELECT data
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list(
        &self,
        collection: &str,
        filter: Option<&Value>,
    ) -> Result<Vec<Value>, sqlx::Error> {
        let filter = filter
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));
        sqlx::query_scalar::<_, Value>(
            r#"
            SELECT data
            FROM documents
            WHERE collection = $1 AND data @> $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(collection)
        .bind(filter)
        .fetch_all(&self.pool)
        .await
    }

    async fn put(
        &self,
        collection: &str,
        id: Option<Uuid>,
        data: Value,
    ) -> Result<Uuid, sqlx::Error> {
        let id = id.unwrap_or_else(Uuid::new_v4);
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data, created_at, updated_at)
            VALUES ($1, $2, $3, now(), now())
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(data)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
