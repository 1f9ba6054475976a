use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::stores::{EmbeddingRecord, EmbeddingStore, StoreError};

use super::{PostgresCacheStore, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct EmbeddingRow {
    digest: String,
    model: String,
    vector: Vec<f32>,
    created_at: OffsetDateTime,
}

impl From<EmbeddingRow> for EmbeddingRecord {
    fn from(row: EmbeddingRow) -> Self {
        Self {
            digest: row.digest,
            model: row.model,
            vector: row.vector,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl EmbeddingStore for PostgresCacheStore {
    async fn upsert(&self, digest: &str, model: &str, vector: &[f32]) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO contract_embeddings (digest, model, vector, created_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (digest, model) DO UPDATE SET
                vector = EXCLUDED.vector,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(digest)
        .bind(model)
        .bind(vector)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_key(
        &self,
        digest: &str,
        model: &str,
    ) -> Result<Option<EmbeddingRecord>, StoreError> {
        let row = sqlx::query_as::<_, EmbeddingRow>(
            r#"
            SELECT digest, model, vector, created_at
            FROM contract_embeddings
            WHERE digest = $1 AND model = $2
            "#,
        )
        .bind(digest)
        .bind(model)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(EmbeddingRecord::from))
    }

    async fn delete(&self, digest: &str, model: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM contract_embeddings WHERE digest = $1 AND model = $2")
            .bind(digest)
            .bind(model)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM contract_embeddings")
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contract_embeddings")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(count as u64)
    }
}
