use async_trait::async_trait;
use sqlx::types::Json;
use time::OffsetDateTime;

use crate::application::stores::{NewResponse, ResponseRecord, ResponseStore, StoreError};
use crate::domain::inference::ModelResponse;

use super::{PostgresCacheStore, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct ResponseRow {
    digest: String,
    model: String,
    payload: Json<ModelResponse>,
    created_at: OffsetDateTime,
    expires_at: Option<OffsetDateTime>,
}

impl From<ResponseRow> for ResponseRecord {
    fn from(row: ResponseRow) -> Self {
        Self {
            digest: row.digest,
            model: row.model,
            response: row.payload.0,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

#[async_trait]
impl ResponseStore for PostgresCacheStore {
    async fn upsert(&self, record: NewResponse) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO model_responses (digest, model, payload, created_at, expires_at)
            VALUES ($1, $2, $3, now(), $4)
            ON CONFLICT (digest, model) DO UPDATE SET
                payload = EXCLUDED.payload,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(&record.digest)
        .bind(&record.model)
        .bind(Json(&record.response))
        .bind(record.expires_at)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_key(
        &self,
        digest: &str,
        model: &str,
    ) -> Result<Option<ResponseRecord>, StoreError> {
        let row = sqlx::query_as::<_, ResponseRow>(
            r#"
            SELECT digest, model, payload, created_at, expires_at
            FROM model_responses
            WHERE digest = $1 AND model = $2
            "#,
        )
        .bind(digest)
        .bind(model)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ResponseRecord::from))
    }

    async fn delete(&self, digest: &str, model: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM model_responses WHERE digest = $1 AND model = $2")
            .bind(digest)
            .bind(model)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM model_responses")
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM model_responses")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn count_expired(&self, now: OffsetDateTime) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM model_responses WHERE expires_at IS NOT NULL AND expires_at < $1",
        )
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn delete_expired(&self, now: OffsetDateTime) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "DELETE FROM model_responses WHERE expires_at IS NOT NULL AND expires_at < $1",
        )
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}
