use async_trait::async_trait;
use sqlx::types::Json;
use time::OffsetDateTime;

use crate::application::stores::{FingerprintRecord, FingerprintStore, NewFingerprint, StoreError};
use crate::domain::documents::{ParseStrategy, ParsedContract};

use super::{PostgresCacheStore, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct FingerprintRow {
    digest: String,
    payload: Json<ParsedContract>,
    strategy: String,
    completeness: f32,
    warnings: Vec<String>,
    created_at: OffsetDateTime,
    expires_at: Option<OffsetDateTime>,
}

impl TryFrom<FingerprintRow> for FingerprintRecord {
    type Error = StoreError;

    fn try_from(row: FingerprintRow) -> Result<Self, Self::Error> {
        let strategy = ParseStrategy::parse(&row.strategy).ok_or_else(|| {
            StoreError::integrity(format!(
                "unknown parse strategy `{}` for digest `{}`",
                row.strategy, row.digest
            ))
        })?;

        Ok(Self {
            digest: row.digest,
            contract: row.payload.0,
            strategy,
            completeness: row.completeness,
            warnings: row.warnings,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}

#[async_trait]
impl FingerprintStore for PostgresCacheStore {
    async fn upsert(&self, record: NewFingerprint) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO document_fingerprints (
                digest, payload, strategy, completeness, warnings, created_at, expires_at
            ) VALUES ($1, $2, $3, $4, $5, now(), $6)
            ON CONFLICT (digest) DO UPDATE SET
                payload = EXCLUDED.payload,
                strategy = EXCLUDED.strategy,
                completeness = EXCLUDED.completeness,
                warnings = EXCLUDED.warnings,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(&record.digest)
        .bind(Json(&record.contract))
        .bind(record.strategy.as_str())
        .bind(record.completeness)
        .bind(&record.warnings)
        .bind(record.expires_at)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_digest(&self, digest: &str) -> Result<Option<FingerprintRecord>, StoreError> {
        let row = sqlx::query_as::<_, FingerprintRow>(
            r#"
            SELECT digest, payload, strategy, completeness, warnings, created_at, expires_at
            FROM document_fingerprints
            WHERE digest = $1
            "#,
        )
        .bind(digest)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(FingerprintRecord::try_from).transpose()
    }

    async fn delete(&self, digest: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM document_fingerprints WHERE digest = $1")
            .bind(digest)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM document_fingerprints")
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM document_fingerprints")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn count_expired(&self, now: OffsetDateTime) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM document_fingerprints WHERE expires_at IS NOT NULL AND expires_at < $1",
        )
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn delete_expired(&self, now: OffsetDateTime) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "DELETE FROM document_fingerprints WHERE expires_at IS NOT NULL AND expires_at < $1",
        )
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}
