//! In-memory durable-store doubles for exercising the domain caches
//! without a database. Each mock records lookups and can be switched into
//! failure modes to drive the error-path contracts.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;

use pactum_cache::application::stores::{
    EmbeddingRecord, EmbeddingStore, FingerprintRecord, FingerprintStore, NewFingerprint,
    NewResponse, ResponseRecord, ResponseStore, StoreError,
};
use pactum_cache::domain::documents::{ParseOutcome, ParseStrategy, ParsedContract};
use pactum_cache::domain::inference::ModelResponse;

fn unavailable() -> StoreError {
    StoreError::Persistence("connection refused".to_string())
}

// ============================================================================
// Fingerprints
// ============================================================================

#[derive(Default)]
pub struct MockFingerprintStore {
    records: Mutex<HashMap<String, FingerprintRecord>>,
    pub lookups: AtomicUsize,
    fail_upserts: AtomicBool,
    fail_finds: AtomicBool,
    malformed_finds: AtomicBool,
}

impl MockFingerprintStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_finds(&self, fail: bool) {
        self.fail_finds.store(fail, Ordering::SeqCst);
    }

    /// Make every lookup report an unreadable record, as a schema drift
    /// would.
    pub fn malformed_finds(&self, malformed: bool) {
        self.malformed_finds.store(malformed, Ordering::SeqCst);
    }

    pub fn insert_record(&self, record: FingerprintRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.digest.clone(), record);
    }

    pub fn contains(&self, digest: &str) -> bool {
        self.records.lock().unwrap().contains_key(digest)
    }

    pub fn record(&self, digest: &str) -> Option<FingerprintRecord> {
        self.records.lock().unwrap().get(digest).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl FingerprintStore for MockFingerprintStore {
    async fn upsert(&self, record: NewFingerprint) -> Result<(), StoreError> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let stored = FingerprintRecord {
            digest: record.digest.clone(),
            contract: record.contract,
            strategy: record.strategy,
            completeness: record.completeness,
            warnings: record.warnings,
            created_at: OffsetDateTime::now_utc(),
            expires_at: record.expires_at,
        };
        self.records.lock().unwrap().insert(record.digest, stored);
        Ok(())
    }

    async fn find_by_digest(&self, digest: &str) -> Result<Option<FingerprintRecord>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_finds.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        if self.malformed_finds.load(Ordering::SeqCst) {
            return Err(StoreError::integrity("unknown parse strategy `v8`"));
        }
        Ok(self.records.lock().unwrap().get(digest).cloned())
    }

    async fn delete(&self, digest: &str) -> Result<(), StoreError> {
        self.records.lock().unwrap().remove(digest);
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut records = self.records.lock().unwrap();
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.records.lock().unwrap().len() as u64)
    }

    async fn count_expired(&self, now: OffsetDateTime) -> Result<u64, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.expires_at.is_some_and(|deadline| now > deadline))
            .count() as u64)
    }

    async fn delete_expired(&self, now: OffsetDateTime) -> Result<u64, StoreError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|_, r| !r.expires_at.is_some_and(|deadline| now > deadline));
        Ok((before - records.len()) as u64)
    }
}

// ============================================================================
// Embeddings
// ============================================================================

#[derive(Default)]
pub struct MockEmbeddingStore {
    records: Mutex<HashMap<(String, String), EmbeddingRecord>>,
    pub lookups: AtomicUsize,
    fail_upserts: AtomicBool,
}

impl MockEmbeddingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, digest: &str, model: &str) -> bool {
        self.records
            .lock()
            .unwrap()
            .contains_key(&(digest.to_string(), model.to_string()))
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl EmbeddingStore for MockEmbeddingStore {
    async fn upsert(&self, digest: &str, model: &str, vector: &[f32]) -> Result<(), StoreError> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let record = EmbeddingRecord {
            digest: digest.to_string(),
            model: model.to_string(),
            vector: vector.to_vec(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.records
            .lock()
            .unwrap()
            .insert((digest.to_string(), model.to_string()), record);
        Ok(())
    }

    async fn find_by_key(
        &self,
        digest: &str,
        model: &str,
    ) -> Result<Option<EmbeddingRecord>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(digest.to_string(), model.to_string()))
            .cloned())
    }

    async fn delete(&self, digest: &str, model: &str) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap()
            .remove(&(digest.to_string(), model.to_string()));
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut records = self.records.lock().unwrap();
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.records.lock().unwrap().len() as u64)
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Default)]
pub struct MockResponseStore {
    records: Mutex<HashMap<(String, String), ResponseRecord>>,
    pub lookups: AtomicUsize,
    fail_upserts: AtomicBool,
}

impl MockResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }

    pub fn insert_record(&self, record: ResponseRecord) {
        self.records
            .lock()
            .unwrap()
            .insert((record.digest.clone(), record.model.clone()), record);
    }

    pub fn contains(&self, digest: &str, model: &str) -> bool {
        self.records
            .lock()
            .unwrap()
            .contains_key(&(digest.to_string(), model.to_string()))
    }

    pub fn record(&self, digest: &str, model: &str) -> Option<ResponseRecord> {
        self.records
            .lock()
            .unwrap()
            .get(&(digest.to_string(), model.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl ResponseStore for MockResponseStore {
    async fn upsert(&self, record: NewResponse) -> Result<(), StoreError> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let stored = ResponseRecord {
            digest: record.digest.clone(),
            model: record.model.clone(),
            response: record.response,
            created_at: OffsetDateTime::now_utc(),
            expires_at: record.expires_at,
        };
        self.records
            .lock()
            .unwrap()
            .insert((record.digest, record.model), stored);
        Ok(())
    }

    async fn find_by_key(
        &self,
        digest: &str,
        model: &str,
    ) -> Result<Option<ResponseRecord>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(digest.to_string(), model.to_string()))
            .cloned())
    }

    async fn delete(&self, digest: &str, model: &str) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap()
            .remove(&(digest.to_string(), model.to_string()));
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut records = self.records.lock().unwrap();
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.records.lock().unwrap().len() as u64)
    }

    async fn count_expired(&self, now: OffsetDateTime) -> Result<u64, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.expires_at.is_some_and(|deadline| now > deadline))
            .count() as u64)
    }

    async fn delete_expired(&self, now: OffsetDateTime) -> Result<u64, StoreError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|_, r| !r.expires_at.is_some_and(|deadline| now > deadline));
        Ok((before - records.len()) as u64)
    }
}

// ============================================================================
// Sample payloads
// ============================================================================

pub fn sample_contract(title: &str) -> ParsedContract {
    ParsedContract {
        markdown: format!("# {title}\n\nThe parties agree as follows."),
        page_count: 12,
        table_count: 2,
        title: Some(title.to_string()),
        parties: vec!["Acme Corp".to_string(), "Initech LLC".to_string()],
        effective_date: None,
        expiration_date: None,
        contract_value: Some(250_000.0),
        currency: Some("USD".to_string()),
        governing_law: Some("Delaware".to_string()),
    }
}

pub fn sample_outcome(title: &str) -> ParseOutcome {
    ParseOutcome {
        contract: sample_contract(title),
        strategy: ParseStrategy::Hybrid,
        completeness: 0.85,
        warnings: vec!["expiration date not found".to_string()],
    }
}

pub fn sample_response(content: &str, model: &str) -> ModelResponse {
    ModelResponse {
        content: content.to_string(),
        model: model.to_string(),
        total_tokens: Some(412),
    }
}
