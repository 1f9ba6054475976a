//! Verifies the cache paths emit the documented metric keys.

mod common;

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use serial_test::serial;

use pactum_cache::cache::{CacheConfig, DocumentCache, EmbeddingCache, MemoryStore};

use common::{MockEmbeddingStore, MockFingerprintStore, sample_outcome};

static SNAPSHOTTER: OnceLock<Snapshotter> = OnceLock::new();

fn snapshotter() -> &'static Snapshotter {
    SNAPSHOTTER.get_or_init(|| {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        recorder
            .install()
            .expect("debug metrics recorder should install in this test process");
        snapshotter
    })
}

fn counter_total(snapshotter: &Snapshotter, name: &str) -> u64 {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(composite_key, _, _, _)| composite_key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(count) => count,
            _ => 0,
        })
        .sum()
}

#[tokio::test]
#[serial]
async fn cache_paths_emit_expected_metric_keys() {
    let snapshotter = snapshotter();

    let config = CacheConfig::default();
    let memory = Arc::new(MemoryStore::new());

    // L1 hit, miss, and TTL eviction.
    let embeddings = Arc::new(MockEmbeddingStore::new());
    let cache = EmbeddingCache::new(
        Arc::clone(&memory),
        embeddings.clone(),
        &config,
    );
    cache.write("warranty clause", "m1", vec![1.0]).await;
    let _ = cache.read("warranty clause", "m1").await;
    let _ = cache.read("unknown clause", "m1").await; // L1 + L2 miss

    memory.set(
        "llm:short-lived",
        pactum_cache::cache::CachedValue::Embedding(vec![0.0]),
        Some(1),
    );
    tokio::time::sleep(Duration::from_millis(1200)).await;
    memory.sweep_expired();

    // L2 hit via backfill, and an absorbed write failure.
    let digest = EmbeddingCache::digest("warranty clause");
    memory.delete(&pactum_cache::cache::keys::embedding_key(&digest, "m1"));
    let _ = cache.read("warranty clause", "m1").await;

    let fingerprints = Arc::new(MockFingerprintStore::new());
    fingerprints.fail_upserts(true);
    let documents = DocumentCache::new(
        Arc::clone(&memory),
        fingerprints.clone(),
        &config,
    );
    documents.write(b"doomed write", sample_outcome("Doomed"), None).await;

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "pactum_cache_l1_hit_total",
        "pactum_cache_l1_miss_total",
        "pactum_cache_l1_expired_total",
        "pactum_cache_l2_hit_total",
        "pactum_cache_l2_miss_total",
        "pactum_cache_l2_write_error_total",
        "pactum_cache_l2_lookup_ms",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}

#[tokio::test]
#[serial]
async fn absorbed_write_failures_are_counted() {
    let snapshotter = snapshotter();
    let before = counter_total(snapshotter, "pactum_cache_l2_write_error_total");

    let memory = Arc::new(MemoryStore::new());
    let fingerprints = Arc::new(MockFingerprintStore::new());
    fingerprints.fail_upserts(true);
    let documents = DocumentCache::new(
        Arc::clone(&memory),
        fingerprints.clone(),
        &CacheConfig::default(),
    );

    documents.write(b"first failure", sample_outcome("F1"), None).await;
    documents.write(b"second failure", sample_outcome("F2"), None).await;

    let after = counter_total(snapshotter, "pactum_cache_l2_write_error_total");
    assert_eq!(after - before, 2);
}
