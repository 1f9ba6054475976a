//! Content-addressed cache key derivation.
//!
//! Every key is `{prefix}{digest}` or `{prefix}{digest}:{model}`, where the
//! digest is the hex-encoded SHA-256 of the canonical input bytes. Identical
//! input always yields the identical key; distinct inputs practically never
//! collide. Document uploads and model-echoed text are untrusted, so the
//! digest must come from a cryptographic hash, not a fast non-cryptographic
//! one.

use sha2::{Digest, Sha256};

/// Key prefix for cached parse results.
pub const DOCUMENT_PREFIX: &str = "doc_fp:";
/// Key prefix for cached embeddings.
pub const EMBEDDING_PREFIX: &str = "embed:";
/// Key prefix for cached model responses.
pub const INFERENCE_PREFIX: &str = "llm:";

/// Hex-encoded SHA-256 of a byte payload.
pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Digest of embedding input text. Surrounding whitespace does not change
/// the embedding, so it is stripped before hashing; case is preserved.
pub fn digest_text(text: &str) -> String {
    digest_bytes(text.trim().as_bytes())
}

/// Digest of a prompt/input pair, hashed as one concatenated stream.
pub fn digest_prompt_input(prompt: &str, input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn document_key(digest: &str) -> String {
    format!("{DOCUMENT_PREFIX}{digest}")
}

pub fn embedding_key(digest: &str, model: &str) -> String {
    format!("{EMBEDDING_PREFIX}{digest}:{model}")
}

pub fn inference_key(digest: &str, model: &str) -> String {
    format!("{INFERENCE_PREFIX}{digest}:{model}")
}
