//! Model inference outputs.

use serde::{Deserialize, Serialize};

/// A completed model invocation as cached and served to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The model's textual output.
    pub content: String,
    /// Identifier of the model that produced the output.
    pub model: String,
    /// Total token usage reported by the provider, when available.
    pub total_tokens: Option<i32>,
}
