//! Parsed contract documents and their parse metadata.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// How a document's text was obtained during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    /// Text extracted directly from the document's native layer.
    Native,
    /// Text recovered via OCR on page renders.
    Ocr,
    /// Native extraction with OCR fallback for image-only pages.
    Hybrid,
}

impl ParseStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseStrategy::Native => "native",
            ParseStrategy::Ocr => "ocr",
            ParseStrategy::Hybrid => "hybrid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "native" => Some(ParseStrategy::Native),
            "ocr" => Some(ParseStrategy::Ocr),
            "hybrid" => Some(ParseStrategy::Hybrid),
            _ => None,
        }
    }
}

/// Structured output of the document conversion pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedContract {
    /// Full document body converted to Markdown.
    pub markdown: String,
    pub page_count: i32,
    pub table_count: i32,
    pub title: Option<String>,
    pub parties: Vec<String>,
    pub effective_date: Option<Date>,
    pub expiration_date: Option<Date>,
    pub contract_value: Option<f64>,
    pub currency: Option<String>,
    pub governing_law: Option<String>,
}

/// A parse result as produced by the parsing pipeline, before caching.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub contract: ParsedContract,
    pub strategy: ParseStrategy,
    /// Share of expected contract fields that were extracted, in `[0, 1]`.
    pub completeness: f32,
    pub warnings: Vec<String>,
}

/// A parse result as served from the cache.
///
/// `parsed_at` is the only field not carried verbatim from [`ParseOutcome`]:
/// on a durable-tier backfill it is reconstructed from the stored record's
/// creation timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedDocument {
    pub contract: ParsedContract,
    pub strategy: ParseStrategy,
    pub completeness: f32,
    pub warnings: Vec<String>,
    pub parsed_at: OffsetDateTime,
}

impl CachedDocument {
    pub fn from_outcome(outcome: ParseOutcome, parsed_at: OffsetDateTime) -> Self {
        Self {
            contract: outcome.contract,
            strategy: outcome.strategy,
            completeness: outcome.completeness,
            warnings: outcome.warnings,
            parsed_at,
        }
    }
}
