use serde::Serialize;
use thiserror::Error;
use vitrine_core::Strategy;

/// Hard failures of the extractor. Malformed HTML is never one of them.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document is not valid UTF-8 text: {0}")]
    InvalidText(#[from] std::str::Utf8Error),
}

/// A problem recovered locally during extraction.
///
/// Issues never abort the cascade: the offending block or candidate is
/// skipped and lower-priority strategies still run. They are returned in the
/// [`crate::Extraction`] report for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionIssue {
    #[error("JSON-LD block {block} does not parse: {reason}")]
    MalformedStructuredData { block: usize, reason: String },

    #[error("hydration payload {marker} does not parse: {reason}")]
    MalformedHydrationPayload { marker: String, reason: String },

    #[error("reference \"{key}\" could not be resolved: {reason}")]
    UnresolvableReference { key: String, reason: String },

    #[error("{strategy} found {count} distinct prices; deferring")]
    AmbiguousPriceSet { strategy: Strategy, count: usize },
}
