//! Best-effort product field extraction from storefront HTML.
//!
//! [`FieldExtractor`] runs a fixed cascade of strategies over one page
//! (JSON-LD, hydration state, meta tags, attribute heuristics, raw text,
//! heading/title) and keeps, per field, the value from the highest-priority
//! strategy that found one.

pub mod amount;
mod candidate;
mod embed;
pub mod error;
pub mod extractor;
mod page;
mod reference;
mod strategy;

pub use error::{ExtractError, ExtractionIssue};
pub use extractor::{extract, extract_bytes, Extraction, FieldExtractor};
