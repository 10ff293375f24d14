//! The cascading field extractor.

use serde::Serialize;
use vitrine_core::{ExtractorConfig, ProductRecord};

use crate::candidate::CandidateSet;
use crate::error::{ExtractError, ExtractionIssue};
use crate::page::Page;
use crate::strategy::{default_strategies, ExtractionStrategy};

/// Extracts a [`ProductRecord`] from product-page HTML by running every
/// strategy in priority order.
///
/// An extractor holds only its configuration and compiled patterns, so one
/// instance can be shared across threads and reused for any number of pages.
pub struct FieldExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

/// A record together with what was recovered from along the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub record: ProductRecord,
    /// Problems skipped over during the cascade, in the order they occurred.
    pub issues: Vec<ExtractionIssue>,
    /// Hydration markers detected on the page (`__NEXT_DATA__`, ...).
    pub hydration_markers: Vec<String>,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

impl FieldExtractor {
    #[must_use]
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            strategies: default_strategies(config),
        }
    }

    /// Runs the cascade and returns the record with its diagnostics.
    ///
    /// Strategies run until every field holds a confident value or the
    /// cascade is exhausted. Whichever strategies ran, each field is taken
    /// from the highest-priority one that produced it.
    #[must_use]
    pub fn run(&self, html: &str, source_url: &str) -> Extraction {
        let page = Page::parse(html);
        let mut candidates = CandidateSet::default();
        let mut issues = Vec::new();

        for strategy in &self.strategies {
            let kind = strategy.kind();
            let before = issues.len();
            let partial = strategy.try_extract(&page, &mut issues);
            for issue in &issues[before..] {
                tracing::debug!(source_url, strategy = %kind, %issue, "recovered extraction issue");
            }
            candidates.absorb(kind, partial);
            if candidates.is_complete() {
                tracing::debug!(source_url, strategy = %kind, "all fields resolved");
                break;
            }
        }

        let record = candidates.into_record(source_url);
        if record.price_suspect {
            tracing::warn!(
                source_url,
                list_price = ?record.list_price,
                selling_price = ?record.selling_price,
                "selling price exceeds list price"
            );
        }

        Extraction {
            record,
            issues,
            hydration_markers: page
                .hydration_payloads()
                .iter()
                .map(|payload| payload.marker.clone())
                .collect(),
        }
    }

    /// Extracts a record from `html`, fetched from `source_url`.
    ///
    /// Never fails: a page with nothing recognizable yields a record whose
    /// fields are all empty.
    #[must_use]
    pub fn extract(&self, html: &str, source_url: &str) -> ProductRecord {
        self.run(html, source_url).record
    }

    /// Like [`FieldExtractor::extract`] for a raw response body.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidText`] if `body` is not valid UTF-8.
    pub fn extract_bytes(&self, body: &[u8], source_url: &str) -> Result<ProductRecord, ExtractError> {
        let html = std::str::from_utf8(body)?;
        Ok(self.extract(html, source_url))
    }
}

/// Extracts a record with the default configuration.
#[must_use]
pub fn extract(html: &str, source_url: &str) -> ProductRecord {
    FieldExtractor::default().extract(html, source_url)
}

/// Extracts a record from a raw body with the default configuration.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidText`] if `body` is not valid UTF-8.
pub fn extract_bytes(body: &[u8], source_url: &str) -> Result<ProductRecord, ExtractError> {
    FieldExtractor::default().extract_bytes(body, source_url)
}

#[cfg(test)]
mod tests {
    use vitrine_core::{Field, Strategy};

    use super::*;

    #[test]
    fn extractor_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FieldExtractor>();
    }

    #[test]
    fn empty_document_gives_empty_record() {
        let extraction = FieldExtractor::default().run("", "https://loja.example/p/1");
        assert!(extraction.record.is_empty());
        assert!(extraction.issues.is_empty());
        assert!(extraction.hydration_markers.is_empty());
    }

    #[test]
    fn cascade_stops_once_complete() {
        let html = r#"<html><head><script type="application/ld+json">{
            "@type": "Product", "name": "Cafeteira", "brand": "Oster",
            "offers": {"price": "299.00", "priceCurrency": "BRL",
                       "availability": "https://schema.org/InStock"}
        }</script></head><body>
            <span class="price">R$ 10,00</span><span class="price">R$ 20,00</span>
            <span class="price">R$ 30,00</span>
        </body></html>"#;
        let extraction = FieldExtractor::default().run(html, "u");
        assert!(extraction.issues.is_empty(), "heuristics never ran");
        assert_eq!(
            extraction.record.source_of(Field::Price),
            Some(Strategy::StructuredData)
        );
    }

    #[test]
    fn reports_hydration_markers() {
        let html = r#"<script id="__NEXT_DATA__" type="application/json">{"props":{}}</script>"#;
        let extraction = FieldExtractor::default().run(html, "u");
        assert_eq!(extraction.hydration_markers, vec!["__NEXT_DATA__".to_string()]);
    }
}
