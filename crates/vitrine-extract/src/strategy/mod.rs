//! Extraction strategy implementations, one per source of product facts.

mod attributes;
mod fallback;
mod heuristic;
pub(crate) mod hydration;
mod jsonld;
mod meta;
mod raw_text;

use vitrine_core::{Availability, ExtractorConfig, PriceQuote, Strategy};

use crate::error::ExtractionIssue;
use crate::page::Page;

pub(crate) use attributes::AttributeStrategy;
pub(crate) use fallback::DocumentFallbackStrategy;
pub(crate) use hydration::HydrationStrategy;
pub(crate) use jsonld::StructuredDataStrategy;
pub(crate) use meta::MetaTagStrategy;
pub(crate) use raw_text::RawTextStrategy;

/// Whatever one strategy found on a page. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PartialRecord {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub quote: Option<PriceQuote>,
    pub currency: Option<String>,
    pub availability: Option<Availability>,
}

impl PartialRecord {
    /// Fills every empty field of `self` from `other`.
    pub(crate) fn fill_from(&mut self, other: PartialRecord) {
        if self.name.is_none() {
            self.name = other.name;
        }
        if self.brand.is_none() {
            self.brand = other.brand;
        }
        if self.quote.is_none() {
            self.quote = other.quote;
        }
        if self.currency.is_none() {
            self.currency = other.currency;
        }
        if self.availability.is_none() {
            self.availability = other.availability;
        }
    }
}

/// One way of reading product facts out of a page.
///
/// Implementations are stateless after construction and never fail: a
/// problem with one block or candidate is pushed onto `issues` and that input
/// is skipped.
pub(crate) trait ExtractionStrategy: Send + Sync {
    /// Which strategy this is; its rank is the strategy's priority.
    fn kind(&self) -> Strategy;

    fn try_extract(&self, page: &Page, issues: &mut Vec<ExtractionIssue>) -> PartialRecord;
}

/// The full cascade, highest priority first.
pub(crate) fn default_strategies(config: &ExtractorConfig) -> Vec<Box<dyn ExtractionStrategy>> {
    let mut strategies: Vec<Box<dyn ExtractionStrategy>> = vec![
        Box::new(StructuredDataStrategy),
        Box::new(HydrationStrategy::new(config.max_reference_hops)),
        Box::new(MetaTagStrategy),
        Box::new(AttributeStrategy::new(config)),
        Box::new(RawTextStrategy::new(config)),
        Box::new(DocumentFallbackStrategy),
    ];
    strategies.sort_by_key(|s| s.kind());
    strategies
}

/// Builds a quote from a selling price and an optional list price.
///
/// Equal prices are not a markdown, so the list price is dropped. A list
/// price with no selling price stands in as the only price.
pub(crate) fn quote_from(
    selling: Option<rust_decimal::Decimal>,
    list: Option<rust_decimal::Decimal>,
) -> Option<PriceQuote> {
    match (selling, list) {
        (Some(selling), Some(list)) if list != selling => {
            Some(PriceQuote::discounted(list, selling))
        }
        (Some(price), _) | (None, Some(price)) => Some(PriceQuote::single(price)),
        (None, None) => None,
    }
}
