use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tunable thresholds for the product field extractor.
///
/// The defaults are the values most storefront variants agree on; every one
/// of them can be overridden through `VITRINE_*` environment variables (see
/// [`crate::config::load_extractor_config`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Raw-text amounts below this are treated as noise (quantities,
    /// weights, installment counts).
    pub min_plausible_price: Decimal,
    /// Largest number of distinct amounts a heuristic pass may find before
    /// the set is considered ambiguous.
    pub max_price_candidates: usize,
    /// Maximum indirection hops followed inside a hydration cache.
    pub max_reference_hops: usize,
    /// Currency marker that prefixes amounts in page text.
    pub currency_marker: String,
    /// Currency code inferred when `currency_marker` is observed.
    pub default_currency: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_plausible_price: Decimal::TEN,
            max_price_candidates: 2,
            max_reference_hops: 3,
            currency_marker: "R$".to_string(),
            default_currency: "BRL".to_string(),
        }
    }
}
