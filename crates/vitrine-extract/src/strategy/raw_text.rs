//! Strategy 5: currency-marker scan over the rendered text.

use regex::Regex;
use rust_decimal::Decimal;
use vitrine_core::{ExtractorConfig, Strategy};

use super::heuristic::{count_prices, PriceCount};
use super::{ExtractionStrategy, PartialRecord};
use crate::amount::{marked_amount_regex, marked_amounts};
use crate::error::ExtractionIssue;
use crate::page::Page;

pub(crate) struct RawTextStrategy {
    marked: Regex,
    min_plausible_price: Decimal,
    max_price_candidates: usize,
    default_currency: String,
}

impl RawTextStrategy {
    pub(crate) fn new(config: &ExtractorConfig) -> Self {
        Self {
            marked: marked_amount_regex(&config.currency_marker),
            min_plausible_price: config.min_plausible_price,
            max_price_candidates: config.max_price_candidates,
            default_currency: config.default_currency.clone(),
        }
    }
}

impl ExtractionStrategy for RawTextStrategy {
    fn kind(&self) -> Strategy {
        Strategy::RawText
    }

    fn try_extract(&self, page: &Page, issues: &mut Vec<ExtractionIssue>) -> PartialRecord {
        let found = marked_amounts(&self.marked, page.visible_text());
        if found.is_empty() {
            return PartialRecord::default();
        }

        // Below the threshold is noise: installment fractions, shipping fees.
        let plausible: Vec<Decimal> = found
            .into_iter()
            .filter(|amount| *amount >= self.min_plausible_price && *amount > Decimal::ZERO)
            .collect();

        let mut partial = PartialRecord {
            currency: Some(self.default_currency.clone()),
            ..PartialRecord::default()
        };
        match count_prices(&plausible, self.max_price_candidates) {
            PriceCount::Empty => {}
            PriceCount::Quote(quote) => partial.quote = Some(quote),
            PriceCount::Ambiguous(count) => {
                tracing::debug!(count, "raw text price candidates are ambiguous");
                issues.push(ExtractionIssue::AmbiguousPriceSet {
                    strategy: Strategy::RawText,
                    count,
                });
            }
        }
        partial
    }
}
