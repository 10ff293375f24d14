//! Strategy 3: OpenGraph / product meta tags.

use vitrine_core::{Availability, Strategy};

use super::{quote_from, ExtractionStrategy, PartialRecord};
use crate::amount::{parse_machine_amount, positive};
use crate::error::ExtractionIssue;
use crate::page::Page;

const NAME_KEYS: [&str; 2] = ["og:title", "twitter:title"];
const BRAND_KEYS: [&str; 2] = ["product:brand", "og:brand"];
const PRICE_KEYS: [&str; 3] = [
    "product:sale_price:amount",
    "product:price:amount",
    "og:price:amount",
];
const LIST_PRICE_KEYS: [&str; 1] = ["product:original_price:amount"];
const CURRENCY_KEYS: [&str; 3] = [
    "product:sale_price:currency",
    "product:price:currency",
    "og:price:currency",
];
const AVAILABILITY_KEYS: [&str; 2] = ["product:availability", "og:availability"];

pub(crate) struct MetaTagStrategy;

impl ExtractionStrategy for MetaTagStrategy {
    fn kind(&self) -> Strategy {
        Strategy::MetaTags
    }

    fn try_extract(&self, page: &Page, _issues: &mut Vec<ExtractionIssue>) -> PartialRecord {
        let amount = |keys: &[&str]| {
            page.meta_content(keys)
                .as_deref()
                .and_then(parse_machine_amount)
                .and_then(positive)
        };

        PartialRecord {
            name: page.meta_content(&NAME_KEYS),
            brand: page.meta_content(&BRAND_KEYS),
            quote: quote_from(amount(&PRICE_KEYS), amount(&LIST_PRICE_KEYS)),
            currency: page
                .meta_content(&CURRENCY_KEYS)
                .map(|c| c.to_uppercase()),
            availability: page
                .meta_content(&AVAILABILITY_KEYS)
                .map(|label| Availability::from_label(&label)),
        }
    }
}
