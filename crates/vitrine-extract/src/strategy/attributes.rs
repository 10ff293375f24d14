//! Strategy 4: class/id/attribute-name heuristics and microdata.

use regex::Regex;
use rust_decimal::Decimal;
use scraper::ElementRef;
use vitrine_core::{Availability, ExtractorConfig, Strategy};

use super::heuristic::{count_prices, PriceCount};
use super::{ExtractionStrategy, PartialRecord};
use crate::amount::{first_label_amount, marked_amount_regex, parse_machine_amount, positive};
use crate::error::ExtractionIssue;
use crate::page::{collapse_whitespace, element_text, Page};

/// Case-insensitive fragments marking a price-bearing class, id, or
/// attribute name.
const PRICE_FRAGMENTS: [&str; 4] = ["price", "valor", "preco", "preço"];

/// Elements never inspected for class or attribute hints.
const SKIPPED_ELEMENTS: [&str; 8] = [
    "html", "head", "body", "script", "style", "noscript", "template", "title",
];

/// Longest label text read for an amount. Longer elements are containers
/// (whole product cards, page sections) rather than price labels.
const MAX_LABEL_LEN: usize = 120;

pub(crate) struct AttributeStrategy {
    marked: Regex,
    max_price_candidates: usize,
    default_currency: String,
}

impl AttributeStrategy {
    pub(crate) fn new(config: &ExtractorConfig) -> Self {
        Self {
            marked: marked_amount_regex(&config.currency_marker),
            max_price_candidates: config.max_price_candidates,
            default_currency: config.default_currency.clone(),
        }
    }

    /// The amount carried by a class/id/attribute-name hint on `element`.
    /// The flag reports whether the currency marker was seen.
    fn hinted_amount(&self, element: &ElementRef<'_>) -> Option<(Decimal, bool)> {
        let el = element.value();

        let attr_value = el.attrs().find_map(|(name, value)| {
            let name = name.to_lowercase();
            if name == "class" || name == "id" || !has_price_fragment(&name) {
                return None;
            }
            parse_machine_amount(value).map(|amount| (amount, false))
        });
        if attr_value.is_some() {
            return attr_value;
        }

        let hinted = ["class", "id"]
            .iter()
            .filter_map(|attr| el.attr(attr))
            .any(|value| has_price_fragment(&value.to_lowercase()));
        if !hinted {
            return None;
        }

        let text = element_text(element);
        if text.chars().count() > MAX_LABEL_LEN {
            return None;
        }
        first_label_amount(&self.marked, &text)
    }
}

impl ExtractionStrategy for AttributeStrategy {
    fn kind(&self) -> Strategy {
        Strategy::Attributes
    }

    fn try_extract(&self, page: &Page, issues: &mut Vec<ExtractionIssue>) -> PartialRecord {
        let mut partial = PartialRecord::default();
        let mut amounts: Vec<Decimal> = Vec::new();
        let mut marker_seen = false;

        for element in page.elements() {
            let el = element.value();
            if SKIPPED_ELEMENTS.contains(&el.name()) {
                continue;
            }

            if let Some(itemprop) = el.attr("itemprop") {
                let props: Vec<String> = itemprop
                    .split_whitespace()
                    .map(str::to_lowercase)
                    .collect();
                let mut handled_price = false;
                for prop in &props {
                    match prop.as_str() {
                        "price" => {
                            if let Some(amount) = microdata_amount(&self.marked, &element) {
                                amounts.push(amount.0);
                                marker_seen |= amount.1;
                            }
                            handled_price = true;
                        }
                        "name" if partial.name.is_none() && in_product_scope(&element) => {
                            partial.name = microdata_text(&element);
                        }
                        "brand" if partial.brand.is_none() && in_product_scope(&element) => {
                            partial.brand = microdata_brand(&element);
                        }
                        "pricecurrency" if partial.currency.is_none() => {
                            partial.currency =
                                microdata_text(&element).map(|c| c.to_uppercase());
                        }
                        "availability" if partial.availability.is_none() => {
                            partial.availability = el
                                .attr("href")
                                .or_else(|| el.attr("content"))
                                .map(str::to_string)
                                .or_else(|| Some(element_text(&element)))
                                .map(|label| Availability::from_label(&label));
                        }
                        _ => {}
                    }
                }
                if handled_price {
                    continue;
                }
            }

            if matches!(el.name(), "meta" | "link") {
                continue;
            }
            if let Some((amount, marked)) = self.hinted_amount(&element) {
                amounts.push(amount);
                marker_seen |= marked;
            }
        }

        let amounts: Vec<Decimal> = amounts.into_iter().filter_map(positive).collect();
        match count_prices(&amounts, self.max_price_candidates) {
            PriceCount::Empty => {}
            PriceCount::Quote(quote) => partial.quote = Some(quote),
            PriceCount::Ambiguous(count) => {
                tracing::debug!(count, "attribute price candidates are ambiguous");
                issues.push(ExtractionIssue::AmbiguousPriceSet {
                    strategy: Strategy::Attributes,
                    count,
                });
            }
        }

        if partial.currency.is_none() && marker_seen {
            partial.currency = Some(self.default_currency.clone());
        }
        partial
    }
}

fn has_price_fragment(lowercase: &str) -> bool {
    PRICE_FRAGMENTS.iter().any(|f| lowercase.contains(f))
}

/// `itemprop="price"`: the `content` attribute is machine-readable, the
/// element text is a display label.
fn microdata_amount(marked: &Regex, element: &ElementRef<'_>) -> Option<(Decimal, bool)> {
    if let Some(content) = element.value().attr("content") {
        return parse_machine_amount(content).map(|amount| (amount, false));
    }
    first_label_amount(marked, &element_text(element))
}

fn microdata_text(element: &ElementRef<'_>) -> Option<String> {
    element
        .value()
        .attr("content")
        .map(collapse_whitespace)
        .or_else(|| Some(element_text(element)))
        .filter(|s| !s.is_empty())
}

/// `itemprop="brand"` may hold the name directly or wrap a nested
/// `itemprop="name"` (a `Brand` item).
fn microdata_brand(element: &ElementRef<'_>) -> Option<String> {
    if let Some(content) = element.value().attr("content") {
        let cleaned = collapse_whitespace(content);
        return (!cleaned.is_empty()).then_some(cleaned);
    }
    let nested_name = element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|child| {
            child
                .value()
                .attr("itemprop")
                .is_some_and(|p| p.split_whitespace().any(|t| t.eq_ignore_ascii_case("name")))
        });
    match nested_name {
        Some(child) => microdata_text(&child),
        None => microdata_text(element),
    }
}

/// `true` when the nearest enclosing `itemscope` is a `Product`, or when
/// there is no enclosing scope at all.
fn in_product_scope(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().attr("itemscope").is_some())
        .is_none_or(|scope| {
            scope
                .value()
                .attr("itemtype")
                .is_some_and(|t| t.to_lowercase().contains("product"))
        })
}

#[cfg(test)]
#[path = "attributes_test.rs"]
mod tests;
