//! Strategy 1: schema.org `Product` JSON-LD.

use serde_json::Value;
use vitrine_core::{Availability, Strategy};

use super::{quote_from, ExtractionStrategy, PartialRecord};
use crate::amount::{json_amount, positive};
use crate::error::ExtractionIssue;
use crate::page::{collapse_whitespace, Page};

/// `priceType` values marking a crossed-out original price.
const LIST_PRICE_TYPES: [&str; 2] = ["ListPrice", "StrikethroughPrice"];

pub(crate) struct StructuredDataStrategy;

impl ExtractionStrategy for StructuredDataStrategy {
    fn kind(&self) -> Strategy {
        Strategy::StructuredData
    }

    fn try_extract(&self, page: &Page, issues: &mut Vec<ExtractionIssue>) -> PartialRecord {
        let blocks = page.scripts().filter(|script| {
            script
                .value()
                .attr("type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
        });

        let mut parsed = Vec::new();
        for (block, script) in blocks.enumerate() {
            let raw = script.text().collect::<String>();
            match parse_block(&raw) {
                Ok(Some(value)) => parsed.push(value),
                Ok(None) => {}
                Err(e) => issues.push(ExtractionIssue::MalformedStructuredData {
                    block,
                    reason: e.to_string(),
                }),
            }
        }

        // A Product declared at block level describes the page itself; one
        // nested deeper (carousels, related items) is only used when no block
        // declares one. Fields it lacks stay empty rather than being borrowed
        // from another block.
        parsed
            .iter()
            .find_map(declared_product)
            .or_else(|| parsed.iter().find_map(find_product_node))
            .map(product_fields)
            .unwrap_or_default()
    }
}

/// Parses one JSON-LD block, tolerating HTML comment and CDATA wrappers and
/// raw control characters inside strings. Blank blocks yield `Ok(None)`.
fn parse_block(raw: &str) -> Result<Option<Value>, serde_json::Error> {
    let mut text = raw.trim();
    for (open, close) in [("<!--", "-->"), ("//<![CDATA[", "//]]>"), ("<![CDATA[", "]]>")] {
        if let Some(inner) = text.strip_prefix(open).and_then(|t| t.strip_suffix(close)) {
            text = inner.trim();
        }
    }
    let text = text.trim_end_matches(';').trim_end();
    if text.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str(text) {
        Ok(value) => Ok(Some(value)),
        Err(first_err) => {
            let cleaned: String = text
                .chars()
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect();
            serde_json::from_str(&cleaned)
                .map(Some)
                .map_err(|_| first_err)
        }
    }
}

/// A `Product` declared at block level: the block itself, a top-level array
/// item, a `@graph` member, or the `mainEntity` of a page node.
fn declared_product(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(map) => {
            if is_product_type(map.get("@type")) {
                return Some(value);
            }
            ["@graph", "mainEntity"]
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(declared_product)
        }
        Value::Array(items) => items.iter().find_map(declared_product),
        _ => None,
    }
}

/// Depth-first search for the first node whose `@type` is or contains
/// `Product`. Covers top-level objects, arrays, `@graph` containers and
/// products nested under `mainEntity`.
fn find_product_node(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(map) => {
            if is_product_type(map.get("@type")) {
                return Some(value);
            }
            map.values().find_map(find_product_node)
        }
        Value::Array(items) => items.iter().find_map(find_product_node),
        _ => None,
    }
}

fn is_product_type(node_type: Option<&Value>) -> bool {
    let matches = |s: &str| {
        let tail = s.rsplit('/').next().unwrap_or(s);
        tail.eq_ignore_ascii_case("Product")
    };
    match node_type {
        Some(Value::String(s)) => matches(s),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(matches),
        _ => false,
    }
}

fn product_fields(product: &Value) -> PartialRecord {
    let name = product
        .get("name")
        .and_then(Value::as_str)
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty());

    let brand = product.get("brand").and_then(brand_name);

    let mut fields = product
        .get("offers")
        .and_then(select_offer)
        .map(offer_fields)
        .unwrap_or_default();
    fields.name = name;
    fields.brand = brand;
    fields
}

/// `brand` may be a plain string, an object with `name`, or an array of
/// either.
fn brand_name(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.get("name").and_then(Value::as_str),
        Value::Array(items) => return items.iter().find_map(brand_name),
        _ => None,
    }?;
    let cleaned = collapse_whitespace(raw);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// The first offer that carries a price, or the first offer at all.
fn select_offer(offers: &Value) -> Option<&Value> {
    match offers {
        Value::Object(_) => Some(offers),
        Value::Array(items) => items
            .iter()
            .find(|o| o.get("price").or_else(|| o.get("lowPrice")).is_some())
            .or_else(|| items.first()),
        _ => None,
    }
}

/// Price, currency and availability from one offer.
fn offer_fields(offer: &Value) -> PartialRecord {
    let specs: Vec<&Value> = match offer.get("priceSpecification") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(spec @ Value::Object(_)) => vec![spec],
        _ => Vec::new(),
    };

    let is_list_spec = |spec: &&Value| {
        spec.get("priceType")
            .and_then(Value::as_str)
            .is_some_and(|t| {
                let tail = t.rsplit('/').next().unwrap_or(t);
                LIST_PRICE_TYPES.iter().any(|l| tail.eq_ignore_ascii_case(l))
            })
    };

    let selling = offer
        .get("price")
        .and_then(json_amount)
        .or_else(|| offer.get("lowPrice").and_then(json_amount))
        .or_else(|| {
            specs
                .iter()
                .copied()
                .filter(|s| !is_list_spec(s))
                .find_map(|s| s.get("price").and_then(json_amount))
        })
        .and_then(positive);

    let list = specs
        .iter()
        .copied()
        .filter(is_list_spec)
        .find_map(|s| s.get("price").and_then(json_amount))
        .and_then(positive);

    let currency = offer
        .get("priceCurrency")
        .and_then(Value::as_str)
        .or_else(|| {
            specs
                .iter()
                .find_map(|s| s.get("priceCurrency").and_then(Value::as_str))
        })
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty());

    let availability = offer
        .get("availability")
        .and_then(Value::as_str)
        .map(Availability::from_label);

    PartialRecord {
        quote: quote_from(selling, list),
        currency,
        availability,
        ..PartialRecord::default()
    }
}

#[cfg(test)]
#[path = "jsonld_test.rs"]
mod tests;
