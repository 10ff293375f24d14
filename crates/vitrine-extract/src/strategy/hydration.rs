//! Strategy 2: framework hydration payloads.
//!
//! Client-rendered storefronts embed their initial state in the page. The
//! shapes differ per platform (Next.js `__NEXT_DATA__`, Apollo caches, VTEX
//! `__STATE__` templates, `window.__INITIAL_STATE__` assignments), so fields
//! are found by a shape-agnostic key scan rather than fixed paths.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use vitrine_core::{Field, Strategy};

use super::{quote_from, ExtractionStrategy, PartialRecord};
use crate::amount::{json_amount, positive};
use crate::embed::assigned_json;
use crate::error::ExtractionIssue;
use crate::page::{collapse_whitespace, Page};
use crate::reference::ReferenceTable;

/// Script `id`s that mark a JSON state block.
const STATE_SCRIPT_IDS: [&str; 4] = [
    "__NEXT_DATA__",
    "__NUXT_DATA__",
    "__APOLLO_STATE__",
    "__STATE__",
];

const NAME_KEYS: [&str; 1] = ["productName"];
const BRAND_KEYS: [&str; 2] = ["brand", "brandName"];
const PRICE_KEYS: [&str; 1] = ["price"];
const SELLING_PRICE_KEYS: [&str; 1] = ["sellingPrice"];
const LIST_PRICE_KEYS: [&str; 1] = ["listPrice"];

/// `window.__FOO__ = `, `var __FOO__ = `, ... Group 1 is the global name.
static STATE_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\bwindow\.|\bself\.|\bglobalThis\.|\bvar\s+|\blet\s+|\bconst\s+)(__[A-Za-z0-9_]+__)\s*=",
    )
    .expect("valid regex")
});

/// One embedded state document, still unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HydrationPayload {
    /// The marker that identified it, e.g. `"__NEXT_DATA__"`.
    pub marker: String,
    pub json: String,
}

/// Finds every hydration payload on the page, in document order.
pub(crate) fn find_payloads(page: &Page) -> Vec<HydrationPayload> {
    let mut payloads = Vec::new();

    for script in page.scripts() {
        let el = script.value();
        if el
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
        {
            continue;
        }
        let text = script.text().collect::<String>();

        let tagged_marker = el
            .attr("id")
            .map(str::trim)
            .filter(|id| STATE_SCRIPT_IDS.contains(id))
            .or_else(|| {
                script.ancestors().find_map(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .and_then(|el| el.attr("data-varname"))
                        .map(str::trim)
                })
            });

        if let Some(marker) = tagged_marker {
            let json = text.trim().trim_end_matches(';').trim_end().to_string();
            if !json.is_empty() {
                payloads.push(HydrationPayload {
                    marker: marker.to_string(),
                    json,
                });
            }
            continue;
        }

        for cap in STATE_ASSIGNMENT.captures_iter(&text) {
            let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            if let Some(json) = assigned_json(&text[whole.end()..]) {
                payloads.push(HydrationPayload {
                    marker: name.as_str().to_string(),
                    json,
                });
            }
        }
    }

    payloads
}

pub(crate) struct HydrationStrategy {
    max_hops: usize,
}

impl HydrationStrategy {
    pub(crate) fn new(max_hops: usize) -> Self {
        Self { max_hops }
    }

    /// Fields found in one payload. A field in `stopped` is skipped; a field
    /// whose pointer cannot be resolved is added to it.
    fn payload_fields(
        &self,
        root: &Value,
        issues: &mut Vec<ExtractionIssue>,
        stopped: &mut BTreeSet<Field>,
    ) -> PartialRecord {
        let scan = KeyScan {
            table: ReferenceTable::from_payload(root),
            max_hops: self.max_hops,
        };

        let name = scan.field(Field::Name, root, &NAME_KEYS, issues, stopped, text_value);
        let brand = scan.field(Field::Brand, root, &BRAND_KEYS, issues, stopped, brand_value);
        let selling = scan
            .field(Field::Price, root, &SELLING_PRICE_KEYS, issues, stopped, price_value)
            .or_else(|| scan.field(Field::Price, root, &PRICE_KEYS, issues, stopped, price_value));
        let list = scan.field(Field::Price, root, &LIST_PRICE_KEYS, issues, stopped, price_value);

        PartialRecord {
            name,
            brand,
            quote: quote_from(selling, list),
            ..PartialRecord::default()
        }
    }
}

impl ExtractionStrategy for HydrationStrategy {
    fn kind(&self) -> Strategy {
        Strategy::Hydration
    }

    fn try_extract(&self, page: &Page, issues: &mut Vec<ExtractionIssue>) -> PartialRecord {
        let mut merged = PartialRecord::default();
        let mut stopped = BTreeSet::new();

        for payload in page.hydration_payloads() {
            let root: Value = match serde_json::from_str(&payload.json) {
                Ok(root) => root,
                Err(e) => {
                    issues.push(ExtractionIssue::MalformedHydrationPayload {
                        marker: payload.marker.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            tracing::debug!(marker = %payload.marker, "scanning hydration payload");
            merged.fill_from(self.payload_fields(&root, issues, &mut stopped));
        }

        merged
    }
}

/// Depth-first key search over one payload, resolving pointer values.
struct KeyScan<'a> {
    table: ReferenceTable<'a>,
    max_hops: usize,
}

/// Whether the scan should keep looking after visiting one node.
enum Visit<T> {
    Found(T),
    Continue,
    Stop,
}

impl<'a> KeyScan<'a> {
    /// The first value under any of `keys` (case-insensitive) that `accept`
    /// turns into a value for `field`.
    ///
    /// A pointer that cannot be resolved ends the search for `field` within
    /// this strategy: the issue is recorded, the field is marked stopped and
    /// stays empty, including for later payloads.
    fn field<T>(
        &self,
        field: Field,
        root: &'a Value,
        keys: &[&str],
        issues: &mut Vec<ExtractionIssue>,
        stopped: &mut BTreeSet<Field>,
        accept: fn(&Value) -> Option<T>,
    ) -> Option<T> {
        if stopped.contains(&field) {
            return None;
        }
        match self.visit(root, keys, issues, accept) {
            Visit::Found(value) => Some(value),
            Visit::Continue => None,
            Visit::Stop => {
                stopped.insert(field);
                None
            }
        }
    }

    fn visit<T>(
        &self,
        value: &'a Value,
        keys: &[&str],
        issues: &mut Vec<ExtractionIssue>,
        accept: fn(&Value) -> Option<T>,
    ) -> Visit<T> {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if keys.iter().any(|want| key.eq_ignore_ascii_case(want)) {
                        match self.table.resolve(child, self.max_hops) {
                            Ok(resolved) => {
                                if let Some(found) = accept(resolved) {
                                    return Visit::Found(found);
                                }
                            }
                            Err(e) => {
                                tracing::debug!(field = %key, error = %e, "unresolvable hydration reference");
                                issues.push(ExtractionIssue::UnresolvableReference {
                                    key: e.key().unwrap_or(key).to_string(),
                                    reason: e.to_string(),
                                });
                                return Visit::Stop;
                            }
                        }
                    }
                    match self.visit(child, keys, issues, accept) {
                        Visit::Continue => {}
                        done => return done,
                    }
                }
                Visit::Continue
            }
            Value::Array(items) => {
                for child in items {
                    match self.visit(child, keys, issues, accept) {
                        Visit::Continue => {}
                        done => return done,
                    }
                }
                Visit::Continue
            }
            _ => Visit::Continue,
        }
    }
}

fn text_value(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
}

/// A brand is a string or an object carrying `name` / `brandName`.
fn brand_value(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => text_value(value),
        Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("brandName"))
            .and_then(text_value),
        _ => None,
    }
}

fn price_value(value: &Value) -> Option<Decimal> {
    json_amount(value).and_then(positive)
}

#[cfg(test)]
#[path = "hydration_test.rs"]
mod tests;
