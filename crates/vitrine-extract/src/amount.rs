//! Monetary amount parsing.
//!
//! Storefront text uses the Brazilian convention (`.` groups thousands, `,`
//! separates decimals) while machine-readable values (JSON numbers, `content`
//! attributes) usually use a plain decimal point. Every parser here returns
//! `None` rather than an error so one bad candidate never aborts a strategy.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;

/// A comma-decimal amount with no currency marker, e.g. `"1.299,00"`.
static COMMA_DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,3}(?:\.\d{3})+,\d{2}|\d+,\d{2})\b").expect("valid regex")
});

/// Builds the pattern for `marker`-prefixed amounts (`R$ 1.234,56`,
/// `R$99,9`, `R$ 1500`). Capture group 1 is the numeric token.
pub(crate) fn marked_amount_regex(marker: &str) -> Regex {
    let pattern = format!(
        r"{}\s*(\d{{1,3}}(?:\.\d{{3}})+(?:,\d{{1,2}})?|\d+(?:,\d{{1,2}})?)",
        regex::escape(marker)
    );
    Regex::new(&pattern).expect("escaped marker always compiles")
}

/// Parses a text amount using the locale rule: remove every `.`, then turn
/// `,` into the decimal point.
///
/// `"1.234,56"` is 1234.56, `"99,9"` is 99.9. Negative or non-numeric input
/// yields `None`.
#[must_use]
pub fn parse_locale_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if !trimmed.bytes().next().is_some_and(|b| b.is_ascii_digit()) {
        return None;
    }
    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || b == b'.' || b == b',')
    {
        return None;
    }

    let normalized: String = trimmed
        .chars()
        .filter(|&c| c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    Decimal::from_str(&normalized).ok()
}

/// Parses a machine-readable amount such as a `content` attribute or a JSON
/// string (`"149.90"`, `"BRL 149.90"`, `"149,90"`).
///
/// Anything before the first digit and after the last digit is ignored, so
/// currency prefixes and suffixes are tolerated. Values whose last separator
/// is a comma fall back to the locale rule, as do dotted values that are not a plain
/// decimal (`"1.234.567"`).
#[must_use]
pub fn parse_machine_amount(raw: &str) -> Option<Decimal> {
    let bytes = raw.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;
    let end = bytes.iter().rposition(u8::is_ascii_digit)? + 1;

    // A leading minus sign makes the value negative, which is never a price.
    if raw[..start].trim_end().ends_with('-') {
        return None;
    }

    let core = &raw[start..end];
    if core.contains(',') {
        // `1,299.00`: commas group thousands when a dot comes last.
        if core.rfind('.') > core.rfind(',') {
            return Decimal::from_str(&core.replace(',', "")).ok();
        }
        return parse_locale_amount(core);
    }
    Decimal::from_str(core)
        .ok()
        .or_else(|| parse_locale_amount(core))
}

/// Reads an amount from a JSON value: a number, a numeric string, or an
/// object carrying `lowPrice` / `value` / `amount` (price-range shapes).
#[must_use]
pub fn json_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
                .filter(|d| !d.is_sign_negative())
        }
        Value::String(s) => parse_machine_amount(s),
        Value::Object(map) => ["lowPrice", "value", "amount"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(|nested| match nested {
                Value::Number(_) | Value::String(_) => json_amount(nested),
                _ => None,
            }),
        _ => None,
    }
}

/// Keeps strictly positive amounts; a zero price is a placeholder, not a price.
pub(crate) fn positive(value: Decimal) -> Option<Decimal> {
    (value > Decimal::ZERO).then_some(value)
}

/// All `marker`-prefixed amounts in `text`, in order of appearance.
pub(crate) fn marked_amounts(marked: &Regex, text: &str) -> Vec<Decimal> {
    marked
        .captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .filter_map(|m| parse_locale_amount(m.as_str()))
        .collect()
}

/// The first amount in a short price label: a marker-prefixed amount if one
/// exists, else the first comma-decimal token. The flag reports whether the
/// currency marker was seen.
pub(crate) fn first_label_amount(marked: &Regex, text: &str) -> Option<(Decimal, bool)> {
    if let Some(value) = marked_amounts(marked, text).into_iter().next() {
        return Some((value, true));
    }
    COMMA_DECIMAL
        .captures(text)
        .and_then(|cap| cap.get(1))
        .and_then(|m| parse_locale_amount(m.as_str()))
        .map(|value| (value, false))
}

#[cfg(test)]
#[path = "amount_test.rs"]
mod tests;
