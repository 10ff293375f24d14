//! Locating JSON values embedded in JavaScript source.

/// Returns the shortest prefix of `s` that forms a complete JSON object or
/// array, or `None` when `s` does not start with `{`/`[` or the value is
/// unterminated.
///
/// Scans character by character tracking bracket depth, respecting string
/// literals and escape sequences, so trailing statements such as
/// `; window.other = 1;` are left out.
pub(crate) fn extract_balanced(s: &str) -> Option<&str> {
    let close = match s.chars().next()? {
        '{' => '}',
        '[' => ']',
        _ => return None,
    };
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;
    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    // Only the matching bracket type closes the value, so
                    // malformed input like `[42}` is never accepted.
                    return (c == close).then(|| &s[..=i]);
                }
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    None
}

/// Returns the JSON text assigned by a statement tail such as
/// ` {"a":1};` or ` JSON.parse("{\"a\":1}")`.
///
/// For the `JSON.parse("…")` form the double-quoted string literal is
/// decoded, yielding the JSON document it carries.
pub(crate) fn assigned_json(tail: &str) -> Option<String> {
    let tail = tail.trim_start();
    if let Some(value) = extract_balanced(tail) {
        return Some(value.to_string());
    }

    let literal = tail.strip_prefix("JSON.parse(")?.trim_start();
    let end = string_literal_end(literal)?;
    serde_json::from_str::<String>(&literal[..end]).ok()
}

/// Byte length of the double-quoted string literal at the start of `s`,
/// including both quotes.
fn string_literal_end(s: &str) -> Option<usize> {
    if !s.starts_with('"') {
        return None;
    }
    let mut escape = false;
    for (i, c) in s.char_indices().skip(1) {
        if escape {
            escape = false;
            continue;
        }
        match c {
            '\\' => escape = true,
            '"' => return Some(i + 1),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_object_stops_at_matching_brace() {
        let s = r#"{"a":{"b":[1,2]}}; window.x = {};"#;
        assert_eq!(extract_balanced(s), Some(r#"{"a":{"b":[1,2]}}"#));
    }

    #[test]
    fn balanced_array() {
        assert_eq!(extract_balanced("[1,[2],3] trailing"), Some("[1,[2],3]"));
    }

    #[test]
    fn balanced_ignores_brackets_inside_strings() {
        let s = r#"{"name":"T\"ênis {azul}"} rest"#;
        assert_eq!(extract_balanced(s), Some(r#"{"name":"T\"ênis {azul}"}"#));
    }

    #[test]
    fn balanced_rejects_mismatched_close() {
        assert_eq!(extract_balanced("[42}"), None);
    }

    #[test]
    fn balanced_rejects_unterminated_and_non_json_start() {
        assert_eq!(extract_balanced(r#"{"a":1"#), None);
        assert_eq!(extract_balanced("function(){}"), None);
        assert_eq!(extract_balanced(""), None);
    }

    #[test]
    fn assigned_json_literal_object() {
        assert_eq!(
            assigned_json(r#"  {"a":1};"#).as_deref(),
            Some(r#"{"a":1}"#)
        );
    }

    #[test]
    fn assigned_json_decodes_json_parse_string() {
        let tail = r#" JSON.parse("{\"productName\":\"Camiseta\"}");"#;
        assert_eq!(
            assigned_json(tail).as_deref(),
            Some(r#"{"productName":"Camiseta"}"#)
        );
    }

    #[test]
    fn assigned_json_rejects_function_calls() {
        assert!(assigned_json(" (function(a){return a})(1);").is_none());
    }
}
