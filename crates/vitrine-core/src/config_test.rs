use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_extractor_config_uses_defaults_when_env_is_empty() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_extractor_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg, ExtractorConfig::default());
    assert_eq!(cfg.min_plausible_price, Decimal::TEN);
    assert_eq!(cfg.max_price_candidates, 2);
    assert_eq!(cfg.max_reference_hops, 3);
    assert_eq!(cfg.currency_marker, "R$");
    assert_eq!(cfg.default_currency, "BRL");
}

#[test]
fn min_plausible_price_override() {
    let mut map = HashMap::new();
    map.insert("VITRINE_MIN_PLAUSIBLE_PRICE", "4.99");
    let cfg = build_extractor_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.min_plausible_price, Decimal::new(499, 2));
}

#[test]
fn min_plausible_price_invalid() {
    let mut map = HashMap::new();
    map.insert("VITRINE_MIN_PLAUSIBLE_PRICE", "ten");
    let result = build_extractor_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VITRINE_MIN_PLAUSIBLE_PRICE"),
        "expected InvalidEnvVar(VITRINE_MIN_PLAUSIBLE_PRICE), got: {result:?}"
    );
}

#[test]
fn min_plausible_price_negative_rejected() {
    let mut map = HashMap::new();
    map.insert("VITRINE_MIN_PLAUSIBLE_PRICE", "-1");
    let result = build_extractor_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref reason, .. }) if reason.contains("negative")),
        "expected negative rejection, got: {result:?}"
    );
}

#[test]
fn max_price_candidates_override() {
    let mut map = HashMap::new();
    map.insert("VITRINE_MAX_PRICE_CANDIDATES", "3");
    let cfg = build_extractor_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_price_candidates, 3);
}

#[test]
fn max_price_candidates_zero_rejected() {
    let mut map = HashMap::new();
    map.insert("VITRINE_MAX_PRICE_CANDIDATES", "0");
    let result = build_extractor_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VITRINE_MAX_PRICE_CANDIDATES"),
        "expected InvalidEnvVar(VITRINE_MAX_PRICE_CANDIDATES), got: {result:?}"
    );
}

#[test]
fn max_reference_hops_invalid() {
    let mut map = HashMap::new();
    map.insert("VITRINE_MAX_REFERENCE_HOPS", "not-a-number");
    let result = build_extractor_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VITRINE_MAX_REFERENCE_HOPS"),
        "expected InvalidEnvVar(VITRINE_MAX_REFERENCE_HOPS), got: {result:?}"
    );
}

#[test]
fn currency_overrides_are_trimmed_and_uppercased() {
    let mut map = HashMap::new();
    map.insert("VITRINE_CURRENCY_MARKER", " US$ ");
    map.insert("VITRINE_DEFAULT_CURRENCY", "usd");
    let cfg = build_extractor_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.currency_marker, "US$");
    assert_eq!(cfg.default_currency, "USD");
}

#[test]
fn empty_currency_marker_rejected() {
    let mut map = HashMap::new();
    map.insert("VITRINE_CURRENCY_MARKER", "  ");
    let result = build_extractor_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VITRINE_CURRENCY_MARKER"),
        "expected InvalidEnvVar(VITRINE_CURRENCY_MARKER), got: {result:?}"
    );
}
