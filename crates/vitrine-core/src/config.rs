use std::str::FromStr;

use rust_decimal::Decimal;

use crate::extractor_config::ExtractorConfig;
use crate::ConfigError;

/// Load extractor configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_extractor_config() -> Result<ExtractorConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_extractor_config_from_env()
}

/// Load extractor configuration from environment variables already in the process.
///
/// Unlike [`load_extractor_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_extractor_config_from_env() -> Result<ExtractorConfig, ConfigError> {
    build_extractor_config(|key| std::env::var(key))
}

/// Build extractor configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a plain `HashMap`.
fn build_extractor_config<F>(lookup: F) -> Result<ExtractorConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = ExtractorConfig::default();

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_positive_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        let Ok(raw) = lookup(var) else {
            return Ok(default);
        };
        let value = raw
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let non_empty = |var: &str, default: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(raw) if raw.trim().is_empty() => Err(invalid(var, "must not be empty".to_string())),
            Ok(raw) => Ok(raw.trim().to_string()),
            Err(_) => Ok(default.to_string()),
        }
    };

    let min_plausible_price = match lookup("VITRINE_MIN_PLAUSIBLE_PRICE") {
        Ok(raw) => {
            let value = Decimal::from_str(raw.trim())
                .map_err(|e| invalid("VITRINE_MIN_PLAUSIBLE_PRICE", e.to_string()))?;
            if value.is_sign_negative() {
                return Err(invalid(
                    "VITRINE_MIN_PLAUSIBLE_PRICE",
                    "must not be negative".to_string(),
                ));
            }
            value
        }
        Err(_) => defaults.min_plausible_price,
    };

    let max_price_candidates =
        parse_positive_usize("VITRINE_MAX_PRICE_CANDIDATES", defaults.max_price_candidates)?;
    let max_reference_hops =
        parse_positive_usize("VITRINE_MAX_REFERENCE_HOPS", defaults.max_reference_hops)?;
    let currency_marker = non_empty("VITRINE_CURRENCY_MARKER", &defaults.currency_marker)?;
    let default_currency = non_empty("VITRINE_DEFAULT_CURRENCY", &defaults.default_currency)?
        .to_uppercase();

    Ok(ExtractorConfig {
        min_plausible_price,
        max_price_candidates,
        max_reference_hops,
        currency_marker,
        default_currency,
    })
}

/// Log filter for binaries, from `VITRINE_LOG_LEVEL` (default `"info"`).
#[must_use]
pub fn log_level() -> String {
    std::env::var("VITRINE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
