pub mod config;
pub mod extractor_config;
pub mod record;

use thiserror::Error;

pub use config::{load_extractor_config, load_extractor_config_from_env};
pub use extractor_config::ExtractorConfig;
pub use record::{Availability, Field, PriceQuote, ProductRecord, Strategy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
