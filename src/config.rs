//! Responder configuration
//!
//! Loaded from, in increasing priority:
//! - built-in defaults
//! - an optional TOML file (`responder.toml` unless a path is given)
//! - environment variables prefixed with `RESPONDER_`
//!   (e.g. `RESPONDER_THRESHOLD=0.4`, `RESPONDER_SHEET_ID=...`)

use std::{path::PathBuf, time::Duration};

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ResponderError, Result},
    vectorizer::evaluate::scoring::DEFAULT_THRESHOLD,
};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ResponderConfig {
    /// Similarity a match must strictly exceed
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Seconds between automatic corpus refreshes
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Google Sheet whose CSV export holds the trigger table
    #[serde(default)]
    pub sheet_id: Option<String>,

    /// Local CSV file holding the trigger table (takes precedence over `sheet_id`)
    #[serde(default)]
    pub csv_path: Option<PathBuf>,

    /// HTTP timeout for fetching the sheet
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Where the last good index is cached between runs
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_threshold() -> f64 { DEFAULT_THRESHOLD }
fn default_refresh_interval() -> u64 { 600 }
fn default_request_timeout() -> u64 { 30 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            refresh_interval_secs: default_refresh_interval(),
            sheet_id: None,
            csv_path: None,
            request_timeout_secs: default_request_timeout(),
            snapshot_path: None,
            log_level: default_log_level(),
        }
    }
}

impl ResponderConfig {
    /// Load from `responder.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from the given file (required when given) and the environment
    pub fn load_from(path: Option<&str>) -> Result<Self> {
        let file = match path {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name("responder").required(false),
        };
        let config = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("RESPONDER").try_parsing(true))
            .build()?;
        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.threshold) {
            return Err(ResponderError::Config {
                message: format!("threshold must be in [0, 1), got {}", self.threshold),
            });
        }
        if self.refresh_interval_secs == 0 {
            return Err(ResponderError::Config {
                message: "refresh_interval_secs must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
