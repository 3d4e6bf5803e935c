//! TOML configuration.
//!
//! Every section is optional; missing sections and fields take their
//! defaults, so an empty file is a valid configuration.

use crate::data::retry::RetryPolicy;
use crate::reference::{ReferenceError, ReferenceTables};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub yahoo: YahooConfig,
    pub reference: Option<ReferenceConfig>,
}

/// Batching and retry settings for the metadata fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub batch_size: usize,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

impl FetchConfig {
    pub fn batch_size(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.batch_size)
            .ok_or_else(|| ConfigError::Invalid("fetch.batch_size must be greater than 0".into()))
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "fetch.max_attempts must be greater than 0".into(),
            ));
        }
        Ok(RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
        })
    }
}

/// Yahoo Finance endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YahooConfig {
    pub base_url: String,
    pub cookie_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com".into(),
            cookie_url: "https://fc.yahoo.com".into(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
            timeout_secs: 30,
        }
    }
}

/// Replacement reference tables. All three maps must be given together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    pub sector_colors: BTreeMap<String, String>,
    pub country_labels: BTreeMap<String, String>,
    pub country_colors: BTreeMap<String, String>,
}

impl AppConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reference tables from the `[reference]` section, or the built-in ones.
    pub fn reference_tables(&self) -> Result<ReferenceTables, ConfigError> {
        match &self.reference {
            Some(r) => Ok(ReferenceTables::new(
                r.sector_colors.clone(),
                r.country_labels.clone(),
                r.country_colors.clone(),
            )?),
            None => Ok(ReferenceTables::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.fetch.batch_size().unwrap().get(), 50);
        assert_eq!(config.fetch.retry_policy().unwrap(), RetryPolicy::default());
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let config = AppConfig::from_toml(
            r#"
[fetch]
batch_size = 10

[yahoo]
timeout_secs = 5
"#,
        )
        .unwrap();
        assert_eq!(config.fetch.batch_size, 10);
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.yahoo.timeout_secs, 5);
        assert_eq!(config.yahoo.base_url, "https://query2.finance.yahoo.com");
    }

    #[test]
    fn zero_batch_size_is_invalid() {
        let config = AppConfig::from_toml("[fetch]\nbatch_size = 0\n").unwrap();
        assert!(matches!(
            config.fetch.batch_size(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn zero_attempts_is_invalid() {
        let config = AppConfig::from_toml("[fetch]\nmax_attempts = 0\n").unwrap();
        assert!(config.fetch.retry_policy().is_err());
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(
            AppConfig::from_toml("[fetch\nbatch_size = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn reference_section_replaces_builtin_tables() {
        let config = AppConfig::from_toml(
            r##"
[reference.sector_colors]
Energy = "#9467bd"

[reference.country_labels]
"^FTSE" = "FTSE (United Kingdom)"

[reference.country_colors]
"FTSE (United Kingdom)" = "#123456"
"##,
        )
        .unwrap();
        let tables = config.reference_tables().unwrap();
        assert_eq!(tables.sector_color("Energy"), Some("#9467bd"));
        assert_eq!(tables.sector_color("Technology"), None);
        assert_eq!(tables.country_color_for_ticker("^FTSE"), Some("#123456"));
    }

    #[test]
    fn inconsistent_reference_section_is_rejected() {
        let config = AppConfig::from_toml(
            r##"
[reference]
sector_colors = {}
country_labels = { "^FTSE" = "FTSE (United Kingdom)" }
country_colors = {}
"##,
        )
        .unwrap();
        assert!(matches!(
            config.reference_tables(),
            Err(ConfigError::Reference(_))
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = AppConfig::from_file(Path::new("/nonexistent/capscope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
