//! Ticker universes — named groups of tickers.
//!
//! A universe is stored as a TOML file with one array per group:
//!
//! ```toml
//! [groups]
//! indices = ["^GSPC", "^FTSE"]
//! mega_caps = ["AAPL", "MSFT"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize universe: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unknown group '{0}'")]
    UnknownGroup(String),
}

/// Named ticker groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub groups: BTreeMap<String, Vec<String>>,
}

impl Universe {
    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|source| UniverseError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a universe from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize the universe to TOML.
    pub fn to_toml(&self) -> Result<String, UniverseError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// All tickers across all groups, groups in name order. A ticker listed in
    /// several groups appears once, at its first position.
    pub fn all_tickers(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.groups
            .values()
            .flat_map(|tickers| tickers.iter().map(|t| t.as_str()))
            .filter(|t| seen.insert(*t))
            .collect()
    }

    /// Tickers of one group.
    pub fn group_tickers(&self, group: &str) -> Result<&[String], UniverseError> {
        self.groups
            .get(group)
            .map(|v| v.as_slice())
            .ok_or_else(|| UniverseError::UnknownGroup(group.to_string()))
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(|s| s.as_str()).collect()
    }

    /// Total number of entries across groups, duplicates included.
    pub fn ticker_count(&self) -> usize {
        self.groups.values().map(|v| v.len()).sum()
    }

    /// World benchmark indices plus a handful of US large caps.
    pub fn default_world() -> Self {
        let mut groups = BTreeMap::new();

        groups.insert(
            "indices".into(),
            vec![
                "^GSPC", "000001.SS", "^HSI", "^AXJO", "^NSEI", "^GSPTSE", "^GDAXI", "^FTSE",
                "^N225", "^MXX", "^BVSP",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );

        groups.insert(
            "mega_caps".into(),
            vec![
                "AAPL", "MSFT", "NVDA", "GOOGL", "AMZN", "META", "BRK-B", "LLY", "JPM", "XOM",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );

        Self { groups }
    }
}
