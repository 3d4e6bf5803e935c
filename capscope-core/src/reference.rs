//! Reference tables for the visualization layer.
//!
//! Sector colours, ticker → country labels, and country colours. Built once
//! and passed by reference to whatever renders the tables; never mutated.

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("country label '{label}' (ticker {ticker}) has no colour")]
    MissingCountryColor { ticker: String, label: String },

    #[error("sector '{0}' has no colour")]
    MissingSectorColor(String),
}

/// Sector name → hex colour, as used for Yahoo Finance sector names.
const SECTOR_COLORS: &[(&str, &str)] = &[
    ("Basic Materials", "#1f77b4"),
    ("Communication Services", "#ff7f0e"),
    ("Consumer Cyclical", "#2ca02c"),
    ("Consumer Defensive", "#d62728"),
    ("Energy", "#9467bd"),
    ("Financial Services", "#8c564b"),
    ("Healthcare", "#e377c2"),
    ("Industrials", "#7f7f7f"),
    ("Real Estate", "#bcbd22"),
    ("Technology", "#17becf"),
    ("Utilities", "#1f4e1f"),
];

/// Benchmark index ticker → country label.
const COUNTRY_LABELS: &[(&str, &str)] = &[
    ("^GSPC", "GSPC (United States)"),
    ("000001.SS", "SSE (China)"),
    ("^HSI", "HSI (Hong Kong)"),
    ("^AXJO", "AXJO (Australia)"),
    ("^NSEI", "NSEI (India)"),
    ("^GSPTSE", "GSPTSE (Canada)"),
    ("^GDAXI", "GDAXI (Germany)"),
    ("^FTSE", "FTSE (United Kingdom)"),
    ("^N225", "N225 (Japan)"),
    ("^MXX", "MXX (Mexico)"),
    ("^BVSP", "BVSP (Brazil)"),
];

/// Country label → hex colour.
const COUNTRY_COLORS: &[(&str, &str)] = &[
    ("GSPC (United States)", "#1f77b4"),
    ("SSE (China)", "#d62728"),
    ("HSI (Hong Kong)", "#ff7f0e"),
    ("AXJO (Australia)", "#2ca02c"),
    ("NSEI (India)", "#ff9896"),
    ("GSPTSE (Canada)", "#9467bd"),
    ("GDAXI (Germany)", "#8c564b"),
    ("FTSE (United Kingdom)", "#e377c2"),
    ("N225 (Japan)", "#7f7f7f"),
    ("MXX (Mexico)", "#bcbd22"),
    ("BVSP (Brazil)", "#17becf"),
];

/// Immutable colour and label lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTables {
    sector_colors: BTreeMap<String, String>,
    country_labels: BTreeMap<String, String>,
    country_colors: BTreeMap<String, String>,
}

impl ReferenceTables {
    /// Build tables from explicit maps, rejecting country labels without a colour.
    pub fn new(
        sector_colors: BTreeMap<String, String>,
        country_labels: BTreeMap<String, String>,
        country_colors: BTreeMap<String, String>,
    ) -> Result<Self, ReferenceError> {
        let tables = Self {
            sector_colors,
            country_labels,
            country_colors,
        };
        tables.validate()?;
        Ok(tables)
    }

    /// The built-in sector palette and world-index country labels.
    pub fn builtin() -> Self {
        Self {
            sector_colors: to_map(SECTOR_COLORS),
            country_labels: to_map(COUNTRY_LABELS),
            country_colors: to_map(COUNTRY_COLORS),
        }
    }

    /// Every country label must be a key of the country colour map.
    pub fn validate(&self) -> Result<(), ReferenceError> {
        for (ticker, label) in &self.country_labels {
            if !self.country_colors.contains_key(label) {
                return Err(ReferenceError::MissingCountryColor {
                    ticker: ticker.clone(),
                    label: label.clone(),
                });
            }
        }
        Ok(())
    }

    /// Every sector in `sectors` must resolve to a colour. There is no fallback colour.
    pub fn check_sectors<'a, I>(&self, sectors: I) -> Result<(), ReferenceError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for sector in sectors {
            if !self.sector_colors.contains_key(sector) {
                return Err(ReferenceError::MissingSectorColor(sector.to_string()));
            }
        }
        Ok(())
    }

    pub fn sector_color(&self, sector: &str) -> Option<&str> {
        self.sector_colors.get(sector).map(String::as_str)
    }

    pub fn country_label(&self, ticker: &str) -> Option<&str> {
        self.country_labels.get(ticker).map(String::as_str)
    }

    pub fn country_color(&self, label: &str) -> Option<&str> {
        self.country_colors.get(label).map(String::as_str)
    }

    /// Colour for a ticker via its country label.
    pub fn country_color_for_ticker(&self, ticker: &str) -> Option<&str> {
        self.country_label(ticker)
            .and_then(|label| self.country_color(label))
    }

    pub fn sector_colors(&self) -> &BTreeMap<String, String> {
        &self.sector_colors
    }

    pub fn country_labels(&self) -> &BTreeMap<String, String> {
        &self.country_labels
    }

    pub fn country_colors(&self) -> &BTreeMap<String, String> {
        &self.country_colors
    }
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
