//! Ticker data client trait and structured error types.
//!
//! The TickerDataClient trait abstracts over the market-data source (Yahoo
//! Finance in production) so the fetch pipeline can be driven by a mock in
//! tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-ticker metadata. Either field is `None` when the provider omits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub sector: Option<String>,
    pub market_cap: Option<f64>,
}

/// Raw daily OHLCV bar from a data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("invalid date range: start {start} is not before end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Short, stable name of the error variant, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NetworkUnreachable(_) => "NetworkUnreachable",
            Self::RateLimited { .. } => "RateLimited",
            Self::ResponseFormatChanged(_) => "ResponseFormatChanged",
            Self::AuthenticationRequired(_) => "AuthenticationRequired",
            Self::SymbolNotFound { .. } => "SymbolNotFound",
            Self::InvalidRange { .. } => "InvalidRange",
            Self::Other(_) => "Other",
        }
    }
}

/// A market-data source that answers one ticker at a time.
///
/// There is no bulk endpoint: callers issue one `get_info` or `get_history`
/// per ticker. Implementations must not retry internally; retry policy
/// belongs to the caller.
pub trait TickerDataClient: Send + Sync {
    /// Human-readable name of this client.
    fn name(&self) -> &str;

    /// Fetch sector and market capitalization for a ticker.
    fn get_info(&self, ticker: &str) -> Result<TickerInfo, DataError>;

    /// Fetch daily bars for a ticker over `[start, end)`.
    fn get_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError>;
}

/// Batch-level progress sink for multi-batch fetch runs. Purely observational.
pub trait FetchProgress {
    /// Called once before the first batch.
    fn on_start(&self, total_batches: usize);

    /// Called when a batch finishes, successfully or not.
    fn on_batch_complete(&self, index: usize, total_batches: usize, succeeded: bool);

    /// Called once after the last batch.
    fn on_finish(&self, succeeded: usize, failed: usize, total_batches: usize);
}

/// Progress sink that reports nothing.
pub struct NoProgress;

impl FetchProgress for NoProgress {
    fn on_start(&self, _total_batches: usize) {}

    fn on_batch_complete(&self, _index: usize, _total_batches: usize, _succeeded: bool) {}

    fn on_finish(&self, _succeeded: usize, _failed: usize, _total_batches: usize) {}
}

/// Progress sink that reports through `tracing`.
pub struct LogProgress;

impl FetchProgress for LogProgress {
    fn on_start(&self, total_batches: usize) {
        tracing::info!("fetching {total_batches} batches");
    }

    fn on_batch_complete(&self, index: usize, total_batches: usize, succeeded: bool) {
        if succeeded {
            tracing::info!("[{}/{}] batch ok", index + 1, total_batches);
        } else {
            tracing::info!("[{}/{}] batch dropped", index + 1, total_batches);
        }
    }

    fn on_finish(&self, succeeded: usize, failed: usize, total_batches: usize) {
        tracing::info!(
            "fetch complete: {succeeded}/{total_batches} batches succeeded, {failed} dropped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_names_variant() {
        assert_eq!(DataError::Other("x".into()).kind(), "Other");
        assert_eq!(
            DataError::SymbolNotFound {
                symbol: "ZZZ".into()
            }
            .kind(),
            "SymbolNotFound"
        );
        assert_eq!(
            DataError::RateLimited {
                retry_after_secs: 5
            }
            .kind(),
            "RateLimited"
        );
    }

    #[test]
    fn error_display_is_readable() {
        let err = DataError::SymbolNotFound {
            symbol: "ZZZ".into(),
        };
        assert_eq!(err.to_string(), "symbol not found: ZZZ");

        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = DataError::InvalidRange { start, end };
        assert!(err.to_string().contains("2024-02-01"));
    }
}
