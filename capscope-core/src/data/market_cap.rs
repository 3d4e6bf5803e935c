//! Market-cap metadata fetch: per-ticker lookup and the batched, retried run.

use super::batch::{batch_count, batches};
use super::provider::{DataError, FetchProgress, TickerDataClient};
use super::retry::{retry_with_backoff, RetryOutcome, RetryPolicy, Sleeper};
use super::table::{MarketCapTable, TickerRecord};
use std::num::NonZeroUsize;

/// Fetch sector and market cap for each ticker, one client call per ticker.
///
/// Records come back in input order. The first client error aborts the call
/// and is returned as is.
pub fn fetch_market_cap(
    client: &dyn TickerDataClient,
    tickers: &[&str],
) -> Result<Vec<TickerRecord>, DataError> {
    let mut records = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let info = client.get_info(ticker)?;
        records.push(TickerRecord {
            ticker: ticker.to_string(),
            sector: info.sector,
            market_cap: info.market_cap,
        });
    }
    Ok(records)
}

/// Batch size and retry policy for a batched run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub batch_size: NonZeroUsize,
    pub retry: RetryPolicy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: NonZeroUsize::new(50).unwrap_or(NonZeroUsize::MIN),
            retry: RetryPolicy::default(),
        }
    }
}

/// A batch that failed every attempt and contributed no rows.
#[derive(Debug)]
pub struct FailedBatch {
    /// Zero-based position of the batch in the run.
    pub index: usize,
    pub tickers: Vec<String>,
    pub attempts: u32,
    pub last_error: DataError,
}

/// Outcome of a batched run: the rows that made it, and the batches that didn't.
#[derive(Debug, Default)]
pub struct MarketCapRun {
    pub table: MarketCapTable,
    pub failures: Vec<FailedBatch>,
}

impl MarketCapRun {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Tickers from every dropped batch, in run order.
    pub fn failed_tickers(&self) -> Vec<&str> {
        self.failures
            .iter()
            .flat_map(|f| f.tickers.iter().map(String::as_str))
            .collect()
    }
}

/// Fetch metadata for a large ticker list in batches, retrying failed batches.
///
/// Each batch is fetched with [`fetch_market_cap`] and retried as a whole
/// under `options.retry`. A batch that exhausts its attempts is dropped from
/// the table and recorded in [`MarketCapRun::failures`]; the run always
/// continues with the next batch.
pub fn download_batches_market_cap(
    client: &dyn TickerDataClient,
    tickers: &[&str],
    options: &BatchOptions,
    sleeper: &dyn Sleeper,
    progress: &dyn FetchProgress,
) -> MarketCapRun {
    let total = batch_count(tickers.len(), options.batch_size);
    let mut run = MarketCapRun::default();

    tracing::info!(
        "fetching market caps for {} tickers from {} in {} batches of up to {}",
        tickers.len(),
        client.name(),
        total,
        options.batch_size
    );
    progress.on_start(total);

    for (index, batch) in batches(tickers, options.batch_size).enumerate() {
        let label = format!("batch {}/{}", index + 1, total);
        let outcome = retry_with_backoff(&options.retry, sleeper, &label, || {
            fetch_market_cap(client, batch)
        });

        match outcome {
            RetryOutcome::Succeeded { value, attempts } => {
                tracing::debug!(
                    "{label} fetched {} records in {attempts} attempt(s)",
                    value.len()
                );
                run.table.extend(value);
                progress.on_batch_complete(index, total, true);
            }
            RetryOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                tracing::error!(
                    "{label} dropped after {attempts} attempts: {} ({last_error}); tickers: {}",
                    last_error.kind(),
                    batch.join(",")
                );
                run.failures.push(FailedBatch {
                    index,
                    tickers: batch.iter().map(|t| t.to_string()).collect(),
                    attempts,
                    last_error,
                });
                progress.on_batch_complete(index, total, false);
            }
        }
    }

    let failed = run.failures.len();
    progress.on_finish(total - failed, failed, total);
    run
}
