//! Historical price fetch across several tickers.

use super::provider::{DataError, TickerDataClient};
use super::table::{HistoricalRecord, HistoryTable};
use chrono::NaiveDate;

/// Fetch daily bars for every ticker over `[start, end)` into one table.
///
/// Rows are grouped by ticker in input order and tagged with their ticker.
/// There is no retry: the first failing ticker aborts the whole call and no
/// partial table is returned.
pub fn fetch_history(
    client: &dyn TickerDataClient,
    tickers: &[&str],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<HistoryTable, DataError> {
    if start >= end {
        return Err(DataError::InvalidRange { start, end });
    }

    tracing::info!(
        "fetching history for {} tickers from {} ({start}..{end})",
        tickers.len(),
        client.name()
    );

    let mut table = HistoryTable::new();
    for ticker in tickers {
        let bars = client.get_history(ticker, start, end)?;
        tracing::debug!("{ticker}: {} bars", bars.len());
        table.extend(bars.into_iter().map(|bar| HistoricalRecord {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            adj_close: bar.adj_close,
            volume: bar.volume,
            ticker: ticker.to_string(),
        }));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::{RawBar, TickerInfo};
    use std::sync::Mutex;

    struct OneBarClient {
        calls: Mutex<usize>,
        fail_on: Option<&'static str>,
    }

    impl TickerDataClient for OneBarClient {
        fn name(&self) -> &str {
            "one_bar"
        }

        fn get_info(&self, _ticker: &str) -> Result<TickerInfo, DataError> {
            Ok(TickerInfo::default())
        }

        fn get_history(
            &self,
            ticker: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<RawBar>, DataError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail_on == Some(ticker) {
                return Err(DataError::NetworkUnreachable("timeout".into()));
            }
            Ok(vec![RawBar {
                date: start,
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                adj_close: 1.5,
                volume: 10,
            }])
        }
    }

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        )
    }

    #[test]
    fn rows_are_tagged_with_ticker() {
        let client = OneBarClient {
            calls: Mutex::new(0),
            fail_on: None,
        };
        let (start, end) = range();
        let table = fetch_history(&client, &["A", "B"], start, end).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].ticker, "A");
        assert_eq!(table.rows()[1].ticker, "B");
        assert_eq!(table.rows()[0].date, start);
    }

    #[test]
    fn first_failure_aborts_without_retry() {
        let client = OneBarClient {
            calls: Mutex::new(0),
            fail_on: Some("B"),
        };
        let (start, end) = range();
        let err = fetch_history(&client, &["A", "B", "C"], start, end).unwrap_err();
        assert!(matches!(err, DataError::NetworkUnreachable(_)));
        assert_eq!(*client.calls.lock().unwrap(), 2);
    }

    #[test]
    fn empty_range_is_rejected() {
        let client = OneBarClient {
            calls: Mutex::new(0),
            fail_on: None,
        };
        let (start, _) = range();
        let err = fetch_history(&client, &["A"], start, start).unwrap_err();
        assert!(matches!(err, DataError::InvalidRange { .. }));
        assert_eq!(*client.calls.lock().unwrap(), 0);
    }
}
