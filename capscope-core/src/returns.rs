//! Return calculations: percentage change and compound annual growth rate.
//!
//! Results are percentages rounded to three decimals. Inputs outside the real
//! domain are reported as `ReturnError` rather than yielding inf or NaN.

use crate::data::table::HistoryTable;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

const DECIMALS: i32 = 3;
const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ReturnError {
    #[error("base price is zero")]
    ZeroBase,

    #[error("number of periods is zero")]
    ZeroPeriods,

    #[error("price ratio {0} is negative, growth rate is not real")]
    NegativeRatio(f64),
}

/// Percentage change from `t0` to `t1`: `((t1 - t0) / t0) * 100`.
pub fn ytd_return(t1: f64, t0: f64) -> Result<f64, ReturnError> {
    if t0 == 0.0 {
        return Err(ReturnError::ZeroBase);
    }
    Ok(round_to(((t1 - t0) / t0) * 100.0, DECIMALS))
}

/// Compound growth rate per period over `n` periods: `((t1 / t0)^(1/n) - 1) * 100`.
pub fn cagr(t1: f64, t0: f64, n: f64) -> Result<f64, ReturnError> {
    if t0 == 0.0 {
        return Err(ReturnError::ZeroBase);
    }
    if n == 0.0 {
        return Err(ReturnError::ZeroPeriods);
    }
    let ratio = t1 / t0;
    if ratio < 0.0 {
        return Err(ReturnError::NegativeRatio(ratio));
    }
    Ok(round_to((ratio.powf(1.0 / n) - 1.0) * 100.0, DECIMALS))
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Return of one ticker between the first and last close of a history table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReturn {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub first_close: f64,
    pub last_close: f64,
    /// Percentage change between the two closes.
    pub total_return: f64,
    /// Annualized over the elapsed calendar time; `None` for a single-day span.
    pub cagr: Option<f64>,
}

/// Per-ticker returns from the earliest to the latest valid close.
///
/// Tickers appear in order of first appearance; rows with a non-finite close
/// are ignored, and tickers without any valid close are left out.
pub fn period_returns(history: &HistoryTable) -> Result<Vec<PeriodReturn>, ReturnError> {
    // (ticker, (first date, first close), (last date, last close))
    let mut spans: Vec<(&str, (NaiveDate, f64), (NaiveDate, f64))> = Vec::new();

    for row in history.rows().iter().filter(|r| r.close.is_finite()) {
        let point = (row.date, row.close);
        match spans.iter_mut().find(|(t, _, _)| *t == row.ticker) {
            Some((_, first, last)) => {
                if point.0 < first.0 {
                    *first = point;
                }
                if point.0 > last.0 {
                    *last = point;
                }
            }
            None => spans.push((row.ticker.as_str(), point, point)),
        }
    }

    spans
        .into_iter()
        .map(|(ticker, first, last)| span_return(ticker, first, last))
        .collect()
}

fn span_return(
    ticker: &str,
    (start_date, first_close): (NaiveDate, f64),
    (end_date, last_close): (NaiveDate, f64),
) -> Result<PeriodReturn, ReturnError> {
    let years = (end_date - start_date).num_days() as f64 / DAYS_PER_YEAR;
    let annualized = if years > 0.0 {
        Some(cagr(last_close, first_close, years)?)
    } else {
        None
    };
    Ok(PeriodReturn {
        ticker: ticker.to_string(),
        start_date,
        end_date,
        first_close,
        last_close,
        total_return: ytd_return(last_close, first_close)?,
        cagr: annualized,
    })
}
