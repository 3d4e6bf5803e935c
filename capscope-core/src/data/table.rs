//! Result tables: row types, polars schemas, and export.
//!
//! A `ResultTable` is an ordered list of rows in fetch order. It owns its
//! rows and materializes them as a polars `DataFrame` on demand, or writes
//! them out as CSV or Parquet.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Metadata row: one per ticker per successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerRecord {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Sector")]
    pub sector: Option<String>,
    #[serde(rename = "MarketCap")]
    pub market_cap: Option<f64>,
}

/// Price row: one per (ticker, trading date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Adj Close")]
    pub adj_close: f64,
    #[serde(rename = "Volume")]
    pub volume: u64,
    #[serde(rename = "Ticker")]
    pub ticker: String,
}

/// A row type with a fixed tabular schema.
pub trait TableRow: Serialize + Sized {
    /// Column names and types, in column order.
    fn schema() -> Schema;

    /// Build a `DataFrame` from rows, preserving row order.
    fn to_dataframe(rows: &[Self]) -> PolarsResult<DataFrame>;
}

impl TableRow for TickerRecord {
    fn schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("Ticker".into(), DataType::String),
            Field::new("Sector".into(), DataType::String),
            Field::new("MarketCap".into(), DataType::Float64),
        ])
    }

    fn to_dataframe(rows: &[Self]) -> PolarsResult<DataFrame> {
        let tickers: Vec<String> = rows.iter().map(|r| r.ticker.clone()).collect();
        let sectors: Vec<Option<String>> = rows.iter().map(|r| r.sector.clone()).collect();
        let caps: Vec<Option<f64>> = rows.iter().map(|r| r.market_cap).collect();

        DataFrame::new(vec![
            Column::new("Ticker".into(), tickers),
            Column::new("Sector".into(), sectors),
            Column::new("MarketCap".into(), caps),
        ])
    }
}

impl TableRow for HistoricalRecord {
    fn schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("Date".into(), DataType::Date),
            Field::new("Open".into(), DataType::Float64),
            Field::new("High".into(), DataType::Float64),
            Field::new("Low".into(), DataType::Float64),
            Field::new("Close".into(), DataType::Float64),
            Field::new("Adj Close".into(), DataType::Float64),
            Field::new("Volume".into(), DataType::UInt64),
            Field::new("Ticker".into(), DataType::String),
        ])
    }

    fn to_dataframe(rows: &[Self]) -> PolarsResult<DataFrame> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
        let dates: Vec<i32> = rows
            .iter()
            .map(|r| (r.date - epoch).num_days() as i32)
            .collect();
        let opens: Vec<f64> = rows.iter().map(|r| r.open).collect();
        let highs: Vec<f64> = rows.iter().map(|r| r.high).collect();
        let lows: Vec<f64> = rows.iter().map(|r| r.low).collect();
        let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();
        let adj_closes: Vec<f64> = rows.iter().map(|r| r.adj_close).collect();
        let volumes: Vec<u64> = rows.iter().map(|r| r.volume).collect();
        let tickers: Vec<String> = rows.iter().map(|r| r.ticker.clone()).collect();

        DataFrame::new(vec![
            Column::new("Date".into(), dates).cast(&DataType::Date)?,
            Column::new("Open".into(), opens),
            Column::new("High".into(), highs),
            Column::new("Low".into(), lows),
            Column::new("Close".into(), closes),
            Column::new("Adj Close".into(), adj_closes),
            Column::new("Volume".into(), volumes),
            Column::new("Ticker".into(), tickers),
        ])
    }
}

/// Ordered rows in fetch order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable<R> {
    rows: Vec<R>,
}

/// Ticker metadata table (`Ticker`, `Sector`, `MarketCap`).
pub type MarketCapTable = ResultTable<TickerRecord>;

/// Historical price table (`Date`, OHLC, `Adj Close`, `Volume`, `Ticker`).
pub type HistoryTable = ResultTable<HistoricalRecord>;

impl<R> Default for ResultTable<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R> ResultTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = R>) {
        self.rows.extend(rows);
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<R: TableRow> ResultTable<R> {
    /// Materialize the rows as a `DataFrame`.
    pub fn to_dataframe(&self) -> Result<DataFrame, TableError> {
        Ok(R::to_dataframe(&self.rows)?)
    }

    /// Write the rows as CSV with a header line.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut wtr = csv::Writer::from_writer(writer);
        if self.rows.is_empty() {
            let header: Vec<String> = R::schema()
                .iter_fields()
                .map(|f| f.name().to_string())
                .collect();
            wtr.write_record(&header)?;
        }
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the rows to a Parquet file.
    pub fn write_parquet(&self, path: &Path) -> Result<(), TableError> {
        let mut df = self.to_dataframe()?;
        let file = fs::File::create(path)?;
        ParquetWriter::new(file).finish(&mut df)?;
        Ok(())
    }
}

/// Check that `df` carries every column of `expected` with the expected type.
pub fn validate_schema(df: &DataFrame, expected: &Schema) -> Result<(), TableError> {
    let actual = df.schema();

    for field in expected.iter_fields() {
        let actual_dtype = actual
            .get(field.name())
            .ok_or_else(|| TableError::MissingColumn(field.name().to_string()))?;
        if actual_dtype != field.dtype() {
            return Err(TableError::TypeMismatch {
                column: field.name().to_string(),
                expected: field.dtype().clone(),
                actual: actual_dtype.clone(),
            });
        }
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("type mismatch in column {column}: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },

    #[error("dataframe error: {0}")]
    Polars(#[from] PolarsError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
