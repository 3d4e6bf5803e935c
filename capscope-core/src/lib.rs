//! Capscope Core — market-cap and price-history retrieval for ticker universes.
//!
//! - A per-ticker data client trait with a Yahoo Finance implementation
//! - Batched metadata fetch with bounded exponential-backoff retry
//! - Multi-ticker history fetch into a single tagged table
//! - Tabular results convertible to polars DataFrames, CSV and Parquet
//! - Return calculations and visualization reference tables

pub mod config;
pub mod data;
pub mod reference;
pub mod returns;
