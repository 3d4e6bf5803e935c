//! Market data retrieval and tabular results

pub mod batch;
pub mod history;
pub mod market_cap;
pub mod provider;
pub mod retry;
pub mod table;
pub mod universe;
pub mod yahoo;

pub use batch::{batch_count, batches};
pub use history::fetch_history;
pub use market_cap::{
    download_batches_market_cap, fetch_market_cap, BatchOptions, FailedBatch, MarketCapRun,
};
pub use provider::{
    DataError, FetchProgress, LogProgress, NoProgress, RawBar, TickerDataClient, TickerInfo,
};
pub use retry::{retry_with_backoff, RetryOutcome, RetryPolicy, Sleeper, ThreadSleeper};
pub use table::{
    HistoricalRecord, HistoryTable, MarketCapTable, ResultTable, TableError, TableRow,
    TickerRecord,
};
pub use universe::{Universe, UniverseError};
pub use yahoo::YahooClient;
