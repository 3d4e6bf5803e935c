//! Yahoo Finance ticker data client.
//!
//! History comes from the v8 chart API. Sector and market cap come from the
//! v10 quoteSummary API, which needs a session cookie and a crumb token; the
//! crumb is fetched lazily and dropped whenever Yahoo answers 401 so the
//! caller's next attempt starts a fresh session.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes. Every call is a single HTTP request: no retries happen here.

use super::provider::{DataError, RawBar, TickerDataClient, TickerInfo};
use crate::config::YahooConfig;
use chrono::NaiveDate;
use reqwest::blocking::{Client, Response};
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::Duration;

const SECONDS_PER_DAY: i64 = 86_400;

/// Used when a 429 carries no usable `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

/// Error object shared by the chart and quoteSummary APIs.
#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

/// Exchange metadata; `gmtoffset` is the exchange's UTC offset in seconds.
#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance v10 quoteSummary API response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummaryResult,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    result: Option<Vec<QuoteSummaryData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryData {
    asset_profile: Option<AssetProfile>,
    price: Option<PriceModule>,
}

#[derive(Debug, Deserialize)]
struct AssetProfile {
    sector: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    market_cap: Option<RawNumber>,
}

/// Yahoo's `{ "raw": 1.0, "fmt": "1.00" }` wrapper; `{}` when the value is absent.
#[derive(Debug, Deserialize)]
struct RawNumber {
    #[serde(default)]
    raw: Option<f64>,
}

/// Yahoo Finance ticker data client.
pub struct YahooClient {
    client: Client,
    base_url: String,
    cookie_url: String,
    crumb: Mutex<Option<String>>,
}

impl YahooClient {
    pub fn new(config: &YahooConfig) -> Result<Self, DataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cookie_url: config.cookie_url.clone(),
            crumb: Mutex::new(None),
        })
    }

    /// Build the chart API URL for a ticker and a half-open date range.
    ///
    /// The window is padded by a day on each side so sessions of exchanges
    /// far from UTC are included; `parse_chart` trims to exchange-local dates.
    fn chart_url(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}/v8/finance/chart/{ticker}\
             ?period1={}&period2={}&interval=1d\
             &includeAdjustedClose=true",
            self.base_url,
            midnight_timestamp(start) - SECONDS_PER_DAY,
            midnight_timestamp(end) + SECONDS_PER_DAY
        )
    }

    fn quote_summary_url(&self, ticker: &str, crumb: &str) -> String {
        format!(
            "{}/v10/finance/quoteSummary/{ticker}?modules=assetProfile,price&crumb={crumb}",
            self.base_url
        )
    }

    /// Parse the chart API response into bars, dropping rows outside `[start, end)`.
    fn parse_chart(
        ticker: &str,
        resp: ChartResponse,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        let result = resp
            .chart
            .result
            .ok_or_else(|| api_error(ticker, resp.chart.error))?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        let gmtoffset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        // No timestamps means no trading days in the range.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            // Session timestamps are UTC; the trading date is the exchange-local one.
            let date = chrono::DateTime::from_timestamp(ts + gmtoffset, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;
            if date < start || date >= end {
                continue;
            }

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();
            let adj_close = adj_closes
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten());

            // Holidays and halted sessions come back as all-null rows
            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && volume.is_none()
            {
                continue;
            }

            let close = close.unwrap_or(f64::NAN);
            bars.push(RawBar {
                date,
                open: open.unwrap_or(f64::NAN),
                high: high.unwrap_or(f64::NAN),
                low: low.unwrap_or(f64::NAN),
                close,
                adj_close: adj_close.unwrap_or(close),
                volume: volume.unwrap_or(0),
            });
        }

        Ok(bars)
    }

    /// Parse the quoteSummary response into sector and market cap.
    fn parse_quote_summary(
        ticker: &str,
        resp: QuoteSummaryResponse,
    ) -> Result<TickerInfo, DataError> {
        let result = resp
            .quote_summary
            .result
            .ok_or_else(|| api_error(ticker, resp.quote_summary.error))?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        let sector = data
            .asset_profile
            .and_then(|p| p.sector)
            .filter(|s| !s.trim().is_empty());
        let market_cap = data
            .price
            .and_then(|p| p.market_cap)
            .and_then(|m| m.raw);

        Ok(TickerInfo { sector, market_cap })
    }

    /// Return the cached crumb, starting a cookie session and fetching one if needed.
    fn crumb(&self) -> Result<String, DataError> {
        let mut guard = self
            .crumb
            .lock()
            .map_err(|_| DataError::Other("crumb lock poisoned".into()))?;
        if let Some(crumb) = guard.as_ref() {
            return Ok(crumb.clone());
        }

        // The cookie endpoint answers 404 but still sets the session cookie.
        if let Err(e) = self.client.get(&self.cookie_url).send() {
            tracing::debug!("cookie request failed: {e}");
        }

        let url = format!("{}/v1/test/getcrumb", self.base_url);
        let resp = self.client.get(&url).send().map_err(network_error)?;
        if !resp.status().is_success() {
            return Err(DataError::AuthenticationRequired(format!(
                "crumb request answered HTTP {}",
                resp.status()
            )));
        }
        let crumb = resp
            .text()
            .map_err(|e| DataError::ResponseFormatChanged(format!("failed to read crumb: {e}")))?
            .trim()
            .to_string();

        if crumb.is_empty() || crumb.contains('<') || crumb.contains(' ') {
            return Err(DataError::AuthenticationRequired(
                "Yahoo Finance returned no usable crumb".into(),
            ));
        }

        tracing::debug!("obtained Yahoo crumb");
        *guard = Some(crumb.clone());
        Ok(crumb)
    }

    fn fetch_quote_summary(&self, ticker: &str) -> Result<TickerInfo, DataError> {
        let crumb = self.crumb()?;
        let url = self.quote_summary_url(ticker, &crumb);
        tracing::debug!("GET quoteSummary {ticker}");

        let resp = check_status(self.client.get(&url).send().map_err(network_error)?, ticker)?;
        let summary: QuoteSummaryResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!(
                "failed to parse quoteSummary for {ticker}: {e}"
            ))
        })?;
        Self::parse_quote_summary(ticker, summary)
    }

    /// Forget the crumb after an authentication failure so the next call
    /// starts a new cookie session.
    fn drop_crumb_on_auth_error<T>(&self, result: &Result<T, DataError>) {
        if let Err(DataError::AuthenticationRequired(_)) = result {
            tracing::debug!("dropping Yahoo crumb after authentication failure");
            self.invalidate_crumb();
        }
    }

    fn invalidate_crumb(&self) {
        if let Ok(mut guard) = self.crumb.lock() {
            *guard = None;
        }
    }
}

impl TickerDataClient for YahooClient {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn get_info(&self, ticker: &str) -> Result<TickerInfo, DataError> {
        let result = self.fetch_quote_summary(ticker);
        self.drop_crumb_on_auth_error(&result);
        result
    }

    fn get_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        if start >= end {
            return Err(DataError::InvalidRange { start, end });
        }

        let url = self.chart_url(ticker, start, end);
        tracing::debug!("GET chart {ticker} {start}..{end}");

        let resp = check_status(self.client.get(&url).send().map_err(network_error)?, ticker)?;
        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {ticker}: {e}"))
        })?;
        Self::parse_chart(ticker, chart, start, end)
    }
}

/// Map HTTP status codes to data errors, passing successful responses through.
fn check_status(resp: Response, ticker: &str) -> Result<Response, DataError> {
    let retry_after = resp
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok());
    match map_status(resp.status(), retry_after, ticker) {
        Some(err) => Err(err),
        None => Ok(resp),
    }
}

/// Error for a non-success status; `None` for 2xx.
fn map_status(status: StatusCode, retry_after: Option<&str>, ticker: &str) -> Option<DataError> {
    if status.is_success() {
        return None;
    }

    let err = match status {
        StatusCode::NOT_FOUND => DataError::SymbolNotFound {
            symbol: ticker.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => DataError::RateLimited {
            retry_after_secs: retry_after
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DataError::AuthenticationRequired(format!("HTTP {status} for {ticker}"))
        }
        _ => DataError::Other(format!("HTTP {status} for {ticker}")),
    };
    Some(err)
}

fn network_error(e: reqwest::Error) -> DataError {
    DataError::NetworkUnreachable(e.to_string())
}

fn api_error(ticker: &str, error: Option<ApiError>) -> DataError {
    match error {
        Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
            symbol: ticker.to_string(),
        },
        Some(err) if err.code == "Unauthorized" => {
            DataError::AuthenticationRequired(err.description)
        }
        Some(err) => DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description)),
        None => DataError::ResponseFormatChanged("empty result with no error".into()),
    }
}

fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn client() -> YahooClient {
        YahooClient::new(&YahooConfig::default()).unwrap()
    }

    #[test]
    fn chart_url_pads_range_by_a_day() {
        let url = client().chart_url("^GSPC", date(2024, 1, 1), date(2024, 1, 2));
        assert!(url.starts_with("https://query2.finance.yahoo.com/v8/finance/chart/^GSPC?"));
        // padded by a day: 2023-12-31 and 2024-01-03 midnight UTC
        assert!(url.contains("period1=1703980800"));
        assert!(url.contains("period2=1704240000"));
        assert!(url.contains("interval=1d"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = YahooConfig {
            base_url: "http://localhost:9999/".into(),
            ..YahooConfig::default()
        };
        let c = YahooClient::new(&config).unwrap();
        assert_eq!(
            c.quote_summary_url("AAPL", "abc"),
            "http://localhost:9999/v10/finance/quoteSummary/AAPL?modules=assetProfile,price&crumb=abc"
        );
    }

    #[test]
    fn parse_chart_skips_null_rows_and_out_of_range_dates() {
        // 2024-01-02, 2024-01-03 (all null), 2024-01-04, 2024-01-05 (past end)
        let json = r#"{"chart":{"result":[{
            "timestamp":[1704205800,1704292200,1704378600,1704465000],
            "indicators":{
                "quote":[{
                    "open":[100.0,null,102.0,103.0],
                    "high":[101.0,null,103.0,104.0],
                    "low":[99.0,null,101.0,102.0],
                    "close":[100.5,null,102.5,103.5],
                    "volume":[1000,null,1200,1300]
                }],
                "adjclose":[{"adjclose":[100.4,null,102.4,103.4]}]
            }
        }],"error":null}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        let bars =
            YahooClient::parse_chart("SPY", resp, date(2024, 1, 2), date(2024, 1, 5)).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, date(2024, 1, 2));
        assert_eq!(bars[0].adj_close, 100.4);
        assert_eq!(bars[1].date, date(2024, 1, 4));
        assert_eq!(bars[1].volume, 1200);
    }

    #[test]
    fn parse_chart_without_adjclose_falls_back_to_close() {
        let json = r#"{"chart":{"result":[{
            "timestamp":[1704205800],
            "indicators":{"quote":[{
                "open":[1.0],"high":[2.0],"low":[0.5],"close":[1.5],"volume":[10]
            }]}
        }],"error":null}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        let bars =
            YahooClient::parse_chart("X", resp, date(2024, 1, 1), date(2024, 2, 1)).unwrap();
        assert_eq!(bars[0].adj_close, 1.5);
    }

    #[test]
    fn parse_chart_without_timestamps_is_empty() {
        let json = r#"{"chart":{"result":[{"indicators":{"quote":[
            {"open":[],"high":[],"low":[],"close":[],"volume":[]}
        ]}}],"error":null}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        let bars =
            YahooClient::parse_chart("X", resp, date(2024, 1, 1), date(2024, 2, 1)).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn parse_chart_dates_bars_in_exchange_time() {
        // ^AXJO sessions open at 10:00 AEDT, 23:00Z the previous day.
        // 2024-01-01 10:00 AEDT falls in the padding day and is dropped.
        let json = r#"{"chart":{"result":[{
            "meta":{"symbol":"^AXJO","gmtoffset":39600,"exchangeTimezoneName":"Australia/Sydney"},
            "timestamp":[1704063600,1704150000],
            "indicators":{"quote":[{
                "open":[7590.0,7600.0],"high":[7610.0,7650.0],"low":[7580.0,7590.0],
                "close":[7600.0,7620.0],"volume":[0,0]
            }]}
        }],"error":null}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        let bars =
            YahooClient::parse_chart("^AXJO", resp, date(2024, 1, 2), date(2024, 1, 3)).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, date(2024, 1, 2));
        assert_eq!(bars[0].close, 7620.0);
    }

    #[test]
    fn parse_chart_negative_offset_keeps_session_date() {
        // ^BVSP 2024-01-02 10:00 BRT is 13:00Z
        let json = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":-10800},
            "timestamp":[1704200400],
            "indicators":{"quote":[{
                "open":[134000.0],"high":[134500.0],"low":[133000.0],
                "close":[134100.0],"volume":[1]
            }]}
        }],"error":null}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        let bars =
            YahooClient::parse_chart("^BVSP", resp, date(2024, 1, 2), date(2024, 1, 3)).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, date(2024, 1, 2));
    }

    #[test]
    fn map_status_success_passes() {
        assert!(map_status(StatusCode::OK, None, "AAPL").is_none());
    }

    #[test]
    fn map_status_not_found() {
        let err = map_status(StatusCode::NOT_FOUND, None, "ZZZZ").unwrap();
        assert!(matches!(err, DataError::SymbolNotFound { ref symbol } if symbol == "ZZZZ"));
    }

    #[test]
    fn map_status_rate_limited_reads_retry_after() {
        let err = map_status(StatusCode::TOO_MANY_REQUESTS, Some("7"), "AAPL").unwrap();
        assert!(matches!(err, DataError::RateLimited { retry_after_secs: 7 }));
    }

    #[test]
    fn map_status_rate_limited_defaults_to_sixty_seconds() {
        for header in [None, Some("Wed, 21 Oct 2026 07:28:00 GMT")] {
            let err = map_status(StatusCode::TOO_MANY_REQUESTS, header, "AAPL").unwrap();
            assert!(matches!(err, DataError::RateLimited { retry_after_secs: 60 }));
        }
    }

    #[test]
    fn map_status_unauthorized_and_forbidden() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = map_status(status, None, "AAPL").unwrap();
            assert!(matches!(err, DataError::AuthenticationRequired(_)));
        }
    }

    #[test]
    fn map_status_other_errors() {
        let err = map_status(StatusCode::BAD_GATEWAY, None, "AAPL").unwrap();
        assert!(matches!(err, DataError::Other(ref m) if m.contains("502")));
    }

    /// Answer a single HTTP request on localhost with a canned response.
    fn serve_once(response: &'static str) -> String {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}")
    }

    fn local_client(base_url: String) -> YahooClient {
        let config = YahooConfig {
            base_url,
            timeout_secs: 5,
            ..YahooConfig::default()
        };
        YahooClient::new(&config).unwrap()
    }

    fn seed_crumb(client: &YahooClient) {
        *client.crumb.lock().unwrap() = Some("seeded".into());
    }

    fn cached_crumb(client: &YahooClient) -> Option<String> {
        client.crumb.lock().unwrap().clone()
    }

    #[test]
    fn unauthorized_get_info_clears_crumb() {
        let base = serve_once(
            "HTTP/1.1 401 Unauthorized\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let client = local_client(base);
        seed_crumb(&client);

        let err = client.get_info("AAPL").unwrap_err();
        assert!(matches!(err, DataError::AuthenticationRequired(_)));
        assert_eq!(cached_crumb(&client), None);
    }

    #[test]
    fn other_get_info_failures_keep_crumb() {
        let base = serve_once(concat!(
            "HTTP/1.1 500 Internal Server Error\r\n",
            "Content-Length: 0\r\nConnection: close\r\n\r\n",
        ));
        let client = local_client(base);
        seed_crumb(&client);

        let err = client.get_info("AAPL").unwrap_err();
        assert!(matches!(err, DataError::Other(_)));
        assert_eq!(cached_crumb(&client).as_deref(), Some("seeded"));
    }

    #[test]
    fn rate_limited_history_carries_retry_after() {
        let base = serve_once(concat!(
            "HTTP/1.1 429 Too Many Requests\r\nRetry-After: 7\r\n",
            "Content-Length: 0\r\nConnection: close\r\n\r\n",
        ));
        let client = local_client(base);

        let err = client
            .get_history("SPY", date(2024, 1, 2), date(2024, 1, 3))
            .unwrap_err();
        assert!(matches!(err, DataError::RateLimited { retry_after_secs: 7 }));
    }

    #[test]
    fn parse_chart_tolerates_empty_quote_object() {
        let json = r#"{"chart":{"result":[{"indicators":{"quote":[{}],"adjclose":[{"adjclose":[]}]}}],"error":null}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        let bars =
            YahooClient::parse_chart("X", resp, date(2024, 1, 1), date(2024, 2, 1)).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn parse_quote_summary_unknown_error_code() {
        let json = r#"{"quoteSummary":{"result":null,"error":{"code":"Bad Request","description":"Invalid module"}}}"#;
        let resp: QuoteSummaryResponse = serde_json::from_str(json).unwrap();
        let err = YahooClient::parse_quote_summary("AAPL", resp).unwrap_err();
        assert!(
            matches!(err, DataError::ResponseFormatChanged(ref m) if m.contains("Invalid module"))
        );
    }

    #[test]
    fn parse_chart_not_found() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        let err = YahooClient::parse_chart("ZZZZ", resp, date(2024, 1, 1), date(2024, 2, 1))
            .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { ref symbol } if symbol == "ZZZZ"));
    }

    #[test]
    fn parse_quote_summary_extracts_sector_and_cap() {
        let json = r#"{"quoteSummary":{"result":[{
            "assetProfile":{"sector":"Technology","industry":"Consumer Electronics"},
            "price":{"marketCap":{"raw":3400000000000,"fmt":"3.4T","longFmt":"3,400,000,000,000"}}
        }],"error":null}}"#;
        let resp: QuoteSummaryResponse = serde_json::from_str(json).unwrap();
        let info = YahooClient::parse_quote_summary("AAPL", resp).unwrap();
        assert_eq!(info.sector.as_deref(), Some("Technology"));
        assert_eq!(info.market_cap, Some(3.4e12));
    }

    #[test]
    fn parse_quote_summary_index_has_no_sector_or_cap() {
        let json = r#"{"quoteSummary":{"result":[{
            "price":{"marketCap":{}}
        }],"error":null}}"#;
        let resp: QuoteSummaryResponse = serde_json::from_str(json).unwrap();
        let info = YahooClient::parse_quote_summary("^GSPC", resp).unwrap();
        assert_eq!(info, TickerInfo::default());
    }

    #[test]
    fn parse_quote_summary_error_object() {
        let json = r#"{"quoteSummary":{"result":null,"error":{"code":"Unauthorized","description":"Invalid Crumb"}}}"#;
        let resp: QuoteSummaryResponse = serde_json::from_str(json).unwrap();
        let err = YahooClient::parse_quote_summary("AAPL", resp).unwrap_err();
        assert!(matches!(err, DataError::AuthenticationRequired(ref m) if m == "Invalid Crumb"));
    }

    #[test]
    fn inverted_range_is_rejected_before_any_request() {
        let err = client()
            .get_history("SPY", date(2024, 2, 1), date(2024, 1, 1))
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidRange { .. }));
    }
}
