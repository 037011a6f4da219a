//! Exchange adapter - trait and implementations
//!
//! Response shapes are validated here, once, so everything downstream works
//! with typed tickers and candle pairs.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::client::{JsonResponse, MarketClient};
use crate::error::{FetchError, Result, ScanError, UpstreamError};
use crate::types::{Candle, CandlePair, Ticker};

const TICKER_PATH: &str = "/fapi/v1/ticker/24hr";
const KLINES_PATH: &str = "/fapi/v1/klines";
const KLINE_LIMIT: &str = "2";

/// Candle lookup for one symbol
#[derive(Debug, Clone, PartialEq)]
pub enum KlineResult {
    Ok(CandlePair),
    /// The exchange answered with JSON of the wrong shape
    ShapeError(String),
    /// No usable response arrived
    TransportError(FetchError),
}

/// Client trait for the exchange - protocol agnostic
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketData: Send + Sync {
    /// 24h statistics for every listed symbol
    async fn tickers(&self) -> std::result::Result<Vec<Ticker>, UpstreamError>;

    /// The two most recent candles for `symbol`
    async fn klines(&self, symbol: &str) -> KlineResult;
}

/// Validate a ticker listing. Anything but a JSON array is an upstream error.
pub fn decode_tickers(response: JsonResponse) -> std::result::Result<Vec<Ticker>, UpstreamError> {
    match response.body {
        Ok(Value::Array(items)) => Ok(items.iter().filter_map(Ticker::from_value).collect()),
        Ok(other) => Err(UpstreamError {
            http_status: response.status,
            detail: other,
        }),
        Err(e) => Err(UpstreamError {
            http_status: response.status,
            detail: e.to_detail(),
        }),
    }
}

/// Validate a candle listing: index 0 is the previous candle, index 1 the current one.
pub fn decode_klines(response: JsonResponse) -> KlineResult {
    let rows = match response.body {
        Ok(Value::Array(rows)) => rows,
        Ok(other) => {
            return KlineResult::ShapeError(format!(
                "expected candle array, got {}",
                json_kind(&other)
            ))
        }
        Err(e) => return KlineResult::TransportError(e),
    };

    if rows.len() < 2 {
        return KlineResult::ShapeError(format!("expected 2 candles, got {}", rows.len()));
    }

    match (Candle::from_row(&rows[0]), Candle::from_row(&rows[1])) {
        (Some(previous), Some(current)) => KlineResult::Ok(CandlePair { previous, current }),
        _ => KlineResult::ShapeError("malformed candle row".to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ==================== Binance USDT-M Futures ====================

/// REST adapter for Binance USDT-margined futures
#[derive(Debug, Clone)]
pub struct BinanceFutures {
    client: MarketClient,
    base_url: String,
    interval: String,
    ticker_timeout: Duration,
    kline_timeout: Duration,
}

impl BinanceFutures {
    pub fn new(client: MarketClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            interval: "15m".to_string(),
            ticker_timeout: Duration::from_secs(10),
            kline_timeout: Duration::from_secs(6),
        }
    }

    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = interval.into();
        self
    }

    pub fn with_timeouts(mut self, ticker: Duration, kline: Duration) -> Self {
        self.ticker_timeout = ticker;
        self.kline_timeout = kline;
        self
    }

    /// Build the adapter described by the exchange and scan sections.
    pub fn from_config(
        exchange: &config::ExchangeConfig,
        scan: &config::ScanConfig,
    ) -> Result<Self> {
        if exchange.kline_interval.is_empty() {
            return Err(ScanError::Config("kline_interval must not be empty".to_string()));
        }

        let client = MarketClient::new(&exchange.user_agent)?;
        Ok(Self::new(client, &exchange.base_url)
            .with_interval(exchange.kline_interval.clone())
            .with_timeouts(
                Duration::from_millis(scan.ticker_timeout_ms),
                Duration::from_millis(scan.symbol_timeout_ms),
            ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MarketData for BinanceFutures {
    async fn tickers(&self) -> std::result::Result<Vec<Ticker>, UpstreamError> {
        let url = format!("{}{}", self.base_url, TICKER_PATH);
        let response = self.client.fetch_json(&url, &[], self.ticker_timeout).await;
        decode_tickers(response)
    }

    async fn klines(&self, symbol: &str) -> KlineResult {
        let url = format!("{}{}", self.base_url, KLINES_PATH);
        let query = [
            ("symbol", symbol),
            ("interval", self.interval.as_str()),
            ("limit", KLINE_LIMIT),
        ];
        let result = decode_klines(self.client.fetch_json(&url, &query, self.kline_timeout).await);

        if !matches!(result, KlineResult::Ok(_)) {
            debug!(symbol, ?result, "No usable candles");
        }
        result
    }
}

// ==================== Static Implementation ====================

/// Fixed in-memory market for tests and offline runs
///
/// Counts calls and records the peak number of concurrent candle requests.
pub struct StaticMarket {
    tickers: std::result::Result<Vec<Ticker>, UpstreamError>,
    klines: HashMap<String, KlineResult>,
    delay: Duration,
    ticker_calls: AtomicUsize,
    kline_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl StaticMarket {
    pub fn new() -> Self {
        Self {
            tickers: Ok(Vec::new()),
            klines: HashMap::new(),
            delay: Duration::ZERO,
            ticker_calls: AtomicUsize::new(0),
            kline_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// List a symbol with the given 24h quote volume
    pub fn with_ticker(self, symbol: impl Into<String>, quote_volume: f64) -> Self {
        self.with_raw_ticker(Ticker {
            symbol: symbol.into(),
            quote_volume: Some(quote_volume),
        })
    }

    pub fn with_raw_ticker(mut self, ticker: Ticker) -> Self {
        if let Ok(tickers) = self.tickers.as_mut() {
            tickers.push(ticker);
        }
        self
    }

    /// Make the ticker listing fail
    pub fn with_ticker_failure(mut self, error: UpstreamError) -> Self {
        self.tickers = Err(error);
        self
    }

    pub fn with_candles(
        self,
        symbol: impl Into<String>,
        previous: Candle,
        current: Candle,
    ) -> Self {
        self.with_klines(symbol, KlineResult::Ok(CandlePair { previous, current }))
    }

    pub fn with_klines(mut self, symbol: impl Into<String>, result: KlineResult) -> Self {
        self.klines.insert(symbol.into(), result);
        self
    }

    /// Delay every candle request
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn ticker_calls(&self) -> usize {
        self.ticker_calls.load(Ordering::SeqCst)
    }

    pub fn kline_calls(&self) -> usize {
        self.kline_calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for StaticMarket {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketData for StaticMarket {
    async fn tickers(&self) -> std::result::Result<Vec<Ticker>, UpstreamError> {
        self.ticker_calls.fetch_add(1, Ordering::SeqCst);
        self.tickers.clone()
    }

    async fn klines(&self, symbol: &str) -> KlineResult {
        self.kline_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.klines
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| KlineResult::ShapeError(format!("unknown symbol {}", symbol)))
    }
}
