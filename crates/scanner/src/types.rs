//! Core scanner types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One 15-minute OHLC bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time in milliseconds since the epoch
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open_time: 0,
            open,
            high,
            low,
            close,
        }
    }

    /// Parse an exchange kline row: `[openTime, open, high, low, close, ...]`.
    ///
    /// Prices arrive as decimal strings; plain JSON numbers are accepted too.
    /// The open time is informational only and defaults to 0 when absent.
    pub fn from_row(row: &Value) -> Option<Self> {
        let fields = row.as_array()?;
        if fields.len() < 5 {
            return None;
        }

        Some(Self {
            open_time: fields[0].as_i64().unwrap_or_default(),
            open: parse_number(&fields[1])?,
            high: parse_number(&fields[2])?,
            low: parse_number(&fields[3])?,
            close: parse_number(&fields[4])?,
        })
    }
}

/// The two most recent candles of a symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandlePair {
    /// Last fully closed candle
    pub previous: Candle,
    /// Candle still forming
    pub current: Candle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandleLabel {
    Current,
    Previous,
}

impl CandleLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandleLabel::Current => "current",
            CandleLabel::Previous => "previous",
        }
    }
}

/// 24h statistics for one symbol, reduced to what eligibility needs
#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    pub symbol: String,
    /// `None` when the field is missing or not numeric
    pub quote_volume: Option<f64>,
}

impl Ticker {
    /// Parse one element of the 24h ticker listing.
    ///
    /// Returns `None` for elements without a string `symbol`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let symbol = object.get("symbol")?.as_str()?.to_string();
        let quote_volume = object.get("quoteVolume").and_then(parse_number);

        Some(Self {
            symbol,
            quote_volume,
        })
    }
}

/// A symbol whose chosen candle met the threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityResult {
    pub symbol: String,
    pub candle: CandleLabel,
    /// Close of the chosen candle
    pub price: f64,
    pub high: f64,
    pub low: f64,
    /// `(high - low) / low * 100`
    pub volatility_pct: f64,
    /// `(close - open) / open * 100`
    pub change_pct: f64,
}

/// One call to the scan endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub threshold_pct: f64,
    /// Forwarded-for address, peer address or `"unknown"`
    pub client_identity: String,
}

impl ScanRequest {
    pub fn new(threshold_pct: f64, client_identity: impl Into<String>) -> Self {
        Self {
            threshold_pct,
            client_identity: client_identity.into(),
        }
    }
}

/// Decimal string or JSON number
pub(crate) fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candle_from_exchange_row() {
        let row = json!([
            1700000000000i64,
            "100.0",
            "110.5",
            "95.25",
            "108",
            "1234.5",
            1700000899999i64
        ]);
        let candle = Candle::from_row(&row).unwrap();

        assert_eq!(candle.open_time, 1700000000000);
        assert_eq!(candle.open, 100.0);
        assert_eq!(candle.high, 110.5);
        assert_eq!(candle.low, 95.25);
        assert_eq!(candle.close, 108.0);
    }

    #[test]
    fn test_candle_rejects_bad_rows() {
        assert!(Candle::from_row(&json!([1, "1", "2"])).is_none());
        assert!(Candle::from_row(&json!([1, "abc", "2", "1", "1"])).is_none());
        assert!(Candle::from_row(&json!({"open": "1"})).is_none());
        assert!(Candle::from_row(&json!([1, "1", null, "1", "1"])).is_none());
    }

    #[test]
    fn test_ticker_quote_volume_forms() {
        let as_string =
            Ticker::from_value(&json!({"symbol": "BTCUSDT", "quoteVolume": "2500000.5"})).unwrap();
        assert_eq!(as_string.quote_volume, Some(2_500_000.5));

        let as_number =
            Ticker::from_value(&json!({"symbol": "ETHUSDT", "quoteVolume": 42})).unwrap();
        assert_eq!(as_number.quote_volume, Some(42.0));

        let missing = Ticker::from_value(&json!({"symbol": "XRPUSDT"})).unwrap();
        assert_eq!(missing.quote_volume, None);

        let garbage =
            Ticker::from_value(&json!({"symbol": "ADAUSDT", "quoteVolume": "n/a"})).unwrap();
        assert_eq!(garbage.quote_volume, None);
    }

    #[test]
    fn test_ticker_requires_symbol() {
        assert!(Ticker::from_value(&json!({"quoteVolume": "1"})).is_none());
        assert!(Ticker::from_value(&json!("BTCUSDT")).is_none());
    }

    #[test]
    fn test_candle_label_serializes_lowercase() {
        assert_eq!(serde_json::to_value(CandleLabel::Current).unwrap(), json!("current"));
        assert_eq!(CandleLabel::Previous.as_str(), "previous");
    }
}
