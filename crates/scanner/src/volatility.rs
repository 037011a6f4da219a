//! Per-candle volatility metrics

use crate::types::Candle;

/// Metrics derived from one candle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleStats {
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// `(high - low) / low * 100`
    pub volatility_pct: f64,
    /// `(close - open) / open * 100`
    pub change_pct: f64,
}

/// Score a candle, or `None` when open or low is not positive.
pub fn evaluate(candle: &Candle) -> Option<CandleStats> {
    if candle.open <= 0.0 || candle.low <= 0.0 {
        return None;
    }

    Some(CandleStats {
        high: candle.high,
        low: candle.low,
        close: candle.close,
        volatility_pct: (candle.high - candle.low) / candle.low * 100.0,
        change_pct: (candle.close - candle.open) / candle.open * 100.0,
    })
}
