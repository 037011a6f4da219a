//! Per-symbol candle selection

use tracing::debug;

use crate::market::{KlineResult, MarketData};
use crate::types::{CandleLabel, CandlePair, VolatilityResult};
use crate::volatility::evaluate;

/// What scanning one symbol produced
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    Qualified(VolatilityResult),
    /// Candles arrived but neither met the threshold
    BelowThreshold,
    /// Candles could not be fetched or parsed
    Failed(String),
}

impl SymbolOutcome {
    pub fn into_result(self) -> Option<VolatilityResult> {
        match self {
            SymbolOutcome::Qualified(result) => Some(result),
            _ => None,
        }
    }
}

/// Pick the first candle, current before previous, whose volatility is at
/// least `threshold_pct`.
pub fn select_candle(
    symbol: &str,
    pair: &CandlePair,
    threshold_pct: f64,
) -> Option<VolatilityResult> {
    [
        (CandleLabel::Current, &pair.current),
        (CandleLabel::Previous, &pair.previous),
    ]
    .into_iter()
    .find_map(|(label, candle)| {
        let stats = evaluate(candle)?;
        (stats.volatility_pct >= threshold_pct).then(|| VolatilityResult {
            symbol: symbol.to_string(),
            candle: label,
            price: stats.close,
            high: stats.high,
            low: stats.low,
            volatility_pct: stats.volatility_pct,
            change_pct: stats.change_pct,
        })
    })
}

/// Fetch and score one symbol, keeping the reason for failures.
pub async fn inspect_symbol(
    market: &dyn MarketData,
    symbol: &str,
    threshold_pct: f64,
) -> SymbolOutcome {
    match market.klines(symbol).await {
        KlineResult::Ok(pair) => match select_candle(symbol, &pair, threshold_pct) {
            Some(result) => SymbolOutcome::Qualified(result),
            None => SymbolOutcome::BelowThreshold,
        },
        KlineResult::ShapeError(reason) => {
            debug!(symbol, %reason, "Dropping symbol with malformed candles");
            SymbolOutcome::Failed(reason)
        }
        KlineResult::TransportError(e) => {
            debug!(symbol, error = %e, "Dropping symbol after fetch failure");
            SymbolOutcome::Failed(e.to_string())
        }
    }
}

/// Qualifying result for `symbol`, or `None` for no data or no qualifying candle.
pub async fn scan_symbol(
    market: &dyn MarketData,
    symbol: &str,
    threshold_pct: f64,
) -> Option<VolatilityResult> {
    inspect_symbol(market, symbol, threshold_pct).await.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::market::{MockMarketData, StaticMarket};
    use crate::types::Candle;
    use assert_matches::assert_matches;

    fn pair(previous: Candle, current: Candle) -> CandlePair {
        CandlePair { previous, current }
    }

    #[test]
    fn test_current_preferred_over_more_volatile_previous() {
        let candles = pair(
            Candle::new(100.0, 120.0, 100.0, 110.0),
            Candle::new(100.0, 106.0, 99.0, 103.0),
        );

        let result = select_candle("BTCUSDT", &candles, 5.0).unwrap();
        assert_eq!(result.candle, CandleLabel::Current);
        assert_eq!(result.price, 103.0);
        assert_eq!(result.high, 106.0);
        assert_eq!(result.low, 99.0);
    }

    #[test]
    fn test_falls_back_to_previous() {
        let candles = pair(
            Candle::new(100.0, 106.0, 99.0, 103.0),
            Candle::new(100.0, 101.0, 99.5, 100.0),
        );

        let result = select_candle("ETHUSDT", &candles, 5.0).unwrap();
        assert_eq!(result.candle, CandleLabel::Previous);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let candles = pair(
            Candle::new(100.0, 100.0, 100.0, 100.0),
            Candle::new(100.0, 110.0, 100.0, 105.0),
        );
        let exact = (110.0 - 100.0) / 100.0 * 100.0;

        assert!(select_candle("X", &candles, exact).is_some());
        assert!(select_candle("X", &candles, exact + 1e-9).is_none());
    }

    #[test]
    fn test_zero_threshold_accepts_flat_candle() {
        let flat = Candle::new(1.0, 1.0, 1.0, 1.0);
        let result = select_candle("FLATUSDT", &pair(flat, flat), 0.0).unwrap();
        assert_eq!(result.candle, CandleLabel::Current);
        assert_eq!(result.volatility_pct, 0.0);
    }

    #[test]
    fn test_uncomputable_current_skipped() {
        let candles = pair(
            Candle::new(100.0, 110.0, 100.0, 105.0),
            Candle::new(0.0, 110.0, 100.0, 105.0),
        );
        let result = select_candle("X", &candles, 1.0).unwrap();
        assert_eq!(result.candle, CandleLabel::Previous);
    }

    #[tokio::test]
    async fn test_scan_symbol_with_static_market() {
        let market = StaticMarket::new().with_candles(
            "SOLUSDT",
            Candle::new(100.0, 101.0, 100.0, 100.0),
            Candle::new(100.0, 106.0, 99.0, 103.0),
        );

        let result = scan_symbol(&market, "SOLUSDT", 5.0).await.unwrap();
        assert_eq!(result.symbol, "SOLUSDT");
        assert!(scan_symbol(&market, "SOLUSDT", 50.0).await.is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_is_excluded() {
        let mut market = MockMarketData::new();
        market
            .expect_klines()
            .times(1)
            .returning(|_| {
                KlineResult::TransportError(FetchError::RequestException("timeout".to_string()))
            });

        let outcome = inspect_symbol(&market, "DOGEUSDT", 1.0).await;
        assert_matches!(outcome, SymbolOutcome::Failed(reason) if reason.contains("timeout"));
    }

    #[tokio::test]
    async fn test_shape_error_is_excluded() {
        let mut market = MockMarketData::new();
        market
            .expect_klines()
            .returning(|_| KlineResult::ShapeError("expected 2 candles, got 1".to_string()));

        assert!(scan_symbol(&market, "NEWUSDT", 0.0).await.is_none());
    }
}
