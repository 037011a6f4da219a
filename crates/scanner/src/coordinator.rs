//! Bounded fan-out of per-symbol scans
//!
//! At most `concurrency` symbol scans run at once. The call returns only
//! after every dispatched scan has finished, so the result set is complete.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::market::MarketData;
use crate::symbol::{inspect_symbol, SymbolOutcome};
use crate::types::VolatilityResult;

/// Concurrent candle fetches per scan
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Ranked results of one fan-out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FanOutSummary {
    /// Qualifying symbols, most volatile first
    pub results: Vec<VolatilityResult>,
    /// Symbols dispatched
    pub scanned: usize,
    /// Symbols dropped for missing or malformed candles
    pub failures: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct FanOut {
    concurrency: usize,
}

impl FanOut {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Scan every symbol against `threshold_pct` and rank the qualifying ones.
    pub async fn run(
        &self,
        market: Arc<dyn MarketData>,
        symbols: Vec<String>,
        threshold_pct: f64,
    ) -> FanOutSummary {
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut summary = FanOutSummary {
            scanned: symbols.len(),
            ..FanOutSummary::default()
        };

        for symbol in symbols {
            // The semaphore is never closed, so acquisition only waits.
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                break;
            };
            let market = Arc::clone(&market);

            tasks.spawn(async move {
                let _permit = permit;
                inspect_symbol(market.as_ref(), &symbol, threshold_pct).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(SymbolOutcome::Qualified(result)) => summary.results.push(result),
                Ok(SymbolOutcome::BelowThreshold) => {}
                Ok(SymbolOutcome::Failed(_)) => summary.failures += 1,
                Err(e) => {
                    warn!(error = %e, "Symbol scan task aborted");
                    summary.failures += 1;
                }
            }
        }

        rank(&mut summary.results);
        debug!(
            scanned = summary.scanned,
            qualified = summary.results.len(),
            failures = summary.failures,
            "Fan-out complete"
        );
        summary
    }

    /// Qualifying results only, most volatile first
    pub async fn run_scan(
        &self,
        market: Arc<dyn MarketData>,
        symbols: Vec<String>,
        threshold_pct: f64,
    ) -> Vec<VolatilityResult> {
        self.run(market, symbols, threshold_pct).await.results
    }
}

impl Default for FanOut {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

/// Sort by volatility descending; equal volatilities are ordered by symbol.
pub fn rank(results: &mut [VolatilityResult]) {
    results.sort_by(|a, b| {
        b.volatility_pct
            .total_cmp(&a.volatility_pct)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::market::{KlineResult, MockMarketData, StaticMarket};
    use crate::types::{Candle, CandleLabel};
    use std::time::Duration;

    fn quiet() -> Candle {
        Candle::new(100.0, 100.5, 100.0, 100.0)
    }

    /// Current candle with the given range in percent over a low of 100
    fn moving(range_pct: f64) -> Candle {
        Candle::new(100.0, 100.0 + range_pct, 100.0, 100.0)
    }

    #[tokio::test]
    async fn test_results_ranked_descending() {
        let market = StaticMarket::new()
            .with_candles("AUSDT", quiet(), moving(4.0))
            .with_candles("BUSDT", quiet(), moving(9.0))
            .with_candles("CUSDT", quiet(), moving(6.5))
            .with_candles("DUSDT", quiet(), moving(1.0));

        let symbols = ["AUSDT", "BUSDT", "CUSDT", "DUSDT"].map(String::from).to_vec();
        let summary = FanOut::default().run(Arc::new(market), symbols, 3.0).await;

        let order: Vec<&str> = summary.results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["BUSDT", "CUSDT", "AUSDT"]);
        assert_eq!(summary.scanned, 4);
        assert_eq!(summary.failures, 0);
    }

    #[tokio::test]
    async fn test_failures_counted_not_returned() {
        let market = StaticMarket::new()
            .with_candles("GOODUSDT", quiet(), moving(5.0))
            .with_klines(
                "SLOWUSDT",
                KlineResult::TransportError(FetchError::RequestException("timed out".to_string())),
            );

        let symbols = vec!["GOODUSDT".to_string(), "SLOWUSDT".to_string(), "GONEUSDT".to_string()];
        let summary = FanOut::new(2).run(Arc::new(market), symbols, 1.0).await;

        assert_eq!(summary.results.len(), 1);
        assert_eq!(summary.results[0].candle, CandleLabel::Current);
        assert_eq!(summary.failures, 2);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let mut market = StaticMarket::new().with_delay(Duration::from_millis(20));
        let mut symbols = Vec::new();
        for i in 0..40 {
            let symbol = format!("SYM{}USDT", i);
            market = market.with_candles(symbol.clone(), quiet(), moving(5.0));
            symbols.push(symbol);
        }
        let market = Arc::new(market);

        let results = FanOut::new(8)
            .run_scan(Arc::clone(&market) as Arc<dyn MarketData>, symbols, 3.0)
            .await;

        assert_eq!(results.len(), 40);
        assert_eq!(market.kline_calls(), 40);
        assert!(market.peak_in_flight() <= 8);
        assert!(market.peak_in_flight() > 1);
    }

    #[tokio::test]
    async fn test_empty_symbol_list() {
        let market = MockMarketData::new();
        let summary = FanOut::default().run(Arc::new(market), Vec::new(), 3.0).await;
        assert_eq!(summary, FanOutSummary::default());
    }

    #[tokio::test]
    async fn test_zero_concurrency_clamped() {
        assert_eq!(FanOut::new(0).concurrency(), 1);
    }

    #[test]
    fn test_rank_ties_by_symbol() {
        let row = |symbol: &str, volatility_pct: f64| VolatilityResult {
            symbol: symbol.to_string(),
            candle: CandleLabel::Current,
            price: 1.0,
            high: 1.0,
            low: 1.0,
            volatility_pct,
            change_pct: 0.0,
        };
        let mut results = vec![row("ZUSDT", 5.0), row("AUSDT", 5.0), row("MUSDT", 7.0)];
        rank(&mut results);

        let order: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["MUSDT", "AUSDT", "ZUSDT"]);
    }
}
