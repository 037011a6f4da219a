//! One full scan: ticker listing, eligibility, fan-out, ranking

use observability::ScanMetrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::coordinator::FanOut;
use crate::eligibility::EligibilityFilter;
use crate::error::{Result, UpstreamError};
use crate::market::{BinanceFutures, MarketData};
use crate::types::VolatilityResult;

pub struct ScanPipeline {
    market: Arc<dyn MarketData>,
    filter: EligibilityFilter,
    fan_out: FanOut,
    metrics: ScanMetrics,
}

impl ScanPipeline {
    pub fn new(market: Arc<dyn MarketData>, filter: EligibilityFilter, fan_out: FanOut) -> Self {
        Self {
            market,
            filter,
            fan_out,
            metrics: ScanMetrics::new(),
        }
    }

    /// Pipeline against the configured exchange
    pub fn from_config(config: &config::ScannerConfig) -> Result<Self> {
        let market = BinanceFutures::from_config(&config.exchange, &config.scan)?;
        Ok(Self::new(
            Arc::new(market),
            EligibilityFilter::from_config(&config.exchange, &config.scan),
            FanOut::new(config.scan.concurrency),
        ))
    }

    pub fn market(&self) -> &Arc<dyn MarketData> {
        &self.market
    }

    /// Run a fresh scan, bypassing any cache.
    ///
    /// # Errors
    ///
    /// Fails only when the ticker listing is unusable. Individual symbols
    /// that cannot be fetched are left out of the result.
    pub async fn scan(
        &self,
        threshold_pct: f64,
    ) -> std::result::Result<Vec<VolatilityResult>, UpstreamError> {
        let started = Instant::now();

        let tickers = self.market.tickers().await.map_err(|e| {
            warn!(http_status = e.http_status, detail = %e.detail, "Ticker listing unusable");
            e
        })?;

        let symbols = self.filter.eligible_symbols(&tickers);
        let eligible = symbols.len();
        info!(listed = tickers.len(), eligible, threshold_pct, "Dispatching scan");

        let summary = self
            .fan_out
            .run(Arc::clone(&self.market), symbols, threshold_pct)
            .await;

        let elapsed = started.elapsed();
        self.metrics.record_scan(elapsed, eligible, summary.results.len());
        self.metrics.symbols_failed(summary.failures);

        info!(
            eligible,
            qualified = summary.results.len(),
            failures = summary.failures,
            elapsed_ms = elapsed.as_millis() as u64,
            "Scan complete"
        );

        Ok(summary.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{MockMarketData, StaticMarket};
    use crate::types::{Candle, Ticker};
    use serde_json::json;

    #[tokio::test]
    async fn test_only_eligible_symbols_scanned() {
        let market = Arc::new(
            StaticMarket::new()
                .with_ticker("BTCUSDT", 5e9)
                .with_ticker("THINUSDT", 10.0)
                .with_ticker("ETHBUSD", 5e9)
                .with_candles(
                    "BTCUSDT",
                    Candle::new(1.0, 1.0, 1.0, 1.0),
                    Candle::new(100.0, 106.0, 99.0, 103.0),
                )
                .with_candles(
                    "THINUSDT",
                    Candle::new(1.0, 1.0, 1.0, 1.0),
                    Candle::new(100.0, 150.0, 99.0, 103.0),
                ),
        );
        let pipeline = ScanPipeline::new(
            market.clone(),
            EligibilityFilter::default(),
            FanOut::default(),
        );

        let results = pipeline.scan(3.0).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "BTCUSDT");
        assert_eq!(market.ticker_calls(), 1);
        assert_eq!(market.kline_calls(), 1);
    }

    #[tokio::test]
    async fn test_ticker_failure_skips_fan_out() {
        let mut market = MockMarketData::new();
        market.expect_tickers().times(1).returning(|| {
            Err(UpstreamError {
                http_status: 451,
                detail: json!({"code": 0, "msg": "restricted location"}),
            })
        });
        market.expect_klines().never();

        let pipeline = ScanPipeline::new(
            Arc::new(market),
            EligibilityFilter::default(),
            FanOut::default(),
        );
        let err = pipeline.scan(3.0).await.unwrap_err();

        assert_eq!(err.http_status, 451);
    }

    #[tokio::test]
    async fn test_no_eligible_symbols() {
        let mut market = MockMarketData::new();
        market.expect_tickers().returning(|| {
            Ok(vec![Ticker {
                symbol: "BTCUSDT".to_string(),
                quote_volume: None,
            }])
        });

        let pipeline = ScanPipeline::new(
            Arc::new(market),
            EligibilityFilter::default(),
            FanOut::default(),
        );
        assert!(pipeline.scan(0.0).await.unwrap().is_empty());
    }
}
