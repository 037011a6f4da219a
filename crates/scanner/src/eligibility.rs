//! Liquidity and quote-asset filter over the ticker listing

use crate::types::Ticker;

#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityFilter {
    quote_suffix: String,
    min_quote_volume: f64,
}

impl EligibilityFilter {
    pub fn new(quote_suffix: impl Into<String>, min_quote_volume: f64) -> Self {
        Self {
            quote_suffix: quote_suffix.into(),
            min_quote_volume,
        }
    }

    pub fn from_config(exchange: &config::ExchangeConfig, scan: &config::ScanConfig) -> Self {
        Self::new(exchange.quote_suffix.clone(), scan.min_quote_volume)
    }

    /// Quoted in the configured asset and strictly above the volume floor.
    /// A missing or non-numeric volume never qualifies.
    pub fn is_eligible(&self, ticker: &Ticker) -> bool {
        ticker.symbol.ends_with(&self.quote_suffix)
            && ticker
                .quote_volume
                .is_some_and(|volume| volume > self.min_quote_volume)
    }

    /// Symbols to scan, in listing order
    pub fn eligible_symbols(&self, tickers: &[Ticker]) -> Vec<String> {
        tickers
            .iter()
            .filter(|ticker| self.is_eligible(ticker))
            .map(|ticker| ticker.symbol.clone())
            .collect()
    }
}

impl Default for EligibilityFilter {
    fn default() -> Self {
        Self::new("USDT", 1_000_000.0)
    }
}
