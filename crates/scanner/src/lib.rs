//! Volatility scanner for USDT-margined perpetual futures
//!
//! Finds liquid symbols whose latest or previous 15-minute candle moved
//! more than a percentage threshold, and serves the ranked list over HTTP.
//!
//! # Layers
//!
//! - `client` - JSON-over-HTTPS fetcher with per-call timeouts
//! - `market` - exchange adapter (`MarketData`) for tickers and candles
//! - `volatility` / `symbol` - per-candle metrics and per-symbol selection
//! - `eligibility` / `coordinator` / `pipeline` - bounded fan-out over symbols
//! - `store` / `gate` - per-client cooldown and threshold-keyed result cache
//! - `api` - axum routes for `/`, `/scan` and `/health`

pub mod api;
pub mod client;
pub mod clock;
pub mod coordinator;
pub mod eligibility;
pub mod error;
pub mod format;
pub mod gate;
pub mod market;
pub mod pipeline;
pub mod store;
pub mod symbol;
pub mod types;
pub mod volatility;

// Re-export commonly used types
pub use client::{JsonResponse, MarketClient};
pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::{rank, FanOut, FanOutSummary};
pub use eligibility::EligibilityFilter;
pub use error::{FetchError, GateError, Result, ScanError, UpstreamError};
pub use gate::{threshold_key, GateSettings, ScanGate, ScanOutput};
pub use market::{BinanceFutures, KlineResult, MarketData, StaticMarket};
pub use pipeline::ScanPipeline;
pub use store::ScanStore;
pub use symbol::{inspect_symbol, scan_symbol, SymbolOutcome};
pub use types::{Candle, CandleLabel, CandlePair, ScanRequest, Ticker, VolatilityResult};
pub use volatility::{evaluate, CandleStats};

pub use api::{create_router, ApiState};
