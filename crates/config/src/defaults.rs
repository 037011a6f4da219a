// Server defaults
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_http_port() -> u16 {
    8000
}

// Exchange defaults
pub fn default_exchange_name() -> String {
    "binance-futures".to_string()
}

pub fn default_base_url() -> String {
    "https://fapi.binance.com".to_string()
}

pub fn default_user_agent() -> String {
    "Mozilla/5.0 (BinanceVolScanner)".to_string()
}

pub fn default_quote_suffix() -> String {
    "USDT".to_string()
}

pub fn default_kline_interval() -> String {
    "15m".to_string()
}

// Scan defaults
pub fn default_threshold() -> f64 {
    3.0
}

pub fn default_min_quote_volume() -> f64 {
    1_000_000.0
}

pub fn default_concurrency() -> usize {
    8
}

pub fn default_symbol_timeout_ms() -> u64 {
    6_000
}

pub fn default_ticker_timeout_ms() -> u64 {
    10_000
}

// Gate defaults
pub fn default_cache_ttl_seconds() -> u64 {
    90
}

pub fn default_cooldown_seconds() -> u64 {
    10
}

// Observability defaults
pub fn default_log_format() -> String {
    "pretty".to_string()
}

pub fn default_metrics_port() -> u16 {
    9090
}
