use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Top-level configuration for the volscan service.
///
/// Every section is optional in the YAML file; missing fields fall back to
/// the values in [`defaults`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScannerConfig {
    #[serde(default)]
    pub server: HttpConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_http_port(),
        }
    }
}

/// Upstream exchange settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExchangeConfig {
    #[serde(default = "default_exchange_name")]
    pub name: String,
    /// REST base URL, e.g. `https://fapi.binance.com`
    #[serde(rename = "base_url")]
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(rename = "user_agent")]
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Only symbols quoted in this asset are scanned
    #[serde(rename = "quote_suffix")]
    #[serde(default = "default_quote_suffix")]
    pub quote_suffix: String,
    #[serde(rename = "kline_interval")]
    #[serde(default = "default_kline_interval")]
    pub kline_interval: String,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            name: default_exchange_name(),
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            quote_suffix: default_quote_suffix(),
            kline_interval: default_kline_interval(),
        }
    }
}

/// Fan-out and eligibility settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    #[serde(rename = "default_threshold")]
    #[serde(default = "default_threshold")]
    pub default_threshold: f64,
    /// Liquidity floor on 24h quote volume (exclusive)
    #[serde(rename = "min_quote_volume")]
    #[serde(default = "default_min_quote_volume")]
    pub min_quote_volume: f64,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(rename = "symbol_timeout_ms")]
    #[serde(default = "default_symbol_timeout_ms")]
    pub symbol_timeout_ms: u64,
    #[serde(rename = "ticker_timeout_ms")]
    #[serde(default = "default_ticker_timeout_ms")]
    pub ticker_timeout_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            default_threshold: default_threshold(),
            min_quote_volume: default_min_quote_volume(),
            concurrency: default_concurrency(),
            symbol_timeout_ms: default_symbol_timeout_ms(),
            ticker_timeout_ms: default_ticker_timeout_ms(),
        }
    }
}

/// Request shaping in front of the scan pipeline
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GateConfig {
    #[serde(rename = "cache_ttl_seconds")]
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
    #[serde(rename = "cooldown_seconds")]
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_cache_ttl_seconds(),
            cooldown_seconds: default_cooldown_seconds(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// One of `pretty`, `json`, `compact`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: ScannerConfig = serde_yaml::from_str("{}").expect("Failed to parse YAML");

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.exchange.base_url, "https://fapi.binance.com");
        assert_eq!(config.exchange.quote_suffix, "USDT");
        assert_eq!(config.exchange.kline_interval, "15m");
        assert_eq!(config.scan.concurrency, 8);
        assert_eq!(config.scan.min_quote_volume, 1_000_000.0);
        assert_eq!(config.scan.symbol_timeout_ms, 6_000);
        assert_eq!(config.scan.ticker_timeout_ms, 10_000);
        assert_eq!(config.gate.cache_ttl_seconds, 90);
        assert_eq!(config.gate.cooldown_seconds, 10);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_partial_sections() {
        let yaml = r#"
server:
  port: 9001
scan:
  concurrency: 16
  min_quote_volume: 5000000
gate:
  cooldown_seconds: 3
"#;

        let config: ScannerConfig = serde_yaml::from_str(yaml).expect("Failed to parse YAML");

        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.scan.concurrency, 16);
        assert_eq!(config.scan.min_quote_volume, 5_000_000.0);
        assert_eq!(config.scan.default_threshold, 3.0);
        assert_eq!(config.gate.cooldown_seconds, 3);
        assert_eq!(config.gate.cache_ttl_seconds, 90);
    }
}
