use crate::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid exchange base_url '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("Exchange quote_suffix must not be empty")]
    MissingQuoteSuffix,

    #[error("Exchange kline_interval must not be empty")]
    MissingKlineInterval,

    #[error("{field} must be a positive integer")]
    InvalidPositiveInteger { field: String },

    #[error("{field} must be a non-negative number")]
    InvalidNonNegative { field: String },

    #[error("{field} must be between 0 and 100")]
    InvalidPercentageRange { field: String },

    #[error("Unknown log format '{0}'. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("Environment variable placeholder left unresolved in {field}")]
    UnresolvedEnvVar { field: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &ScannerConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_exchange(&config.exchange, &mut report);
    validate_scan(&config.scan, &mut report);
    validate_gate(&config.gate, &mut report);

    if !matches!(config.logging.format.to_lowercase().as_str(), "pretty" | "json" | "compact") {
        report.add_error(ValidationError::InvalidLogFormat(config.logging.format.clone()));
    }

    if config.metrics.enabled && config.metrics.port == config.server.port {
        report.add_warning(
            "metrics.port",
            "Metrics exporter shares the HTTP port and will fail to bind",
        );
    }

    report
}

fn validate_exchange(exchange: &ExchangeConfig, report: &mut ValidationReport) {
    if has_unresolved_env_vars(&exchange.base_url) {
        report.add_error(ValidationError::UnresolvedEnvVar {
            field: "exchange.base_url".to_string(),
        });
    } else {
        match url::Url::parse(&exchange.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                if url.scheme() == "http" {
                    report.add_warning("exchange.base_url", "Exchange is reached over plain HTTP");
                }
            }
            Ok(url) => report.add_error(ValidationError::InvalidBaseUrl {
                url: exchange.base_url.clone(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => report.add_error(ValidationError::InvalidBaseUrl {
                url: exchange.base_url.clone(),
                message: e.to_string(),
            }),
        }
    }

    if exchange.quote_suffix.trim().is_empty() {
        report.add_error(ValidationError::MissingQuoteSuffix);
    }

    if exchange.kline_interval.trim().is_empty() {
        report.add_error(ValidationError::MissingKlineInterval);
    } else if exchange.kline_interval != "15m" {
        report.add_warning(
            "exchange.kline_interval",
            "Scanner is tuned for 15m candles; thresholds may need adjusting",
        );
    }

    if exchange.user_agent.trim().is_empty() {
        report.add_warning("exchange.user_agent", "Empty user agent may be rejected upstream");
    }
}

fn validate_scan(scan: &ScanConfig, report: &mut ValidationReport) {
    if !(0.0..=100.0).contains(&scan.default_threshold) {
        report.add_error(ValidationError::InvalidPercentageRange {
            field: "scan.default_threshold".to_string(),
        });
    }

    if !scan.min_quote_volume.is_finite() || scan.min_quote_volume < 0.0 {
        report.add_error(ValidationError::InvalidNonNegative {
            field: "scan.min_quote_volume".to_string(),
        });
    }

    if scan.concurrency == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "scan.concurrency".to_string(),
        });
    } else if scan.concurrency > 32 {
        report.add_warning(
            "scan.concurrency",
            "High concurrency may trip the exchange's request weight limits",
        );
    }

    if scan.symbol_timeout_ms == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "scan.symbol_timeout_ms".to_string(),
        });
    }

    if scan.ticker_timeout_ms == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "scan.ticker_timeout_ms".to_string(),
        });
    }
}

fn validate_gate(gate: &GateConfig, report: &mut ValidationReport) {
    if gate.cache_ttl_seconds == 0 {
        report.add_warning(
            "gate.cache_ttl_seconds",
            "Cache disabled, every request scans upstream",
        );
    }

    if gate.cooldown_seconds == 0 {
        report.add_warning("gate.cooldown_seconds", "Per-client cooldown disabled");
    }
}
