//! volscan CLI and Server Binary
//!
//! Entry point for the scanner. Provides commands for initializing and
//! validating configuration, running a one-off scan, and serving the
//! HTTP API.

use anyhow::{Context, Result};
use cli::{Cli, Commands, LogFormatArg};
use config::{
    generate_default_config, load_config, load_config_or_default, save_config, validate_config,
    ScannerConfig,
};
use observability::{init_logging, init_metrics, LogFormat};
use scanner::api::ScanRow;
use scanner::{create_router, ApiState, GateSettings, ScanGate, ScanPipeline};
use server::{validate_port_available, HealthState, HttpServer, ServerConfig, ServerExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const SERVICE_NAME: &str = "volscan";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            log_format,
        } => serve_command(config, host, port, log_format).await,
        Commands::Scan {
            config,
            threshold,
            json,
        } => scan_command(config, threshold, json).await,
        Commands::Validate { config } => {
            init_logging(SERVICE_NAME, LogFormat::Compact)?;
            info!("Executing 'validate' command");
            validate_command(config).await
        }
        Commands::Init { output } => {
            init_logging(SERVICE_NAME, LogFormat::Compact)?;
            info!("Executing 'init' command");
            init_command(output).await
        }
    }
}

/// Log warnings and fail on validation errors
fn check_config(config: &ScannerConfig) -> Result<()> {
    let report = validate_config(config);

    if !report.warnings.is_empty() {
        warn!("Configuration warnings:");
        for warning in &report.warnings {
            warn!(field = %warning.field, message = %warning.message);
        }
    }

    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start scanner due to configuration errors");
    }

    Ok(())
}

async fn serve_command(
    config_path: PathBuf,
    host_override: Option<String>,
    port_override: Option<u16>,
    log_format_override: Option<LogFormatArg>,
) -> Result<()> {
    let mut config = load_config_or_default(&config_path)?;

    let log_format = match log_format_override {
        Some(format) => format.as_str().to_string(),
        None => config.logging.format.clone(),
    };
    init_logging(SERVICE_NAME, LogFormat::parse(&log_format).unwrap_or_default())?;
    info!(path = ?config_path, "Executing 'serve' command");

    if let Some(host) = host_override {
        debug!(%host, "Overriding listen host");
        config.server.host = host;
    }
    if let Some(port) = port_override {
        debug!(port, "Overriding HTTP port");
        config.server.port = port;
    }

    check_config(&config)?;

    if config.metrics.enabled {
        init_metrics(config.metrics.port)?;
    }

    let pipeline = ScanPipeline::from_config(&config)?;
    let gate = ScanGate::new(pipeline, GateSettings::from_config(&config.gate));
    let state = ApiState::new(Arc::new(gate), config.scan.default_threshold);
    let health = Arc::new(HealthState::new(SERVICE_NAME, env!("CARGO_PKG_VERSION")));
    let router = create_router(state, health);

    let server_config = ServerConfig::new(config.server.host.clone(), config.server.port);
    validate_port_available(&server_config).await?;

    info!(
        exchange = %config.exchange.name,
        base_url = %config.exchange.base_url,
        concurrency = config.scan.concurrency,
        cache_ttl_seconds = config.gate.cache_ttl_seconds,
        cooldown_seconds = config.gate.cooldown_seconds,
        "Starting scanner"
    );

    // Serve until SIGINT or SIGTERM
    HttpServer::new(server_config, router).run_until_signal().await?;

    Ok(())
}

async fn scan_command(config_path: PathBuf, threshold: Option<f64>, json: bool) -> Result<()> {
    let config = load_config_or_default(&config_path)?;
    init_logging(SERVICE_NAME, LogFormat::Compact)?;
    check_config(&config)?;

    let threshold = threshold.unwrap_or(config.scan.default_threshold);
    if !(0.0..=100.0).contains(&threshold) {
        anyhow::bail!("Threshold must be between 0 and 100, got {}", threshold);
    }

    let pipeline = ScanPipeline::from_config(&config)?;
    let results = pipeline.scan(threshold).await.map_err(|e| {
        error!(http_status = e.http_status, detail = %e.detail, "Exchange ticker response error");
        anyhow::anyhow!("{} (detail: {})", e, e.detail)
    })?;

    let rows: Vec<ScanRow> = results.iter().map(ScanRow::from).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{:<16} {:<9} {:>12} {:>27} {:>9} {:>9}",
        "SYMBOL", "CANDLE", "PRICE", "HIGH / LOW", "RANGE", "CHANGE"
    );
    for row in &rows {
        println!(
            "{:<16} {:<9} {:>12} {:>27} {:>9} {:>9}",
            row.symbol, row.candle, row.price, row.range, row.volatility, row.change
        );
    }
    println!();
    println!("{} symbols at or above {}%", rows.len(), threshold);

    Ok(())
}

async fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Exchange: {} ({})", config.exchange.name, config.exchange.base_url);
    println!(
        "Universe: *{} with 24h quote volume above {}",
        config.exchange.quote_suffix, config.scan.min_quote_volume
    );
    println!("Candle interval: {}", config.exchange.kline_interval);
    println!("Concurrency: {}", config.scan.concurrency);
    println!(
        "Cache TTL: {}s, cooldown: {}s",
        config.gate.cache_ttl_seconds, config.gate.cooldown_seconds
    );
    println!("Listen: {}:{}", config.server.host, config.server.port);

    Ok(())
}

async fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Edit the configuration file to customize settings");
    println!(
        "  2. Run 'volscan validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  3. Run 'volscan serve --config {:?}' to start the scanner",
        output_path
    );

    Ok(())
}
