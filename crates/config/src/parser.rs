use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ScannerConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    parse_config(&content)
}

/// Parse a YAML document after environment variable substitution
pub fn parse_config(content: &str) -> Result<ScannerConfig> {
    let substituted = substitution::substitute_env_vars(content)?;
    debug!("Environment variable substitution completed");

    // An empty file is a valid "all defaults" configuration
    if substituted.trim().is_empty() {
        return Ok(ScannerConfig::default());
    }

    let config: ScannerConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    info!("Configuration loaded successfully");
    Ok(config)
}

/// Load the config file if it exists, otherwise fall back to defaults
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<ScannerConfig> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        warn!(?path, "Config file not found, using built-in defaults");
        Ok(generate_default_config())
    }
}

#[instrument]
pub fn generate_default_config() -> ScannerConfig {
    ScannerConfig::default()
}

#[instrument]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(
    config: &ScannerConfig,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volscan.yaml");

        let mut config = generate_default_config();
        config.scan.concurrency = 4;
        config.gate.cache_ttl_seconds = 30;
        save_config(&config, &path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.scan.concurrency, 4);
        assert_eq!(loaded.gate.cache_ttl_seconds, 30);
        assert_eq!(loaded.exchange.quote_suffix, "USDT");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_or_default(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_empty_content() {
        let config = parse_config("   \n").unwrap();
        assert_eq!(config.gate.cooldown_seconds, 10);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(parse_config("scan: [unterminated").is_err());
    }
}
