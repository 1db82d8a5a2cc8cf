//! Configuration Loader - File Loading, Overrides and Validation
//!
//! Handles loading `config.toml`, applying `RATES_*` environment
//! overrides, validating all parameters, and providing clear error
//! messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};

use super::{AppConfig, StoreBackend};

/// Environment variable naming the config file path.
pub const CONFIG_PATH_ENV: &str = "RATES_CONFIG";

/// Load, override and validate configuration.
///
/// A missing file is not an error: defaults are used and only the
/// environment overrides apply. A file that exists but cannot be
/// read or parsed is an error.
///
/// # Errors
/// Returns detailed error if:
/// - The file exists but can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let mut config = if path.exists() {
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)?
  } else {
    AppConfig::default()
  };

  apply_env_overrides(&mut config, |key| std::env::var(key).ok());
  validate_config(&config)?;

  Ok(config)
}

/// Parse a TOML document into configuration (no validation).
pub fn parse_config(content: &str) -> Result<AppConfig> {
  toml::from_str(content).context("Failed to parse config.toml")
}

/// Apply `RATES_*` overrides read through `lookup`.
///
/// Supported keys: `RATES_DATABASE_URL`, `RATES_EXCHANGE_BASE_URL`,
/// `RATES_SERVER_BIND`, `RATES_LOG_LEVEL`.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
  if let Some(url) = lookup("RATES_DATABASE_URL") {
    config.database.url = url;
  }
  if let Some(url) = lookup("RATES_EXCHANGE_BASE_URL") {
    config.exchange.base_url = url;
  }
  if let Some(bind) = lookup("RATES_SERVER_BIND") {
    config.server.bind_address = bind;
  }
  if let Some(level) = lookup("RATES_LOG_LEVEL") {
    config.service.log_level = level;
  }
}

/// Validate all configuration parameters.
pub fn validate_config(config: &AppConfig) -> Result<()> {
  // Exchange validation
  anyhow::ensure!(
    !config.exchange.base_url.is_empty(),
    "Exchange base_url must not be empty"
  );
  anyhow::ensure!(
    config.exchange.timeout_ms > 0,
    "Exchange timeout_ms must be positive"
  );
  anyhow::ensure!(
    !config.exchange.default_market.trim().is_empty(),
    "Exchange default_market must not be empty"
  );

  // Server validation
  anyhow::ensure!(
    !config.server.bind_address.is_empty(),
    "Server bind_address must not be empty"
  );
  anyhow::ensure!(
    config.server.request_timeout_ms > 0,
    "Server request_timeout_ms must be positive"
  );

  // Database validation
  if config.database.backend == StoreBackend::Postgres {
    anyhow::ensure!(
      !config.database.url.is_empty(),
      "Database url must not be empty for the postgres backend"
    );
    anyhow::ensure!(
      config.database.max_open_conns > 0,
      "Database max_open_conns must be positive"
    );
    anyhow::ensure!(
      config.database.min_idle_conns <= config.database.max_open_conns,
      "Database min_idle_conns ({}) must not exceed max_open_conns ({})",
      config.database.min_idle_conns,
      config.database.max_open_conns
    );
  }

  Ok(())
}
