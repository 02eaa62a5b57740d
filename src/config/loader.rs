//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    mode = %config.staking.mode,
    bankroll = config.staking.bankroll,
    lambda_threshold = config.thresholds.lambda_threshold,
    min_edge_pct = config.thresholds.min_edge_pct,
    n_bootstrap = config.bootstrap.n_bootstrap,
    rounds = config.rounds.len(),
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Like [`load_config`], but a missing file yields validated defaults.
///
/// # Errors
/// A file that exists but cannot be parsed or validated is still an error.
pub fn load_config_or_default(path: &str) -> Result<AppConfig> {
  if Path::new(path).exists() {
    return load_config(path);
  }

  warn!(path, "Config file not found, using defaults");
  let config = AppConfig::default();
  validate_config(&config)?;
  Ok(config)
}

/// Parse and validate a TOML document.
///
/// # Errors
/// Fails on malformed TOML or any validation rule.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-negative thresholds and a CI width in (0, 1]
/// - Staking ranges (bankroll, cap, Kelly multiplier, tolerances)
/// - Bootstrap replicate count and confidence level
/// - Backtest noise band, commission and date window
/// - A well-formed round table
pub fn validate_config(config: &AppConfig) -> Result<()> {
  // Threshold validation
  let t = &config.thresholds;
  anyhow::ensure!(
    t.lambda_threshold >= 0.0,
    "lambda_threshold must be >= 0, got {}",
    t.lambda_threshold
  );
  anyhow::ensure!(
    t.max_prob_ci_width > 0.0 && t.max_prob_ci_width <= 1.0,
    "max_prob_ci_width must be in (0, 1], got {}",
    t.max_prob_ci_width
  );
  anyhow::ensure!(t.min_edge_pct.is_finite(), "min_edge_pct must be finite");

  // Staking validation
  let s = &config.staking;
  anyhow::ensure!(
    s.bankroll >= 0.0 && s.bankroll.is_finite(),
    "bankroll must be >= 0, got {}",
    s.bankroll
  );
  anyhow::ensure!(
    (0.0..=1.0).contains(&s.stake_cap),
    "stake_cap must be in [0, 1], got {}",
    s.stake_cap
  );
  anyhow::ensure!(
    (0.0..=1.0).contains(&s.kelly_fraction),
    "kelly_fraction must be in [0, 1], got {}",
    s.kelly_fraction
  );
  anyhow::ensure!(s.tau_conf > 0.0, "tau_conf must be positive, got {}", s.tau_conf);
  anyhow::ensure!(s.flat_size >= 0.0, "flat_size must be >= 0, got {}", s.flat_size);
  anyhow::ensure!(
    s.target_edge_pct >= 0.0,
    "target_edge_pct must be >= 0, got {}",
    s.target_edge_pct
  );

  // Bootstrap validation
  let b = &config.bootstrap;
  anyhow::ensure!(b.n_bootstrap > 0, "n_bootstrap must be positive");
  anyhow::ensure!(
    b.confidence_level > 0.0 && b.confidence_level < 1.0,
    "confidence_level must be in (0, 1), got {}",
    b.confidence_level
  );

  // Backtest validation
  let bt = &config.backtest;
  anyhow::ensure!(
    (0.0..1.0).contains(&bt.odds_noise_pct),
    "odds_noise_pct must be in [0, 1), got {}",
    bt.odds_noise_pct
  );
  anyhow::ensure!(
    (0.0..1.0).contains(&bt.commission_rate),
    "commission_rate must be in [0, 1), got {}",
    bt.commission_rate
  );
  if let (Some(start), Some(end)) = (bt.start_date, bt.end_date) {
    anyhow::ensure!(start <= end, "start_date {start} is after end_date {end}");
  }

  // Round table validation
  for (i, window) in config.rounds.iter().enumerate() {
    anyhow::ensure!(
      window.start <= window.end,
      "Round {} (entry {}) starts after it ends",
      window.round,
      i
    );
  }

  if let Some(max_recent) = config.samples.max_recent {
    anyhow::ensure!(max_recent > 0, "max_recent must be positive when set");
  }

  Ok(())
}
