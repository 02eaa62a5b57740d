//! Configuration Module - TOML-based Engine Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! Thresholds, staking policy, bootstrap settings and feed paths are
//! externalized here - nothing is hardcoded in the domain layer.
//! The resulting `AppConfig` is built once and passed down by reference.

pub mod loader;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::{GateThresholds, StakeMode, StakePolicy, WagerSide};

/// Top-level engine configuration.
///
/// Every section has defaults, so an empty file is a valid config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Engine identity and logging.
  pub engine: EngineConfig,
  /// Decision thresholds.
  pub thresholds: ThresholdConfig,
  /// Stake sizing policy.
  pub staking: StakingConfig,
  /// Bootstrap interval settings.
  pub bootstrap: BootstrapConfig,
  /// Sample window selection.
  pub samples: SampleConfig,
  /// Backtest run parameters.
  pub backtest: BacktestConfig,
  /// Competition round table for the round-based harness.
  pub rounds: Vec<RoundWindow>,
  /// Feed and output locations.
  pub persistence: PersistenceConfig,
}

/// Engine identity configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Human-readable run name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  pub log_level: String,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
    }
  }
}

/// Decision gate thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
  /// Minimum expected first-half goals.
  pub lambda_threshold: f64,
  /// Minimum home-scope samples for the home team.
  pub min_samples_home: usize,
  /// Minimum away-scope samples for the away team.
  pub min_samples_away: usize,
  /// Minimum edge over fair odds, in percent.
  pub min_edge_pct: f64,
  /// Maximum width of the probability interval.
  pub max_prob_ci_width: f64,
}

impl Default for ThresholdConfig {
  fn default() -> Self {
    Self {
      lambda_threshold: 1.5,
      min_samples_home: 8,
      min_samples_away: 8,
      min_edge_pct: 3.0,
      max_prob_ci_width: 0.20,
    }
  }
}

impl ThresholdConfig {
  pub fn gate(&self) -> GateThresholds {
    GateThresholds {
      lambda_threshold: self.lambda_threshold,
      max_prob_ci_width: self.max_prob_ci_width,
    }
  }
}

/// Stake sizing configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StakingConfig {
  /// `flat` or `dynamic`.
  pub mode: StakeMode,
  /// Bankroll the caps are measured against.
  pub bankroll: f64,
  /// Fixed stake in flat mode.
  pub flat_size: f64,
  /// Kelly fraction multiplier (0.5 = half-Kelly).
  pub kelly_fraction: f64,
  /// CI width tolerance for the confidence weight.
  pub tau_conf: f64,
  /// Edge (percent) at which the value weight saturates.
  pub target_edge_pct: f64,
  /// Maximum stake as a fraction of bankroll.
  pub stake_cap: f64,
}

impl Default for StakingConfig {
  fn default() -> Self {
    Self::from(&StakePolicy::default())
  }
}

impl From<&StakePolicy> for StakingConfig {
  fn from(p: &StakePolicy) -> Self {
    Self {
      mode: p.mode,
      bankroll: p.bankroll,
      flat_size: p.flat_size,
      kelly_fraction: p.kelly_fraction,
      tau_conf: p.tau_conf,
      target_edge_pct: p.target_edge_pct,
      stake_cap: p.stake_cap,
    }
  }
}

impl StakingConfig {
  pub fn policy(&self) -> StakePolicy {
    StakePolicy {
      mode: self.mode,
      bankroll: self.bankroll,
      flat_size: self.flat_size,
      kelly_fraction: self.kelly_fraction,
      tau_conf: self.tau_conf,
      target_edge_pct: self.target_edge_pct,
      stake_cap: self.stake_cap,
    }
  }
}

/// Bootstrap configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
  /// Number of resampling replicates.
  pub n_bootstrap: usize,
  /// Two-sided confidence level, e.g. 0.95.
  pub confidence_level: f64,
}

impl Default for BootstrapConfig {
  fn default() -> Self {
    Self {
      n_bootstrap: crate::domain::projection::DEFAULT_N_BOOTSTRAP,
      confidence_level: crate::domain::projection::DEFAULT_CONFIDENCE_LEVEL,
    }
  }
}

/// Which historical samples feed a projection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
  /// Restrict samples to the fixture's own season.
  pub season_to_date: bool,
  /// Keep only the N most recent samples per scope.
  pub max_recent: Option<usize>,
}

/// Backtest run configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
  /// Base seed for bootstrap and synthetic odds.
  pub seed: u64,
  /// Half-width of the synthetic odds noise band (0.10 = ±10%).
  pub odds_noise_pct: f64,
  /// Which side of the market a bet takes.
  pub wager_side: WagerSide,
  /// Exchange commission on net winnings.
  pub commission_rate: f64,
  /// Evaluate fixtures on the rayon pool.
  pub parallel: bool,
  /// Leagues to run; empty means every league in the feed.
  pub league_filter: Vec<String>,
  /// First match date to include.
  pub start_date: Option<NaiveDate>,
  /// Last match date to include.
  pub end_date: Option<NaiveDate>,
}

impl Default for BacktestConfig {
  fn default() -> Self {
    Self {
      seed: 42,
      odds_noise_pct: 0.10,
      wager_side: WagerSide::BackOver,
      commission_rate: 0.0,
      parallel: false,
      league_filter: Vec::new(),
      start_date: None,
      end_date: None,
    }
  }
}

/// One row of the competition round table (inclusive dates).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoundWindow {
  pub round: u32,
  pub start: NaiveDate,
  pub end: NaiveDate,
}

/// Feed and output locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
  /// Directory for outputs.
  pub data_dir: String,
  /// Historical sample feed (JSON array or JSONL).
  pub samples_path: String,
  /// Fixture feed (JSON array or JSONL).
  pub fixtures_path: String,
  /// Recorded odds feed; absent means synthetic odds only.
  pub odds_path: Option<String>,
  /// JSONL record log, relative to `data_dir`.
  pub records_file: String,
  /// Summary snapshot, relative to `data_dir`.
  pub summary_file: String,
  /// Prometheus text metrics, relative to `data_dir`.
  pub metrics_file: String,
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
      samples_path: "data/samples.jsonl".to_string(),
      fixtures_path: "data/fixtures.jsonl".to_string(),
      odds_path: None,
      records_file: "records.jsonl".to_string(),
      summary_file: "summary.json".to_string(),
      metrics_file: "metrics.prom".to_string(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "fh-over".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_data_dir() -> String {
  "data".to_string()
}
