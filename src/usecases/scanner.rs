//! Live Scanner - Single Pass over Upcoming Fixtures
//!
//! Evaluates scheduled fixtures with the same pipeline as the backtest,
//! cutting samples at each fixture's kickoff. Prices come from recorded
//! odds only; a fixture without a quote gets a signal with the reason
//! "No market odds available".

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::AppConfig;
use crate::domain::{DateRange, EngineError, Fixture, FixtureEvaluation, FixtureStatus};
use crate::ports::odds_source::OddsSource;
use crate::ports::repository::{FixtureRepository, SampleRepository};

use super::backtest::CancellationFlag;
use super::evaluator::FixtureEvaluator;

/// Outcome of one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
  pub evaluations: Vec<FixtureEvaluation>,
  pub signals: usize,
  pub cancelled: bool,
}

impl ScanReport {
  /// Evaluations whose gate fired with a positive stake.
  pub fn bets(&self) -> impl Iterator<Item = &FixtureEvaluation> {
    self.evaluations.iter().filter(|e| e.is_bet())
  }
}

/// Scans scheduled fixtures for bet signals.
pub struct LiveScanner<S: SampleRepository, F: FixtureRepository, O: OddsSource> {
  evaluator: FixtureEvaluator<S, O>,
  fixtures: Arc<F>,
  league_filter: Vec<String>,
  cancel: CancellationFlag,
}

impl<S, F, O> LiveScanner<S, F, O>
where
  S: SampleRepository,
  F: FixtureRepository,
  O: OddsSource,
{
  /// # Errors
  /// `EngineError::StakeConfiguration` for an invalid staking section.
  pub fn new(
    samples: Arc<S>,
    fixtures: Arc<F>,
    recorded_odds: Arc<O>,
    config: &AppConfig,
    cancel: CancellationFlag,
  ) -> Result<Self, EngineError> {
    Ok(Self {
      evaluator: FixtureEvaluator::new(samples, recorded_odds, config)?,
      fixtures,
      league_filter: config.backtest.league_filter.clone(),
      cancel,
    })
  }

  /// Evaluate every scheduled fixture in `range`.
  ///
  /// # Errors
  /// `LookaheadViolation` from a misbehaving repository.
  #[instrument(skip(self))]
  pub fn scan(&self, range: Option<DateRange>) -> Result<ScanReport, EngineError> {
    let fixtures: Vec<Fixture> = self
      .fixtures
      .find_fixtures(range, None)
      .into_iter()
      .filter(|f| f.status == FixtureStatus::Scheduled)
      .filter(|f| self.league_filter.is_empty() || self.league_filter.contains(&f.league))
      .collect();

    info!(fixtures = fixtures.len(), "Starting scan");

    let mut report = ScanReport::default();
    for fixture in &fixtures {
      if self.cancel.is_cancelled() {
        warn!(completed = report.evaluations.len(), "Scan cancelled");
        report.cancelled = true;
        break;
      }
      let evaluation = self.evaluator.evaluate(fixture)?.evaluation;
      if evaluation.is_bet() {
        report.signals += 1;
        info!(
          fixture_id = %evaluation.fixture_id,
          league = %evaluation.league,
          edge_pct = ?evaluation.value.as_ref().and_then(|v| v.edge_pct),
          stake = evaluation.stake.stake_amount,
          "Bet signal"
        );
      }
      report.evaluations.push(evaluation);
    }

    info!(
      evaluated = report.evaluations.len(),
      signals = report.signals,
      "Scan complete"
    );
    Ok(report)
  }
}
