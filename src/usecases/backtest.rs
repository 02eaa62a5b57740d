//! Backtest Harness - Chronological Causal Replay
//!
//! Per league: Init → (per fixture, ascending by kickoff) Evaluate →
//! Record → Next, terminal Summarize.
//!
//! Every fixture draws its randomness from a seed derived from its own
//! id, so sequential and parallel runs produce identical records. In
//! parallel mode workers return records and the reduction happens on
//! the calling thread. Cancellation is checked only between fixtures;
//! an emitted record is always complete.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{NaiveTime, TimeZone, Utc};
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::config::{AppConfig, BacktestConfig};
use crate::domain::{
  BacktestRecord, BacktestSummary, DateRange, EngineError, Fixture, RecordOutcome, Settlement,
};
use crate::ports::odds_source::OddsSource;
use crate::ports::repository::{FixtureRepository, SampleRepository};

use super::evaluator::{Evaluated, FixtureEvaluator};
use super::summary::summarize;

/// Shared stop flag, honoured at fixture boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    self.0.store(true, Ordering::SeqCst);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }
}

/// Result of one league run.
#[derive(Debug, Clone)]
pub struct BacktestReport {
  /// `None` when the run covered every league at once.
  pub league: Option<String>,
  pub records: Vec<BacktestRecord>,
  pub summary: BacktestSummary,
  /// Stopped early; `records` holds the completed prefix.
  pub cancelled: bool,
}

/// Drives the evaluator over a league's finished fixtures.
pub struct BacktestHarness<S: SampleRepository, F: FixtureRepository, O: OddsSource> {
  evaluator: FixtureEvaluator<S, O>,
  fixtures: Arc<F>,
  settings: BacktestConfig,
  cancel: CancellationFlag,
}

impl<S, F, O> BacktestHarness<S, F, O>
where
  S: SampleRepository,
  F: FixtureRepository,
  O: OddsSource,
{
  /// Wire a harness.
  ///
  /// # Errors
  /// `EngineError::StakeConfiguration` for an invalid staking section.
  pub fn new(
    samples: Arc<S>,
    fixtures: Arc<F>,
    odds: Arc<O>,
    config: &AppConfig,
    cancel: CancellationFlag,
  ) -> Result<Self, EngineError> {
    Ok(Self {
      evaluator: FixtureEvaluator::new(samples, odds, config)?,
      fixtures,
      settings: config.backtest.clone(),
      cancel,
    })
  }

  /// Configured date window as UTC instants (whole days, inclusive).
  pub fn date_range(&self) -> Option<DateRange> {
    let start = self
      .settings
      .start_date
      .map_or(chrono::DateTime::<Utc>::MIN_UTC, |d| {
        Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN))
      });
    let end = self
      .settings
      .end_date
      .and_then(|d| d.and_hms_nano_opt(23, 59, 59, 999_999_999))
      .map_or(chrono::DateTime::<Utc>::MAX_UTC, |d| Utc.from_utc_datetime(&d));

    (self.settings.start_date.is_some() || self.settings.end_date.is_some())
      .then(|| DateRange::new(start, end))
  }

  /// Finished fixtures for `league`, ascending by kickoff.
  pub fn finished_fixtures(&self, league: Option<&str>) -> Vec<Fixture> {
    let mut fixtures: Vec<Fixture> = self
      .fixtures
      .find_fixtures(self.date_range(), league)
      .into_iter()
      .filter(Fixture::is_finished)
      .collect();
    fixtures.sort_by_key(|f| f.match_date);
    fixtures
  }

  /// Backtest one league (or the whole feed with `None`).
  ///
  /// # Errors
  /// `NoFixtures` when nothing finished falls inside the window, or
  /// `LookaheadViolation` from a misbehaving repository.
  pub fn run_league(&self, league: Option<&str>) -> Result<BacktestReport, EngineError> {
    self.run_labelled(league, |_| None)
  }

  /// Backtest with a round label attached to each record.
  ///
  /// # Errors
  /// As [`Self::run_league`].
  #[instrument(skip(self, round_of), fields(league = league.unwrap_or("all")))]
  pub fn run_labelled<L>(
    &self,
    league: Option<&str>,
    round_of: L,
  ) -> Result<BacktestReport, EngineError>
  where
    L: Fn(&Fixture) -> Option<u32> + Sync,
  {
    let fixtures = self.finished_fixtures(league);
    if fixtures.is_empty() {
      return Err(EngineError::NoFixtures {
        league: league.map(str::to_string),
      });
    }

    info!(
      fixtures = fixtures.len(),
      parallel = self.settings.parallel,
      odds = self.evaluator.odds_source_name(),
      max_stake = self.evaluator.sizer().max_stake(),
      wager_side = %self.settings.wager_side,
      "Starting backtest"
    );

    let (records, cancelled) = if self.settings.parallel {
      self.run_parallel(&fixtures, &round_of)?
    } else {
      self.run_sequential(&fixtures, &round_of)?
    };

    if cancelled {
      warn!(
        completed = records.len(),
        total = fixtures.len(),
        "Backtest cancelled at fixture boundary"
      );
    }

    let summary = summarize(&records);
    info!(
      processed = summary.fixtures_processed,
      bets = summary.total_bets,
      win_rate = summary.win_rate,
      profit = summary.total_profit,
      roi = summary.total_roi,
      max_drawdown = summary.max_drawdown,
      "Backtest complete"
    );

    Ok(BacktestReport {
      league: league.map(str::to_string),
      records,
      summary,
      cancelled,
    })
  }

  /// Run every configured league (or every league in the feed) in turn.
  ///
  /// # Errors
  /// The first league-level error aborts the remaining leagues.
  pub fn run_all(&self) -> Result<Vec<BacktestReport>, EngineError> {
    let leagues = if self.settings.league_filter.is_empty() {
      self.fixtures.leagues()
    } else {
      self.settings.league_filter.clone()
    };
    if leagues.is_empty() {
      return Err(EngineError::NoFixtures { league: None });
    }

    let mut reports = Vec::with_capacity(leagues.len());
    for league in &leagues {
      if self.cancel.is_cancelled() {
        warn!(league = %league, "Skipping league after cancellation");
        break;
      }
      reports.push(self.run_league(Some(league.as_str()))?);
    }
    Ok(reports)
  }

  fn run_sequential<L>(
    &self,
    fixtures: &[Fixture],
    round_of: &L,
  ) -> Result<(Vec<BacktestRecord>, bool), EngineError>
  where
    L: Fn(&Fixture) -> Option<u32>,
  {
    let mut records = Vec::with_capacity(fixtures.len());
    for fixture in fixtures {
      if self.cancel.is_cancelled() {
        return Ok((records, true));
      }
      records.push(self.process(fixture, round_of(fixture))?);
    }
    Ok((records, false))
  }

  fn run_parallel<L>(
    &self,
    fixtures: &[Fixture],
    round_of: &L,
  ) -> Result<(Vec<BacktestRecord>, bool), EngineError>
  where
    L: Fn(&Fixture) -> Option<u32> + Sync,
  {
    let results: Vec<Option<Result<BacktestRecord, EngineError>>> = fixtures
      .par_iter()
      .map(|fixture| {
        (!self.cancel.is_cancelled()).then(|| self.process(fixture, round_of(fixture)))
      })
      .collect();

    // Keep the chronological prefix of completed fixtures.
    let mut records = Vec::with_capacity(results.len());
    for result in results {
      match result {
        Some(record) => records.push(record?),
        None => return Ok((records, true)),
      }
    }
    Ok((records, false))
  }

  fn process(&self, fixture: &Fixture, round: Option<u32>) -> Result<BacktestRecord, EngineError> {
    let evaluated = self.evaluator.evaluate(fixture)?;
    let record = settle_record(evaluated, fixture, &self.settings, round);
    debug!(
      fixture_id = %fixture.id,
      outcome = ?record.outcome,
      profit_loss = record.profit_loss,
      "Fixture recorded"
    );
    Ok(record)
  }
}

/// Resolve an evaluation against the fixture's recorded half-time score.
pub fn settle_record(
  evaluated: Evaluated,
  fixture: &Fixture,
  settings: &BacktestConfig,
  round: Option<u32>,
) -> BacktestRecord {
  let Evaluated { evaluation, quote } = evaluated;
  let actual = fixture.actual_first_half_goals();
  let actual_over_05 = actual.map(|g| g > 0);

  let (outcome, profit_loss, roi) = if !evaluation.signal.min_samples_met {
    (RecordOutcome::InsufficientSamples, 0.0, None)
  } else if !evaluation.is_bet() {
    (RecordOutcome::NoBet, 0.0, None)
  } else {
    let over_odds = evaluation
      .value
      .as_ref()
      .and_then(|v| v.market_odds)
      .unwrap_or(1.0);
    match actual_over_05 {
      None => (RecordOutcome::Unsettled, 0.0, None),
      Some(hit) => {
        let stake = evaluation.stake.stake_amount;
        let pl = Settlement {
          side: settings.wager_side,
          stake,
          over_odds,
          under_odds: quote.and_then(|q| q.under_odds),
          commission_rate: settings.commission_rate,
        }
        .profit_loss(hit);
        let outcome = if hit { RecordOutcome::Won } else { RecordOutcome::Lost };
        (outcome, pl, Some(pl / stake))
      }
    }
  };

  BacktestRecord {
    evaluation,
    round,
    wager_side: settings.wager_side,
    actual_first_half_goals: actual,
    actual_over_05,
    outcome,
    profit_loss,
    roi,
  }
}
