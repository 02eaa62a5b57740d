//! Round Harness - Backtest with Per-round Subtotals
//!
//! Buckets fixtures into competition rounds using an explicit
//! date-range table instead of a computed week number. Per-fixture
//! evaluation is the regular harness; only the labelling and the
//! subtotals differ.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::config::RoundWindow;
use crate::domain::{BacktestRecord, EngineError, Fixture, RoundSummary};
use crate::ports::odds_source::OddsSource;
use crate::ports::repository::{FixtureRepository, SampleRepository};

use super::backtest::{BacktestHarness, BacktestReport};
use super::summary::summarize;

/// Round number used for fixtures outside every configured window.
pub const UNASSIGNED_ROUND: u32 = 0;

/// Explicit round → date-range table.
#[derive(Debug, Clone, Default)]
pub struct RoundCalendar {
  windows: Vec<RoundWindow>,
}

impl RoundCalendar {
  pub fn new(windows: Vec<RoundWindow>) -> Self {
    Self { windows }
  }

  pub fn is_empty(&self) -> bool {
    self.windows.is_empty()
  }

  /// First window containing `date` (inclusive on both ends).
  pub fn round_for(&self, date: NaiveDate) -> Option<u32> {
    self
      .windows
      .iter()
      .find(|w| w.start <= date && date <= w.end)
      .map(|w| w.round)
  }

  /// Round of a fixture by its UTC kickoff date.
  pub fn round_of(&self, fixture: &Fixture) -> Option<u32> {
    self.round_for(fixture.match_date.date_naive())
  }
}

/// League report with per-round subtotals.
#[derive(Debug, Clone)]
pub struct RoundReport {
  pub report: BacktestReport,
  pub rounds: Vec<RoundSummary>,
}

/// Subtotal records by round, ascending; unassigned fixtures land in round 0.
pub fn round_subtotals(records: &[BacktestRecord]) -> Vec<RoundSummary> {
  let mut buckets: BTreeMap<u32, Vec<BacktestRecord>> = BTreeMap::new();
  for record in records {
    buckets
      .entry(record.round.unwrap_or(UNASSIGNED_ROUND))
      .or_default()
      .push(record.clone());
  }

  buckets
    .into_iter()
    .map(|(round, records)| RoundSummary {
      round,
      summary: summarize(&records),
    })
    .collect()
}

/// Run one league through the harness with round labels.
///
/// # Errors
/// Propagates harness errors (`NoFixtures`, `LookaheadViolation`).
#[instrument(skip(harness, calendar), fields(league = league.unwrap_or("all")))]
pub fn run_rounds<S, F, O>(
  harness: &BacktestHarness<S, F, O>,
  calendar: &RoundCalendar,
  league: Option<&str>,
) -> Result<RoundReport, EngineError>
where
  S: SampleRepository,
  F: FixtureRepository,
  O: OddsSource,
{
  let report = harness.run_labelled(league, |f| calendar.round_of(f))?;
  let rounds = round_subtotals(&report.records);

  for r in &rounds {
    info!(
      round = r.round,
      processed = r.summary.fixtures_processed,
      bets = r.summary.total_bets,
      profit = r.summary.total_profit,
      "Round subtotal"
    );
  }

  Ok(RoundReport { report, rounds })
}
