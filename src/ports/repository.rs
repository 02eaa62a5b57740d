//! Repository Ports - Feed Access and Result Persistence
//!
//! Sample and fixture repositories hand the engine plain value records.
//! Sample queries always carry an explicit `before` timestamp: the
//! returned samples must be dated strictly before it.
//!
//! `ResultSink` is the async persistence boundary for backtest records,
//! scan signals and run summaries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    BacktestRecord, DateRange, Fixture, FixtureEvaluation, RunSummary, Scope, Season, TeamSamples,
};

/// Optional narrowing of a sample query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleWindow {
  /// Only samples from this season.
  pub season: Option<Season>,
  /// Only the N most recent samples.
  pub max_recent: Option<usize>,
}

/// Historical per-team first-half samples.
pub trait SampleRepository: Send + Sync {
  /// Samples for `team_id` in `scope`, all dated strictly before `before`,
  /// ascending by match date.
  fn find_samples(
    &self,
    team_id: &str,
    scope: Scope,
    before: DateTime<Utc>,
    window: &SampleWindow,
  ) -> TeamSamples;
}

/// Fixture feed.
pub trait FixtureRepository: Send + Sync {
  /// Fixtures inside `range` (inclusive) and `league`, ascending by date.
  fn find_fixtures(&self, range: Option<DateRange>, league: Option<&str>) -> Vec<Fixture>;

  /// Distinct league names, sorted.
  fn leagues(&self) -> Vec<String>;
}

/// Persistence of run outputs.
///
/// Records are appended one per line so a cancelled run still leaves a
/// readable log of every completed fixture.
#[async_trait]
pub trait ResultSink: Send + Sync + 'static {
  /// Append one backtest record.
  async fn save_record(&self, record: &BacktestRecord) -> anyhow::Result<()>;

  /// Append a batch of records in order.
  async fn save_records(&self, records: &[BacktestRecord]) -> anyhow::Result<()> {
    for record in records {
      self.save_record(record).await?;
    }
    Ok(())
  }

  /// Append one live-scan evaluation.
  async fn save_evaluation(&self, evaluation: &FixtureEvaluation) -> anyhow::Result<()>;

  /// Replace the run summary snapshot.
  async fn save_summary(&self, summary: &RunSummary) -> anyhow::Result<()>;

  /// Load the most recent run summary, if any.
  async fn load_summary(&self) -> anyhow::Result<Option<RunSummary>>;

  /// Check the sink is writable.
  async fn is_healthy(&self) -> bool;
}
