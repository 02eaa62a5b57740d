//! Evaluation, backtest record and summary value objects.
//!
//! Built fresh per fixture and never mutated afterwards. Summaries are
//! pure reductions over a record list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fixture::{FixtureId, TeamId};
use super::projection::ProjectionResult;
use super::settlement::WagerSide;
use super::signal::Signal;
use super::staking::StakeResult;
use super::value::ValueResult;

/// Full pipeline output for one fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureEvaluation {
    pub fixture_id: FixtureId,
    pub league: String,
    pub match_date: DateTime<Utc>,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_samples: usize,
    pub away_samples: usize,
    /// `None` when sample validation failed and projection was skipped.
    pub projection: Option<ProjectionResult>,
    pub value: Option<ValueResult>,
    pub stake: StakeResult,
    pub signal: Signal,
}

impl FixtureEvaluation {
    /// A bet is placed only when every gate passed and the stake is positive.
    pub fn is_bet(&self) -> bool {
        self.signal.signal && self.stake.stake_amount > 0.0
    }
}

/// How a processed fixture ended up in the record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    /// Below the minimum sample counts; processed, no bet.
    InsufficientSamples,
    /// Evaluated but the gate did not fire.
    NoBet,
    Won,
    Lost,
    /// Bet signalled but no half-time score to settle against.
    Unsettled,
}

/// One row per evaluated fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRecord {
    #[serde(flatten)]
    pub evaluation: FixtureEvaluation,
    pub round: Option<u32>,
    pub wager_side: WagerSide,
    pub actual_first_half_goals: Option<u32>,
    pub actual_over_05: Option<bool>,
    pub outcome: RecordOutcome,
    pub profit_loss: f64,
    /// `profit_loss / stake` for settled bets.
    pub roi: Option<f64>,
}

impl BacktestRecord {
    /// Whether this record counts toward the bet population.
    pub fn is_settled_bet(&self) -> bool {
        matches!(self.outcome, RecordOutcome::Won | RecordOutcome::Lost)
    }

    pub fn stake_amount(&self) -> f64 {
        self.evaluation.stake.stake_amount
    }
}

/// Aggregated performance over settled bets, plus coverage counts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub total_bets: usize,
    pub winning_bets: usize,
    pub losing_bets: usize,
    pub win_rate: f64,
    pub total_staked: f64,
    pub total_profit: f64,
    pub total_roi: f64,
    pub avg_stake: f64,
    pub avg_profit_per_bet: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub fixtures_processed: usize,
    pub fixtures_insufficient_samples: usize,
    pub fixtures_unsettled: usize,
}

/// Subtotal for one competition round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// 0 collects fixtures outside every configured round.
    pub round: u32,
    pub summary: BacktestSummary,
}

/// Persisted snapshot of a completed (or cancelled) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub run_name: String,
    pub generated_at: DateTime<Utc>,
    pub leagues: Vec<LeagueSummary>,
    pub overall: BacktestSummary,
    pub cancelled: bool,
}

/// Per-league section of a run snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueSummary {
    pub league: String,
    pub summary: BacktestSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rounds: Vec<RoundSummary>,
}
