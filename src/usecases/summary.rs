//! Backtest Summary - Pure Reduction over Records
//!
//! Performance figures cover settled bets only. Coverage counts cover
//! every processed fixture. Drawdown walks the cumulative-profit curve
//! in record order, which the harness keeps chronological.

use crate::domain::{BacktestRecord, BacktestSummary, RecordOutcome};

/// Reduce a record list to a summary.
pub fn summarize(records: &[BacktestRecord]) -> BacktestSummary {
  let bets: Vec<&BacktestRecord> = records.iter().filter(|r| r.is_settled_bet()).collect();

  let total_bets = bets.len();
  let winning_bets = bets
    .iter()
    .filter(|r| r.outcome == RecordOutcome::Won)
    .count();
  let losing_bets = total_bets - winning_bets;

  let total_staked: f64 = bets.iter().map(|r| r.stake_amount()).sum();
  let total_profit: f64 = bets.iter().map(|r| r.profit_loss).sum();
  let profits: Vec<f64> = bets.iter().map(|r| r.profit_loss).collect();
  let rois: Vec<f64> = bets.iter().filter_map(|r| r.roi).collect();

  BacktestSummary {
    total_bets,
    winning_bets,
    losing_bets,
    win_rate: ratio(winning_bets as f64, total_bets as f64),
    total_staked,
    total_profit,
    total_roi: ratio(total_profit, total_staked),
    avg_stake: ratio(total_staked, total_bets as f64),
    avg_profit_per_bet: ratio(total_profit, total_bets as f64),
    max_drawdown: max_drawdown(&profits),
    sharpe_ratio: sharpe_ratio(&rois),
    fixtures_processed: records.len(),
    fixtures_insufficient_samples: records
      .iter()
      .filter(|r| r.outcome == RecordOutcome::InsufficientSamples)
      .count(),
    fixtures_unsettled: records
      .iter()
      .filter(|r| r.outcome == RecordOutcome::Unsettled)
      .count(),
  }
}

/// Largest peak-to-trough fall of the cumulative-profit curve.
///
/// The curve starts at zero, so an opening losing streak counts.
pub fn max_drawdown(profits: &[f64]) -> f64 {
  let mut cumulative = 0.0_f64;
  let mut peak = 0.0_f64;
  let mut worst = 0.0_f64;
  for p in profits {
    cumulative += p;
    peak = peak.max(cumulative);
    worst = worst.max(peak - cumulative);
  }
  worst
}

/// `mean / stdev` of per-bet ROI (population stdev).
///
/// Zero with fewer than two bets or no dispersion.
pub fn sharpe_ratio(rois: &[f64]) -> f64 {
  if rois.len() < 2 {
    return 0.0;
  }
  let n = rois.len() as f64;
  let mean = rois.iter().sum::<f64>() / n;
  let var = rois.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
  let std = var.sqrt();
  if std > 0.0 { mean / std } else { 0.0 }
}

fn ratio(num: f64, den: f64) -> f64 {
  if den > 0.0 { num / den } else { 0.0 }
}
