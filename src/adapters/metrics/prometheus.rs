//! Prometheus Metrics Registry - Backtest Observability
//!
//! Counts processed fixtures by outcome, tracks cumulative profit per
//! league, and records stake, edge and evaluation-latency histograms.
//! Rendered in the Prometheus text format to a file for scraping by a
//! node exporter textfile collector.

use std::path::Path;

use anyhow::Context;
use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use tokio::fs;
use tracing::{info, instrument};

use crate::domain::{BacktestRecord, BacktestSummary, RecordOutcome};

/// Centralized Prometheus metrics for engine runs.
///
/// All metrics follow the naming convention `fh_over_*` and carry a
/// league label.
pub struct BacktestMetrics {
    registry: Registry,
    /// Fixtures processed, labelled by outcome.
    pub fixtures_processed: IntCounterVec,
    /// Cumulative profit per league.
    pub cumulative_profit: GaugeVec,
    /// Maximum drawdown per league.
    pub max_drawdown: GaugeVec,
    /// Stake size of each placed bet.
    pub stake_amount: HistogramVec,
    /// Edge of each evaluated fixture with a price.
    pub edge_pct: HistogramVec,
    /// Per-fixture evaluation latency (microseconds).
    pub evaluation_latency_us: HistogramVec,
}

impl BacktestMetrics {
    /// Create and register all metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let fixtures_processed = IntCounterVec::new(
            Opts::new("fh_over_fixtures_processed_total", "Fixtures processed by outcome"),
            &["league", "outcome"],
        )?;

        let cumulative_profit = GaugeVec::new(
            Opts::new("fh_over_cumulative_profit", "Cumulative profit in bankroll units"),
            &["league"],
        )?;

        let max_drawdown = GaugeVec::new(
            Opts::new("fh_over_max_drawdown", "Maximum drawdown of the profit curve"),
            &["league"],
        )?;

        let stake_amount = HistogramVec::new(
            HistogramOpts::new("fh_over_stake_amount", "Stake per placed bet")
                .buckets(vec![1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 50.0, 100.0]),
            &["league"],
        )?;

        let edge_pct = HistogramVec::new(
            HistogramOpts::new("fh_over_edge_pct", "Edge over fair odds in percent")
                .buckets(vec![-20.0, -10.0, -5.0, 0.0, 3.0, 5.0, 10.0, 20.0, 50.0]),
            &["league"],
        )?;

        let evaluation_latency_us = HistogramVec::new(
            HistogramOpts::new(
                "fh_over_evaluation_latency_us",
                "Per-fixture evaluation latency in microseconds",
            )
            .buckets(vec![10.0, 100.0, 500.0, 1000.0, 5000.0, 20000.0, 100000.0]),
            &["league"],
        )?;

        registry.register(Box::new(fixtures_processed.clone()))?;
        registry.register(Box::new(cumulative_profit.clone()))?;
        registry.register(Box::new(max_drawdown.clone()))?;
        registry.register(Box::new(stake_amount.clone()))?;
        registry.register(Box::new(edge_pct.clone()))?;
        registry.register(Box::new(evaluation_latency_us.clone()))?;

        Ok(Self {
            registry,
            fixtures_processed,
            cumulative_profit,
            max_drawdown,
            stake_amount,
            edge_pct,
            evaluation_latency_us,
        })
    }

    /// Record one processed fixture.
    pub fn observe_record(&self, record: &BacktestRecord) {
        let league = record.evaluation.league.as_str();
        self.fixtures_processed
            .with_label_values(&[league, outcome_label(record.outcome)])
            .inc();

        if let Some(edge) = record.evaluation.value.as_ref().and_then(|v| v.edge_pct) {
            self.edge_pct.with_label_values(&[league]).observe(edge);
        }
        if record.is_settled_bet() {
            self.stake_amount
                .with_label_values(&[league])
                .observe(record.stake_amount());
        }
    }

    /// Record the final summary of a league run.
    pub fn observe_summary(&self, league: &str, summary: &BacktestSummary) {
        self.cumulative_profit
            .with_label_values(&[league])
            .set(summary.total_profit);
        self.max_drawdown
            .with_label_values(&[league])
            .set(summary.max_drawdown);
    }

    pub fn observe_latency(&self, league: &str, micros: f64) {
        self.evaluation_latency_us
            .with_label_values(&[league])
            .observe(micros);
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output is not UTF-8")
    }

    /// Write the rendered metrics to `path`.
    #[instrument(skip(self))]
    pub async fn write_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let body = self.render()?;
        fs::write(path, body)
            .await
            .with_context(|| format!("Failed to write metrics file: {}", path.display()))?;
        info!(path = %path.display(), "Metrics written");
        Ok(())
    }
}

fn outcome_label(outcome: RecordOutcome) -> &'static str {
    match outcome {
        RecordOutcome::InsufficientSamples => "insufficient_samples",
        RecordOutcome::NoBet => "no_bet",
        RecordOutcome::Won => "won",
        RecordOutcome::Lost => "lost",
        RecordOutcome::Unsettled => "unsettled",
    }
}
