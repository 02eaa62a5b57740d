//! First-half Over 0.5 Engine - Entry Point
//!
//! Wiring sequence:
//! 1. Parse the command line
//! 2. Load config.toml + validate (defaults when absent)
//! 3. Init tracing (JSON structured logging)
//! 4. Install Ctrl-C → cancellation flag
//! 5. Load sample, fixture and odds feeds into in-memory repositories
//! 6. Run the command on the blocking pool (backtest, rounds or scan)
//! 7. Persist records, summary snapshot and metrics

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{info, warn};

use fh_over::adapters::memory::{InMemoryFixtureStore, InMemorySampleStore};
use fh_over::adapters::metrics::BacktestMetrics;
use fh_over::adapters::odds::{PreferRecordedOddsSource, RecordedOddsSource, SyntheticOddsSource};
use fh_over::adapters::persistence::{self, RepositoryImpl};
use fh_over::config::{self, AppConfig};
use fh_over::domain::{BacktestRecord, DateRange, EngineError, LeagueSummary, RunSummary};
use fh_over::ports::repository::{FixtureRepository, ResultSink};
use fh_over::usecases::rounds::{RoundCalendar, run_rounds};
use fh_over::usecases::summary::summarize;
use fh_over::usecases::{BacktestHarness, CancellationFlag, LiveScanner};

#[derive(Parser, Debug)]
#[command(name = "fh-over")]
#[command(version)]
#[command(about = "First-half Over 0.5 goals decision engine and backtester", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file path
    #[arg(short, long, default_value = "config.toml", env = "FH_OVER_CONFIG", global = true)]
    config: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chronological backtest over every configured league
    Backtest,
    /// Backtest with per-round subtotals from the [[rounds]] table
    Rounds,
    /// Evaluate scheduled fixtures against recorded odds
    Scan {
        /// Look-ahead window in days from now
        #[arg(long, default_value = "7")]
        days: i64,
    },
}

type Samples = InMemorySampleStore;
type Fixtures = InMemoryFixtureStore;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Command line ─────────────────────────────────────
    let cli = Cli::parse();

    // ── 2. Load configuration ───────────────────────────────
    let config = config::loader::load_config_or_default(&cli.config)
        .context("Failed to load configuration")?;

    // ── 3. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.engine.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.engine.name,
        version = env!("CARGO_PKG_VERSION"),
        command = ?cli.command,
        mode = %config.staking.mode,
        "Starting fh-over"
    );

    // ── 4. Ctrl-C → cancel at the next fixture boundary ─────
    let cancel = CancellationFlag::new();
    let ctrlc_flag = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("SIGINT received, stopping at next fixture boundary");
            ctrlc_flag.cancel();
        }
    });

    // ── 5. Load feeds ───────────────────────────────────────
    let p = &config.persistence;
    let samples = Arc::new(InMemorySampleStore::new(
        persistence::load_samples(&p.samples_path).await?,
    ));
    let fixtures = Arc::new(InMemoryFixtureStore::new(
        persistence::load_fixtures(&p.fixtures_path).await?,
    ));
    let recorded = Arc::new(RecordedOddsSource::new(
        persistence::load_odds(p.odds_path.as_deref()).await?,
    ));

    info!(
        samples = samples.len(),
        fixtures = fixtures.len(),
        odds_fixtures = recorded.fixtures_covered(),
        "Feeds loaded"
    );

    let sink = RepositoryImpl::from_config(&config.persistence).await?;
    let metrics = BacktestMetrics::new()?;

    // ── 6/7. Run the command and persist ────────────────────
    match cli.command {
        Command::Backtest => {
            run_backtest(
                &config,
                samples,
                fixtures,
                recorded,
                cancel,
                &sink,
                &metrics,
            )
            .await?;
        }
        Command::Rounds => {
            run_round_backtest(
                &config,
                samples,
                fixtures,
                recorded,
                cancel,
                &sink,
                &metrics,
            )
            .await?;
        }
        Command::Scan { days } => {
            run_scan(&config, samples, fixtures, recorded, cancel, &sink, days).await?;
        }
    }

    info!("Shutdown complete");
    Ok(())
}

type Odds = PreferRecordedOddsSource<RecordedOddsSource, SyntheticOddsSource>;

fn backtest_harness(
    config: &AppConfig,
    samples: Arc<Samples>,
    fixtures: Arc<Fixtures>,
    recorded: Arc<RecordedOddsSource>,
    cancel: CancellationFlag,
) -> Result<BacktestHarness<Samples, Fixtures, Odds>> {
    let synthetic = Arc::new(SyntheticOddsSource::new(
        config.backtest.seed,
        config.backtest.odds_noise_pct,
    ));
    let odds = Arc::new(PreferRecordedOddsSource::new(recorded, synthetic));
    Ok(BacktestHarness::new(samples, fixtures, odds, config, cancel)?)
}

async fn run_backtest(
    config: &AppConfig,
    samples: Arc<Samples>,
    fixtures: Arc<Fixtures>,
    recorded: Arc<RecordedOddsSource>,
    cancel: CancellationFlag,
    sink: &RepositoryImpl,
    metrics: &BacktestMetrics,
) -> Result<()> {
    let harness = backtest_harness(config, samples, fixtures, recorded, cancel)?;
    let started = Instant::now();
    let reports = tokio::task::spawn_blocking(move || harness.run_all())
        .await
        .context("Backtest task panicked")??;
    let elapsed_us = started.elapsed().as_secs_f64() * 1e6;

    let cancelled = reports.iter().any(|r| r.cancelled);
    let outputs = reports
        .iter()
        .map(|r| {
            let summary = LeagueSummary {
                league: r.league.clone().unwrap_or_else(|| "all".to_string()),
                summary: r.summary,
                rounds: Vec::new(),
            };
            (summary, r.records.as_slice())
        })
        .collect();

    persist_run(config, sink, metrics, outputs, cancelled, elapsed_us).await
}

async fn run_round_backtest(
    config: &AppConfig,
    samples: Arc<Samples>,
    fixtures: Arc<Fixtures>,
    recorded: Arc<RecordedOddsSource>,
    cancel: CancellationFlag,
    sink: &RepositoryImpl,
    metrics: &BacktestMetrics,
) -> Result<()> {
    let calendar = RoundCalendar::new(config.rounds.clone());
    if calendar.is_empty() {
        warn!("No [[rounds]] configured, every fixture lands in round 0");
    }

    let leagues = if config.backtest.league_filter.is_empty() {
        fixtures.leagues()
    } else {
        config.backtest.league_filter.clone()
    };

    let harness = backtest_harness(config, samples, fixtures, recorded, cancel.clone())?;
    let started = Instant::now();
    let reports = tokio::task::spawn_blocking(move || {
        let mut out = Vec::with_capacity(leagues.len());
        for league in &leagues {
            if cancel.is_cancelled() {
                break;
            }
            out.push(run_rounds(&harness, &calendar, Some(league.as_str()))?);
        }
        Ok::<_, EngineError>(out)
    })
    .await
    .context("Round backtest task panicked")??;
    let elapsed_us = started.elapsed().as_secs_f64() * 1e6;

    let cancelled = reports.iter().any(|r| r.report.cancelled);
    let outputs = reports
        .iter()
        .map(|r| {
            let summary = LeagueSummary {
                league: r.report.league.clone().unwrap_or_else(|| "all".to_string()),
                summary: r.report.summary,
                rounds: r.rounds.clone(),
            };
            (summary, r.report.records.as_slice())
        })
        .collect();

    persist_run(config, sink, metrics, outputs, cancelled, elapsed_us).await
}

async fn persist_run(
    config: &AppConfig,
    sink: &RepositoryImpl,
    metrics: &BacktestMetrics,
    outputs: Vec<(LeagueSummary, &[BacktestRecord])>,
    cancelled: bool,
    elapsed_us: f64,
) -> Result<()> {
    sink.records().reset().await?;
    let all_fixture_count = outputs.iter().map(|(_, r)| r.len()).sum::<usize>().max(1);

    let mut all_records: Vec<BacktestRecord> = Vec::new();
    let mut league_summaries = Vec::with_capacity(outputs.len());
    for (league, records) in outputs {
        sink.save_records(records).await?;
        for record in records {
            metrics.observe_record(record);
        }
        metrics.observe_summary(&league.league, &league.summary);
        if !records.is_empty() {
            // Wall time spread evenly over the run's fixtures.
            metrics.observe_latency(&league.league, elapsed_us / all_fixture_count as f64);
        }
        all_records.extend_from_slice(records);
        league_summaries.push(league);
    }

    all_records.sort_by_key(|r| r.evaluation.match_date);
    let overall = summarize(&all_records);

    let run = RunSummary {
        run_id: uuid::Uuid::new_v4().to_string(),
        run_name: config.engine.name.clone(),
        generated_at: Utc::now(),
        leagues: league_summaries,
        overall,
        cancelled,
    };
    sink.save_summary(&run).await?;

    let metrics_path =
        Path::new(&config.persistence.data_dir).join(&config.persistence.metrics_file);
    metrics.write_to_file(&metrics_path).await?;

    info!(
        bets = overall.total_bets,
        win_rate = overall.win_rate,
        profit = overall.total_profit,
        roi = overall.total_roi,
        sharpe = overall.sharpe_ratio,
        cancelled,
        records = %sink.records().records_path().display(),
        "Run persisted"
    );
    Ok(())
}

async fn run_scan(
    config: &AppConfig,
    samples: Arc<Samples>,
    fixtures: Arc<Fixtures>,
    recorded: Arc<RecordedOddsSource>,
    cancel: CancellationFlag,
    sink: &RepositoryImpl,
    days: i64,
) -> Result<()> {
    let now = Utc::now();
    let range = DateRange::days_ahead(now, days)
        .with_context(|| format!("Scan window of {days} days is out of range"))?;

    let scanner = LiveScanner::new(samples, fixtures, recorded, config, cancel)?;
    let report = tokio::task::spawn_blocking(move || scanner.scan(Some(range)))
        .await
        .context("Scan task panicked")??;

    if !sink.is_healthy().await {
        warn!("Result sink reports unhealthy storage");
    }
    for evaluation in &report.evaluations {
        sink.save_evaluation(evaluation).await?;
    }

    info!(
        evaluated = report.evaluations.len(),
        bets = report.bets().count(),
        cancelled = report.cancelled,
        "Scan persisted"
    );
    Ok(())
}
