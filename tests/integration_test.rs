//! Integration Tests - Evaluator, Scanner and Result Sink
//!
//! Tests the interaction between usecases, ports, and mock adapters.
//! Uses mockall for trait mocking and tokio::test for async tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use mockall::mock;
use mockall::predicate::*;

use fh_over::adapters::memory::{InMemoryFixtureStore, InMemorySampleStore};
use fh_over::adapters::odds::RecordedOddsSource;
use fh_over::adapters::persistence::RepositoryImpl;
use fh_over::config::{AppConfig, BacktestConfig, PersistenceConfig};
use fh_over::domain::samples::build_team_samples;
use fh_over::domain::{
    BacktestRecord, BacktestSummary, EngineError, FirstHalfSample, Fixture, FixtureEvaluation,
    FixtureStatus, LeagueSummary, MarketQuote, RecordOutcome, RunSummary, Scope, TeamSamples,
};
use fh_over::ports::odds_source::OddsSource;
use fh_over::ports::repository::{ResultSink, SampleRepository, SampleWindow};
use fh_over::usecases::backtest::settle_record;
use fh_over::usecases::{CancellationFlag, FixtureEvaluator, LiveScanner};

// ---- Mock Definitions ----

mock! {
    pub Samples {}

    impl SampleRepository for Samples {
        fn find_samples(
            &self,
            team_id: &str,
            scope: Scope,
            before: DateTime<Utc>,
            window: &SampleWindow,
        ) -> TeamSamples;
    }
}

mock! {
    pub Odds {}

    impl OddsSource for Odds {
        fn quote(&self, fixture: &Fixture, fair_odds: Option<f64>) -> Option<MarketQuote>;
        fn name(&self) -> &'static str;
    }
}

mock! {
    pub Sink {}

    #[async_trait::async_trait]
    impl ResultSink for Sink {
        async fn save_record(&self, record: &BacktestRecord) -> anyhow::Result<()>;
        async fn save_evaluation(&self, evaluation: &FixtureEvaluation) -> anyhow::Result<()>;
        async fn save_summary(&self, summary: &RunSummary) -> anyhow::Result<()>;
        async fn load_summary(&self) -> anyhow::Result<Option<RunSummary>>;
        async fn is_healthy(&self) -> bool;
    }
}

// ---- Helpers ----

const HOME_GOALS: [f64; 8] = [1.0, 0.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0];
const AWAY_GOALS: [f64; 8] = [0.0, 1.0, 1.0, 0.0, 2.0, 1.0, 0.0, 1.0];

fn kickoff() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 19, 14, 0, 0).unwrap()
}

fn rows(team: &str, scope: Scope, goals: &[f64]) -> Vec<FirstHalfSample> {
    goals
        .iter()
        .enumerate()
        .map(|(i, g)| FirstHalfSample {
            team_id: team.into(),
            scope,
            match_date: kickoff() - Duration::days(7 * (goals.len() - i) as i64),
            first_half_goals: *g,
            season: "2024-25".into(),
        })
        .collect()
}

fn team_samples(team: &str, scope: Scope, goals: &[f64]) -> TeamSamples {
    build_team_samples(&rows(team, scope, goals), team, scope, None, None)
}

fn fixture(id: &str, status: FixtureStatus, ht: Option<(u32, u32)>) -> Fixture {
    Fixture {
        id: id.into(),
        home_team_id: "hom".into(),
        away_team_id: "awy".into(),
        league: "Premier League".into(),
        match_date: kickoff(),
        season: "2024-25".into(),
        status,
        home_first_half_goals: ht.map(|(h, _)| h),
        away_first_half_goals: ht.map(|(_, a)| a),
    }
}

fn quote(fixture_id: &str, over: f64) -> MarketQuote {
    MarketQuote {
        fixture_id: fixture_id.into(),
        over_odds: over,
        under_odds: None,
        provider: "exchange".into(),
    }
}

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.thresholds.lambda_threshold = 0.5;
    config.thresholds.max_prob_ci_width = 0.5;
    config.staking.tau_conf = 1.0;
    config.bootstrap.n_bootstrap = 500;
    config
}

fn scenario_samples() -> MockSamples {
    let mut samples = MockSamples::new();
    samples
        .expect_find_samples()
        .with(eq("hom"), eq(Scope::Home), eq(kickoff()), always())
        .times(1)
        .returning(|team, scope, _, _| team_samples(team, scope, &HOME_GOALS));
    samples
        .expect_find_samples()
        .with(eq("awy"), eq(Scope::Away), eq(kickoff()), always())
        .times(1)
        .returning(|team, scope, _, _| team_samples(team, scope, &AWAY_GOALS));
    samples
}

fn evaluated_record(id: &str, ht: (u32, u32)) -> BacktestRecord {
    let mut odds = MockOdds::new();
    odds.expect_quote().returning(|f, _| Some(quote(&f.id, 2.10)));
    let evaluator =
        FixtureEvaluator::new(Arc::new(scenario_samples()), Arc::new(odds), &config()).unwrap();
    let fx = fixture(id, FixtureStatus::Finished, Some(ht));
    let evaluated = evaluator.evaluate(&fx).unwrap();
    settle_record(evaluated, &fx, &BacktestConfig::default(), None)
}

fn temp_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("fh-over-it-{}", uuid::Uuid::new_v4()))
}

// ---- Evaluator with mock ports ----

#[test]
fn test_evaluator_queries_before_kickoff_and_prices_once() {
    let mut odds = MockOdds::new();
    odds.expect_quote()
        .withf(|f, fair| f.id == "fx-1" && fair.is_some_and(|o| (o - 1.7149).abs() < 1e-3))
        .times(1)
        .returning(|f, _| Some(quote(&f.id, 2.10)));

    let evaluator =
        FixtureEvaluator::new(Arc::new(scenario_samples()), Arc::new(odds), &config()).unwrap();
    let evaluated = evaluator
        .evaluate(&fixture("fx-1", FixtureStatus::Finished, Some((1, 0))))
        .unwrap();

    let evaluation = &evaluated.evaluation;
    assert!(evaluation.signal.signal, "reasons: {:?}", evaluation.signal.reasons);
    assert!(evaluation.is_bet());
    assert_eq!(evaluation.home_samples, 8);
    assert_eq!(evaluation.away_samples, 8);
    assert_eq!(evaluated.quote.map(|q| q.provider), Some("exchange".to_string()));
    assert!(evaluation.stake.stake_amount <= 30.0);
}

#[test]
fn test_evaluator_skips_odds_when_samples_short() {
    let mut samples = MockSamples::new();
    samples
        .expect_find_samples()
        .returning(|team, scope, _, _| team_samples(team, scope, &[1.0, 1.0, 1.0]));
    let mut odds = MockOdds::new();
    odds.expect_quote().times(0);

    let evaluator = FixtureEvaluator::new(Arc::new(samples), Arc::new(odds), &config()).unwrap();
    let evaluated = evaluator
        .evaluate(&fixture("fx-2", FixtureStatus::Finished, Some((0, 0))))
        .unwrap();

    let evaluation = evaluated.evaluation;
    assert!(evaluation.projection.is_none());
    assert!(evaluation.value.is_none());
    assert!(!evaluation.signal.min_samples_met);
    assert_eq!(evaluation.signal.reasons.len(), 2);
    assert_eq!(evaluation.stake.stake_amount, 0.0);
}

#[test]
fn test_evaluator_without_market_price() {
    let mut odds = MockOdds::new();
    odds.expect_quote().times(1).returning(|_, _| None);

    let evaluator =
        FixtureEvaluator::new(Arc::new(scenario_samples()), Arc::new(odds), &config()).unwrap();
    let evaluation = evaluator
        .evaluate(&fixture("fx-3", FixtureStatus::Scheduled, None))
        .unwrap()
        .evaluation;

    assert!(!evaluation.signal.signal);
    assert!(!evaluation.signal.edge_threshold_met);
    assert!(
        evaluation
            .signal
            .reasons
            .iter()
            .any(|r| r == "No market odds available")
    );
    assert_eq!(evaluation.stake.stake_amount, 0.0);
}

#[test]
fn test_evaluator_degenerate_projection_is_not_a_signal() {
    let mut samples = MockSamples::new();
    samples
        .expect_find_samples()
        .returning(|team, scope, _, _| team_samples(team, scope, &[40.0; 8]));
    let mut odds = MockOdds::new();
    odds.expect_quote().returning(|f, _| Some(quote(&f.id, 1.05)));

    let evaluator = FixtureEvaluator::new(Arc::new(samples), Arc::new(odds), &config()).unwrap();
    let evaluation = evaluator
        .evaluate(&fixture("fx-5", FixtureStatus::Finished, Some((2, 1))))
        .unwrap()
        .evaluation;

    let projection = evaluation.projection.as_ref().unwrap();
    assert_eq!(projection.p_hat, 1.0);
    assert!(!evaluation.signal.signal);
    assert!(!evaluation.is_bet());
    assert_eq!(evaluation.signal.reasons[0], "Invalid probability: 1.000");
    assert_eq!(evaluation.stake.stake_amount, 0.0);
}

#[test]
fn test_evaluator_rejects_samples_on_kickoff() {
    let mut samples = MockSamples::new();
    samples.expect_find_samples().returning(|team, scope, before, _| {
        let mut ts = team_samples(team, scope, &HOME_GOALS);
        ts.match_dates.push(before);
        ts.samples.push(3.0);
        ts.n_samples += 1;
        ts
    });
    let mut odds = MockOdds::new();
    odds.expect_quote().times(0);

    let evaluator = FixtureEvaluator::new(Arc::new(samples), Arc::new(odds), &config()).unwrap();
    let result = evaluator.evaluate(&fixture("fx-4", FixtureStatus::Finished, Some((1, 1))));
    assert!(matches!(result, Err(EngineError::LookaheadViolation { .. })));
}

// ---- Live scanner ----

#[test]
fn test_scan_uses_recorded_odds_only() {
    let mut feed = rows("hom", Scope::Home, &HOME_GOALS);
    feed.extend(rows("awy", Scope::Away, &AWAY_GOALS));
    let fixtures = vec![
        fixture("priced", FixtureStatus::Scheduled, None),
        fixture("unpriced", FixtureStatus::Scheduled, None),
        fixture("done", FixtureStatus::Finished, Some((1, 0))),
    ];
    let odds = RecordedOddsSource::new(vec![quote("priced", 2.10), quote("done", 2.10)]);

    let scanner = LiveScanner::new(
        Arc::new(InMemorySampleStore::new(feed)),
        Arc::new(InMemoryFixtureStore::new(fixtures)),
        Arc::new(odds),
        &config(),
        CancellationFlag::new(),
    )
    .unwrap();
    let report = scanner.scan(None).unwrap();

    assert_eq!(report.evaluations.len(), 2);
    assert_eq!(report.signals, 1);
    let bets: Vec<_> = report.bets().map(|e| e.fixture_id.as_str()).collect();
    assert_eq!(bets, vec!["priced"]);

    let unpriced = report
        .evaluations
        .iter()
        .find(|e| e.fixture_id == "unpriced")
        .unwrap();
    assert!(
        unpriced
            .signal
            .reasons
            .contains(&"No market odds available".to_string())
    );
}

// ---- Result sink ----

#[tokio::test]
async fn test_save_records_forwards_each_record() {
    let records = vec![
        evaluated_record("fx-a", (1, 0)),
        evaluated_record("fx-b", (0, 0)),
        evaluated_record("fx-c", (0, 2)),
    ];
    assert_eq!(records[1].outcome, RecordOutcome::Lost);

    let mut sink = MockSink::new();
    sink.expect_save_record().times(3).returning(|_| Ok(()));
    sink.save_records(&records).await.unwrap();
}

#[tokio::test]
async fn test_save_records_stops_at_first_failure() {
    let records = vec![evaluated_record("fx-a", (1, 0)), evaluated_record("fx-b", (1, 0))];

    let mut sink = MockSink::new();
    sink.expect_save_record()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("disk full")));
    let err = sink.save_records(&records).await.unwrap_err();
    assert!(err.to_string().contains("disk full"));
}

#[tokio::test]
async fn test_unhealthy_sink_reported() {
    let mut sink = MockSink::new();
    sink.expect_is_healthy().times(1).return_const(false);
    sink.expect_load_summary().times(1).returning(|| Ok(None));

    assert!(!sink.is_healthy().await);
    assert!(sink.load_summary().await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_sink_records_round_trip() {
    let dir = temp_dir();
    let config = PersistenceConfig {
        data_dir: dir.to_string_lossy().into_owned(),
        ..PersistenceConfig::default()
    };
    let sink = RepositoryImpl::from_config(&config).await.unwrap();
    assert!(sink.is_healthy().await);

    let records = vec![evaluated_record("fx-a", (1, 0)), evaluated_record("fx-b", (0, 0))];
    sink.save_records(&records).await.unwrap();

    let loaded = sink.records().load_records().await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].evaluation.fixture_id, "fx-a");
    assert_eq!(loaded[1].outcome, RecordOutcome::Lost);
    assert!((loaded[0].profit_loss - records[0].profit_loss).abs() < 1e-9);

    sink.records().reset().await.unwrap();
    assert!(sink.records().load_records().await.unwrap().is_empty());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_file_sink_summary_snapshot() {
    tokio_test::block_on(async {
        let dir = temp_dir();
        let config = PersistenceConfig {
            data_dir: dir.to_string_lossy().into_owned(),
            ..PersistenceConfig::default()
        };
        let sink = RepositoryImpl::from_config(&config).await.unwrap();
        assert!(sink.load_summary().await.unwrap().is_none());

        let overall = BacktestSummary {
            total_bets: 4,
            winning_bets: 3,
            losing_bets: 1,
            fixtures_processed: 10,
            ..BacktestSummary::default()
        };
        let run = RunSummary {
            run_id: "run-1".into(),
            run_name: "fh-over".into(),
            generated_at: kickoff(),
            leagues: vec![LeagueSummary {
                league: "Premier League".into(),
                summary: overall,
                rounds: Vec::new(),
            }],
            overall,
            cancelled: false,
        };
        sink.save_summary(&run).await.unwrap();

        let loaded = sink.load_summary().await.unwrap().unwrap();
        assert_eq!(loaded.run_id, "run-1");
        assert_eq!(loaded.overall.total_bets, 4);
        assert_eq!(loaded.leagues[0].league, "Premier League");
        assert!(!loaded.cancelled);

        let _ = std::fs::remove_dir_all(&dir);
    });
}
