//! Property-Based Tests - Domain Layer Invariants
//!
//! Uses `proptest` to verify that the projection, value and staking
//! math maintain their invariants across random inputs.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use fh_over::domain::projection::poisson_probability_over_05;
use fh_over::domain::samples::build_team_samples;
use fh_over::domain::value::{detect_value, edge_percentage, fair_odds};
use fh_over::domain::{
    FirstHalfSample, ProjectionEngine, ProjectionResult, Scope, StakeMode, StakePolicy, StakeSizer,
    TeamSamples,
};

fn projection(p_hat: f64, width: f64) -> ProjectionResult {
    ProjectionResult {
        lambda_hat: -(1.0 - p_hat).ln(),
        p_hat,
        p_ci_low: (p_hat - width / 2.0).max(0.0),
        p_ci_high: (p_hat + width / 2.0).min(1.0),
        prob_ci_width: width,
        n_bootstrap: 1000,
    }
}

fn sizer(mode: StakeMode, bankroll: f64, cap: f64) -> StakeSizer {
    StakeSizer::new(StakePolicy {
        mode,
        bankroll,
        stake_cap: cap,
        tau_conf: 0.5,
        ..StakePolicy::default()
    })
    .unwrap()
}

/// Market price giving exactly `edge_pct` over the fair price of `p_hat`.
fn market_for_edge(p_hat: f64, edge_pct: f64) -> f64 {
    (1.0 + edge_pct / 100.0) / p_hat
}

fn team(scope: Scope, goals: &[f64]) -> TeamSamples {
    let rows: Vec<FirstHalfSample> = goals
        .iter()
        .enumerate()
        .map(|(i, g)| FirstHalfSample {
            team_id: "t".into(),
            scope,
            match_date: Utc.with_ymd_and_hms(2024, 1, 1, 15, 0, 0).unwrap()
                + chrono::Duration::days(i as i64),
            first_half_goals: *g,
            season: "2023-24".into(),
        })
        .collect();
    build_team_samples(&rows, "t", scope, None, None)
}

// ── Poisson Probability Properties ──────────────────────────

proptest! {
    /// P(first-half goals > 0) stays in [0, 1).
    #[test]
    fn poisson_probability_in_unit_interval(lambda in 0.0f64..20.0) {
        let p = poisson_probability_over_05(lambda);
        prop_assert!(p >= 0.0, "probability must be >= 0, got {p}");
        prop_assert!(p < 1.0, "probability must be < 1, got {p}");
    }

    /// Probability is monotonically non-decreasing in lambda.
    #[test]
    fn poisson_probability_monotonic(
        lambda in 0.0f64..10.0,
        delta in 0.0f64..10.0,
    ) {
        let p1 = poisson_probability_over_05(lambda);
        let p2 = poisson_probability_over_05(lambda + delta);
        prop_assert!(p2 >= p1, "p({lambda})={p1} > p({})={p2}", lambda + delta);
    }
}

// ── Projection Properties ───────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// The interval always brackets the point estimate.
    #[test]
    fn projection_interval_brackets_p_hat(
        home in prop::collection::vec(0u8..4, 1..15),
        away in prop::collection::vec(0u8..4, 1..15),
        seed in any::<u64>(),
    ) {
        let home: Vec<f64> = home.into_iter().map(f64::from).collect();
        let away: Vec<f64> = away.into_iter().map(f64::from).collect();
        let engine = ProjectionEngine::new(200, 0.95);
        let proj = engine.project(&team(Scope::Home, &home), &team(Scope::Away, &away), seed);

        prop_assert!(proj.p_ci_low <= proj.p_hat);
        prop_assert!(proj.p_hat <= proj.p_ci_high);
        prop_assert!(proj.prob_ci_width >= 0.0);
        prop_assert!((proj.prob_ci_width - (proj.p_ci_high - proj.p_ci_low)).abs() < 1e-12);
    }

    /// Same inputs and seed give a bit-identical projection.
    #[test]
    fn projection_deterministic_for_seed(
        goals in prop::collection::vec(0u8..4, 2..12),
        seed in any::<u64>(),
    ) {
        let goals: Vec<f64> = goals.into_iter().map(f64::from).collect();
        let engine = ProjectionEngine::new(100, 0.9);
        let home = team(Scope::Home, &goals);
        let away = team(Scope::Away, &goals);
        prop_assert_eq!(engine.project(&home, &away, seed), engine.project(&home, &away, seed));
    }
}

// ── Value Detection Properties ──────────────────────────────

proptest! {
    /// Fair odds are the reciprocal of the probability.
    #[test]
    fn fair_odds_times_probability_is_one(p in 0.001f64..0.999) {
        let fair = fair_odds(p).unwrap();
        prop_assert!((fair * p - 1.0).abs() < 1e-12, "fair={fair}, p={p}");
    }

    /// Edge follows the definition and the signal fires iff edge >= min.
    #[test]
    fn value_signal_iff_edge_meets_minimum(
        p in 0.05f64..0.95,
        market in 1.01f64..10.0,
        min_edge in 0.0f64..20.0,
    ) {
        let value = detect_value(&projection(p, 0.1), Some(market), Some("x"), min_edge);
        let edge = value.edge_pct.unwrap();
        let expected = (market / (1.0 / p) - 1.0) * 100.0;
        prop_assert!((edge - expected).abs() < 1e-9);
        prop_assert!((edge - edge_percentage(1.0 / p, market)).abs() < 1e-12);
        prop_assert_eq!(value.value_signal, edge >= min_edge);
    }

    /// Missing or non-positive odds never produce a signal.
    #[test]
    fn no_odds_no_signal(p in 0.05f64..0.95, bad in -5.0f64..=0.0) {
        for market in [None, Some(bad)] {
            let value = detect_value(&projection(p, 0.1), market, None, 0.0);
            prop_assert!(!value.value_signal);
            prop_assert!(value.edge_pct.is_none());
        }
    }
}

// ── Stake Sizer Properties ──────────────────────────────────

proptest! {
    /// Stakes are never negative and never exceed cap * bankroll.
    #[test]
    fn stake_bounded_by_cap(
        bankroll in 0.0f64..100_000.0,
        cap in 0.0f64..=1.0,
        p in 0.05f64..0.95,
        edge in -20.0f64..60.0,
        width in 0.0f64..0.6,
        flat in any::<bool>(),
    ) {
        let mode = if flat { StakeMode::Flat } else { StakeMode::Dynamic };
        let s = sizer(mode, bankroll, cap);
        let value = detect_value(&projection(p, width), Some(market_for_edge(p, edge)), None, 0.0);
        let stake = s.size(&projection(p, width), &value);

        prop_assert!(stake.stake_amount >= 0.0);
        prop_assert!(
            stake.stake_amount <= cap * bankroll + 1e-9,
            "stake {} > cap {cap} * bankroll {bankroll}", stake.stake_amount
        );
        prop_assert!(stake.stake_fraction <= cap + 1e-12);
    }

    /// Flat stakes ignore edge and confidence once the signal fires.
    #[test]
    fn flat_stake_invariant_to_edge(
        p in 0.05f64..0.95,
        e1 in 0.0f64..50.0,
        e2 in 0.0f64..50.0,
        w1 in 0.0f64..0.6,
        w2 in 0.0f64..0.6,
    ) {
        let s = sizer(StakeMode::Flat, 1000.0, 0.03);
        let v1 = detect_value(&projection(p, w1), Some(market_for_edge(p, e1)), None, 0.0);
        let v2 = detect_value(&projection(p, w2), Some(market_for_edge(p, e2)), None, 0.0);
        prop_assume!(v1.value_signal && v2.value_signal);

        let a = s.size(&projection(p, w1), &v1).stake_amount;
        let b = s.size(&projection(p, w2), &v2).stake_amount;
        prop_assert_eq!(a, b);
        prop_assert_eq!(a, 10.0);
    }

    /// Dynamic stakes are weakly increasing in edge at fixed width.
    #[test]
    fn dynamic_stake_increasing_in_edge(
        p in 0.2f64..0.9,
        e1 in 0.0f64..30.0,
        delta in 0.0f64..30.0,
        width in 0.0f64..0.4,
    ) {
        let s = sizer(StakeMode::Dynamic, 10_000.0, 0.05);
        let proj = projection(p, width);
        let lo = detect_value(&proj, Some(market_for_edge(p, e1)), None, 0.0);
        let hi = detect_value(&proj, Some(market_for_edge(p, e1 + delta)), None, 0.0);

        let a = s.size(&proj, &lo).stake_amount;
        let b = s.size(&proj, &hi).stake_amount;
        prop_assert!(b + 0.011 >= a, "edge {e1} -> {a}, edge {} -> {b}", e1 + delta);
    }

    /// Dynamic stakes are weakly decreasing in interval width at fixed edge.
    #[test]
    fn dynamic_stake_decreasing_in_width(
        p in 0.2f64..0.9,
        edge in 0.0f64..40.0,
        w1 in 0.0f64..0.4,
        delta in 0.0f64..0.4,
    ) {
        let s = sizer(StakeMode::Dynamic, 10_000.0, 0.05);
        let market = market_for_edge(p, edge);
        let narrow = projection(p, w1);
        let wide = projection(p, w1 + delta);

        let a = s.size(&narrow, &detect_value(&narrow, Some(market), None, 0.0)).stake_amount;
        let b = s.size(&wide, &detect_value(&wide, Some(market), None, 0.0)).stake_amount;
        prop_assert!(a + 0.011 >= b, "width {w1} -> {a}, width {} -> {b}", w1 + delta);
    }
}
