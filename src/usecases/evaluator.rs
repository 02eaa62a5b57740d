//! Fixture Evaluator - Single-fixture Decision Pipeline
//!
//! Runs, for one fixture:
//! 1. Causal sample lookup (strictly before kickoff) via `SampleRepository`
//! 2. Sample validation against minimum counts
//! 3. Poisson projection with a seeded bootstrap interval
//! 4. Value detection against an `OddsSource` quote
//! 5. Decision gate, then stake sizing
//!
//! Per-fixture shortfalls end up as `Signal` reasons. Only a repository
//! that breaks the causal cut is an error.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::{AppConfig, SampleConfig, ThresholdConfig};
use crate::domain::projection::validate_projection;
use crate::domain::samples::validate_samples;
use crate::domain::seed::{BOOTSTRAP_SALT, fixture_seed};
use crate::domain::signal::build_signal;
use crate::domain::value::{detect_value, fair_odds};
use crate::domain::{
  EngineError, Fixture, FixtureEvaluation, MarketQuote, ProjectionEngine, ProjectionResult, Scope,
  Signal, StakeResult, StakeSizer, TeamSamples, ValueResult,
};
use crate::ports::odds_source::OddsSource;
use crate::ports::repository::{SampleRepository, SampleWindow};

/// Evaluation plus the quote it was priced against.
#[derive(Debug, Clone)]
pub struct Evaluated {
  pub evaluation: FixtureEvaluation,
  pub quote: Option<MarketQuote>,
}

/// Single-fixture pipeline over injected sample and odds ports.
pub struct FixtureEvaluator<S: SampleRepository, O: OddsSource> {
  /// Historical sample repository.
  samples: Arc<S>,
  /// Market price source.
  odds: Arc<O>,
  /// Bootstrap projection engine.
  engine: ProjectionEngine,
  /// Stake sizer (validated at construction).
  sizer: StakeSizer,
  thresholds: ThresholdConfig,
  sample_config: SampleConfig,
  /// Base seed mixed with each fixture id.
  base_seed: u64,
}

impl<S: SampleRepository, O: OddsSource> FixtureEvaluator<S, O> {
  /// Create an evaluator.
  ///
  /// # Errors
  /// `EngineError::StakeConfiguration` if the staking section is invalid.
  pub fn new(samples: Arc<S>, odds: Arc<O>, config: &AppConfig) -> Result<Self, EngineError> {
    let sizer = StakeSizer::new(config.staking.policy())?;
    let engine = ProjectionEngine::new(
      config.bootstrap.n_bootstrap,
      config.bootstrap.confidence_level,
    );

    Ok(Self {
      samples,
      odds,
      engine,
      sizer,
      thresholds: config.thresholds.clone(),
      sample_config: config.samples.clone(),
      base_seed: config.backtest.seed,
    })
  }

  pub fn sizer(&self) -> &StakeSizer {
    &self.sizer
  }

  pub fn odds_source_name(&self) -> &'static str {
    self.odds.name()
  }

  /// Evaluate one fixture.
  ///
  /// # Errors
  /// `EngineError::LookaheadViolation` if the repository returned a
  /// sample dated on or after kickoff.
  #[instrument(skip(self, fixture), fields(fixture_id = %fixture.id))]
  pub fn evaluate(&self, fixture: &Fixture) -> Result<Evaluated, EngineError> {
    let window = SampleWindow {
      season: self
        .sample_config
        .season_to_date
        .then(|| fixture.season.clone()),
      max_recent: self.sample_config.max_recent,
    };

    let home = self.samples.find_samples(
      &fixture.home_team_id,
      Scope::Home,
      fixture.match_date,
      &window,
    );
    let away = self.samples.find_samples(
      &fixture.away_team_id,
      Scope::Away,
      fixture.match_date,
      &window,
    );
    check_causal(fixture, &home)?;
    check_causal(fixture, &away)?;

    let gate = self.thresholds.gate();
    let (min_samples_met, sample_reasons) = validate_samples(
      &home,
      &away,
      self.thresholds.min_samples_home,
      self.thresholds.min_samples_away,
    );

    if !min_samples_met {
      for (samples, required) in [
        (&home, self.thresholds.min_samples_home),
        (&away, self.thresholds.min_samples_away),
      ] {
        if samples.n_samples < required {
          absorbed(&EngineError::InsufficientSamples {
            scope: samples.scope,
            available: samples.n_samples,
            required,
          });
        }
      }
      let signal = build_signal(gate, false, sample_reasons, None, Vec::new(), None);
      return Ok(Evaluated {
        evaluation: self.assemble(fixture, &home, &away, None, None, signal),
        quote: None,
      });
    }

    let seed = fixture_seed(self.base_seed, &fixture.id, BOOTSTRAP_SALT);
    let projection = self.engine.project(&home, &away, seed);
    let (_, projection_reasons) = validate_projection(
      &projection,
      self.thresholds.lambda_threshold,
      self.thresholds.max_prob_ci_width,
    );

    if !projection.has_valid_probability() {
      absorbed(&EngineError::InvalidProjection {
        p_hat: projection.p_hat,
      });
    }

    let quote = self.odds.quote(fixture, fair_odds(projection.p_hat));
    if quote.is_none() {
      absorbed(&EngineError::MissingMarketOdds {
        fixture_id: fixture.id.clone(),
      });
    }
    let value = detect_value(
      &projection,
      quote.as_ref().map(|q| q.over_odds),
      quote.as_ref().map(|q| q.provider.as_str()),
      self.thresholds.min_edge_pct,
    );

    let signal = build_signal(
      gate,
      true,
      sample_reasons,
      Some(&projection),
      projection_reasons,
      Some(&value),
    );

    debug!(
      lambda_hat = projection.lambda_hat,
      p_hat = projection.p_hat,
      ci_width = projection.prob_ci_width,
      edge_pct = ?value.edge_pct,
      signal = signal.signal,
      "Fixture evaluated"
    );

    Ok(Evaluated {
      evaluation: self.assemble(fixture, &home, &away, Some(projection), Some(value), signal),
      quote,
    })
  }

  fn assemble(
    &self,
    fixture: &Fixture,
    home: &TeamSamples,
    away: &TeamSamples,
    projection: Option<ProjectionResult>,
    value: Option<ValueResult>,
    signal: Signal,
  ) -> FixtureEvaluation {
    // A stake is only sized for fixtures that passed every gate.
    let stake = match (&projection, &value) {
      (Some(p), Some(v)) if signal.signal => self.sizer.size(p, v),
      _ => StakeResult::zero(self.sizer.policy().mode),
    };

    FixtureEvaluation {
      fixture_id: fixture.id.clone(),
      league: fixture.league.clone(),
      match_date: fixture.match_date,
      home_team_id: fixture.home_team_id.clone(),
      away_team_id: fixture.away_team_id.clone(),
      home_samples: home.n_samples,
      away_samples: away.n_samples,
      projection,
      value,
      stake,
      signal,
    }
  }
}

/// Per-fixture conditions end up as signal reasons; only log them here.
fn absorbed(condition: &EngineError) {
  debug!(condition = %condition, fatal = condition.is_fatal(), "Fixture condition absorbed");
}

fn check_causal(fixture: &Fixture, samples: &TeamSamples) -> Result<(), EngineError> {
  match samples
    .match_dates
    .iter()
    .find(|d| **d >= fixture.match_date)
  {
    Some(date) => Err(EngineError::LookaheadViolation {
      fixture_id: fixture.id.clone(),
      sample_date: *date,
      cutoff: fixture.match_date,
    }),
    None => Ok(()),
  }
}
