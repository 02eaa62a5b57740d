//! Engine error taxonomy.
//!
//! Per-fixture conditions (`InsufficientSamples`, `InvalidProjection`,
//! `MissingMarketOdds`) are folded into a `Signal` with reasons by the
//! evaluator and never abort a run. The remaining variants are fatal.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::fixture::{FixtureId, Scope};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("insufficient {scope} samples: {available} < {required}")]
    InsufficientSamples {
        scope: Scope,
        available: usize,
        required: usize,
    },

    #[error("invalid projection: p_hat={p_hat}")]
    InvalidProjection { p_hat: f64 },

    #[error("no market odds available for fixture {fixture_id}")]
    MissingMarketOdds { fixture_id: FixtureId },

    /// Negative bankroll or a stake cap outside `[0, 1]`.
    #[error("stake configuration error: {0}")]
    StakeConfiguration(String),

    /// A repository handed back a sample not strictly before the fixture.
    #[error(
        "lookahead violation for fixture {fixture_id}: sample dated {sample_date} is not before {cutoff}"
    )]
    LookaheadViolation {
        fixture_id: FixtureId,
        sample_date: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    },

    #[error("no fixtures to evaluate{}", league_suffix(.league))]
    NoFixtures { league: Option<String> },
}

fn league_suffix(league: &Option<String>) -> String {
    league
        .as_deref()
        .map(|l| format!(" for league {l}"))
        .unwrap_or_default()
}

impl EngineError {
    /// Whether this error must abort a run rather than be absorbed per fixture.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::StakeConfiguration(_) | Self::LookaheadViolation { .. } | Self::NoFixtures { .. }
        )
    }
}
