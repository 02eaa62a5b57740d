//! Domain layer - Decision engine math and value objects.
//!
//! Sample selection, Poisson projection with bootstrap bounds, value
//! detection, stake sizing, the decision gate and wager settlement.
//! No I/O and no logging here (hexagonal architecture inner ring).
//! All types are serializable and testable in isolation.

pub mod error;
pub mod fixture;
pub mod projection;
pub mod record;
pub mod samples;
pub mod seed;
pub mod settlement;
pub mod signal;
pub mod staking;
pub mod value;

// Re-export core types for convenience
pub use error::EngineError;
pub use fixture::{
    DateRange, FirstHalfSample, Fixture, FixtureId, FixtureStatus, MarketQuote, Scope, Season,
    TeamId, best_quote,
};
pub use projection::{ProjectionEngine, ProjectionResult};
pub use record::{
    BacktestRecord, BacktestSummary, FixtureEvaluation, LeagueSummary, RecordOutcome,
    RoundSummary, RunSummary,
};
pub use samples::{SampleStatistics, TeamSamples};
pub use settlement::{Settlement, WagerSide};
pub use signal::{GateThresholds, Signal};
pub use staking::{StakeMode, StakePolicy, StakeResult, StakeSizer};
pub use value::ValueResult;
