//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `SampleRepository` / `FixtureRepository`: historical feeds, queried
//!   with an explicit `before` cut so evaluation can never look ahead
//! - `OddsSource`: recorded or synthesized market prices
//! - `ResultSink`: persistence of records and run summaries

pub mod odds_source;
pub mod repository;

pub use odds_source::OddsSource;
pub use repository::{FixtureRepository, ResultSink, SampleRepository, SampleWindow};
