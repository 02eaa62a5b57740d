//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! engine's workflows. Each use case is a self-contained operation.
//!
//! Use cases:
//! - `FixtureEvaluator`: single-fixture decision pipeline
//! - `BacktestHarness`: chronological causal replay per league
//! - `summary`: pure reduction of records to performance figures
//! - `rounds`: round-table variant with per-round subtotals
//! - `LiveScanner`: one pass over scheduled fixtures with recorded odds

pub mod backtest;
pub mod evaluator;
pub mod rounds;
pub mod scanner;
pub mod summary;

pub use backtest::{BacktestHarness, BacktestReport, CancellationFlag};
pub use evaluator::FixtureEvaluator;
pub use rounds::{RoundCalendar, RoundReport};
pub use scanner::{LiveScanner, ScanReport};
