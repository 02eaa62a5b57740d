//! Metrics Adapters
//!
//! Prometheus registry for backtest and scan runs, rendered to a
//! text-format file at the end of each run.

pub mod prometheus;

pub use prometheus::BacktestMetrics;
