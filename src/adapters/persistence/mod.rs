//! Persistence Adapters - JSON/JSONL File Storage
//!
//! Loads the sample, fixture and odds feeds, appends backtest records
//! and scan signals to JSONL logs, and writes atomic JSON snapshots of
//! run summaries. No database dependency.

pub mod feeds;
pub mod records;
pub mod repository_impl;
pub mod summary;

pub use feeds::{load_feed, load_fixtures, load_odds, load_samples};
pub use records::RecordLogger;
pub use repository_impl::RepositoryImpl;
pub use summary::SummaryStore;
