//! Repository Implementation - Concrete Adapter for the ResultSink Port
//!
//! Wraps `SummaryStore` (atomic JSON snapshots) and `RecordLogger`
//! (JSONL append-only files) into a single struct that implements
//! `ResultSink` from `crate::ports::repository`.

use anyhow::Result;
use async_trait::async_trait;

use super::records::RecordLogger;
use super::summary::SummaryStore;
use crate::config::PersistenceConfig;
use crate::domain::{BacktestRecord, FixtureEvaluation, RunSummary};
use crate::ports::repository::ResultSink;

/// File-backed result sink.
pub struct RepositoryImpl {
    summary_store: SummaryStore,
    record_logger: RecordLogger,
}

impl RepositoryImpl {
    pub fn new(summary_store: SummaryStore, record_logger: RecordLogger) -> Self {
        Self {
            summary_store,
            record_logger,
        }
    }

    /// Build both stores under the configured data directory.
    pub async fn from_config(config: &PersistenceConfig) -> Result<Self> {
        let summary_store = SummaryStore::new(&config.data_dir, &config.summary_file).await?;
        let record_logger = RecordLogger::new(&config.data_dir, &config.records_file).await?;
        Ok(Self::new(summary_store, record_logger))
    }

    pub fn records(&self) -> &RecordLogger {
        &self.record_logger
    }
}

#[async_trait]
impl ResultSink for RepositoryImpl {
    async fn save_record(&self, record: &BacktestRecord) -> Result<()> {
        self.record_logger.append_record(record).await
    }

    async fn save_evaluation(&self, evaluation: &FixtureEvaluation) -> Result<()> {
        self.record_logger.append_evaluation(evaluation).await
    }

    async fn save_summary(&self, summary: &RunSummary) -> Result<()> {
        self.summary_store.save(summary).await
    }

    async fn load_summary(&self) -> Result<Option<RunSummary>> {
        self.summary_store.load().await
    }

    async fn is_healthy(&self) -> bool {
        self.summary_store.is_healthy().await && self.record_logger.is_healthy().await
    }
}
