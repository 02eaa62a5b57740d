//! Record Logger - Append-only JSONL Backtest Records
//!
//! Persists backtest records to `<records_file>` and live-scan
//! evaluations to `signals/YYYY-MM-DD.jsonl`. Each line is a
//! self-contained JSON record for easy parsing and streaming.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};

use crate::domain::{BacktestRecord, FixtureEvaluation};

/// Append-only JSONL logger for records and signals.
pub struct RecordLogger {
    /// Backtest record log.
    records_path: PathBuf,
    /// Directory for daily signal files.
    signals_dir: PathBuf,
}

impl RecordLogger {
    /// Create a logger in the given data directory.
    pub async fn new(data_dir: &str, records_file: &str) -> Result<Self> {
        let dir = Path::new(data_dir);
        let signals_dir = dir.join("signals");

        fs::create_dir_all(&signals_dir)
            .await
            .context("Failed to create signals directory")?;

        Ok(Self {
            records_path: dir.join(records_file),
            signals_dir,
        })
    }

    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    /// Append one backtest record.
    #[instrument(skip(self, record), fields(fixture_id = %record.evaluation.fixture_id))]
    pub async fn append_record(&self, record: &BacktestRecord) -> Result<()> {
        append_line(&self.records_path, record).await
    }

    /// Append one scan evaluation to today's signal file.
    #[instrument(skip(self, evaluation), fields(fixture_id = %evaluation.fixture_id))]
    pub async fn append_evaluation(&self, evaluation: &FixtureEvaluation) -> Result<()> {
        let date = Utc::now().format("%Y-%m-%d").to_string();
        let path = self.signals_dir.join(format!("{date}.jsonl"));
        append_line(&path, evaluation).await
    }

    /// Load every backtest record in log order.
    #[instrument(skip(self))]
    pub async fn load_records(&self) -> Result<Vec<BacktestRecord>> {
        let records: Vec<BacktestRecord> = read_lines(&self.records_path).await?;
        info!(count = records.len(), "Loaded backtest records");
        Ok(records)
    }

    /// Truncate the record log before a fresh run.
    pub async fn reset(&self) -> Result<()> {
        fs::write(&self.records_path, b"")
            .await
            .context("Failed to reset record log")
    }

    /// Check if the signals directory is writable.
    pub async fn is_healthy(&self) -> bool {
        let test_path = self.signals_dir.join(".health_check");
        let result = fs::write(&test_path, b"ok").await;
        let _ = fs::remove_file(&test_path).await;
        result.is_ok()
    }
}

async fn append_line<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string(value).context("Failed to serialize record")?;
    json.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    file.write_all(json.as_bytes())
        .await
        .context("Failed to write record")?;

    file.flush().await.context("Failed to flush record log")?;

    Ok(())
}

async fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).await?;
    let mut out = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(line) {
            Ok(value) => out.push(value),
            Err(e) => {
                warn!(
                    file = %path.display(),
                    error = %e,
                    "Skipping malformed record"
                );
            }
        }
    }
    Ok(out)
}
