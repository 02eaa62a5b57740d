//! Summary Store - Atomic JSON Run Snapshots
//!
//! Saves run summaries using atomic writes (write to tmp file, then
//! rename) so the file is always either the old or the new version.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, instrument};

use crate::domain::RunSummary;

/// Atomic JSON snapshot of the latest run.
pub struct SummaryStore {
    summary_path: PathBuf,
    tmp_path: PathBuf,
}

impl SummaryStore {
    /// Create a store in the given data directory.
    pub async fn new(data_dir: &str, summary_file: &str) -> Result<Self> {
        let dir = Path::new(data_dir);
        fs::create_dir_all(dir)
            .await
            .context("Failed to create data directory")?;

        Ok(Self {
            summary_path: dir.join(summary_file),
            tmp_path: dir.join(format!("{summary_file}.tmp")),
        })
    }

    /// Save a summary atomically (tmp → rename).
    #[instrument(skip(self, summary), fields(run_id = %summary.run_id))]
    pub async fn save(&self, summary: &RunSummary) -> Result<()> {
        let json =
            serde_json::to_string_pretty(summary).context("Failed to serialize run summary")?;

        fs::write(&self.tmp_path, &json)
            .await
            .context("Failed to write tmp summary file")?;

        fs::rename(&self.tmp_path, &self.summary_path)
            .await
            .context("Failed to rename summary file")?;

        info!(
            path = %self.summary_path.display(),
            bets = summary.overall.total_bets,
            profit = summary.overall.total_profit,
            cancelled = summary.cancelled,
            "Run summary saved"
        );

        Ok(())
    }

    /// Load the latest summary; `None` before the first run.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Option<RunSummary>> {
        if !self.summary_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.summary_path)
            .await
            .context("Failed to read summary file")?;

        let summary = serde_json::from_str(&json).context("Failed to parse summary JSON")?;
        Ok(Some(summary))
    }

    /// Check the summary file, if present, is readable.
    pub async fn is_healthy(&self) -> bool {
        if !self.summary_path.exists() {
            return true;
        }
        fs::metadata(&self.summary_path).await.is_ok()
    }
}
