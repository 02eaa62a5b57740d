//! Feed Loader - JSON and JSONL Input Files
//!
//! Reads the externally prepared sample, fixture and odds feeds. A file
//! whose first non-blank character is `[` is parsed as a JSON array;
//! anything else is treated as JSON Lines.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::domain::{FirstHalfSample, Fixture, MarketQuote};

/// Load every record of a JSON array or JSONL file.
///
/// Malformed JSONL lines are skipped with a warning; a malformed JSON
/// array is an error.
#[instrument]
pub async fn load_feed<T: DeserializeOwned>(path: &str) -> Result<Vec<T>> {
    let content = fs::read_to_string(Path::new(path))
        .await
        .with_context(|| format!("Failed to read feed file: {path}"))?;

    if content.trim_start().starts_with('[') {
        return serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON array feed: {path}"));
    }

    let mut records = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(
                    file = %path,
                    line = line_no + 1,
                    error = %e,
                    "Skipping malformed feed record"
                );
            }
        }
    }

    Ok(records)
}

/// Historical per-team first-half samples.
pub async fn load_samples(path: &str) -> Result<Vec<FirstHalfSample>> {
    let samples: Vec<FirstHalfSample> = load_feed(path).await?;
    info!(count = samples.len(), path, "Loaded sample feed");
    Ok(samples)
}

/// Fixture feed.
pub async fn load_fixtures(path: &str) -> Result<Vec<Fixture>> {
    let fixtures: Vec<Fixture> = load_feed(path).await?;
    info!(count = fixtures.len(), path, "Loaded fixture feed");
    Ok(fixtures)
}

/// Recorded odds feed; a missing path means no recorded odds.
pub async fn load_odds(path: Option<&str>) -> Result<Vec<MarketQuote>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    if !Path::new(path).exists() {
        warn!(path, "Odds feed not found, continuing without recorded odds");
        return Ok(Vec::new());
    }
    let quotes: Vec<MarketQuote> = load_feed(path).await?;
    info!(count = quotes.len(), path, "Loaded odds feed");
    Ok(quotes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("fh-over-feeds-{}-{name}", uuid::Uuid::new_v4()))
            .display()
            .to_string()
    }

    #[tokio::test]
    async fn test_jsonl_skips_bad_lines() {
        let path = temp_path("odds.jsonl");
        let body = concat!(
            r#"{"fixture_id":"f1","over_odds":1.4,"provider":"a"}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"fixture_id":"f2","over_odds":1.3,"under_odds":3.5,"provider":"b"}"#,
            "\n",
        );
        fs::write(&path, body).await.unwrap();

        let quotes = load_odds(Some(&path)).await.unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[1].under_odds, Some(3.5));

        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_json_array_feed() {
        let path = temp_path("samples.json");
        let body = r#"[
            {"team_id":"ars","scope":"home","match_date":"2024-08-17T14:00:00Z","first_half_goals":1.0,"season":"2024-25"}
        ]"#;
        fs::write(&path, body).await.unwrap();

        let samples = load_samples(&path).await.unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].team_id, "ars");

        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_missing_odds_feed_is_empty() {
        assert!(load_odds(Some("/nonexistent/odds.jsonl")).await.unwrap().is_empty());
        assert!(load_odds(None).await.unwrap().is_empty());
        assert!(load_fixtures("/nonexistent/fixtures.jsonl").await.is_err());
    }
}
