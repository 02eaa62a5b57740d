//! In-memory sample repository.
//!
//! Samples are grouped by `(team, scope)` and kept ascending by match
//! date, so the causal cut for a query is a binary search.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::samples::build_team_samples;
use crate::domain::{FirstHalfSample, Scope, TeamId, TeamSamples};
use crate::ports::repository::{SampleRepository, SampleWindow};

/// Sample feed indexed by team and scope.
#[derive(Debug, Default)]
pub struct InMemorySampleStore {
    by_team: HashMap<(TeamId, Scope), Vec<FirstHalfSample>>,
    total: usize,
}

impl InMemorySampleStore {
    /// Index a flat feed. Rows sharing a date keep their feed order.
    pub fn new(samples: Vec<FirstHalfSample>) -> Self {
        let total = samples.len();
        let mut by_team: HashMap<(TeamId, Scope), Vec<FirstHalfSample>> = HashMap::new();
        for sample in samples {
            by_team
                .entry((sample.team_id.clone(), sample.scope))
                .or_default()
                .push(sample);
        }
        for rows in by_team.values_mut() {
            rows.sort_by_key(|s| s.match_date);
        }

        debug!(samples = total, groups = by_team.len(), "Indexed sample feed");
        Self { by_team, total }
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl SampleRepository for InMemorySampleStore {
    fn find_samples(
        &self,
        team_id: &str,
        scope: Scope,
        before: DateTime<Utc>,
        window: &SampleWindow,
    ) -> TeamSamples {
        let season = window.season.as_deref();
        let Some(rows) = self.by_team.get(&(team_id.to_string(), scope)) else {
            return TeamSamples::empty(team_id, scope, season);
        };

        let cut = rows.partition_point(|s| s.match_date < before);
        let samples = build_team_samples(&rows[..cut], team_id, scope, season, None);

        match window.max_recent {
            Some(n) => samples.most_recent(n),
            None => samples,
        }
    }
}
