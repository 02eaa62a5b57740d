//! Per-team first-half goal samples.
//!
//! Filters the flat sample feed down to one team and scope, orders it
//! by match date, and checks the result against minimum sample counts.
//!
//! The store never cuts by "now". Callers evaluating a fixture must hand
//! in a pool already restricted to matches strictly before kickoff; the
//! `SampleRepository` port enforces this with an explicit `before` bound.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fixture::{DateRange, FirstHalfSample, Scope, Season, TeamId};

/// Ordered first-half goal samples for one team in one scope.
///
/// `samples` and `match_dates` are parallel and ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSamples {
    pub team_id: TeamId,
    pub scope: Scope,
    pub samples: Vec<f64>,
    pub match_dates: Vec<DateTime<Utc>>,
    pub season: Season,
    pub n_samples: usize,
}

impl TeamSamples {
    /// An empty sample set, used when a team has no history yet.
    pub fn empty(team_id: &str, scope: Scope, season: Option<&str>) -> Self {
        Self {
            team_id: team_id.to_string(),
            scope,
            samples: Vec::new(),
            match_dates: Vec::new(),
            season: season.unwrap_or("unknown").to_string(),
            n_samples: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.n_samples == 0
    }

    /// Arithmetic mean of the samples, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        mean(&self.samples)
    }

    /// Keep only the `n` most recent samples.
    pub fn most_recent(mut self, n: usize) -> Self {
        if self.n_samples > n {
            let skip = self.n_samples - n;
            self.samples.drain(..skip);
            self.match_dates.drain(..skip);
            self.n_samples = n;
        }
        self
    }
}

/// Descriptive statistics over one team's samples.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SampleStatistics {
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub n_samples: usize,
}

/// Build ordered samples for one team and scope from the flat feed.
///
/// `season` and `date_range` narrow the selection when given. The sort
/// is stable, so samples sharing a date keep their feed order.
pub fn build_team_samples(
    all_samples: &[FirstHalfSample],
    team_id: &str,
    scope: Scope,
    season: Option<&str>,
    date_range: Option<DateRange>,
) -> TeamSamples {
    let mut selected: Vec<&FirstHalfSample> = all_samples
        .iter()
        .filter(|s| s.team_id == team_id && s.scope == scope)
        .filter(|s| season.is_none_or(|season| s.season == season))
        .filter(|s| date_range.is_none_or(|range| range.contains(s.match_date)))
        .collect();

    selected.sort_by_key(|s| s.match_date);

    let season = season
        .map(str::to_string)
        .or_else(|| selected.first().map(|s| s.season.clone()))
        .unwrap_or_else(|| "unknown".to_string());

    TeamSamples {
        team_id: team_id.to_string(),
        scope,
        samples: selected.iter().map(|s| s.first_half_goals).collect(),
        match_dates: selected.iter().map(|s| s.match_date).collect(),
        season,
        n_samples: selected.len(),
    }
}

/// Home samples for the home team and away samples for the away team.
pub fn get_home_away_samples(
    all_samples: &[FirstHalfSample],
    home_team_id: &str,
    away_team_id: &str,
    season: Option<&str>,
    date_range: Option<DateRange>,
) -> (TeamSamples, TeamSamples) {
    (
        build_team_samples(all_samples, home_team_id, Scope::Home, season, date_range),
        build_team_samples(all_samples, away_team_id, Scope::Away, season, date_range),
    )
}

/// Check both scopes against their minimum counts.
///
/// Fails closed: every shortfall and every empty scope yields its own
/// reason, home before away. Passes only when the reason list is empty.
pub fn validate_samples(
    home: &TeamSamples,
    away: &TeamSamples,
    min_samples_home: usize,
    min_samples_away: usize,
) -> (bool, Vec<String>) {
    let mut reasons = Vec::new();

    for (samples, minimum) in [(home, min_samples_home), (away, min_samples_away)] {
        if samples.n_samples < minimum {
            reasons.push(format!(
                "Insufficient {} samples: {} < {} (short by {})",
                samples.scope,
                samples.n_samples,
                minimum,
                minimum - samples.n_samples
            ));
        }
    }

    for samples in [home, away] {
        if samples.n_samples == 0 {
            reasons.push(format!("No {} samples available", samples.scope));
        }
    }

    (reasons.is_empty(), reasons)
}

/// Summary statistics; all zeros for an empty sample set.
pub fn sample_statistics(samples: &TeamSamples) -> SampleStatistics {
    let Some(mean) = samples.mean() else {
        return SampleStatistics::default();
    };

    let values = &samples.samples;
    let n = values.len();
    let std = if n > 1 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    } else {
        0.0
    };

    let mut sorted = values.clone();
    sorted.sort_by(f64::total_cmp);
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };

    SampleStatistics {
        mean,
        std,
        min: sorted[0],
        max: sorted[n - 1],
        median,
        n_samples: n,
    }
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
