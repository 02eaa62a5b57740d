//! Core fixture and market domain types.
//!
//! Defines the externally owned records the engine consumes: fixtures,
//! per-team first-half samples, and market quotes. The engine treats
//! all of these as read-only input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────
// Type aliases consumed by ports and adapters
// ────────────────────────────────────────────

/// Team identifier as supplied by the ingestion layer.
pub type TeamId = String;

/// Fixture identifier as supplied by the ingestion layer.
pub type FixtureId = String;

/// Season label, e.g. `"2024-25"`.
pub type Season = String;

// ────────────────────────────────────────────
// Enums shared across domain and ports
// ────────────────────────────────────────────

/// Which side of a fixture a sample was recorded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Home,
    Away,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "home"),
            Self::Away => write!(f, "away"),
        }
    }
}

/// Lifecycle status of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureStatus {
    Scheduled,
    Live,
    Finished,
    Cancelled,
}

// ────────────────────────────────────────────
// Feed records
// ────────────────────────────────────────────

/// One row of the flat historical sample feed.
///
/// `first_half_goals` is the total first-half goals of the match the
/// team played in the given scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirstHalfSample {
    pub team_id: TeamId,
    pub scope: Scope,
    pub match_date: DateTime<Utc>,
    pub first_half_goals: f64,
    pub season: Season,
}

/// A single fixture, read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub league: String,
    pub match_date: DateTime<Utc>,
    pub season: Season,
    pub status: FixtureStatus,
    /// Home side goals at half-time, if recorded.
    #[serde(default)]
    pub home_first_half_goals: Option<u32>,
    /// Away side goals at half-time, if recorded.
    #[serde(default)]
    pub away_first_half_goals: Option<u32>,
}

impl Fixture {
    /// Total first-half goals; `None` when a side is unrecorded or the sum overflows.
    pub fn actual_first_half_goals(&self) -> Option<u32> {
        self.home_first_half_goals?.checked_add(self.away_first_half_goals?)
    }

    /// Whether the fixture has finished and can be resolved.
    pub fn is_finished(&self) -> bool {
        self.status == FixtureStatus::Finished
    }
}

/// A market price for "first-half over 0.5 goals".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub fixture_id: FixtureId,
    /// Decimal back price for Over 0.5.
    pub over_odds: f64,
    /// Decimal price for Under 0.5, when the provider quotes it.
    #[serde(default)]
    pub under_odds: Option<f64>,
    pub provider: String,
}

/// Inclusive date window used for fixture and sample queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// `[start, start + days]`, with negative `days` treated as zero.
    /// `None` when the end is not representable.
    pub fn days_ahead(start: DateTime<Utc>, days: i64) -> Option<Self> {
        let span = chrono::Duration::try_days(days.max(0))?;
        let end = start.checked_add_signed(span)?;
        Some(Self::new(start, end))
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Pick the highest over-0.5 price across provider quotes.
///
/// Quotes with non-positive or non-finite prices are ignored.
pub fn best_quote(quotes: &[MarketQuote]) -> Option<&MarketQuote> {
    quotes
        .iter()
        .filter(|q| q.over_odds.is_finite() && q.over_odds > 0.0)
        .max_by(|a, b| a.over_odds.total_cmp(&b.over_odds))
}
