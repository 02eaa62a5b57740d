//! Wager-side settlement.
//!
//! `BackOver` backs "over 0.5" at the market price. `LayUnder` lays
//! "under 0.5" on an exchange: a first-half goal wins the backer's stake
//! accepted and a goalless half costs the liability
//! `accepted * (under_odds - 1)`. The sized stake is the most either side
//! may lose, so a lay at `under_odds > 2` accepts only
//! `stake / (under_odds - 1)`. Commission applies to winnings only.

use serde::{Deserialize, Serialize};

/// Which side of the first-half market a bet takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WagerSide {
    #[default]
    BackOver,
    LayUnder,
}

impl std::fmt::Display for WagerSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BackOver => write!(f, "back_over"),
            Self::LayUnder => write!(f, "lay_under"),
        }
    }
}

/// No-margin complement of an over price: `o / (o - 1)`.
pub fn implied_under_odds(over_odds: f64) -> Option<f64> {
    (over_odds > 1.0).then(|| over_odds / (over_odds - 1.0))
}

/// Inputs needed to settle one bet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub side: WagerSide,
    pub stake: f64,
    pub over_odds: f64,
    /// Quoted under price; derived from `over_odds` when absent.
    pub under_odds: Option<f64>,
    /// Exchange commission on net winnings, in `[0, 1)`.
    pub commission_rate: f64,
}

impl Settlement {
    /// Profit or loss given whether the first half had a goal.
    pub fn profit_loss(&self, actual_over_05: bool) -> f64 {
        let keep = 1.0 - self.commission_rate;
        match (self.side, actual_over_05) {
            (WagerSide::BackOver, true) => self.stake * (self.over_odds - 1.0) * keep,
            (WagerSide::BackOver, false) => -self.stake,
            (WagerSide::LayUnder, true) => self.accepted_stake() * keep,
            (WagerSide::LayUnder, false) => -self.liability(),
        }
    }

    /// Worst-case loss of the bet; never more than `stake`.
    pub fn liability(&self) -> f64 {
        match self.side {
            WagerSide::BackOver => self.stake,
            WagerSide::LayUnder => self.accepted_stake() * (self.lay_odds() - 1.0),
        }
    }

    /// Backer's stake matched by the bet.
    pub fn accepted_stake(&self) -> f64 {
        match self.side {
            WagerSide::BackOver => self.stake,
            WagerSide::LayUnder => self.stake / (self.lay_odds() - 1.0).max(1.0),
        }
    }

    fn lay_odds(&self) -> f64 {
        self.under_odds
            .filter(|o| *o > 1.0)
            .or_else(|| implied_under_odds(self.over_odds))
            .unwrap_or(1.0)
    }
}
