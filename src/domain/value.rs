//! Value detection: projected fair price versus market price.
//!
//! `fair_odds = 1 / p_hat` and
//! `edge_pct = (market_odds / fair_odds - 1) * 100`.
//! A value signal fires when the edge reaches the configured minimum.

use serde::{Deserialize, Serialize};

use super::projection::ProjectionResult;

/// Outcome of comparing a projection to a market price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueResult {
    /// `None` when `p_hat` is zero; never a usable price in that case.
    pub fair_odds: Option<f64>,
    /// Only positive market prices are retained.
    pub market_odds: Option<f64>,
    pub edge_pct: Option<f64>,
    pub odds_provider: Option<String>,
    pub value_signal: bool,
    pub reasons: Vec<String>,
}

/// Break-even decimal price for probability `p_hat`.
pub fn fair_odds(p_hat: f64) -> Option<f64> {
    (p_hat > 0.0 && p_hat.is_finite()).then(|| 1.0 / p_hat)
}

/// Percentage by which `market_odds` exceeds `fair_odds`.
pub fn edge_percentage(fair_odds: f64, market_odds: f64) -> f64 {
    (market_odds / fair_odds - 1.0) * 100.0
}

/// Compare a projection to an optional market price.
///
/// Missing or non-positive odds leave `edge_pct` undefined with the
/// reason "No market odds available". Otherwise the reasons state
/// either the shortfall against `min_edge_pct` or the detected edge.
pub fn detect_value(
    projection: &ProjectionResult,
    market_odds: Option<f64>,
    odds_provider: Option<&str>,
    min_edge_pct: f64,
) -> ValueResult {
    let fair = fair_odds(projection.p_hat);
    let market = market_odds.filter(|o| o.is_finite() && *o > 0.0);
    let mut reasons = Vec::new();

    let edge_pct = match (fair, market) {
        (_, None) => {
            reasons.push("No market odds available".to_string());
            None
        }
        (None, Some(_)) => {
            reasons.push(format!(
                "Fair odds undefined: projected probability is {:.3}",
                projection.p_hat
            ));
            None
        }
        (Some(fair), Some(market)) => Some(edge_percentage(fair, market)),
    };

    let value_signal = match edge_pct {
        Some(edge) if edge >= min_edge_pct => {
            reasons.push(format!("Value detected: {edge:.2}% edge"));
            true
        }
        Some(edge) => {
            reasons.push(format!("Edge too low: {edge:.2}% < {min_edge_pct}%"));
            false
        }
        None => false,
    };

    ValueResult {
        fair_odds: fair,
        market_odds: market,
        edge_pct,
        odds_provider: odds_provider.map(str::to_string),
        value_signal,
        reasons,
    }
}
