//! Stake sizing under a flat or dynamic (fractional Kelly) policy.
//!
//! Dynamic sizing scales full Kelly by `kelly_fraction`, by a confidence
//! weight that shrinks as the probability interval widens relative to
//! `tau_conf`, and by a value weight that grows with edge up to
//! `target_edge_pct`. Both modes are capped at `stake_cap * bankroll`
//! and stake nothing unless the value signal fired on a valid `p_hat`.
//!
//! Amounts are truncated to cents with `Decimal` so rounding never
//! lifts a stake above its cap.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::projection::ProjectionResult;
use super::value::ValueResult;

/// Staking policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakeMode {
    Flat,
    Dynamic,
}

impl std::fmt::Display for StakeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Parameters of a staking policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StakePolicy {
    pub mode: StakeMode,
    pub bankroll: f64,
    pub flat_size: f64,
    /// Multiplier on full Kelly (0.5 = half-Kelly).
    pub kelly_fraction: f64,
    /// CI width at which the confidence weight reaches zero.
    pub tau_conf: f64,
    /// Edge (percent) at which the value weight saturates.
    pub target_edge_pct: f64,
    /// Maximum stake as a fraction of bankroll, in `[0, 1]`.
    pub stake_cap: f64,
}

impl Default for StakePolicy {
    fn default() -> Self {
        Self {
            mode: StakeMode::Dynamic,
            bankroll: 1000.0,
            flat_size: 10.0,
            kelly_fraction: 0.5,
            tau_conf: 0.20,
            target_edge_pct: 5.0,
            stake_cap: 0.03,
        }
    }
}

/// Sized stake for one fixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StakeResult {
    pub stake_mode: StakeMode,
    pub stake_amount: f64,
    pub stake_fraction: f64,
    /// Scaled Kelly fraction before weights (dynamic mode only).
    pub kelly_fraction: Option<f64>,
    pub confidence_weight: Option<f64>,
    pub value_weight: Option<f64>,
}

impl StakeResult {
    pub fn zero(mode: StakeMode) -> Self {
        Self {
            stake_mode: mode,
            stake_amount: 0.0,
            stake_fraction: 0.0,
            kelly_fraction: None,
            confidence_weight: None,
            value_weight: None,
        }
    }
}

/// Full Kelly fraction for a binary bet at decimal `odds` with win
/// probability `probability`: `((o - 1) p - (1 - p)) / (o - 1)`, floored at 0.
pub fn kelly_fraction(odds: f64, probability: f64) -> f64 {
    if odds <= 1.0 || probability <= 0.0 || probability >= 1.0 {
        return 0.0;
    }
    let b = odds - 1.0;
    ((b * probability - (1.0 - probability)) / b).max(0.0)
}

/// `max(0, 1 - width / tau_conf)`; a non-positive width means full confidence.
pub fn confidence_weight(prob_ci_width: f64, tau_conf: f64) -> f64 {
    if prob_ci_width <= 0.0 {
        return 1.0;
    }
    (1.0 - prob_ci_width / tau_conf).max(0.0)
}

/// `min(1, edge / target)`; zero for non-positive edge.
pub fn value_weight(edge_pct: f64, target_edge_pct: f64) -> f64 {
    if edge_pct <= 0.0 {
        return 0.0;
    }
    if target_edge_pct <= 0.0 {
        return 1.0;
    }
    (edge_pct / target_edge_pct).min(1.0)
}

/// Turns validated value signals into bankroll-bounded stakes.
#[derive(Debug, Clone, Copy)]
pub struct StakeSizer {
    policy: StakePolicy,
}

impl StakeSizer {
    /// Validates the policy; a bad bankroll or cap is a configuration bug.
    ///
    /// # Errors
    /// Returns `EngineError::StakeConfiguration` for a negative or
    /// non-finite bankroll, a cap outside `[0, 1]`, a Kelly multiplier
    /// outside `[0, 1]`, a non-positive `tau_conf`, or a negative
    /// flat size or target edge.
    pub fn new(policy: StakePolicy) -> Result<Self, EngineError> {
        let bad = |msg: String| Err(EngineError::StakeConfiguration(msg));

        if !policy.bankroll.is_finite() || policy.bankroll < 0.0 {
            return bad(format!("bankroll must be >= 0, got {}", policy.bankroll));
        }
        if !(0.0..=1.0).contains(&policy.stake_cap) {
            return bad(format!("stake_cap must be in [0, 1], got {}", policy.stake_cap));
        }
        if !(0.0..=1.0).contains(&policy.kelly_fraction) {
            return bad(format!(
                "kelly_fraction must be in [0, 1], got {}",
                policy.kelly_fraction
            ));
        }
        if policy.tau_conf.is_nan() || policy.tau_conf <= 0.0 {
            return bad(format!("tau_conf must be > 0, got {}", policy.tau_conf));
        }
        if policy.flat_size.is_nan() || policy.flat_size < 0.0 {
            return bad(format!("flat_size must be >= 0, got {}", policy.flat_size));
        }
        if policy.target_edge_pct.is_nan() || policy.target_edge_pct < 0.0 {
            return bad(format!(
                "target_edge_pct must be >= 0, got {}",
                policy.target_edge_pct
            ));
        }

        Ok(Self { policy })
    }

    pub fn policy(&self) -> &StakePolicy {
        &self.policy
    }

    /// Largest stake the cap allows.
    pub fn max_stake(&self) -> f64 {
        self.policy.stake_cap * self.policy.bankroll
    }

    /// Size a stake for a projection and its value result.
    pub fn size(&self, projection: &ProjectionResult, value: &ValueResult) -> StakeResult {
        let mode = self.policy.mode;
        if !value.value_signal || !projection.has_valid_probability() {
            return StakeResult::zero(mode);
        }

        match mode {
            StakeMode::Flat => {
                let amount = self.truncate_to_cents(self.policy.flat_size.min(self.max_stake()));
                StakeResult {
                    stake_amount: amount,
                    stake_fraction: self.fraction_of_bankroll(amount),
                    ..StakeResult::zero(mode)
                }
            }
            StakeMode::Dynamic => self.size_dynamic(projection, value),
        }
    }

    fn size_dynamic(&self, projection: &ProjectionResult, value: &ValueResult) -> StakeResult {
        let Some(market_odds) = value.market_odds else {
            return StakeResult::zero(StakeMode::Dynamic);
        };

        let kelly = kelly_fraction(market_odds, projection.p_hat) * self.policy.kelly_fraction;
        let conf = confidence_weight(projection.prob_ci_width, self.policy.tau_conf);
        let val = value_weight(value.edge_pct.unwrap_or(0.0), self.policy.target_edge_pct);

        let fraction = (kelly * conf * val).clamp(0.0, self.policy.stake_cap);
        let amount = self.truncate_to_cents(self.policy.bankroll * fraction);

        StakeResult {
            stake_mode: StakeMode::Dynamic,
            stake_amount: amount,
            stake_fraction: self.fraction_of_bankroll(amount),
            kelly_fraction: Some(kelly),
            confidence_weight: Some(conf),
            value_weight: Some(val),
        }
    }

    fn fraction_of_bankroll(&self, amount: f64) -> f64 {
        if self.policy.bankroll > 0.0 {
            (amount / self.policy.bankroll).min(self.policy.stake_cap)
        } else {
            0.0
        }
    }

    fn truncate_to_cents(&self, amount: f64) -> f64 {
        Decimal::from_f64(amount.max(0.0))
            .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::ToZero))
            .and_then(|d| d.to_f64())
            .unwrap_or(0.0)
            .min(self.max_stake())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection(p_hat: f64, width: f64) -> ProjectionResult {
        ProjectionResult {
            lambda_hat: -(1.0 - p_hat).ln(),
            p_hat,
            p_ci_low: p_hat - width / 2.0,
            p_ci_high: p_hat + width / 2.0,
            prob_ci_width: width,
            n_bootstrap: 0,
        }
    }

    fn value(market_odds: f64, p_hat: f64) -> ValueResult {
        crate::domain::value::detect_value(&projection(p_hat, 0.0), Some(market_odds), None, 0.0)
    }

    #[test]
    fn test_kelly_positive_edge() {
        // b = 1.1, p = 0.5834 → (1.1 * 0.5834 - 0.4166) / 1.1
        let k = kelly_fraction(2.10, 0.5834);
        assert!((k - (1.1 * 0.5834 - 0.4166) / 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_kelly_no_edge_is_zero() {
        assert_eq!(kelly_fraction(2.0, 0.4), 0.0);
        assert_eq!(kelly_fraction(1.0, 0.9), 0.0);
    }

    #[test]
    fn test_flat_stake_capped_by_bankroll_fraction() {
        let sizer = StakeSizer::new(StakePolicy {
            mode: StakeMode::Flat,
            flat_size: 50.0,
            ..StakePolicy::default()
        })
        .unwrap();
        let stake = sizer.size(&projection(0.6, 0.1), &value(2.0, 0.6));
        assert!((stake.stake_amount - 30.0).abs() < 1e-9);
        assert!((stake.stake_fraction - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_flat_stake_below_cap() {
        let sizer = StakeSizer::new(StakePolicy {
            mode: StakeMode::Flat,
            ..StakePolicy::default()
        })
        .unwrap();
        let stake = sizer.size(&projection(0.6, 0.1), &value(2.0, 0.6));
        assert!((stake.stake_amount - 10.0).abs() < 1e-9);
        assert!((stake.stake_fraction - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_no_signal_means_no_stake() {
        let sizer = StakeSizer::new(StakePolicy::default()).unwrap();
        let mut v = value(2.0, 0.6);
        v.value_signal = false;
        assert_eq!(sizer.size(&projection(0.6, 0.1), &v).stake_amount, 0.0);
    }

    #[test]
    fn test_dynamic_shrinks_with_uncertainty() {
        let sizer = StakeSizer::new(StakePolicy {
            stake_cap: 1.0,
            ..StakePolicy::default()
        })
        .unwrap();
        let v = value(2.10, 0.5834);
        let tight = sizer.size(&projection(0.5834, 0.05), &v);
        let wide = sizer.size(&projection(0.5834, 0.15), &v);
        let hopeless = sizer.size(&projection(0.5834, 0.25), &v);
        assert!(tight.stake_amount > wide.stake_amount);
        assert_eq!(hopeless.stake_amount, 0.0);
        assert_eq!(hopeless.confidence_weight, Some(0.0));
    }

    #[test]
    fn test_dynamic_never_exceeds_cap() {
        let sizer = StakeSizer::new(StakePolicy::default()).unwrap();
        let stake = sizer.size(&projection(0.9, 0.0), &value(5.0, 0.9));
        assert!(stake.stake_amount <= 30.0 + 1e-9);
        assert!(stake.stake_amount > 0.0);
    }

    #[test]
    fn test_rejects_bad_configuration() {
        for policy in [
            StakePolicy {
                bankroll: -1.0,
                ..StakePolicy::default()
            },
            StakePolicy {
                stake_cap: 1.5,
                ..StakePolicy::default()
            },
            StakePolicy {
                stake_cap: -0.1,
                ..StakePolicy::default()
            },
        ] {
            let err = StakeSizer::new(policy).unwrap_err();
            assert!(err.is_fatal());
        }
    }

    #[test]
    fn test_truncation_to_cents() {
        let sizer = StakeSizer::new(StakePolicy {
            mode: StakeMode::Flat,
            flat_size: 12.349,
            ..StakePolicy::default()
        })
        .unwrap();
        let stake = sizer.size(&projection(0.6, 0.1), &value(2.0, 0.6));
        assert!((stake.stake_amount - 12.34).abs() < 1e-9);
    }
}
