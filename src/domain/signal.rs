//! Decision gate: combines every threshold check into one bet signal.
//!
//! Reasons concatenate in a fixed order (samples, then projection, then
//! value) so diagnostic output is reproducible.

use serde::{Deserialize, Serialize};

use super::projection::ProjectionResult;
use super::value::ValueResult;

/// Threshold outcome for one fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub lambda_threshold_met: bool,
    pub min_samples_met: bool,
    pub edge_threshold_met: bool,
    pub ci_width_threshold_met: bool,
    /// AND of the four flags above, and false whenever the projected
    /// probability lies outside `(0, 1)`.
    pub signal: bool,
    pub reasons: Vec<String>,
}

/// Thresholds the gate checks a projection against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateThresholds {
    pub lambda_threshold: f64,
    pub max_prob_ci_width: f64,
}

/// Assemble a signal from the three validation stages.
///
/// `projection` is `None` when sample validation failed and the
/// projection was skipped; the dependent flags are then false.
pub fn build_signal(
    thresholds: GateThresholds,
    min_samples_met: bool,
    sample_reasons: Vec<String>,
    projection: Option<&ProjectionResult>,
    projection_reasons: Vec<String>,
    value: Option<&ValueResult>,
) -> Signal {
    let lambda_threshold_met =
        projection.is_some_and(|p| p.lambda_hat >= thresholds.lambda_threshold);
    let ci_width_threshold_met =
        projection.is_some_and(|p| p.prob_ci_width <= thresholds.max_prob_ci_width);
    let edge_threshold_met = value.is_some_and(|v| v.value_signal);
    let valid_probability = projection.is_some_and(ProjectionResult::has_valid_probability);

    let mut reasons = sample_reasons;
    reasons.extend(projection_reasons);
    if let Some(value) = value {
        reasons.extend(value.reasons.iter().cloned());
    }

    Signal {
        lambda_threshold_met,
        min_samples_met,
        edge_threshold_met,
        ci_width_threshold_met,
        signal: lambda_threshold_met
            && min_samples_met
            && edge_threshold_met
            && ci_width_threshold_met
            && valid_probability,
        reasons,
    }
}
