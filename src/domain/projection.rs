//! Poisson projection of "first-half goals > 0" with bootstrap bounds.
//!
//! The point estimate is `lambda_hat = median(mean(home), mean(away))`
//! and `p_hat = 1 - exp(-lambda_hat)`. Confidence bounds come from a
//! percentile bootstrap over the pooled home and away samples.
//!
//! All randomness flows through a caller-supplied seed so a projection
//! is a pure function of its inputs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::samples::{TeamSamples, mean};

/// Default number of bootstrap replicates.
pub const DEFAULT_N_BOOTSTRAP: usize = 5000;

/// Default two-sided confidence level.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Point estimate and bootstrap interval for P(first-half goals > 0).
///
/// Invariant: `p_ci_low <= p_hat <= p_ci_high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub lambda_hat: f64,
    pub p_hat: f64,
    pub p_ci_low: f64,
    pub p_ci_high: f64,
    pub prob_ci_width: f64,
    pub n_bootstrap: usize,
}

impl ProjectionResult {
    /// Whether `p_hat` lies strictly inside `(0, 1)`.
    pub fn has_valid_probability(&self) -> bool {
        self.p_hat > 0.0 && self.p_hat < 1.0
    }
}

/// Median of the per-group sample means.
///
/// Empty groups contribute a mean of zero. With two groups this is their
/// average; more groups degrade to a true median.
pub fn median_of_means(groups: &[&TeamSamples]) -> f64 {
    let mut means: Vec<f64> = groups
        .iter()
        .map(|g| mean(&g.samples).unwrap_or(0.0))
        .collect();
    median(&mut means)
}

/// Expected first-half goals for a fixture.
pub fn calculate_lambda_hat(home: &TeamSamples, away: &TeamSamples) -> f64 {
    median_of_means(&[home, away])
}

/// Poisson P(X > 0) for expected count `lambda`: `1 - exp(-lambda)`.
///
/// Zero at `lambda = 0`, strictly increasing and below one for any
/// `lambda` small enough to be representable (roughly < 36). Negative
/// inputs are treated as zero.
pub fn poisson_probability_over_05(lambda: f64) -> f64 {
    if lambda <= 0.0 || lambda.is_nan() {
        return 0.0;
    }
    -(-lambda).exp_m1()
}

/// Bootstrap-based projection engine.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionEngine {
    n_bootstrap: usize,
    confidence_level: f64,
}

impl ProjectionEngine {
    /// Creates an engine; `confidence_level` is clamped into `(0, 1)`.
    pub fn new(n_bootstrap: usize, confidence_level: f64) -> Self {
        Self {
            n_bootstrap,
            confidence_level: confidence_level.clamp(f64::EPSILON, 1.0 - f64::EPSILON),
        }
    }

    pub fn n_bootstrap(&self) -> usize {
        self.n_bootstrap
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Project P(first-half goals > 0) for a fixture.
    ///
    /// Bounds are the `(alpha/2, 1 - alpha/2)` percentiles of the
    /// replicate probabilities. Because the replicates resample the
    /// pooled sample while `lambda_hat` averages group means, the bounds
    /// are widened to include `p_hat` when group sizes are unbalanced.
    pub fn project(&self, home: &TeamSamples, away: &TeamSamples, seed: u64) -> ProjectionResult {
        let lambda_hat = calculate_lambda_hat(home, away);
        let p_hat = poisson_probability_over_05(lambda_hat);

        let replicates = self.bootstrap_probabilities(home, away, seed);
        let (low, high) = if replicates.is_empty() {
            (p_hat, p_hat)
        } else {
            let alpha = 1.0 - self.confidence_level;
            (
                percentile(&replicates, alpha / 2.0),
                percentile(&replicates, 1.0 - alpha / 2.0),
            )
        };

        let p_ci_low = low.min(p_hat);
        let p_ci_high = high.max(p_hat);

        ProjectionResult {
            lambda_hat,
            p_hat,
            p_ci_low,
            p_ci_high,
            prob_ci_width: p_ci_high - p_ci_low,
            n_bootstrap: self.n_bootstrap,
        }
    }

    /// Sorted replicate probabilities from resampling the pooled samples.
    ///
    /// Each replicate draws `pool.len()` values with replacement. An empty
    /// pool yields all-zero replicates.
    pub fn bootstrap_probabilities(
        &self,
        home: &TeamSamples,
        away: &TeamSamples,
        seed: u64,
    ) -> Vec<f64> {
        let pool: Vec<f64> = home
            .samples
            .iter()
            .chain(away.samples.iter())
            .copied()
            .collect();

        if pool.is_empty() {
            return vec![0.0; self.n_bootstrap];
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n = pool.len();
        let mut probabilities: Vec<f64> = (0..self.n_bootstrap)
            .map(|_| {
                let total: f64 = (0..n).map(|_| pool[rng.gen_range(0..n)]).sum();
                poisson_probability_over_05(total / n as f64)
            })
            .collect();

        probabilities.sort_by(f64::total_cmp);
        probabilities
    }
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_N_BOOTSTRAP, DEFAULT_CONFIDENCE_LEVEL)
    }
}

/// Check a projection against the lambda and CI-width thresholds.
///
/// Each failing condition contributes its own reason.
pub fn validate_projection(
    projection: &ProjectionResult,
    lambda_threshold: f64,
    max_prob_ci_width: f64,
) -> (bool, Vec<String>) {
    let mut reasons = Vec::new();

    if projection.lambda_hat < lambda_threshold {
        reasons.push(format!(
            "Lambda too low: {:.3} < {}",
            projection.lambda_hat, lambda_threshold
        ));
    }

    if projection.prob_ci_width > max_prob_ci_width {
        reasons.push(format!(
            "CI width too wide: {:.3} > {}",
            projection.prob_ci_width, max_prob_ci_width
        ));
    }

    if !projection.has_valid_probability() {
        reasons.push(format!("Invalid probability: {:.3}", projection.p_hat));
    }

    (reasons.is_empty(), reasons)
}

/// Linear-interpolated percentile of an ascending slice, `q` in `[0, 1]`.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let last = sorted.len() - 1;
    let rank = q.clamp(0.0, 1.0) * last as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}
