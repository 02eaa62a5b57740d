//! Synthetic odds for historical fixtures without a recorded price.
//!
//! `market_odds = fair_odds * factor` with `factor` uniform in
//! `[1 - noise, 1 + noise]`, drawn from a ChaCha stream seeded by the
//! run seed and the fixture id. The same fixture always gets the same
//! price regardless of evaluation order.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::domain::seed::{ODDS_SALT, fixture_seed};
use crate::domain::{Fixture, MarketQuote};
use crate::ports::odds_source::OddsSource;

/// Provider label attached to synthesized quotes.
pub const SYNTHETIC_PROVIDER: &str = "synthetic";

/// Fair odds with deterministic multiplicative noise.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticOddsSource {
    base_seed: u64,
    noise_pct: f64,
}

impl SyntheticOddsSource {
    /// `noise_pct` is clamped into `[0, 1)`.
    pub fn new(base_seed: u64, noise_pct: f64) -> Self {
        Self {
            base_seed,
            noise_pct: noise_pct.clamp(0.0, 0.99),
        }
    }

    /// Noise factor for a fixture id.
    pub fn noise_factor(&self, fixture_id: &str) -> f64 {
        if self.noise_pct <= 0.0 {
            return 1.0;
        }
        let mut rng =
            ChaCha8Rng::seed_from_u64(fixture_seed(self.base_seed, fixture_id, ODDS_SALT));
        1.0 + rng.gen_range(-self.noise_pct..=self.noise_pct)
    }
}

impl OddsSource for SyntheticOddsSource {
    fn quote(&self, fixture: &Fixture, fair_odds: Option<f64>) -> Option<MarketQuote> {
        let fair = fair_odds.filter(|o| o.is_finite() && *o > 0.0)?;
        Some(MarketQuote {
            fixture_id: fixture.id.clone(),
            over_odds: fair * self.noise_factor(&fixture.id),
            under_odds: None,
            provider: SYNTHETIC_PROVIDER.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        SYNTHETIC_PROVIDER
    }
}
