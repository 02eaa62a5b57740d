//! Recorded-first odds composition.

use std::sync::Arc;

use crate::domain::{Fixture, MarketQuote};
use crate::ports::odds_source::OddsSource;

/// Uses the primary source when it has a quote, otherwise the fallback.
pub struct PreferRecordedOddsSource<R: OddsSource, F: OddsSource> {
    recorded: Arc<R>,
    fallback: Arc<F>,
}

impl<R: OddsSource, F: OddsSource> PreferRecordedOddsSource<R, F> {
    pub fn new(recorded: Arc<R>, fallback: Arc<F>) -> Self {
        Self { recorded, fallback }
    }
}

impl<R: OddsSource, F: OddsSource> OddsSource for PreferRecordedOddsSource<R, F> {
    fn quote(&self, fixture: &Fixture, fair_odds: Option<f64>) -> Option<MarketQuote> {
        self.recorded
            .quote(fixture, fair_odds)
            .or_else(|| self.fallback.quote(fixture, fair_odds))
    }

    fn name(&self) -> &'static str {
        "recorded+fallback"
    }
}
