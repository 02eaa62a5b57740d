//! Recorded odds: real quotes extracted ahead of time, keyed by fixture.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{Fixture, FixtureId, MarketQuote, best_quote};
use crate::ports::odds_source::OddsSource;

/// Quotes from one or more providers, best price wins.
#[derive(Debug, Default)]
pub struct RecordedOddsSource {
    quotes: HashMap<FixtureId, Vec<MarketQuote>>,
}

impl RecordedOddsSource {
    pub fn new(quotes: Vec<MarketQuote>) -> Self {
        let mut by_fixture: HashMap<FixtureId, Vec<MarketQuote>> = HashMap::new();
        for quote in quotes {
            by_fixture.entry(quote.fixture_id.clone()).or_default().push(quote);
        }
        debug!(fixtures = by_fixture.len(), "Indexed recorded odds");
        Self { quotes: by_fixture }
    }

    pub fn fixtures_covered(&self) -> usize {
        self.quotes.len()
    }
}

impl OddsSource for RecordedOddsSource {
    fn quote(&self, fixture: &Fixture, _fair_odds: Option<f64>) -> Option<MarketQuote> {
        self.quotes
            .get(&fixture.id)
            .and_then(|quotes| best_quote(quotes))
            .cloned()
    }

    fn name(&self) -> &'static str {
        "recorded"
    }
}
