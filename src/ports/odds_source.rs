//! Odds Source Port - Market Price Lookup
//!
//! Recorded and synthesized prices sit behind one interface so the
//! evaluator never knows which it is using.

use crate::domain::{Fixture, MarketQuote};

/// Supplies an over-0.5 first-half quote for a fixture.
pub trait OddsSource: Send + Sync {
  /// Quote for `fixture`, or `None` when no price exists.
  ///
  /// `fair_odds` is the projection's break-even price, which synthetic
  /// sources perturb. Recorded sources ignore it.
  fn quote(&self, fixture: &Fixture, fair_odds: Option<f64>) -> Option<MarketQuote>;

  /// Short label for logs.
  fn name(&self) -> &'static str;
}
