//! Odds Source Adapters
//!
//! - `RecordedOddsSource`: best quote across providers from a recorded feed
//! - `SyntheticOddsSource`: fair odds perturbed by seeded, bounded noise
//! - `PreferRecordedOddsSource`: recorded quote when present, else fallback

pub mod prefer;
pub mod recorded;
pub mod synthetic;

pub use prefer::PreferRecordedOddsSource;
pub use recorded::RecordedOddsSource;
pub use synthetic::SyntheticOddsSource;
