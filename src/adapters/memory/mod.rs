//! In-Memory Repositories
//!
//! Index the flat sample and fixture feeds once at startup and answer
//! repository queries from memory. Sample lookups cut strictly before
//! the requested timestamp.

pub mod fixtures;
pub mod samples;

pub use fixtures::InMemoryFixtureStore;
pub use samples::InMemorySampleStore;
