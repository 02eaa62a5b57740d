//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! infrastructure (in-memory indexes, seeded randomness, file I/O).
//! Each sub-module groups adapters by concern.
//!
//! Adapter categories:
//! - `memory`: in-memory sample and fixture repositories
//! - `odds`: recorded, synthetic and recorded-first odds sources
//! - `metrics`: Prometheus registry rendered to a text file
//! - `persistence`: feed loading, JSONL records and summary snapshots

pub mod memory;
pub mod metrics;
pub mod odds;
pub mod persistence;
