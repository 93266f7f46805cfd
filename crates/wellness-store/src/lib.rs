//! Wellness Store - Embedded persistence for fitness plans
//!
//! This crate provides the storage layer used by plan-generation agents and
//! chat interfaces:
//! - Append-only fitness plan storage keyed by profile and day of week
//! - Latest-plan retrieval with a local-weekday default
//! - Single local SQLite file, no server required

pub mod constants;
pub mod storage;

// Re-exports for convenience
pub use storage::{current_weekday, Database, PlanRecord, PlanStore};
