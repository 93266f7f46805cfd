//! Persistence layer
//!
//! SQLite-based storage for:
//! - Fitness plan versions, keyed by profile and day of week
//! - Latest-plan lookup with a local-weekday default

mod database;
mod plans;

pub use database::Database;
pub use plans::{PlanRecord, PlanStore};

/// Get the current day of the week as a full name, e.g. "Monday".
///
/// Uses the local system calendar, not UTC. Stored timestamps are UTC;
/// this asymmetry is intentional and matches how callers think about
/// "today's plan".
#[inline]
pub fn current_weekday() -> String {
    chrono::Local::now().format("%A").to_string()
}
