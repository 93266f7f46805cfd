//! Fitness plan persistence
//!
//! Append-only plan storage. "Updating" a plan means inserting a new row
//! for the same profile/day; retrieval always picks the newest version.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::storage::DEFAULT_SOURCE;

use super::{current_weekday, database::Database};

/// One stored plan version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRecord {
    pub id: i64,
    /// Free-form profile identifier, e.g. "60yo_woman" or a user id
    pub profile: String,
    /// Full plan content (markdown or plain text)
    pub plan_text: String,
    pub created_at: DateTime<Utc>,
    /// Origin label, e.g. "agent", "chat", "batch"
    pub source: String,
    /// Full day name, e.g. "Monday"; may be empty if the writer gave none
    pub day_of_the_week: String,
}

/// Plan persistence store
pub struct PlanStore<'a> {
    db: &'a Database,
}

impl<'a> PlanStore<'a> {
    /// Create a new plan store with database reference
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Store a plan version and return its id.
    ///
    /// `day` is stored literally, empty string included; the weekday default
    /// applies only on reads. `source` of `None` records "agent".
    pub fn save(
        &self,
        profile: &str,
        plan_text: &str,
        day: &str,
        source: Option<&str>,
    ) -> Result<i64> {
        let conn = self.db.connect()?;
        Database::ensure_schema_on(&conn)?;

        let created_at = Utc::now().to_rfc3339();
        let source = source.unwrap_or(DEFAULT_SOURCE);

        conn.execute(
            "INSERT INTO fitness_plan (profile, plan_text, created_at, source, day_of_the_week)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![profile, plan_text, created_at, source, day],
        )?;

        let id = conn.last_insert_rowid();
        debug!(profile = %profile, day = %day, id, "Saved plan");
        Ok(id)
    }

    /// Fetch the newest plan text for the given profile.
    ///
    /// `day` of `None` defaults to the current local weekday. Returns an
    /// empty string when no plan matches; callers cannot distinguish
    /// "no plan" from "empty plan" through this method (use
    /// [`get_latest_record`](Self::get_latest_record) for that).
    pub fn get_latest(&self, profile: &str, day: Option<&str>) -> Result<String> {
        Ok(self
            .get_latest_record(profile, day)?
            .map(|record| record.plan_text)
            .unwrap_or_default())
    }

    /// Fetch the newest plan row for the given profile, or `None`.
    ///
    /// Ties on `created_at` (same instant to timestamp resolution) are
    /// broken by highest id, i.e. the later insert wins.
    pub fn get_latest_record(&self, profile: &str, day: Option<&str>) -> Result<Option<PlanRecord>> {
        let conn = self.db.connect()?;
        Database::ensure_schema_on(&conn)?;

        let day = match day {
            Some(day) => day.to_string(),
            None => current_weekday(),
        };

        let record = conn.query_row(
            "SELECT id, profile, plan_text, created_at, source, day_of_the_week
             FROM fitness_plan
             WHERE profile = ?1 AND day_of_the_week = ?2
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
            params![profile, day],
            Self::map_plan_row,
        );

        match record {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Helper to map a row to PlanRecord
    fn map_plan_row(row: &rusqlite::Row) -> rusqlite::Result<PlanRecord> {
        let created_at: String = row.get(3)?;
        let source: Option<String> = row.get(4)?;

        Ok(PlanRecord {
            id: row.get(0)?,
            profile: row.get(1)?,
            plan_text: row.get(2)?,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            source: source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            day_of_the_week: row.get(5)?,
        })
    }
}
