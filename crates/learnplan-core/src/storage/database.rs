//! SQLite-backed planner store.
//!
//! Provides persistent storage for:
//! - Weekly schedules (slot statuses, readiness per period, creation time)
//! - Author activity configuration per activity instance
//! - Cached proposals per user-day

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, CacheKey, PlannerStore};
use crate::activity::ActivityConfig;
use crate::error::{DatabaseError, Result};
use crate::schedule::{Slot, WeeklySchedule};
use crate::timeline::ProposedObject;

/// SQLite database for schedules, activity configuration and the proposal cache.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/learnplan/learnplan.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("learnplan.db"))
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schedule_status (
                user_id     INTEGER NOT NULL,
                instance_id INTEGER NOT NULL,
                day         INTEGER NOT NULL,
                period      INTEGER NOT NULL,
                status      INTEGER NOT NULL,
                PRIMARY KEY (user_id, instance_id, day, period)
            );

            CREATE TABLE IF NOT EXISTS schedule_readiness (
                user_id     INTEGER NOT NULL,
                instance_id INTEGER NOT NULL,
                period      INTEGER NOT NULL,
                value       REAL NOT NULL,
                PRIMARY KEY (user_id, instance_id, period)
            );

            CREATE TABLE IF NOT EXISTS schedule_meta (
                user_id     INTEGER NOT NULL,
                instance_id INTEGER NOT NULL,
                created_at  TEXT NOT NULL,
                PRIMARY KEY (user_id, instance_id)
            );

            CREATE TABLE IF NOT EXISTS activity_config (
                instance_id  INTEGER NOT NULL,
                activity_id  INTEGER NOT NULL,
                duration_sec INTEGER NOT NULL,
                category     TEXT NOT NULL,
                weight       INTEGER NOT NULL DEFAULT 0,
                is_ignored   INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (instance_id, activity_id)
            );

            -- No uniqueness on the lookup key: racing misses both insert.
            CREATE TABLE IF NOT EXISTS proposal_cache (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id          INTEGER NOT NULL,
                instance_id      INTEGER NOT NULL,
                day_begin_day    INTEGER NOT NULL,
                day_begin_period INTEGER NOT NULL,
                week             INTEGER NOT NULL,
                position         INTEGER NOT NULL,
                item_key         INTEGER NOT NULL,
                payload          TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_proposal_cache_lookup
                ON proposal_cache(user_id, instance_id, day_begin_day, day_begin_period, week);",
        )?;
        Ok(())
    }

    /// Remove every schedule and cache row of a learner.
    pub fn delete_user(&self, user_id: i64) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for table in ["schedule_status", "schedule_readiness", "schedule_meta", "proposal_cache"] {
            tx.execute(&format!("DELETE FROM {table} WHERE user_id = ?1"), params![user_id])?;
        }
        tx.commit()?;
        tracing::info!(user_id, "learner data deleted");
        Ok(())
    }

    /// Remove every schedule, configuration and cache row of an activity instance.
    pub fn delete_instance(&self, instance_id: i64) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for table in [
            "schedule_status",
            "schedule_readiness",
            "schedule_meta",
            "activity_config",
            "proposal_cache",
        ] {
            tx.execute(
                &format!("DELETE FROM {table} WHERE instance_id = ?1"),
                params![instance_id],
            )?;
        }
        tx.commit()?;
        tracing::info!(instance_id, "instance data deleted");
        Ok(())
    }

    fn created_at(&self, user_id: i64, instance_id: i64) -> Result<Option<DateTime<Utc>>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT created_at FROM schedule_meta WHERE user_id = ?1 AND instance_id = ?2",
                params![user_id, instance_id],
                |row| row.get(0),
            )
            .optional()?;

        let created_at = raw
            .map(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| corrupt("schedule_meta", e))
            })
            .transpose()?;
        Ok(created_at)
    }
}

fn corrupt(table: &str, err: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::CorruptRecord {
        table: table.to_string(),
        message: err.to_string(),
    }
}

impl PlannerStore for Database {
    fn load_schedule(&self, user_id: i64, instance_id: i64) -> Result<Option<WeeklySchedule>> {
        let Some(created_at) = self.created_at(user_id, instance_id)? else {
            return Ok(None);
        };
        let mut schedule = WeeklySchedule::with_created_at(created_at);

        let mut stmt = self.conn.prepare(
            "SELECT day, period, status FROM schedule_status
             WHERE user_id = ?1 AND instance_id = ?2",
        )?;
        let rows = stmt.query_map(params![user_id, instance_id], |row| {
            Ok((
                row.get::<_, u8>(0)?,
                row.get::<_, u8>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;
        for row in rows {
            let (day, period, code) = row?;
            let slot = Slot::new(day, period).map_err(|e| corrupt("schedule_status", e))?;
            schedule
                .set_status(slot, code)
                .map_err(|e| corrupt("schedule_status", e))?;
        }

        let mut stmt = self.conn.prepare(
            "SELECT period, value FROM schedule_readiness
             WHERE user_id = ?1 AND instance_id = ?2",
        )?;
        let rows = stmt.query_map(params![user_id, instance_id], |row| {
            Ok((row.get::<_, u8>(0)?, row.get::<_, f64>(1)?))
        })?;
        for row in rows {
            let (period, value) = row?;
            schedule
                .set_readiness(period, value)
                .map_err(|e| corrupt("schedule_readiness", e))?;
        }

        Ok(Some(schedule))
    }

    fn save_schedule(
        &self,
        user_id: i64,
        instance_id: i64,
        schedule: &WeeklySchedule,
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for table in ["schedule_status", "schedule_readiness", "schedule_meta"] {
            tx.execute(
                &format!("DELETE FROM {table} WHERE user_id = ?1 AND instance_id = ?2"),
                params![user_id, instance_id],
            )?;
        }

        tx.execute(
            "INSERT INTO schedule_meta (user_id, instance_id, created_at) VALUES (?1, ?2, ?3)",
            params![user_id, instance_id, schedule.created_at().to_rfc3339()],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO schedule_status (user_id, instance_id, day, period, status)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (slot, status) in schedule.explicit_statuses() {
                stmt.execute(params![user_id, instance_id, slot.day, slot.period, status.code()])?;
            }
            let mut stmt = tx.prepare(
                "INSERT INTO schedule_readiness (user_id, instance_id, period, value)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (period, value) in schedule.explicit_readiness() {
                stmt.execute(params![user_id, instance_id, period, value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn activity_config(&self, instance_id: i64) -> Result<HashMap<i64, ActivityConfig>> {
        let mut stmt = self.conn.prepare(
            "SELECT activity_id, duration_sec, category, weight, is_ignored
             FROM activity_config WHERE instance_id = ?1",
        )?;
        let rows = stmt.query_map(params![instance_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                ActivityConfig {
                    duration_sec: row.get(1)?,
                    category: row.get(2)?,
                    weight: row.get(3)?,
                    is_ignored: row.get(4)?,
                },
            ))
        })?;

        let mut configs = HashMap::new();
        for row in rows {
            let (id, config) = row?;
            configs.insert(id, config);
        }
        Ok(configs)
    }

    fn save_activity_config(
        &self,
        instance_id: i64,
        config: &HashMap<i64, ActivityConfig>,
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM activity_config WHERE instance_id = ?1",
            params![instance_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO activity_config
                 (instance_id, activity_id, duration_sec, category, weight, is_ignored)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (activity_id, c) in config {
                stmt.execute(params![
                    instance_id,
                    activity_id,
                    c.duration_sec,
                    c.category,
                    c.weight,
                    c.is_ignored,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn cache_entries(&self, key: &CacheKey) -> Result<Vec<ProposedObject>> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM proposal_cache
             WHERE user_id = ?1 AND instance_id = ?2
               AND day_begin_day = ?3 AND day_begin_period = ?4 AND week = ?5
             ORDER BY position, id",
        )?;
        let rows = stmt.query_map(
            params![
                key.user_id,
                key.instance_id,
                key.day_begin_day,
                key.day_begin_period,
                key.week
            ],
            |row| row.get::<_, String>(0),
        )?;

        let mut entries = Vec::new();
        for row in rows {
            let payload = row?;
            let object: ProposedObject =
                serde_json::from_str(&payload).map_err(|e| corrupt("proposal_cache", e))?;
            entries.push(object);
        }
        Ok(entries)
    }

    fn save_cache_entries(&self, key: &CacheKey, entries: &[ProposedObject]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM proposal_cache
             WHERE user_id = ?1 AND instance_id = ?2
               AND day_begin_day = ?3 AND day_begin_period = ?4 AND week = ?5",
            params![
                key.user_id,
                key.instance_id,
                key.day_begin_day,
                key.day_begin_period,
                key.week
            ],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO proposal_cache
                 (user_id, instance_id, day_begin_day, day_begin_period, week,
                  position, item_key, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for (position, object) in entries.iter().enumerate() {
                stmt.execute(params![
                    key.user_id,
                    key.instance_id,
                    key.day_begin_day,
                    key.day_begin_period,
                    key.week,
                    position as i64,
                    object.key,
                    serde_json::to_string(object)?,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
