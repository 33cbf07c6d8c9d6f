//! SQLite-based check-in and punishment storage.
//!
//! Provides persistent storage for:
//! - Submitted check-in records (one per user per date, immutable)
//! - Server-created missed-day records
//! - Punishments and their proof lifecycle
//!
//! Double submission is impossible at this layer: a UNIQUE(user, date)
//! constraint backs the client-side has-checked-in guard, so even two
//! racing writers cannot both land.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::data_dir;
use crate::error::DatabaseError;
use crate::punishment::{Commitment, Punishment, Stage};
use crate::rules::{Pillar, RuleSet};
use crate::scoring::CheckInResult;

/// A persisted check-in. Once written it is read-only for all clients;
/// there is no update path by design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInRecord {
    pub id: Uuid,
    pub user_id: String,
    pub date_key: String,
    pub day_number: u32,
    pub pillars: BTreeSet<Pillar>,
    pub result: CheckInResult,
    /// True only for server-created zero-score records.
    pub is_missed: bool,
    pub submitted_at: DateTime<Utc>,
}

/// SQLite database for check-in and punishment records.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/forge/forge.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("forge.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS check_ins (
                    id                TEXT PRIMARY KEY,
                    user_id           TEXT NOT NULL,
                    date_key          TEXT NOT NULL,
                    day_number        INTEGER NOT NULL,
                    pillars           TEXT NOT NULL,
                    total_score       INTEGER NOT NULL,
                    max_score         INTEGER NOT NULL,
                    percentage        INTEGER NOT NULL,
                    discipline_breach INTEGER NOT NULL,
                    is_missed         INTEGER NOT NULL DEFAULT 0,
                    failed_items      TEXT NOT NULL,
                    sections          TEXT NOT NULL,
                    rule_version      INTEGER NOT NULL,
                    submitted_at      TEXT NOT NULL,
                    UNIQUE(user_id, date_key)
                );

                CREATE TABLE IF NOT EXISTS punishments (
                    id                 TEXT PRIMARY KEY,
                    check_in_id        TEXT NOT NULL REFERENCES check_ins(id),
                    catalog_index      INTEGER NOT NULL,
                    text               TEXT NOT NULL,
                    percentage         INTEGER NOT NULL,
                    date_key           TEXT NOT NULL,
                    stage              TEXT NOT NULL,
                    feeling            TEXT,
                    commitment         TEXT,
                    proof_submitted_at TEXT
                );

                CREATE INDEX IF NOT EXISTS idx_check_ins_user_date ON check_ins(user_id, date_key);
                CREATE INDEX IF NOT EXISTS idx_punishments_check_in ON punishments(check_in_id);
                CREATE INDEX IF NOT EXISTS idx_punishments_stage ON punishments(stage);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    // ── Check-ins ────────────────────────────────────────────────────

    /// Client-side idempotency check backing the submission flow.
    pub fn has_checked_in(&self, user_id: &str, date_key: &str) -> Result<bool, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM check_ins WHERE user_id = ?1 AND date_key = ?2",
                params![user_id, date_key],
                |row| row.get(0),
            )
            .map_err(DatabaseError::from)?;
        Ok(count > 0)
    }

    /// Persist a scored check-in.
    ///
    /// Fails with [`DatabaseError::AlreadySubmitted`] if a record for
    /// (user, date) exists; the stored record is never overwritten.
    pub fn submit_check_in(
        &self,
        user_id: &str,
        date_key: &str,
        day_number: u32,
        pillars: &BTreeSet<Pillar>,
        result: &CheckInResult,
        submitted_at: DateTime<Utc>,
    ) -> Result<CheckInRecord, DatabaseError> {
        let record = CheckInRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            date_key: date_key.to_string(),
            day_number,
            pillars: pillars.clone(),
            result: result.clone(),
            is_missed: false,
            submitted_at,
        };
        DatabaseView { conn: &self.conn }.insert_record_on(&record)?;
        Ok(record)
    }

    pub fn get_check_in(
        &self,
        user_id: &str,
        date_key: &str,
    ) -> Result<Option<CheckInRecord>, DatabaseError> {
        self.conn
            .query_row(
                &format!("{SELECT_CHECK_IN} WHERE user_id = ?1 AND date_key = ?2"),
                params![user_id, date_key],
                row_to_record,
            )
            .optional()
            .map_err(DatabaseError::from)
    }

    /// Full history, oldest first. Missed-day records surface unchanged.
    pub fn list_check_ins(&self, user_id: &str) -> Result<Vec<CheckInRecord>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{SELECT_CHECK_IN} WHERE user_id = ?1 ORDER BY date_key ASC"
            ))
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params![user_id], row_to_record)
            .map_err(DatabaseError::from)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(DatabaseError::from)?);
        }
        Ok(records)
    }

    /// Server-side missed-day enforcement: create a zero-score record plus
    /// an auto-drawn punishment for an elapsed, unanswered day.
    ///
    /// Idempotent: returns `Ok(None)` without writing when any record
    /// already exists for (user, date). The write is transactional so the
    /// record and its punishment land together exactly once.
    pub fn record_missed_day<R: Rng + ?Sized>(
        &mut self,
        user_id: &str,
        date_key: &str,
        day_number: u32,
        rng: &mut R,
    ) -> Result<Option<(CheckInRecord, Punishment)>, DatabaseError> {
        if self.has_checked_in(user_id, date_key)? {
            return Ok(None);
        }

        let rules = RuleSet::for_date(parse_date_key(date_key)?);
        let record = CheckInRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            date_key: date_key.to_string(),
            day_number,
            pillars: BTreeSet::new(),
            result: CheckInResult {
                total_score: 0,
                max_score: 0,
                percentage: 0,
                discipline_breach: true,
                failed_items: Vec::new(),
                sections: Vec::new(),
                rule_version: rules.version,
            },
            is_missed: true,
            submitted_at: Utc::now(),
        };
        let punishment = Punishment::draw(rng, record.id, 0, date_key);

        let tx = self
            .conn
            .transaction()
            .map_err(DatabaseError::from)?;
        {
            let view = DatabaseView { conn: &tx };
            view.insert_record_on(&record)?;
            view.insert_punishment_on(&punishment)?;
        }
        tx.commit().map_err(DatabaseError::from)?;
        Ok(Some((record, punishment)))
    }

    // ── Punishments ──────────────────────────────────────────────────

    pub fn insert_punishment(&self, punishment: &Punishment) -> Result<(), DatabaseError> {
        DatabaseView { conn: &self.conn }.insert_punishment_on(punishment)
    }

    pub fn get_punishment(&self, id: Uuid) -> Result<Option<Punishment>, DatabaseError> {
        self.conn
            .query_row(
                &format!("{SELECT_PUNISHMENT} WHERE id = ?1"),
                params![id.to_string()],
                row_to_punishment,
            )
            .optional()
            .map_err(DatabaseError::from)
    }

    pub fn punishment_for_check_in(
        &self,
        check_in_id: Uuid,
    ) -> Result<Option<Punishment>, DatabaseError> {
        self.conn
            .query_row(
                &format!("{SELECT_PUNISHMENT} WHERE check_in_id = ?1"),
                params![check_in_id.to_string()],
                row_to_punishment,
            )
            .optional()
            .map_err(DatabaseError::from)
    }

    /// Punishments still awaiting proof, oldest first. Re-presented on
    /// every visit until resolved; there is no timeout.
    pub fn unresolved_punishments(&self, user_id: &str) -> Result<Vec<Punishment>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT p.id, p.check_in_id, p.catalog_index, p.text, p.percentage,
                        p.date_key, p.stage, p.feeling, p.commitment, p.proof_submitted_at
                 FROM punishments p
                 JOIN check_ins c ON c.id = p.check_in_id
                 WHERE c.user_id = ?1 AND p.stage != 'resolved'
                 ORDER BY p.date_key ASC",
            )
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params![user_id], row_to_punishment)
            .map_err(DatabaseError::from)?;
        let mut punishments = Vec::new();
        for row in rows {
            punishments.push(row.map_err(DatabaseError::from)?);
        }
        Ok(punishments)
    }

    /// Persist the user's acknowledgment: `Revealed -> ProofPending`.
    ///
    /// The transition is validated in memory first, so the stored stage
    /// can only ever advance along the workflow.
    pub fn acknowledge_punishment(&self, id: Uuid) -> Result<Punishment, DatabaseError> {
        let mut punishment = self
            .get_punishment(id)?
            .ok_or_else(|| DatabaseError::NotFound(format!("punishment {id}")))?;
        if punishment.is_resolved() {
            return Err(DatabaseError::PunishmentResolved { id: id.to_string() });
        }
        punishment
            .acknowledge()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let changed = self
            .conn
            .execute(
                "UPDATE punishments SET stage = ?1 WHERE id = ?2 AND stage != 'resolved'",
                params![punishment.stage.as_str(), id.to_string()],
            )
            .map_err(DatabaseError::from)?;
        if changed == 0 {
            return Err(DatabaseError::PunishmentResolved { id: id.to_string() });
        }
        Ok(punishment)
    }

    /// Record proof and flip the punishment to resolved, irreversibly.
    ///
    /// The WHERE clause excludes already-resolved rows so a resolved
    /// record can never be edited, even by a racing second writer.
    pub fn resolve_punishment(
        &self,
        id: Uuid,
        feeling: &str,
        commitment: Commitment,
        at: DateTime<Utc>,
    ) -> Result<Punishment, DatabaseError> {
        let mut punishment = self
            .get_punishment(id)?
            .ok_or_else(|| DatabaseError::NotFound(format!("punishment {id}")))?;
        if punishment.is_resolved() {
            return Err(DatabaseError::PunishmentResolved { id: id.to_string() });
        }
        punishment
            .resolve(feeling, commitment, at)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let changed = self
            .conn
            .execute(
                "UPDATE punishments
                 SET stage = 'resolved', feeling = ?1, commitment = ?2, proof_submitted_at = ?3
                 WHERE id = ?4 AND stage != 'resolved'",
                params![
                    punishment.feeling,
                    punishment.commitment.map(|c| c.as_str()),
                    at.to_rfc3339(),
                    id.to_string(),
                ],
            )
            .map_err(DatabaseError::from)?;
        if changed == 0 {
            return Err(DatabaseError::PunishmentResolved { id: id.to_string() });
        }
        Ok(punishment)
    }
}

/// Borrowed connection view so record/punishment inserts run either on
/// the plain connection or inside a transaction.
struct DatabaseView<'a> {
    conn: &'a Connection,
}

impl DatabaseView<'_> {
    fn insert_record_on(&self, record: &CheckInRecord) -> Result<(), DatabaseError> {
        let pillars_json = to_json(&record.pillars)?;
        let failed_json = to_json(&record.result.failed_items)?;
        let sections_json = to_json(&record.result.sections)?;
        self.conn
            .execute(
                "INSERT INTO check_ins (
                    id, user_id, date_key, day_number, pillars,
                    total_score, max_score, percentage, discipline_breach,
                    is_missed, failed_items, sections, rule_version, submitted_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    record.id.to_string(),
                    record.user_id,
                    record.date_key,
                    record.day_number,
                    pillars_json,
                    record.result.total_score,
                    record.result.max_score,
                    record.result.percentage,
                    record.result.discipline_breach,
                    record.is_missed,
                    failed_json,
                    sections_json,
                    record.result.rule_version,
                    record.submitted_at.to_rfc3339(),
                ],
            )
            .map_err(|err| match &err {
                rusqlite::Error::SqliteFailure(e, _)
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    DatabaseError::AlreadySubmitted {
                        date_key: record.date_key.clone(),
                    }
                }
                _ => DatabaseError::from(err),
            })?;
        Ok(())
    }

    fn insert_punishment_on(&self, punishment: &Punishment) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO punishments (
                    id, check_in_id, catalog_index, text, percentage,
                    date_key, stage, feeling, commitment, proof_submitted_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    punishment.id.to_string(),
                    punishment.check_in_id.to_string(),
                    punishment.catalog_index,
                    punishment.text,
                    punishment.percentage,
                    punishment.date_key,
                    punishment.stage.as_str(),
                    punishment.feeling,
                    punishment.commitment.map(|c| c.as_str()),
                    punishment.proof_submitted_at.map(|t| t.to_rfc3339()),
                ],
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }
}

const SELECT_CHECK_IN: &str = "SELECT id, user_id, date_key, day_number, pillars,
        total_score, max_score, percentage, discipline_breach,
        is_missed, failed_items, sections, rule_version, submitted_at
 FROM check_ins";

const SELECT_PUNISHMENT: &str = "SELECT id, check_in_id, catalog_index, text, percentage,
        date_key, stage, feeling, commitment, proof_submitted_at
 FROM punishments";

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<CheckInRecord> {
    let id: String = row.get(0)?;
    let pillars: String = row.get(4)?;
    let failed_items: String = row.get(10)?;
    let sections: String = row.get(11)?;
    let submitted_at: String = row.get(13)?;

    Ok(CheckInRecord {
        id: parse_uuid(&id, 0)?,
        user_id: row.get(1)?,
        date_key: row.get(2)?,
        day_number: row.get(3)?,
        pillars: from_json(&pillars, 4)?,
        result: CheckInResult {
            total_score: row.get(5)?,
            max_score: row.get(6)?,
            percentage: row.get(7)?,
            discipline_breach: row.get(8)?,
            failed_items: from_json(&failed_items, 10)?,
            sections: from_json(&sections, 11)?,
            rule_version: row.get(12)?,
        },
        is_missed: row.get(9)?,
        submitted_at: parse_rfc3339(&submitted_at, 13)?,
    })
}

fn row_to_punishment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Punishment> {
    let id: String = row.get(0)?;
    let check_in_id: String = row.get(1)?;
    let stage: String = row.get(6)?;
    let commitment: Option<String> = row.get(8)?;
    let proof_at: Option<String> = row.get(9)?;

    Ok(Punishment {
        id: parse_uuid(&id, 0)?,
        check_in_id: parse_uuid(&check_in_id, 1)?,
        catalog_index: row.get(2)?,
        text: row.get(3)?,
        percentage: row.get(4)?,
        date_key: row.get(5)?,
        stage: Stage::parse(&stage)
            .map_err(|e| column_error(6, e.to_string()))?,
        feeling: row.get(7)?,
        commitment: commitment
            .map(|c| Commitment::parse(&c).map_err(|e| column_error(8, e.to_string())))
            .transpose()?,
        proof_submitted_at: proof_at.map(|t| parse_rfc3339(&t, 9)).transpose()?,
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::QueryFailed(e.to_string()))
}

fn from_json<T: for<'de> Deserialize<'de>>(json: &str, column: usize) -> rusqlite::Result<T> {
    serde_json::from_str(json).map_err(|e| column_error(column, e.to_string()))
}

fn parse_uuid(s: &str, column: usize) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| column_error(column, e.to_string()))
}

fn parse_rfc3339(s: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| column_error(column, e.to_string()))
}

fn parse_date_key(date_key: &str) -> Result<chrono::NaiveDate, DatabaseError> {
    chrono::NaiveDate::parse_from_str(date_key, "%Y-%m-%d")
        .map_err(|e| DatabaseError::QueryFailed(format!("bad date key '{date_key}': {e}")))
}

fn column_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        message.into(),
    )
}
