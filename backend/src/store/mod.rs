//! # Record Store
//!
//! A thin document repository over a single SQLite database. Each application
//! variant writes into its own logical collection; a document is a JSON body
//! with the query-relevant fields (normalized email, subject id, status, date
//! range, submission time) lifted into indexed columns.
//!
//! The store is constructed once in `main.rs` and injected into handlers as
//! `web::Data<RecordStore>`; there is no module-level connection state. All
//! access goes through a mutex-guarded connection with a bounded busy
//! timeout, so no call can hang indefinitely.
//!
//! Duplicate prevention for job applications is two-layered: handlers run a
//! friendly pre-check via [`RecordStore::find_id_by_email`], and a partial
//! unique index on the email column is the authoritative backstop. A unique
//! constraint violation during insert surfaces as [`StoreError::Duplicate`],
//! which handlers report as a concurrent-duplicate conflict.

use chrono::NaiveDate;
use common::model::record::RecordStatus;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Logical collection names, one per application variant.
pub mod collections {
    pub const ONBOARDING: &str = "onboarding_forms";
    pub const JOB_APPLICATIONS: &str = "job_applications";
    pub const LEAVES: &str = "leave_applications";
    pub const PAYSLIPS: &str = "payslip_requests";
}

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum StoreError {
    /// The unique-index backstop rejected the insert.
    #[error("a record with the same unique key already exists")]
    Duplicate,
    /// The store cannot be reached at all (poisoned lock, failed open).
    #[error("database unavailable: {0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored document is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Outcome of a status update, distinguishing a missing record from a
/// matched record whose status already had the requested value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Missing,
    Unchanged,
    Updated,
}

/// Query-relevant fields lifted out of a document body into columns.
#[derive(Debug, Default)]
pub struct DocumentKeys {
    /// Normalized (trimmed, lowercased) email, set when the collection
    /// enforces one record per address.
    pub email: Option<String>,
    /// Subject identifier used by the overlap check, e.g. the employee id.
    pub subject_id: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct RecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl RecordStore {
    /// Opens (creating if necessary) the backing database and ensures the
    /// schema and indexes exist. `path` may be `:memory:` in tests.
    pub fn open(path: &str) -> Result<RecordStore, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS records (
                 id           TEXT PRIMARY KEY,
                 collection   TEXT NOT NULL,
                 email        TEXT,
                 subject_id   TEXT,
                 status       TEXT NOT NULL,
                 from_date    TEXT,
                 to_date      TEXT,
                 submitted_at TEXT NOT NULL,
                 body         TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_records_listing
                 ON records(collection, submitted_at);
             CREATE INDEX IF NOT EXISTS idx_records_subject
                 ON records(collection, subject_id, status);
             CREATE UNIQUE INDEX IF NOT EXISTS ux_applications_email
                 ON records(email)
                 WHERE collection = '{}' AND email IS NOT NULL;",
            collections::JOB_APPLICATIONS
        ))?;
        info!("Record store ready at '{}'", path);
        Ok(RecordStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }

    /// Cheap liveness check, run by handlers before attempting any write.
    pub fn ping(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    /// Inserts one document and returns its generated identifier.
    pub fn insert(
        &self,
        collection: &str,
        status: RecordStatus,
        submitted_at: &str,
        keys: &DocumentKeys,
        body: &Value,
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let conn = self.lock()?;
        let result = conn.execute(
            "INSERT INTO records
                 (id, collection, email, subject_id, status, from_date, to_date, submitted_at, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                collection,
                keys.email,
                keys.subject_id,
                status.as_str(),
                keys.from_date.map(|d| d.to_string()),
                keys.to_date.map(|d| d.to_string()),
                submitted_at,
                body.to_string(),
            ],
        );
        match result {
            Ok(_) => Ok(id),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetches one document by identifier, with the identifier injected into
    /// the returned body under `id`.
    pub fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let conn = self.lock()?;
        let row: Option<String> = conn
            .query_row(
                "SELECT body FROM records WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;
        match row {
            Some(raw) => Ok(Some(with_id(serde_json::from_str(&raw)?, id))),
            None => Ok(None),
        }
    }

    /// Returns all documents of a collection, newest submission first.
    pub fn find_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, body FROM records WHERE collection = ?1 ORDER BY submitted_at DESC",
        )?;
        let rows = stmt.query_map(params![collection], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut documents = Vec::new();
        for row in rows {
            let (id, raw) = row?;
            documents.push(with_id(serde_json::from_str(&raw)?, &id));
        }
        Ok(documents)
    }

    /// Updates the status of one record. A missing record is reported
    /// distinctly from a record that already carried the requested status.
    pub fn update_status(
        &self,
        collection: &str,
        id: &str,
        status: RecordStatus,
    ) -> Result<UpdateOutcome, StoreError> {
        let conn = self.lock()?;
        let current: Option<String> = conn
            .query_row(
                "SELECT status FROM records WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current) = current else {
            return Ok(UpdateOutcome::Missing);
        };
        if RecordStatus::from_str(&current) == Ok(status) {
            return Ok(UpdateOutcome::Unchanged);
        }
        conn.execute(
            "UPDATE records SET status = ?1,
                 body = json_set(body, '$.status', ?1)
             WHERE collection = ?2 AND id = ?3",
            params![status.as_str(), collection, id],
        )?;
        Ok(UpdateOutcome::Updated)
    }

    /// Application-level duplicate pre-check by normalized email.
    pub fn find_id_by_email(
        &self,
        collection: &str,
        email: &str,
    ) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;
        let id = conn
            .query_row(
                "SELECT id FROM records WHERE collection = ?1 AND email = ?2",
                params![collection, email],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Whether an Approved record of the same subject has a date range that
    /// intersects `[from, to]` with inclusive bounds. ISO dates in text
    /// columns compare correctly lexicographically.
    pub fn has_approved_overlap(
        &self,
        collection: &str,
        subject_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let found: i64 = conn.query_row(
            "SELECT EXISTS(
                 SELECT 1 FROM records
                 WHERE collection = ?1 AND subject_id = ?2 AND status = 'Approved'
                   AND from_date <= ?3 AND to_date >= ?4
             )",
            params![collection, subject_id, to.to_string(), from.to_string()],
            |row| row.get(0),
        )?;
        Ok(found != 0)
    }
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn with_id(mut body: Value, id: &str) -> Value {
    if let Value::Object(ref mut map) = body {
        map.insert("id".to_string(), Value::String(id.to_string()));
    }
    body
}
