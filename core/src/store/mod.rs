//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The coordinator and engine see records through RecordFetcher and never
//! execute SQL directly.

use crate::{
    error::{DuesError, DuesResult, FetchError},
    fetcher::{CollectorRecords, RecordFetcher},
    member::RawAmount,
};
use rusqlite::{params, types::Value, Connection, OptionalExtension};

mod member;
mod payment_request;

pub use member::NewMember;
pub use payment_request::NewPaymentRequest;

pub struct DuesStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl DuesStore {
    pub fn open(path: &str) -> DuesResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DuesResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Apply all schema migrations in order. Safe to run more than once.
    pub fn migrate(&self) -> DuesResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_collectors_members.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_payment_requests.sql"))?;
        Ok(())
    }

    // ── Collector ────────────────────────────────────────────────

    pub fn insert_collector(&self, id: &str, name: &str, created_at: &str) -> DuesResult<()> {
        self.conn.execute(
            "INSERT INTO members_collectors (id, name, active, created_at) VALUES (?1, ?2, 1, ?3)",
            params![id, name, created_at],
        )?;
        Ok(())
    }

    pub fn collector_names(&self) -> DuesResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM members_collectors ORDER BY name ASC")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    pub fn collector_id(&self, name: &str) -> DuesResult<Option<String>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM members_collectors WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }
}

impl RecordFetcher for DuesStore {
    fn fetch(&self, collector: &str) -> Result<CollectorRecords, FetchError> {
        let members = self.members_for_collector(collector).map_err(|e| match e {
            DuesError::InputShape(source) => FetchError::Rejected {
                collector: collector.to_string(),
                source,
            },
            other => FetchError::Members {
                collector: collector.to_string(),
                cause: other.to_string(),
            },
        })?;
        let pending_requests = self
            .pending_requests_for_collector(collector)
            .map_err(|e| match e {
                DuesError::InputShape(source) => FetchError::Rejected {
                    collector: collector.to_string(),
                    source,
                },
                other => FetchError::PendingRequests {
                    collector: collector.to_string(),
                    cause: other.to_string(),
                },
            })?;

        log::debug!(
            "Fetched {} members and {} pending requests for collector '{collector}'",
            members.len(),
            pending_requests.len()
        );
        Ok(CollectorRecords {
            members,
            pending_requests,
        })
    }
}

/// Read an untyped amount column as the data source stored it.
pub(crate) fn raw_amount(value: Value) -> Option<RawAmount> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(RawAmount::Number(i as f64)),
        Value::Real(f) => Some(RawAmount::Number(f)),
        Value::Text(s) => Some(RawAmount::Text(s)),
        Value::Blob(b) => Some(RawAmount::Text(String::from_utf8_lossy(&b).into_owned())),
    }
}

/// Inverse of `raw_amount`, for writing.
pub(crate) fn amount_value(amount: Option<&RawAmount>) -> Value {
    match amount {
        None => Value::Null,
        Some(RawAmount::Number(n)) => Value::Real(*n),
        Some(RawAmount::Text(s)) => Value::Text(s.clone()),
    }
}
