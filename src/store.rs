use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use thiserror::Error;

use crate::auth::Credential;
use crate::ranking::HistoricalResult;
use crate::session::{TrialResult, Verdict};

/// A judged trial as it is persisted
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub pair_id: String,
    pub elapsed_ms: u64,
    pub correct: bool,
    pub timestamp: DateTime<Local>,
}

impl ResultRecord {
    /// `None` for trials still waiting on a verdict
    pub fn from_trial(result: &TrialResult, timestamp: DateTime<Local>) -> Option<Self> {
        let correct = match result.verdict {
            Verdict::Correct => true,
            Verdict::Wrong => false,
            Verdict::Pending => return None,
        };
        Some(Self {
            pair_id: result.pair_id.clone(),
            elapsed_ms: result.elapsed_ms,
            correct,
            timestamp,
        })
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("cannot create database directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored timestamp {0:?} is not RFC 3339")]
    Timestamp(String),
}

/// Append-only history of results, keyed by pair
pub trait ResultStore {
    fn append(&mut self, record: &ResultRecord) -> Result<(), StoreError>;

    /// Results for one pair, oldest first
    fn history(&self, pair_id: &str) -> Result<Vec<ResultRecord>, StoreError>;

    /// Every pair's results, oldest first, in the shape the ranking consumes
    fn all_histories(&self) -> Result<HashMap<String, Vec<HistoricalResult>>, StoreError>;

    fn clear(&mut self) -> Result<(), StoreError>;
}

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS pair_results (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pair_id TEXT NOT NULL,
        elapsed_ms INTEGER NOT NULL,
        correct BOOLEAN NOT NULL,
        timestamp TEXT NOT NULL
    )
"#;

/// SQLite-backed result history
#[derive(Debug)]
pub struct SqliteResultStore {
    conn: Connection,
}

impl SqliteResultStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(CREATE_TABLE, [])?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_pair_results_pair ON pair_results(pair_id)",
            [],
        )?;
        Ok(Self { conn })
    }
}

fn parse_timestamp(raw: String) -> Result<DateTime<Local>, StoreError> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Local))
        .map_err(|_| StoreError::Timestamp(raw))
}

impl ResultStore for SqliteResultStore {
    fn append(&mut self, record: &ResultRecord) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO pair_results (pair_id, elapsed_ms, correct, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.pair_id,
                record.elapsed_ms,
                record.correct,
                record.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn history(&self, pair_id: &str) -> Result<Vec<ResultRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT pair_id, elapsed_ms, correct, timestamp
            FROM pair_results
            WHERE pair_id = ?1
            ORDER BY id ASC
            "#,
        )?;

        let rows = stmt.query_map([pair_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (pair_id, elapsed_ms, correct, timestamp) = row?;
            records.push(ResultRecord {
                pair_id,
                elapsed_ms,
                correct,
                timestamp: parse_timestamp(timestamp)?,
            });
        }
        Ok(records)
    }

    fn all_histories(&self) -> Result<HashMap<String, Vec<HistoricalResult>>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT pair_id, elapsed_ms, correct FROM pair_results ORDER BY id ASC")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                HistoricalResult {
                    elapsed_ms: row.get(1)?,
                    correct: row.get(2)?,
                },
            ))
        })?;

        let mut histories: HashMap<String, Vec<HistoricalResult>> = HashMap::new();
        for row in rows {
            let (pair_id, result) = row?;
            histories.entry(pair_id).or_default().push(result);
        }
        Ok(histories)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM pair_results", [])?;
        Ok(())
    }
}

/// Writes judged results when both a store and a credential are available.
/// Failures are logged and swallowed; a session never rolls back on them.
pub struct ResultLogger<S: ResultStore> {
    store: Option<S>,
    credential: Option<Credential>,
}

impl<S: ResultStore> ResultLogger<S> {
    pub fn new(store: Option<S>, credential: Option<Credential>) -> Self {
        Self { store, credential }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some() && self.credential.is_some()
    }

    /// Returns whether the result was written.
    pub fn log_result(&mut self, result: &TrialResult) -> bool {
        if self.credential.is_none() {
            return false;
        }
        let Some(store) = self.store.as_mut() else {
            return false;
        };
        let Some(record) = ResultRecord::from_trial(result, Local::now()) else {
            log::warn!("not logging unjudged trial for {}", result.pair_id);
            return false;
        };
        match store.append(&record) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("failed to log result for {}: {err}", record.pair_id);
                false
            }
        }
    }

    /// Wipe the stored history. Needs the same credential as logging; returns
    /// whether anything was cleared.
    pub fn clear_history(&mut self) -> Result<bool, StoreError> {
        if !self.is_enabled() {
            return Ok(false);
        }
        match self.store.as_mut() {
            Some(store) => {
                store.clear()?;
                log::info!("result history cleared");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn store(&self) -> Option<&S> {
        self.store.as_ref()
    }
}
