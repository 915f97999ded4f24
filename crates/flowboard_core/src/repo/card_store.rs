//! Card collection store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Load and save the whole card list as one serialized document.
//! - Keep SQL and JSON details behind the `CardStore` boundary.
//!
//! # Invariants
//! - Saves replace the full collection; there are no partial writes.
//! - Unreadable persisted data is reported, never silently repaired here.

use crate::db::DbError;
use crate::model::card::Card;
use rusqlite::{params, Connection, OptionalExtension};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("invalid card payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence boundary for the card collection.
pub trait CardStore {
    /// Returns `Ok(None)` when nothing has been saved yet.
    fn load_cards(&self) -> StoreResult<Option<Vec<Card>>>;
    fn save_cards(&self, cards: &[Card]) -> StoreResult<()>;
}

/// SQLite-backed store keeping the card list as JSON under one key.
pub struct SqliteCardStore<'conn> {
    conn: &'conn Connection,
    storage_key: String,
}

impl<'conn> SqliteCardStore<'conn> {
    pub fn new(conn: &'conn Connection, storage_key: impl Into<String>) -> Self {
        Self {
            conn,
            storage_key: storage_key.into(),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }
}

impl CardStore for SqliteCardStore<'_> {
    fn load_cards(&self) -> StoreResult<Option<Vec<Card>>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM board_state WHERE storage_key = ?1;",
                [self.storage_key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save_cards(&self, cards: &[Card]) -> StoreResult<()> {
        let payload = serde_json::to_string(cards)?;
        self.conn.execute(
            "INSERT INTO board_state (storage_key, payload, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(storage_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![self.storage_key.as_str(), payload],
        )?;
        Ok(())
    }
}
