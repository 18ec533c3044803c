//! Message log.
//!
//! Durable, idempotent store of conversation messages. The transport delivers
//! at-least-once, so append must tolerate redelivery; retrieval is always
//! chronological and bounded.

mod schema;

#[cfg(test)]
mod proptests;

pub use schema::{StoredMessage, SCHEMA};

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe handle to the message log.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create the log at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory log (for testing).
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Append a message. Re-inserting an existing `id` is a silent no-op;
    /// the return value says whether a row was actually written.
    pub fn append_message(&self, message: &StoredMessage) -> DbResult<bool> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO messages
                 (id, conversation_id, sender, is_self, content, timestamp, kind)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                message.id,
                message.conversation_id,
                message.sender,
                message.is_self,
                message.content,
                message.timestamp,
                message.kind,
            ],
        )?;
        Ok(inserted > 0)
    }

    /// The `limit` most recent messages of a conversation, oldest first.
    /// Ties on `timestamp` keep insertion order (rowid).
    pub fn recent_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> DbResult<Vec<StoredMessage>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, conversation_id, sender, is_self, content, timestamp, kind
             FROM messages
             WHERE conversation_id = ?1
             ORDER BY timestamp DESC, rowid DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![conversation_id, limit as i64], |row| {
            Ok(StoredMessage {
                id: row.get(0)?,
                conversation_id: row.get(1)?,
                sender: row.get(2)?,
                is_self: row.get(3)?,
                content: row.get(4)?,
                timestamp: row.get(5)?,
                kind: row.get(6)?,
            })
        })?;

        let mut messages = rows.collect::<Result<Vec<_>, _>>()?;
        // Query returns newest-first; the transcript wants oldest-first.
        messages.reverse();
        Ok(messages)
    }

    /// Number of stored messages for a conversation.
    #[allow(dead_code)] // Used in tests
    pub fn message_count(&self, conversation_id: &str) -> DbResult<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
            params![conversation_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
