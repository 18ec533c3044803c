//! Trait seams for dispatcher I/O.
//!
//! The pipeline runs against these instead of concrete storage so tests can
//! swap in mocks. Production adapters live next to the traits.

use crate::db::{Database, StoredMessage};
use async_trait::async_trait;

/// Message persistence as the pipeline sees it: appends that never fail the
/// caller, reads that degrade to empty.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append. Persistence faults are absorbed and logged; the pipeline
    /// continues without memory of this message.
    async fn append(&self, message: &StoredMessage);

    /// The most recent `limit` messages, oldest first. Empty on storage
    /// fault.
    async fn recent(&self, conversation_id: &str, limit: usize) -> Vec<StoredMessage>;
}

/// Production adapter over [`Database`].
pub struct DatabaseStore {
    db: Database,
}

impl DatabaseStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageStore for DatabaseStore {
    async fn append(&self, message: &StoredMessage) {
        match self.db.append_message(message) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(id = %message.id, "duplicate message ignored");
            }
            Err(e) => {
                tracing::error!(
                    id = %message.id,
                    conversation = %message.conversation_id,
                    error = %e,
                    "message append failed; continuing without persistence"
                );
            }
        }
    }

    async fn recent(&self, conversation_id: &str, limit: usize) -> Vec<StoredMessage> {
        match self.db.recent_messages(conversation_id, limit) {
            Ok(messages) => messages,
            Err(e) => {
                tracing::error!(
                    conversation = %conversation_id,
                    error = %e,
                    "context read failed; replying without memory"
                );
                Vec::new()
            }
        }
    }
}
