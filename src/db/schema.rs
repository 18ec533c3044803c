//! Message log schema and record types.

use serde::{Deserialize, Serialize};

/// SQL schema for initialization.
///
/// `id` is the primary key; redelivered messages hit the `OR IGNORE` path on
/// insert. The conversation index serves the "most recent N" read.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    conversation_id TEXT NOT NULL,
    sender TEXT NOT NULL,
    is_self BOOLEAN NOT NULL DEFAULT 0,
    content TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    kind TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_conversation
    ON messages(conversation_id, timestamp DESC);
";

/// A message as stored in the log. Immutable once persisted; never updated,
/// never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub conversation_id: String,
    /// Display name of the author.
    pub sender: String,
    /// True when this row is one of the bot's own generated replies. Set at
    /// creation time; role mapping never re-derives it from `sender`.
    pub is_self: bool,
    pub content: String,
    /// Seconds since the Unix epoch; orders the conversation timeline.
    pub timestamp: i64,
    /// Payload-shape tag from the transport (`conversation`,
    /// `image_caption`, ...). Informational only.
    pub kind: String,
}
