//! Transcript assembly.
//!
//! Pure translation from a chronological slice of stored messages into the
//! role-tagged transcript sent to the completion service. Stateless: the
//! bound on history length is the caller's job.

use crate::db::StoredMessage;
use crate::llm::ChatMessage;

/// Build the transcript for one completion request.
///
/// The persona always leads as the single system entry. Generated replies
/// map to `assistant` and pass through unprefixed; everything else maps to
/// `user` with the sender's display name prefixed, so the model can tell
/// participants apart inside one shared transcript.
pub fn build_transcript(persona: &str, history: &[StoredMessage]) -> Vec<ChatMessage> {
    let mut transcript = Vec::with_capacity(history.len() + 1);
    transcript.push(ChatMessage::system(persona));

    for message in history {
        if message.is_self {
            transcript.push(ChatMessage::assistant(message.content.clone()));
        } else {
            transcript.push(ChatMessage::user(format!(
                "{}: {}",
                message.sender, message.content
            )));
        }
    }

    transcript
}
