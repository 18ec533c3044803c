//! Inbound message pipeline.
//!
//! Wires transport batches to the store, the transcript builder, and the
//! completion service, and pushes generated replies back out through the
//! transport. Each message is handled in isolation: a malformed or failing
//! message never takes the rest of the batch down with it.

mod traits;

#[cfg(test)]
pub mod testing;

pub use traits::{DatabaseStore, MessageStore};

use crate::config::RelayConfig;
use crate::context::build_transcript;
use crate::db::StoredMessage;
use crate::llm::CompletionService;
use crate::persona::SILENCE_SENTINEL;
use crate::transport::{Extracted, InboundMessage, TransportSender};
use chrono::Utc;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub struct Dispatcher {
    config: Arc<RelayConfig>,
    store: Arc<dyn MessageStore>,
    completion: Arc<dyn CompletionService>,
    reply_seq: AtomicU64,
}

impl Dispatcher {
    pub fn new(
        config: Arc<RelayConfig>,
        store: Arc<dyn MessageStore>,
        completion: Arc<dyn CompletionService>,
    ) -> Self {
        Self {
            config,
            store,
            completion,
            reply_seq: AtomicU64::new(0),
        }
    }

    /// Handle one batch, serially. Completion requests never overlap within
    /// a batch, which keeps per-conversation ordering deterministic.
    pub async fn handle_batch(&self, batch: Vec<InboundMessage>, sender: &dyn TransportSender) {
        for message in batch {
            self.handle_message(&message, sender).await;
        }
    }

    async fn handle_message(&self, message: &InboundMessage, sender: &dyn TransportSender) {
        // Echo loop guard: never react to the bot's own account.
        if message.from_self {
            return;
        }
        if !self
            .config
            .watched_conversations
            .iter()
            .any(|c| c == &message.conversation_id)
        {
            return;
        }

        let text = match message.payload.extract_text() {
            Extracted::Text(text) => text,
            Extracted::NoText => return,
        };

        let sender_name = message.display_sender().to_string();
        tracing::info!(
            conversation = %message.conversation_id,
            sender = %sender_name,
            kind = %message.payload.kind(),
            chars = text.len(),
            "inbound message"
        );

        let stored = StoredMessage {
            id: message.id.clone(),
            conversation_id: message.conversation_id.clone(),
            sender: sender_name,
            is_self: false,
            content: text,
            timestamp: message.timestamp,
            kind: message.payload.kind().to_string(),
        };
        self.store.append(&stored).await;

        let history = self
            .store
            .recent(&message.conversation_id, self.config.context_limit)
            .await;
        let transcript = build_transcript(&self.config.persona, &history);

        let Some(reply) = self.completion.complete(&transcript).await else {
            tracing::debug!(conversation = %message.conversation_id, "no reply produced");
            return;
        };
        if reply.contains(SILENCE_SENTINEL) {
            tracing::debug!(conversation = %message.conversation_id, "staying silent");
            return;
        }

        if let Err(e) = sender
            .send_text(&message.conversation_id, &reply, Some(message))
            .await
        {
            tracing::error!(
                conversation = %message.conversation_id,
                error = %e,
                "reply send failed"
            );
            return;
        }
        tracing::info!(
            conversation = %message.conversation_id,
            chars = reply.len(),
            "reply sent"
        );

        let reply_message = StoredMessage {
            id: self.next_reply_id(),
            conversation_id: message.conversation_id.clone(),
            sender: self.config.bot_name.clone(),
            is_self: true,
            content: reply,
            timestamp: Utc::now().timestamp(),
            kind: "conversation".to_string(),
        };
        self.store.append(&reply_message).await;
    }

    /// Best-effort unique id for an outbound reply: wall-clock second, a
    /// process-local counter, and a random suffix. The counter keeps rapid
    /// successive replies within one second apart.
    fn next_reply_id(&self) -> String {
        let seq = self.reply_seq.fetch_add(1, Ordering::Relaxed);
        let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
        format!("bot-{}-{seq}-{suffix:04}", Utc::now().timestamp())
    }
}
