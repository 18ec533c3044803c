//! Mock implementations for pipeline tests.

use super::traits::MessageStore;
use crate::config::{CompletionConfig, RelayConfig};
use crate::db::StoredMessage;
use crate::llm::{ChatMessage, CompletionService};
use crate::transport::{InboundMessage, TransportError, TransportSender};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Config fixture shared by dispatcher and session tests.
pub fn test_config() -> Arc<RelayConfig> {
    Arc::new(RelayConfig {
        watched_conversations: vec!["conv".to_string()],
        context_limit: 10,
        bot_name: "relaybot".to_string(),
        persona: "persona".to_string(),
        db_path: String::new(),
        creds_path: String::new(),
        bridge_addr: String::new(),
        reconnect_delay: Duration::from_secs(3),
        completion: CompletionConfig {
            base_url: String::new(),
            api_key: String::new(),
            model: "test-model".to_string(),
            max_tokens: 1024,
            temperature: 0.8,
            top_p: 1.0,
        },
    })
}

/// In-memory store that records appends and serves them back, mimicking the
/// real ordering contract. `failing` drops writes and reads.
#[derive(Default)]
pub struct MockStore {
    pub appended: Mutex<Vec<StoredMessage>>,
    pub failing: bool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            appended: Mutex::new(Vec::new()),
            failing: true,
        }
    }
}

#[async_trait]
impl MessageStore for MockStore {
    async fn append(&self, message: &StoredMessage) {
        if self.failing {
            return;
        }
        let mut appended = self.appended.lock().unwrap();
        if appended.iter().any(|m| m.id == message.id) {
            return;
        }
        appended.push(message.clone());
    }

    async fn recent(&self, conversation_id: &str, limit: usize) -> Vec<StoredMessage> {
        if self.failing {
            return Vec::new();
        }
        let mut matching: Vec<StoredMessage> = self
            .appended
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        matching.sort_by_key(|m| m.timestamp);
        let skip = matching.len().saturating_sub(limit);
        matching.split_off(skip)
    }
}

/// Completion client returning scripted replies in order.
#[derive(Default)]
pub struct MockCompletion {
    replies: Mutex<VecDeque<Option<String>>>,
    /// Record of every transcript sent.
    pub requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next request. `None` scripts a fault.
    pub fn queue_reply(&self, reply: Option<&str>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(reply.map(String::from));
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for MockCompletion {
    async fn complete(&self, transcript: &[ChatMessage]) -> Option<String> {
        self.requests.lock().unwrap().push(transcript.to_vec());
        self.replies.lock().unwrap().pop_front().flatten()
    }
}

/// Sender recording outbound sends; optionally failing every send.
#[derive(Default)]
pub struct RecordingSender {
    /// (conversation_id, text, quoted message id)
    pub sent: Mutex<Vec<(String, String, Option<String>)>>,
    pub failing: bool,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl TransportSender for RecordingSender {
    async fn send_text(
        &self,
        conversation_id: &str,
        text: &str,
        quote: Option<&InboundMessage>,
    ) -> Result<(), TransportError> {
        if self.failing {
            return Err(TransportError::Disconnected);
        }
        self.sent.lock().unwrap().push((
            conversation_id.to_string(),
            text.to_string(),
            quote.map(|m| m.id.clone()),
        ));
        Ok(())
    }
}
