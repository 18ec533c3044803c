//! Transport boundary.
//!
//! The messaging network itself lives outside this crate. The session layer
//! consumes it as an opaque duplex event source: typed events in, a send
//! handle out. [`bridge`] adapts an out-of-process sidecar speaking
//! newline-delimited JSON over TCP to this interface.

pub mod bridge;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed frame: {0}")]
    Frame(#[from] serde_json::Error),
    #[error("transport closed the connection")]
    Disconnected,
}

/// Why the link went down. Only the logout bit is interpreted; everything
/// else about the cause is free-form detail for the logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseCause {
    /// The session was explicitly logged out; reconnecting cannot help and
    /// a fresh pairing is required.
    pub logged_out: bool,
    #[serde(default)]
    pub detail: String,
}

impl CloseCause {
    pub fn recoverable(detail: impl Into<String>) -> Self {
        Self {
            logged_out: false,
            detail: detail.into(),
        }
    }

    #[allow(dead_code)] // Constructor for API completeness
    pub fn logged_out(detail: impl Into<String>) -> Self {
        Self {
            logged_out: true,
            detail: detail.into(),
        }
    }
}

/// Payload shapes a transport message may carry.
///
/// Exactly one text extraction happens per message, via
/// [`Payload::extract_text`]; nothing downstream re-inspects the shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    Text { text: String },
    ExtendedText { text: String },
    ImageCaption { caption: Option<String> },
    Unsupported { kind: String },
}

/// Result of text extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Text(String),
    NoText,
}

impl Payload {
    /// Payload-shape tag recorded alongside the message.
    pub fn kind(&self) -> &str {
        match self {
            Payload::Text { .. } => "conversation",
            Payload::ExtendedText { .. } => "extended_text",
            Payload::ImageCaption { .. } => "image_caption",
            Payload::Unsupported { kind } => kind,
        }
    }

    /// The one place message text is pulled out of the payload. Empty text
    /// counts as no text.
    pub fn extract_text(&self) -> Extracted {
        let text = match self {
            Payload::Text { text } | Payload::ExtendedText { text } => Some(text),
            Payload::ImageCaption { caption } => caption.as_ref(),
            Payload::Unsupported { .. } => None,
        };
        match text {
            Some(t) if !t.is_empty() => Extracted::Text(t.clone()),
            _ => Extracted::NoText,
        }
    }
}

/// One message as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    pub conversation_id: String,
    /// Display name, when the transport knows it.
    #[serde(default)]
    pub sender: Option<String>,
    /// Participant identifier; fallback identity for the sender.
    #[serde(default)]
    pub participant: Option<String>,
    /// Set by the transport when the message came from the bot's own
    /// account. Used to break echo loops.
    #[serde(default)]
    pub from_self: bool,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub payload: Payload,
}

impl InboundMessage {
    /// Best display identity for the author.
    pub fn display_sender(&self) -> &str {
        self.sender
            .as_deref()
            .or(self.participant.as_deref())
            .unwrap_or("Unknown")
    }
}

/// Opaque authentication material. Persisted verbatim on every update; its
/// structure belongs to the transport.
pub type CredentialBlob = serde_json::Value;

/// Events the transport pushes at the session layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TransportEvent {
    /// Rotated authentication material; must be saved durably right away.
    CredentialsUpdated { creds: CredentialBlob },
    /// Handshake finished; the link is usable.
    ConnectionOpened,
    /// The link went down.
    ConnectionClosed { cause: CloseCause },
    /// A batch of inbound messages.
    Messages { batch: Vec<InboundMessage> },
}

/// Send half of the transport.
#[async_trait]
pub trait TransportSender: Send + Sync {
    /// Deliver `text` into `conversation_id`, quoting `quote` when given.
    async fn send_text(
        &self,
        conversation_id: &str,
        text: &str,
        quote: Option<&InboundMessage>,
    ) -> Result<(), TransportError>;
}

/// An established link: the event stream plus its send handle.
pub struct TransportLink {
    pub events: mpsc::Receiver<TransportEvent>,
    pub sender: Arc<dyn TransportSender>,
}

/// Opens transport links. Called once per (re)connect attempt with whatever
/// credential blob was last saved.
#[async_trait]
pub trait TransportConnector: Send + Sync {
    async fn connect(&self, creds: Option<&CredentialBlob>)
        -> Result<TransportLink, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_text_covers_every_shape() {
        let text = Payload::Text {
            text: "hi".to_string(),
        };
        assert_eq!(text.extract_text(), Extracted::Text("hi".to_string()));

        let extended = Payload::ExtendedText {
            text: "quoted reply".to_string(),
        };
        assert_eq!(
            extended.extract_text(),
            Extracted::Text("quoted reply".to_string())
        );

        let caption = Payload::ImageCaption {
            caption: Some("look at this".to_string()),
        };
        assert_eq!(
            caption.extract_text(),
            Extracted::Text("look at this".to_string())
        );

        let bare_image = Payload::ImageCaption { caption: None };
        assert_eq!(bare_image.extract_text(), Extracted::NoText);

        let sticker = Payload::Unsupported {
            kind: "sticker".to_string(),
        };
        assert_eq!(sticker.extract_text(), Extracted::NoText);
    }

    #[test]
    fn empty_text_counts_as_no_text() {
        let empty = Payload::Text {
            text: String::new(),
        };
        assert_eq!(empty.extract_text(), Extracted::NoText);

        let empty_caption = Payload::ImageCaption {
            caption: Some(String::new()),
        };
        assert_eq!(empty_caption.extract_text(), Extracted::NoText);
    }

    #[test]
    fn display_sender_falls_back_to_participant() {
        let mut message = InboundMessage {
            id: "m-1".to_string(),
            conversation_id: "conv".to_string(),
            sender: Some("Alice".to_string()),
            participant: Some("alice@transport".to_string()),
            from_self: false,
            timestamp: 100,
            payload: Payload::Text {
                text: "hi".to_string(),
            },
        };
        assert_eq!(message.display_sender(), "Alice");

        message.sender = None;
        assert_eq!(message.display_sender(), "alice@transport");

        message.participant = None;
        assert_eq!(message.display_sender(), "Unknown");
    }

    #[test]
    fn events_round_trip_through_json_frames() {
        let event = TransportEvent::Messages {
            batch: vec![InboundMessage {
                id: "m-1".to_string(),
                conversation_id: "conv".to_string(),
                sender: Some("Alice".to_string()),
                participant: None,
                from_self: false,
                timestamp: 100,
                payload: Payload::ImageCaption {
                    caption: Some("sunset".to_string()),
                },
            }],
        };

        let frame = serde_json::to_string(&event).unwrap();
        assert!(frame.contains(r#""event":"messages""#));
        let back: TransportEvent = serde_json::from_str(&frame).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn close_frames_carry_the_logout_bit() {
        let frame = r#"{"event":"connection_closed","cause":{"logged_out":true,"detail":"logged out"}}"#;
        let event: TransportEvent = serde_json::from_str(frame).unwrap();
        match event {
            TransportEvent::ConnectionClosed { cause } => assert!(cause.logged_out),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
