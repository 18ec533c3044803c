//! JSON-lines bridge to an out-of-process transport sidecar.
//!
//! The sidecar owns the messaging wire protocol and the meaning of the
//! credential blob. This side speaks newline-delimited JSON over one TCP
//! connection: [`TransportEvent`] frames in, `init`/`send` frames out.

use super::{
    CloseCause, CredentialBlob, InboundMessage, TransportConnector, TransportError,
    TransportEvent, TransportLink, TransportSender,
};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Connects to the sidecar at a fixed address. One TCP connection per link;
/// reconnects open a fresh one.
pub struct BridgeConnector {
    addr: String,
}

impl BridgeConnector {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[derive(Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum OutboundFrame<'a> {
    /// Handshake: hand the sidecar its last saved credential blob.
    Init { creds: Option<&'a CredentialBlob> },
    /// Deliver a reply, optionally quoting an inbound message id.
    Send {
        conversation_id: &'a str,
        text: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        quote_id: Option<&'a str>,
    },
}

struct BridgeSender {
    writer: Mutex<OwnedWriteHalf>,
}

impl BridgeSender {
    async fn write_frame(&self, frame: &OutboundFrame<'_>) -> Result<(), TransportError> {
        let mut line = serde_json::to_string(frame)?;
        line.push('\n');
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

#[async_trait]
impl TransportSender for BridgeSender {
    async fn send_text(
        &self,
        conversation_id: &str,
        text: &str,
        quote: Option<&InboundMessage>,
    ) -> Result<(), TransportError> {
        self.write_frame(&OutboundFrame::Send {
            conversation_id,
            text,
            quote_id: quote.map(|m| m.id.as_str()),
        })
        .await
    }
}

/// Pump frames from the socket into the event channel until the stream ends.
/// The end of the stream is surfaced as a recoverable close so the session
/// layer treats a dead sidecar like any other dropped link.
async fn read_events(read: OwnedReadHalf, tx: mpsc::Sender<TransportEvent>) {
    let mut lines = BufReader::new(read).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<TransportEvent>(&line) {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                    // One bad frame is dropped; the stream keeps going.
                    Err(e) => tracing::warn!(error = %e, "dropping malformed bridge frame"),
                }
            }
            Ok(None) => {
                let _ = tx
                    .send(TransportEvent::ConnectionClosed {
                        cause: CloseCause::recoverable("bridge stream ended"),
                    })
                    .await;
                return;
            }
            Err(e) => {
                let _ = tx
                    .send(TransportEvent::ConnectionClosed {
                        cause: CloseCause::recoverable(format!("bridge read failed: {e}")),
                    })
                    .await;
                return;
            }
        }
    }
}

#[async_trait]
impl TransportConnector for BridgeConnector {
    async fn connect(
        &self,
        creds: Option<&CredentialBlob>,
    ) -> Result<TransportLink, TransportError> {
        let stream = TcpStream::connect(&self.addr).await?;
        let (read, write) = stream.into_split();

        let sender = BridgeSender {
            writer: Mutex::new(write),
        };
        sender.write_frame(&OutboundFrame::Init { creds }).await?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        tokio::spawn(read_events(read, tx));

        Ok(TransportLink {
            events: rx,
            sender: Arc::new(sender),
        })
    }
}
