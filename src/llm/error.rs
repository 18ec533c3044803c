//! Completion service error types.

use thiserror::Error;

/// Completion fault with classification.
///
/// Never crosses the dispatcher boundary: the client logs it and collapses
/// the request to "no reply this turn".
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CompletionError {
    pub kind: CompletionErrorKind,
    pub message: String,
}

impl CompletionError {
    pub fn new(kind: CompletionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(CompletionErrorKind::Network, message)
    }

    pub fn api(status: u16, body: &str) -> Self {
        Self::new(CompletionErrorKind::Api, format!("HTTP {status}: {body}"))
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(CompletionErrorKind::Malformed, message)
    }
}

/// Fault classification, used only to structure the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionErrorKind {
    /// Could not reach the endpoint (connect failure, timeout).
    Network,
    /// Endpoint answered with a non-success status.
    Api,
    /// Response body lacked a usable reply field.
    Malformed,
}
