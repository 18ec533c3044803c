//! Session states.

/// Lifecycle of the transport link. Rebuilt from `Connecting` on every
/// reconnect; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Opening the transport and waiting for the handshake.
    #[default]
    Connecting,

    /// Handshake done; events flow.
    Open,

    /// Link lost for a recoverable reason; a reconnect is due.
    ClosedRecoverable,

    /// Explicitly logged out. Absorbing: only a fresh pairing outside this
    /// process leaves it.
    ClosedTerminal,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::ClosedTerminal)
    }
}
