//! Effects produced by session transitions.

use crate::transport::{CredentialBlob, InboundMessage};
use std::time::Duration;

/// Work the session loop performs after a transition. Transitions stay
/// pure; all I/O happens out here.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    /// Write the rotated credential blob through to disk.
    PersistCredentials { creds: CredentialBlob },

    /// Hand a batch of inbound messages to the dispatcher.
    DispatchBatch { batch: Vec<InboundMessage> },

    /// Re-enter `Connecting` after the fixed delay.
    ScheduleReconnect { delay: Duration },
}
