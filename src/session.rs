//! Session lifecycle.
//!
//! Owns the transport link: connect, hand over saved credentials, watch
//! lifecycle events, reconnect on recoverable failure. The decision logic is
//! the pure [`transition`] function; this module only executes its effects.
//!
//! Reconnection is unbounded in attempt count and rate-limited by a fixed
//! delay; there is no backoff. A logout close ends the session for good:
//! getting out of it takes a fresh pairing, not a restart.

mod effect;
mod state;
mod transition;

pub use effect::SessionEffect;
pub use state::SessionState;
pub use transition::{transition, Transition};

use crate::creds::CredentialCache;
use crate::dispatch::Dispatcher;
use crate::transport::{CloseCause, TransportConnector, TransportEvent, TransportLink};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct SessionManager {
    connector: Arc<dyn TransportConnector>,
    creds: CredentialCache,
    dispatcher: Dispatcher,
    reconnect_delay: Duration,
}

/// How one link ended.
enum LinkOutcome {
    Reconnect(Duration),
    Terminal,
    Shutdown,
}

impl SessionManager {
    pub fn new(
        connector: Arc<dyn TransportConnector>,
        creds: CredentialCache,
        dispatcher: Dispatcher,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            connector,
            creds,
            dispatcher,
            reconnect_delay,
        }
    }

    /// Run until terminal logout or shutdown. Every recoverable close
    /// retries after the fixed delay.
    pub async fn run(&self, shutdown: CancellationToken) {
        loop {
            match self.run_link(&shutdown).await {
                LinkOutcome::Reconnect(delay) => {
                    tracing::info!(
                        delay_secs = delay.as_secs(),
                        "reconnecting after recoverable close"
                    );
                    tokio::select! {
                        () = shutdown.cancelled() => return,
                        () = tokio::time::sleep(delay) => {}
                    }
                }
                LinkOutcome::Terminal => {
                    tracing::error!(
                        "session logged out; a fresh pairing is required before restarting"
                    );
                    return;
                }
                LinkOutcome::Shutdown => {
                    tracing::info!("session shut down");
                    return;
                }
            }
        }
    }

    /// Drive one link from connect to close.
    async fn run_link(&self, shutdown: &CancellationToken) -> LinkOutcome {
        let saved = self.creds.load();
        let link = tokio::select! {
            () = shutdown.cancelled() => return LinkOutcome::Shutdown,
            link = self.connector.connect(saved.as_ref()) => link,
        };
        let TransportLink { mut events, sender } = match link {
            Ok(link) => link,
            Err(e) => {
                tracing::warn!(error = %e, "transport connect failed");
                return LinkOutcome::Reconnect(self.reconnect_delay);
            }
        };

        let mut state = SessionState::Connecting;
        loop {
            let event = tokio::select! {
                () = shutdown.cancelled() => return LinkOutcome::Shutdown,
                event = events.recv() => match event {
                    Some(event) => event,
                    // Reader gone without a close frame; treat it as a drop.
                    None => TransportEvent::ConnectionClosed {
                        cause: CloseCause::recoverable("event stream ended"),
                    },
                },
            };

            let Transition { new_state, effects } =
                transition(state, event, self.reconnect_delay);
            if new_state != state {
                tracing::info!(from = ?state, to = ?new_state, "session state changed");
            }
            state = new_state;

            let mut reconnect_in = None;
            for effect in effects {
                match effect {
                    SessionEffect::PersistCredentials { creds } => {
                        if let Err(e) = self.creds.save(&creds) {
                            tracing::error!(error = %e, "credential save failed");
                        }
                    }
                    SessionEffect::DispatchBatch { batch } => {
                        self.dispatcher.handle_batch(batch, sender.as_ref()).await;
                    }
                    SessionEffect::ScheduleReconnect { delay } => reconnect_in = Some(delay),
                }
            }

            if state.is_terminal() {
                return LinkOutcome::Terminal;
            }
            if state == SessionState::ClosedRecoverable {
                return LinkOutcome::Reconnect(reconnect_in.unwrap_or(self.reconnect_delay));
            }
        }
    }
}
