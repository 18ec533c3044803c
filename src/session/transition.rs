//! Pure session transition function.
//!
//! Given the same state and event, always the same outcome, with no I/O.
//! The manager loop feeds it real transport events; tests feed it synthetic
//! ones.

use super::{SessionEffect, SessionState};
use crate::transport::TransportEvent;
use std::time::Duration;

/// Result of one transition.
#[derive(Debug)]
pub struct Transition {
    pub new_state: SessionState,
    pub effects: Vec<SessionEffect>,
}

impl Transition {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: SessionEffect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Apply one transport event to the session.
///
/// Close causes are inspected only for the logout bit: logout is terminal,
/// everything else schedules one reconnect after `reconnect_delay`.
pub fn transition(
    state: SessionState,
    event: TransportEvent,
    reconnect_delay: Duration,
) -> Transition {
    match (state, event) {
        // Terminal is absorbing.
        (SessionState::ClosedTerminal, _) => Transition::new(SessionState::ClosedTerminal),

        // Credential rotations are saved no matter the link state.
        (state, TransportEvent::CredentialsUpdated { creds }) => {
            Transition::new(state).with_effect(SessionEffect::PersistCredentials { creds })
        }

        (SessionState::Connecting, TransportEvent::ConnectionOpened) => {
            Transition::new(SessionState::Open)
        }

        // Batches only count once the link is open.
        (SessionState::Open, TransportEvent::Messages { batch }) => {
            Transition::new(SessionState::Open).with_effect(SessionEffect::DispatchBatch { batch })
        }

        (_, TransportEvent::ConnectionClosed { cause }) if cause.logged_out => {
            Transition::new(SessionState::ClosedTerminal)
        }

        (_, TransportEvent::ConnectionClosed { .. }) => {
            Transition::new(SessionState::ClosedRecoverable).with_effect(
                SessionEffect::ScheduleReconnect {
                    delay: reconnect_delay,
                },
            )
        }

        // Anything else is dropped where it stands.
        (state, _) => Transition::new(state),
    }
}
