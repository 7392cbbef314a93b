//! Session state machine using rust-fsm.
//!
//! ## State Diagram
//!
//! ```text
//!                  ┌─────────────────┐
//!                  │  Uninitialized  │ (initial)
//!                  └────────┬────────┘
//!                           │ Initialize
//!                           ▼
//!                  ┌─────────────────┐
//!                  │     Loading     │
//!                  └──┬───────────┬──┘
//!       ProfileLoaded │           │ NoSession / ProfileRejected
//!                     ▼           ▼
//! ┌─────────────────┐  Logout / SessionRevoked  ┌─────────────────┐
//! │  Authenticated  │ ────────────────────────► │ Unauthenticated │
//! │                 │ ◄──────────────────────── │                 │
//! └─────────────────┘       LoginSuccess        └─────────────────┘
//! ```
//!
//! `LoginSuccess`, `Logout` and `SessionRevoked` are accepted from every state.
//! `Initialize` is only accepted once, from `Uninitialized`.

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(Uninitialized)

    Uninitialized => {
        Initialize => Loading,
        LoginSuccess => Authenticated,
        Logout => Unauthenticated,
        SessionRevoked => Unauthenticated
    },
    Loading => {
        NoSession => Unauthenticated,
        ProfileLoaded => Authenticated,
        ProfileRejected => Unauthenticated,
        LoginSuccess => Authenticated,
        Logout => Unauthenticated,
        SessionRevoked => Unauthenticated
    },
    Authenticated => {
        LoginSuccess => Authenticated,
        Logout => Unauthenticated,
        SessionRevoked => Unauthenticated
    },
    Unauthenticated => {
        LoginSuccess => Authenticated,
        Logout => Unauthenticated,
        SessionRevoked => Unauthenticated
    }
}

pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

/// Session status for external consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// `initialize()` has not run yet.
    Uninitialized,
    /// Stored tokens are being checked against the profile endpoint.
    Loading,
    /// A mentor identity is loaded.
    Authenticated,
    /// No usable session.
    Unauthenticated,
}

impl SessionStatus {
    /// Returns true if a mentor identity is loaded.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionStatus::Authenticated)
    }

    /// Returns true while the session outcome is still unknown.
    pub fn is_pending(&self) -> bool {
        matches!(self, SessionStatus::Uninitialized | SessionStatus::Loading)
    }
}

impl From<&SessionMachineState> for SessionStatus {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::Uninitialized => SessionStatus::Uninitialized,
            SessionMachineState::Loading => SessionStatus::Loading,
            SessionMachineState::Authenticated => SessionStatus::Authenticated,
            SessionMachineState::Unauthenticated => SessionStatus::Unauthenticated,
        }
    }
}
