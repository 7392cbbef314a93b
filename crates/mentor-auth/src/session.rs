//! Session management using FSM-based state tracking.
//!
//! `SessionManager` owns the mentor identity and drives the session machine
//! in [`crate::auth_fsm`]. Tokens live in the [`portal_storage::TokenStore`]
//! behind the [`ApiClient`]; the session is the only writer besides the
//! client's own refresh path.

use crate::auth_fsm::{SessionMachine, SessionMachineInput, SessionMachineState, SessionStatus};
use crate::{ApiClient, AuthError, AuthResult};
use parking_lot::Mutex;
use portal_storage::TokenPair;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const LOGIN_PATH: &str = "/mentor-auth/login";
const PROFILE_PATH: &str = "/mentor-auth/profile";

const LOGIN_REQUIRED_MESSAGE: &str = "Please enter both email and password";
const LOGIN_FALLBACK_MESSAGE: &str = "Login failed. Please try again.";

/// The logged-in mentor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorIdentity {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "org_email", default)]
    pub contact_email: String,
    #[serde(rename = "org_phone_number", default)]
    pub contact_phone: String,
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub identity: Option<MentorIdentity>,
}

impl SessionSnapshot {
    fn uninitialized() -> Self {
        Self {
            status: SessionStatus::Uninitialized,
            identity: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status.is_authenticated() && self.identity.is_some()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    mentor: MentorIdentity,
}

#[derive(Deserialize)]
struct ProfileResponse {
    mentor: MentorIdentity,
}

struct SessionState {
    machine: SessionMachine,
    identity: Option<MentorIdentity>,
}

impl SessionState {
    fn status(&self) -> SessionStatus {
        SessionStatus::from(self.machine.state())
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status(),
            identity: self.identity.clone(),
        }
    }
}

struct SessionShared {
    state: Mutex<SessionState>,
    watch_tx: watch::Sender<SessionSnapshot>,
}

impl SessionShared {
    fn transition(
        &self,
        input: &SessionMachineInput,
        identity: Option<MentorIdentity>,
    ) -> AuthResult<SessionSnapshot> {
        let mut state = self.state.lock();
        self.apply(&mut state, input, identity)
    }

    /// Consume `input` on a locked state. The identity is kept only when the
    /// resulting state is `Authenticated`.
    fn apply(
        &self,
        state: &mut SessionState,
        input: &SessionMachineInput,
        identity: Option<MentorIdentity>,
    ) -> AuthResult<SessionSnapshot> {
        let old_status = state.status();

        state.machine.consume(input).map_err(|_| {
            AuthError::InvalidStateTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input, old_status
            ))
        })?;

        let new_status = state.status();
        state.identity = if new_status.is_authenticated() {
            identity
        } else {
            None
        };

        if old_status != new_status {
            debug!(
                old_state = ?old_status,
                new_state = ?new_status,
                "Session state transition"
            );
        }

        let snapshot = state.snapshot();
        self.watch_tx.send_replace(snapshot.clone());
        Ok(snapshot)
    }
}

/// Session manager for the mentor portal.
#[derive(Clone)]
pub struct SessionManager {
    api: ApiClient,
    shared: Arc<SessionShared>,
}

impl SessionManager {
    /// Create a session over `api` and install its unauthenticated hook, so
    /// a failed refresh anywhere drops the identity.
    pub fn new(api: ApiClient) -> Self {
        let (watch_tx, _) = watch::channel(SessionSnapshot::uninitialized());
        let shared = Arc::new(SessionShared {
            state: Mutex::new(SessionState {
                machine: SessionMachine::new(),
                identity: None,
            }),
            watch_tx,
        });

        let weak = Arc::downgrade(&shared);
        api.set_unauthenticated_hook(Arc::new(move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            match shared.transition(&SessionMachineInput::SessionRevoked, None) {
                Ok(_) => info!("Session revoked after failed token refresh"),
                Err(e) => warn!(error = %e, "Failed to record session revocation"),
            }
        }));

        Self { api, shared }
    }

    /// The API client this session authenticates.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // ==========================================
    // Observation
    // ==========================================

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.state.lock().snapshot()
    }

    pub fn status(&self) -> SessionStatus {
        self.shared.state.lock().status()
    }

    pub fn identity(&self) -> Option<MentorIdentity> {
        self.shared.state.lock().identity.clone()
    }

    /// Receive every snapshot published after a transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.watch_tx.subscribe()
    }

    // ==========================================
    // Lifecycle
    // ==========================================

    /// Restore the session from stored tokens.
    ///
    /// One-shot: only the first call leaves `Uninitialized`; later or
    /// concurrent calls return the current snapshot without a request.
    /// Any profile failure clears the stored tokens.
    pub async fn initialize(&self) -> AuthResult<SessionSnapshot> {
        {
            let mut state = self.shared.state.lock();
            if *state.machine.state() != SessionMachineState::Uninitialized {
                debug!(state = ?state.status(), "Session already initialized");
                return Ok(state.snapshot());
            }
            self.shared
                .apply(&mut state, &SessionMachineInput::Initialize, None)?;
        }

        let has_tokens = self.api.tokens().has_tokens().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read stored tokens");
            false
        });

        if !has_tokens {
            info!("No stored session");
            return self.complete_initialize(SessionMachineInput::NoSession, None, false);
        }

        match self.api.get::<ProfileResponse>(PROFILE_PATH).await {
            Ok(profile) => {
                info!(mentor_id = %profile.mentor.id, "Session restored");
                self.complete_initialize(
                    SessionMachineInput::ProfileLoaded,
                    Some(profile.mentor),
                    false,
                )
            }
            Err(e) => {
                warn!(error = %e, status = ?e.status(), "Profile fetch failed, clearing session");
                self.complete_initialize(SessionMachineInput::ProfileRejected, None, true)
            }
        }
    }

    /// Settle a `Loading` session. A login or revocation that landed while
    /// the profile was in flight wins; the result is then discarded.
    fn complete_initialize(
        &self,
        input: SessionMachineInput,
        identity: Option<MentorIdentity>,
        clear_tokens: bool,
    ) -> AuthResult<SessionSnapshot> {
        let mut state = self.shared.state.lock();
        if *state.machine.state() != SessionMachineState::Loading {
            debug!(state = ?state.status(), "Session settled during initialization");
            return Ok(state.snapshot());
        }

        if clear_tokens {
            self.api.tokens().clear()?;
        }
        self.shared.apply(&mut state, &input, identity)
    }

    /// Log in with email and password.
    ///
    /// On failure the state is left unchanged and the server's message is
    /// returned verbatim.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<SessionSnapshot> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(LOGIN_REQUIRED_MESSAGE.to_string()));
        }

        debug!(email, "Logging in");

        let response: LoginResponse = self
            .api
            .post(LOGIN_PATH, &LoginRequest { email, password })
            .await
            .map_err(|e| {
                warn!(error = %e, "Login failed");
                AuthError::rejected(e, LOGIN_FALLBACK_MESSAGE)
            })?;

        self.api.tokens().save(&TokenPair::new(
            response.access_token,
            response.refresh_token,
        ))?;

        let mentor_id = response.mentor.id.clone();
        let snapshot = self
            .shared
            .transition(&SessionMachineInput::LoginSuccess, Some(response.mentor))?;

        info!(mentor_id = %mentor_id, "Logged in");
        Ok(snapshot)
    }

    /// Clear the stored tokens and drop the identity. No server call.
    pub fn logout(&self) -> AuthResult<SessionSnapshot> {
        let cleared = self.api.tokens().clear();
        let snapshot = self
            .shared
            .transition(&SessionMachineInput::Logout, None)?;
        cleared?;

        info!("Logged out");
        Ok(snapshot)
    }
}
