//! Authentication for the mentor portal client.
//!
//! This crate provides:
//! - An API client with bearer auth and 401 refresh-and-replay
//! - Session management with an explicit FSM (`uninitialized → loading → …`)
//! - The redirect policy for protected routes
//! - The forgot-password / OTP / reset flow

mod api_client;
mod auth_fsm;
mod error;
mod password_reset;
mod redirect;
mod session;

pub use api_client::ApiClient;
pub use auth_fsm::session_machine;
pub use auth_fsm::{SessionMachine, SessionMachineInput, SessionMachineState, SessionStatus};
pub use error::{ApiError, ApiResult, AuthError, AuthResult};
pub use password_reset::PasswordResetFlow;
pub use redirect::{
    ProtectedView, RedirectDecision, RedirectGuard, DASHBOARD_ROUTE, DEFAULT_PUBLIC_ROUTES,
    LOGIN_ROUTE,
};
pub use session::{MentorIdentity, SessionManager, SessionSnapshot};
