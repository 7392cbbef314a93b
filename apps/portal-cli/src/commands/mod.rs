//! CLI command implementations.

mod auth;
mod classes;
mod curriculum;
mod password;

pub use auth::{login, logout, status};
pub use classes::{
    classes_cancel, classes_options, classes_reschedule, classes_schedule, classes_upcoming,
};
pub use curriculum::{
    courses, curriculum_create, curriculum_edit, curriculum_list, topics, CurriculumEdits,
};
pub use password::{forgot_password, resend_otp, reset_password, verify_otp};

use anyhow::Result;
use mentor_api::{MentorApi, MentorApiError};
use mentor_auth::{
    ApiClient, MentorIdentity, PasswordResetFlow, RedirectDecision, RedirectGuard, SessionManager,
};
use portal_config_and_utils::{Config, Paths};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::debug;

/// Services shared by every command, all over one token store.
pub struct Portal {
    pub session: SessionManager,
    pub api: MentorApi,
    pub reset: PasswordResetFlow,
    guard: RedirectGuard,
}

impl Portal {
    pub fn new(config: &Config, paths: &Paths) -> Result<Self> {
        let tokens = Arc::new(portal_storage::create_token_store(paths));
        let client = ApiClient::from_config(config, tokens)?;
        debug!(base_url = %client.base_url(), "API client ready");

        Ok(Self {
            session: SessionManager::new(client.clone()),
            api: MentorApi::new(client.clone()),
            reset: PasswordResetFlow::new(client),
            guard: RedirectGuard::new(),
        })
    }

    /// Restore the session and return the mentor allowed to view `route`.
    pub async fn require_mentor(&self, route: &str) -> Result<MentorIdentity> {
        let snapshot = self.session.initialize().await?;

        match (self.guard.evaluate(&snapshot, route), snapshot.identity) {
            (RedirectDecision::Stay, Some(identity)) => Ok(identity),
            (RedirectDecision::Redirect(target), _) => {
                debug!(route, target = %target, "Protected command without a session");
                anyhow::bail!(
                    "Not logged in (redirect to {}). Run 'mentor-portal login' first.",
                    target
                )
            }
            (RedirectDecision::Stay, None) => {
                anyhow::bail!("Not logged in. Run 'mentor-portal login' first.")
            }
        }
    }
}

/// Turn an API failure into the message shown to the mentor.
fn failure(error: MentorApiError, fallback: &str) -> anyhow::Error {
    debug!(error = %error, "Command failed");
    anyhow::anyhow!(error.user_message(fallback))
}

/// Read one trimmed line from stdin.
fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Ask user for confirmation.
fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    io::stdout().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
