//! Authentication commands.

use super::{prompt, Portal};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use mentor_auth::{ProtectedView, RedirectGuard};

/// Login with email and password.
pub async fn login(portal: &Portal, email: Option<String>, format: &OutputFormat) -> Result<()> {
    let snapshot = portal.session.initialize().await?;
    if snapshot.is_authenticated() {
        if let Some(identity) = &snapshot.identity {
            output::print_success(&format!("Already logged in as {}", identity.name), format);
            return Ok(());
        }
    }

    let email = match email {
        Some(email) => email.trim().to_string(),
        None => prompt("Email")?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    let snapshot = portal.session.login(&email, &password).await?;
    let name = snapshot
        .identity
        .map(|identity| identity.name)
        .unwrap_or_else(|| email.clone());
    output::print_success(&format!("Logged in as {}", name), format);

    Ok(())
}

/// Logout and clear stored tokens.
pub fn logout(portal: &Portal, format: &OutputFormat) -> Result<()> {
    portal.session.logout()?;
    output::print_success("Logged out successfully", format);
    Ok(())
}

/// Show the restored session.
pub async fn status(portal: &Portal, format: &OutputFormat) -> Result<()> {
    let snapshot = portal.session.initialize().await?;

    output::render(&snapshot, format, |snapshot| {
        match (RedirectGuard::protected_view(snapshot), &snapshot.identity) {
            (ProtectedView::Visible, Some(identity)) => {
                println!("Auth:     logged in");
                output::print_row("Name", &identity.name);
                output::print_row("Email", &identity.contact_email);
                output::print_row("Phone", &identity.contact_phone);
                output::print_row("Mentor ID", &identity.id);
            }
            (ProtectedView::Loading, _) => println!("Auth:     resolving"),
            _ => println!("Auth:     not logged in"),
        }
        if let Some(route) = RedirectGuard::landing_route(snapshot) {
            output::print_row("Start page", route);
        }
    })
}
