//! Forgot-password commands.
//!
//! Each step is its own invocation; the email and verified code are kept in
//! the token store in between.

use super::{prompt, Portal};
use crate::output::{self, OutputFormat};
use anyhow::Result;

/// Request a one-time code for `email`.
pub async fn forgot_password(
    portal: &Portal,
    email: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt("Email")?,
    };

    portal.reset.request_otp(&email).await?;
    output::print_success(
        &format!(
            "OTP sent to {}. Run 'mentor-portal verify-otp <code>' next.",
            email.trim()
        ),
        format,
    );
    Ok(())
}

/// Verify the code sent by `forgot-password`.
pub async fn verify_otp(portal: &Portal, otp: &str, format: &OutputFormat) -> Result<()> {
    portal.reset.verify_otp(otp).await?;
    output::print_success(
        "OTP verified. Run 'mentor-portal reset-password' to choose a new password.",
        format,
    );
    Ok(())
}

/// Send the code again to the remembered email.
pub async fn resend_otp(portal: &Portal, format: &OutputFormat) -> Result<()> {
    portal.reset.resend_otp().await?;
    output::print_success("A new OTP has been sent to your email", format);
    Ok(())
}

/// Set a new password with the verified code.
pub async fn reset_password(portal: &Portal, format: &OutputFormat) -> Result<()> {
    let new_password = rpassword::prompt_password("New password: ")?;
    let confirm_password = rpassword::prompt_password("Confirm password: ")?;

    portal
        .reset
        .reset_password(&new_password, &confirm_password)
        .await?;
    output::print_success(
        "Password reset successfully. You can now log in with your new password.",
        format,
    );
    Ok(())
}
