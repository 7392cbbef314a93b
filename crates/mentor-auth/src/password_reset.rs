//! Forgot-password flow: request an OTP, verify it, set a new password.
//!
//! The email and verified OTP are kept in the token store's transient reset
//! keys between steps, so the flow can span separate CLI invocations.

use crate::{ApiClient, AuthError, AuthResult};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

const FORGOT_PASSWORD_PATH: &str = "/mentor-auth/forgot-password";
const VERIFY_OTP_PATH: &str = "/mentor-auth/verify-otp";
const RESET_PASSWORD_PATH: &str = "/mentor-auth/reset-password";

const OTP_LENGTH: usize = 6;

#[derive(Serialize)]
struct ForgotPasswordRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct VerifyOtpRequest<'a> {
    email: &'a str,
    otp: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest<'a> {
    email: &'a str,
    otp: &'a str,
    new_password: &'a str,
    confirm_password: &'a str,
}

/// Password reset over the public `/mentor-auth/*` endpoints.
#[derive(Clone)]
pub struct PasswordResetFlow {
    api: ApiClient,
}

impl PasswordResetFlow {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Email of the reset in progress, if any.
    pub fn pending_email(&self) -> AuthResult<Option<String>> {
        Ok(self.api.tokens().get_reset_email()?)
    }

    /// Send a one-time code to `email` and remember the address.
    pub async fn request_otp(&self, email: &str) -> AuthResult<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::Validation(
                "Please enter your email address".to_string(),
            ));
        }

        self.api
            .post::<_, Value>(FORGOT_PASSWORD_PATH, &ForgotPasswordRequest { email })
            .await
            .map_err(|e| {
                warn!(error = %e, "OTP request failed");
                AuthError::rejected(e, "Failed to send OTP")
            })?;

        let tokens = self.api.tokens();
        tokens.clear_reset_flow()?;
        tokens.set_reset_email(email)?;
        info!("OTP sent");
        Ok(())
    }

    /// Verify the code sent to the remembered email.
    pub async fn verify_otp(&self, otp: &str) -> AuthResult<()> {
        let email = self.require_email()?;

        let otp = otp.trim();
        if otp.len() != OTP_LENGTH || !otp.chars().all(|c| c.is_ascii_digit()) {
            return Err(AuthError::Validation(
                "Please enter a valid 6-digit OTP".to_string(),
            ));
        }

        self.api
            .post::<_, Value>(VERIFY_OTP_PATH, &VerifyOtpRequest { email: &email, otp })
            .await
            .map_err(|e| {
                warn!(error = %e, "OTP verification failed");
                AuthError::rejected(e, "Invalid OTP")
            })?;

        self.api.tokens().set_reset_otp(otp)?;
        info!("OTP verified");
        Ok(())
    }

    /// Send a fresh code to the remembered email.
    pub async fn resend_otp(&self) -> AuthResult<()> {
        let email = self.require_email()?;

        self.api
            .post::<_, Value>(FORGOT_PASSWORD_PATH, &ForgotPasswordRequest { email: &email })
            .await
            .map_err(|e| {
                warn!(error = %e, "OTP resend failed");
                AuthError::rejected(e, "Failed to resend OTP")
            })?;

        info!("OTP resent");
        Ok(())
    }

    /// Set a new password using the verified code. Clears the reset keys on
    /// success.
    pub async fn reset_password(
        &self,
        new_password: &str,
        confirm_password: &str,
    ) -> AuthResult<()> {
        if new_password.is_empty() || confirm_password.is_empty() {
            return Err(AuthError::Validation(
                "Please fill in both password fields".to_string(),
            ));
        }
        if new_password != confirm_password {
            return Err(AuthError::Validation("Passwords do not match".to_string()));
        }

        let email = self.require_email()?;
        let otp = self.api.tokens().get_reset_otp()?.ok_or_else(|| {
            AuthError::Validation(
                "OTP not verified. Please verify the code sent to your email.".to_string(),
            )
        })?;

        self.api
            .post::<_, Value>(
                RESET_PASSWORD_PATH,
                &ResetPasswordRequest {
                    email: &email,
                    otp: &otp,
                    new_password,
                    confirm_password,
                },
            )
            .await
            .map_err(|e| {
                warn!(error = %e, "Password reset failed");
                AuthError::rejected(e, "Failed to reset password")
            })?;

        self.api.tokens().clear_reset_flow()?;
        info!("Password reset");
        Ok(())
    }

    fn require_email(&self) -> AuthResult<String> {
        self.pending_email()?.ok_or_else(|| {
            AuthError::Validation(
                "Email not found. Please start from forgot password page.".to_string(),
            )
        })
    }
}
