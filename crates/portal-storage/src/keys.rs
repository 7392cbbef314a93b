//! Storage key constants.

/// Storage keys used by the portal client.
///
/// Names match the keys the web portal keeps in browser storage so a
/// storage file can be inspected side by side with a browser session.
pub struct StorageKeys;

impl StorageKeys {
    /// Bearer access token
    pub const ACCESS_TOKEN: &'static str = "mentorAccessToken";

    /// Refresh token, exchanged at `/mentor-auth/refresh`
    pub const REFRESH_TOKEN: &'static str = "mentorRefreshToken";

    /// Email captured by the forgot-password step
    pub const RESET_EMAIL: &'static str = "forgotPasswordEmail";

    /// OTP accepted by the verify step
    pub const RESET_OTP: &'static str = "forgotPasswordOTP";

    /// Keys belonging to the token pair.
    pub const TOKEN_KEYS: [&'static str; 2] = [Self::ACCESS_TOKEN, Self::REFRESH_TOKEN];

    /// Keys belonging to an in-progress password reset.
    pub const RESET_KEYS: [&'static str; 2] = [Self::RESET_EMAIL, Self::RESET_OTP];
}
