//! Token store: persistence for the mentor's token pair and the transient
//! password-reset keys.

use crate::{SecureStorage, StorageKeys, StorageResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access and refresh token issued by `/mentor-auth/login` or `/mentor-auth/refresh`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Pass-through persistence for the token pair. Holds no in-memory copy, so
/// every read reflects the latest write from any handle.
pub struct TokenStore {
    storage: Box<dyn SecureStorage>,
}

impl TokenStore {
    /// Create a token store over the given storage backend.
    pub fn new(storage: Box<dyn SecureStorage>) -> Self {
        Self { storage }
    }

    // ==========================================
    // Token pair
    // ==========================================

    /// Persist both tokens in one write, replacing any previous pair.
    pub fn save(&self, pair: &TokenPair) -> StorageResult<()> {
        self.storage.set_many(&[
            (StorageKeys::ACCESS_TOKEN, pair.access_token.as_str()),
            (StorageKeys::REFRESH_TOKEN, pair.refresh_token.as_str()),
        ])
    }

    /// Load the stored pair. A store holding only one half loads as empty.
    pub fn load(&self) -> StorageResult<Option<TokenPair>> {
        let access = self.storage.get(StorageKeys::ACCESS_TOKEN)?;
        let refresh = self.storage.get(StorageKeys::REFRESH_TOKEN)?;

        match (access, refresh) {
            (Some(access_token), Some(refresh_token)) => Ok(Some(TokenPair {
                access_token,
                refresh_token,
            })),
            _ => Ok(None),
        }
    }

    /// Remove both tokens.
    pub fn clear(&self) -> StorageResult<()> {
        self.storage.delete_many(&StorageKeys::TOKEN_KEYS)?;
        Ok(())
    }

    /// Current access token, if a complete pair is stored.
    pub fn access_token(&self) -> StorageResult<Option<String>> {
        Ok(self.load()?.map(|pair| pair.access_token))
    }

    /// Current refresh token, if a complete pair is stored.
    pub fn refresh_token(&self) -> StorageResult<Option<String>> {
        Ok(self.load()?.map(|pair| pair.refresh_token))
    }

    /// Check whether a complete pair is stored.
    pub fn has_tokens(&self) -> StorageResult<bool> {
        Ok(self.load()?.is_some())
    }

    // ==========================================
    // Password reset flow
    // ==========================================

    pub fn set_reset_email(&self, email: &str) -> StorageResult<()> {
        self.storage.set(StorageKeys::RESET_EMAIL, email)
    }

    pub fn get_reset_email(&self) -> StorageResult<Option<String>> {
        self.storage.get(StorageKeys::RESET_EMAIL)
    }

    pub fn set_reset_otp(&self, otp: &str) -> StorageResult<()> {
        self.storage.set(StorageKeys::RESET_OTP, otp)
    }

    pub fn get_reset_otp(&self) -> StorageResult<Option<String>> {
        self.storage.get(StorageKeys::RESET_OTP)
    }

    /// Forget the email and OTP of an in-progress reset.
    pub fn clear_reset_flow(&self) -> StorageResult<()> {
        self.storage.delete_many(&StorageKeys::RESET_KEYS)?;
        Ok(())
    }
}
