//! Signup and login payloads

use serde::{Deserialize, Serialize};

/// Email and password as entered by the user
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Outcome of a successful signup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupReceipt {
    pub wallet_address: String,
}

impl SignupReceipt {
    /// Message shown after the account was created
    pub fn message(&self) -> String {
        format!("Account created! Wallet: {}", self.wallet_address)
    }
}

/// Outcome of a successful login, before it becomes a [`super::Session`]
#[derive(Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub access_token: String,
    /// Identity reported by the backend, if any
    pub account_identifier: Option<String>,
}

impl std::fmt::Debug for LoginGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginGrant")
            .field("access_token", &"<redacted>")
            .field("account_identifier", &self.account_identifier)
            .finish()
    }
}
