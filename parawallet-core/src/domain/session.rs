//! Session domain model

use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// An authenticated session: the bearer token and the identity it belongs to.
///
/// Both halves are always present. "No session" is `Option<Session>::None`,
/// never a session with one half missing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: String,
    account_identifier: String,
}

impl Session {
    /// Create a session, rejecting blank token or identity
    pub fn new(token: impl Into<String>, account_identifier: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let account_identifier = account_identifier.into();

        if token.trim().is_empty() {
            return Err(Error::validation("session token cannot be empty"));
        }
        if account_identifier.trim().is_empty() {
            return Err(Error::validation("account identifier cannot be empty"));
        }

        Ok(Self {
            token,
            account_identifier,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn account_identifier(&self) -> &str {
        &self.account_identifier
    }

    /// Expiry from the token's `exp` claim, if the token is a JWT.
    ///
    /// The signature is not verified; this is display information only.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let payload = self.token.split('.').nth(1)?;
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
        let exp = claims.get("exp")?.as_i64()?;
        Utc.timestamp_opt(exp, 0).single()
    }

    /// True if the token carries an expiry that has already passed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|exp| exp <= now).unwrap_or(false)
    }
}

// Token stays out of debug output
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("account_identifier", &self.account_identifier)
            .finish()
    }
}

/// Session state machine: `LoggedOut -> LoggedIn -> LoggedOut`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn(Session),
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionState::LoggedIn(_))
    }
}

impl From<Option<Session>> for SessionState {
    fn from(session: Option<Session>) -> Self {
        match session {
            Some(s) => SessionState::LoggedIn(s),
            None => SessionState::LoggedOut,
        }
    }
}
