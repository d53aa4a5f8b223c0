//! Session storage port - persistent key-value capability

use crate::domain::result::Result;

/// Key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Key holding the display identity
pub const USER_KEY: &str = "user";

/// Small persistent string key-value store
///
/// The session manager keeps exactly two entries here ([`TOKEN_KEY`] and
/// [`USER_KEY`]). Removing a missing key is not an error.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}
