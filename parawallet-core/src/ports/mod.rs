//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The session
//! client and forms depend only on these traits, not on concrete adapters.

mod session_storage;
mod wallet_api;

pub use session_storage::{SessionStorage, TOKEN_KEY, USER_KEY};
pub use wallet_api::WalletApi;
