//! Core domain entities
//!
//! Plain data carried between the session client, the forms and the shell.
//! No I/O here.

mod auth;
pub mod result;
mod session;
mod wallet;

pub use auth::{Credentials, LoginGrant, SignupReceipt};
pub use session::{Session, SessionState};
pub use wallet::{TransferRequest, TransferResult, WalletSnapshot, DEFAULT_EXPLORER_TX_URL};
