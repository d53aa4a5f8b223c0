//! Wallet backend port

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{
    Credentials, LoginGrant, SignupReceipt, TransferRequest, TransferResult, WalletSnapshot,
};

/// Custodial wallet backend
///
/// One method per backend call. Implementations map every failure into the
/// call's error kind (`Error::Auth` for signup/login, `Error::Wallet` for
/// wallet reads, `Error::Transfer` for sends) with a message fit for display.
#[async_trait]
pub trait WalletApi: Send + Sync {
    /// Create an account (unauthenticated)
    async fn create_account(&self, credentials: &Credentials) -> Result<SignupReceipt>;

    /// Exchange credentials for an access token (unauthenticated)
    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginGrant>;

    /// Read the wallet behind `token`
    async fn fetch_wallet(&self, token: &str) -> Result<WalletSnapshot>;

    /// Send funds from the wallet behind `token`
    async fn submit_transfer(&self, token: &str, request: &TransferRequest)
        -> Result<TransferResult>;
}
