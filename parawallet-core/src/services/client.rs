//! Session client - every backend call goes through here
//!
//! Unauthenticated calls (signup, login) go straight to the backend;
//! authenticated calls pull the bearer token from the [`SessionManager`].
//! Every call races a [`CancellationToken`] and resolves to
//! [`Error::Cancelled`] the moment it fires.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Credentials, Session, SignupReceipt, TransferRequest, TransferResult, WalletSnapshot,
};
use crate::ports::WalletApi;
use crate::services::SessionManager;

/// Session client
#[derive(Clone)]
pub struct SessionClient {
    api: Arc<dyn WalletApi>,
    session: Arc<SessionManager>,
}

impl SessionClient {
    pub fn new(api: Arc<dyn WalletApi>, session: Arc<SessionManager>) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Create an account. Never logs in.
    pub async fn create_account(
        &self,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> Result<SignupReceipt> {
        cancellable(cancel, self.api.create_account(credentials)).await
    }

    /// Log in and persist the resulting session.
    ///
    /// On failure the previous session state is left untouched.
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> Result<Session> {
        let grant = cancellable(cancel, self.api.authenticate(credentials)).await?;

        let identity = grant
            .account_identifier
            .unwrap_or_else(|| credentials.email.clone());
        let session = Session::new(grant.access_token, identity)
            .map_err(|_| Error::auth("Login failed"))?;

        self.session.establish(session.clone())?;
        Ok(session)
    }

    /// Read the wallet of the logged-in account
    pub async fn fetch_wallet(&self, cancel: &CancellationToken) -> Result<WalletSnapshot> {
        let token = self.session.token().ok_or(Error::NotLoggedIn)?;
        cancellable(cancel, self.api.fetch_wallet(&token)).await
    }

    /// Send funds from the logged-in account
    pub async fn submit_transfer(
        &self,
        request: &TransferRequest,
        cancel: &CancellationToken,
    ) -> Result<TransferResult> {
        let token = self.session.token().ok_or(Error::NotLoggedIn)?;
        cancellable(cancel, self.api.submit_transfer(&token, request)).await
    }

    /// Forget the session locally. No network call.
    pub fn logout(&self) -> Result<()> {
        self.session.teardown()
    }
}

/// Run `fut` unless `cancel` fires first
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::adapters::mock_backend::{MockConfig, MockWalletBackend};
    use crate::adapters::{HttpWalletApi, MemorySessionStorage};
    use crate::domain::SessionState;
    use crate::ports::{SessionStorage, TOKEN_KEY, USER_KEY};

    fn setup(config: MockConfig) -> (MockWalletBackend, SessionClient, Arc<MemorySessionStorage>) {
        let server = MockWalletBackend::start(config).unwrap();
        let api = HttpWalletApi::new(&server.base_url(), Some(Duration::from_secs(5))).unwrap();
        let storage = Arc::new(MemorySessionStorage::new());
        let session = Arc::new(SessionManager::init_from_storage(storage.clone()).unwrap());
        (server, SessionClient::new(Arc::new(api), session), storage)
    }

    #[tokio::test]
    async fn test_authenticate_establishes_and_persists() {
        let (_server, client, storage) = setup(MockConfig::default());
        let cancel = CancellationToken::new();

        let session = client
            .authenticate(&Credentials::new("a@b.com", "pw123456"), &cancel)
            .await
            .unwrap();

        assert_eq!(session.token(), "mock_access_token");
        assert_eq!(session.account_identifier(), "a@b.com");
        assert_eq!(client.session().state(), SessionState::LoggedIn(session));
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), Some("mock_access_token".to_string()));
        assert_eq!(storage.get(USER_KEY).unwrap(), Some("a@b.com".to_string()));
    }

    #[tokio::test]
    async fn test_wrong_password_stays_logged_out() {
        let (_server, client, storage) = setup(MockConfig::default());
        let cancel = CancellationToken::new();

        let err = client
            .authenticate(&Credentials::new("a@b.com", "wrongpw"), &cancel)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(client.session().state(), SessionState::LoggedOut);
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_signup_does_not_log_in() {
        let (_server, client, storage) = setup(MockConfig::default());
        let cancel = CancellationToken::new();

        let receipt = client
            .create_account(&Credentials::new("a@b.com", "pw123456"), &cancel)
            .await
            .unwrap();

        assert_eq!(receipt.wallet_address, "0xABC");
        assert!(!client.session().is_logged_in());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_authenticated_calls_require_session() {
        let (server, client, _storage) = setup(MockConfig::default());
        let cancel = CancellationToken::new();

        let err = client.fetch_wallet(&cancel).await.unwrap_err();
        assert!(matches!(err, Error::NotLoggedIn));

        let err = client
            .submit_transfer(&TransferRequest::new("0xDEF", "0.01"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotLoggedIn));

        // Nothing reached the backend
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_full_flow_then_logout() {
        let (server, client, storage) = setup(MockConfig::default());
        let cancel = CancellationToken::new();

        client
            .authenticate(&Credentials::new("a@b.com", "pw123456"), &cancel)
            .await
            .unwrap();

        let wallet = client.fetch_wallet(&cancel).await.unwrap();
        assert_eq!(wallet.address, "0xABC");

        let result = client
            .submit_transfer(&TransferRequest::new("0xDEF", "0.01"), &cancel)
            .await
            .unwrap();
        assert_eq!(result.transaction_hash, "0x123");

        let requests = server.requests();
        assert_eq!(
            requests[1].authorization.as_deref(),
            Some("Bearer mock_access_token")
        );
        assert_eq!(
            requests[2].authorization.as_deref(),
            Some("Bearer mock_access_token")
        );

        client.logout().unwrap();
        assert_eq!(client.session().state(), SessionState::LoggedOut);
        assert!(storage.is_empty());
        assert_eq!(server.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_cancel_in_flight_request() {
        let (_server, client, _storage) = setup(MockConfig {
            delay_ms: 2000,
            ..Default::default()
        });
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let err = client
            .create_account(&Credentials::new("a@b.com", "pw123456"), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_already_cancelled_token_skips_call() {
        let (server, client, _storage) = setup(MockConfig::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .authenticate(&Credentials::new("a@b.com", "pw123456"), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(!client.session().is_logged_in());
        assert!(server.requests().is_empty());
    }
}
