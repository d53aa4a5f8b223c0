//! Para Wallet Core - session client for the Para custodial wallet backend
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Plain data (Session, Credentials, WalletSnapshot, etc.)
//! - **ports**: Trait definitions for external dependencies (WalletApi, SessionStorage)
//! - **services**: Session ownership, backend calls, form state, event log
//! - **adapters**: Concrete implementations (reqwest, JSON file, in-memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use adapters::{FileSessionStorage, HttpWalletApi};
use config::Config;
use ports::{SessionStorage, WalletApi};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{
    Credentials, Session, SessionState, SignupReceipt, TransferRequest, TransferResult,
    WalletSnapshot,
};
pub use services::{EndpointStats, EntryPoint, LogEntry, LogEvent, LogFilter, LoggingService};

/// File holding the persisted session inside the app directory
pub const SESSION_FILE: &str = "session.json";

/// Forget the session stored in `app_dir` without building a context.
///
/// Needs neither settings nor a backend, so it works even when the
/// configured URL is unusable. Returns whether a session was stored.
pub fn forget_stored_session(app_dir: &Path) -> Result<bool, Error> {
    let path = app_dir.join(SESSION_FILE);
    let storage = FileSessionStorage::new(&path);
    let session = match SessionManager::init_from_storage(Arc::new(storage)) {
        Ok(session) => session,
        // Unreadable session file: nothing usable is stored, drop it
        Err(Error::Storage(_)) => {
            std::fs::remove_file(&path)?;
            return Ok(false);
        }
        Err(e) => return Err(e),
    };
    let was_logged_in = session.is_logged_in();
    session.teardown()?;
    Ok(was_logged_in)
}

/// Main context for Para Wallet operations
///
/// Owns the session for the lifetime of the process and hands out forms
/// bound to it. Cancelling [`ParaWalletContext::shutdown`] cancels every
/// request started through those forms.
pub struct ParaWalletContext {
    pub config: Config,
    pub session: Arc<SessionManager>,
    pub client: SessionClient,
    shutdown: CancellationToken,
}

impl ParaWalletContext {
    /// Create a context for `app_dir`: load settings, hydrate the session
    /// from `session.json` and build the HTTP client.
    pub fn new(app_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(app_dir)
            .with_context(|| format!("Failed to create {}", app_dir.display()))?;

        let config = Config::load(app_dir)?;
        let api = HttpWalletApi::new(&config.api_base_url, config.request_timeout())?;
        let storage = FileSessionStorage::new(app_dir.join(SESSION_FILE));

        Self::with_parts(config, Arc::new(api), Arc::new(storage))
    }

    /// Assemble a context from explicit parts
    pub fn with_parts(
        config: Config,
        api: Arc<dyn WalletApi>,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self> {
        let session = Arc::new(
            SessionManager::init_from_storage(storage).context("Failed to load session")?,
        );
        let client = SessionClient::new(api, Arc::clone(&session));

        Ok(Self {
            config,
            session,
            client,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn signup_form(&self) -> SignupForm {
        SignupForm::new(&self.shutdown)
    }

    pub fn login_form(&self) -> LoginForm {
        LoginForm::new(&self.shutdown)
    }

    pub fn wallet_panel(&self) -> WalletPanel {
        WalletPanel::new(&self.shutdown)
    }

    pub fn send_form(&self) -> SendForm {
        SendForm::new(&self.shutdown)
    }

    /// Root token; cancelling it cancels every form's in-flight request
    pub fn shutdown(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Forget the session locally
    pub fn logout(&self) -> Result<(), Error> {
        self.client.logout()
    }
}
