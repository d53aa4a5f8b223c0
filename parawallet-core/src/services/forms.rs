//! Form state - per-form request lifecycle
//!
//! Each form owns its input fields, a busy flag, an inline error and the last
//! successful result. A submission:
//! 1. clears the error and raises the busy flag,
//! 2. runs one backend call through the [`SessionClient`],
//! 3. on success stores the result (and clears the inputs where the form
//!    does), on failure stores the error message and keeps everything else,
//! 4. lowers the busy flag, whatever happened.
//!
//! Forms never return errors to their caller; the outcome is read back from
//! the form.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::domain::result::Result;
use crate::domain::{
    Credentials, Session, SignupReceipt, TransferRequest, TransferResult, WalletSnapshot,
};
use crate::services::SessionClient;

// =============================================================================
// Busy flag
// =============================================================================

/// Shared "request in flight" flag
///
/// Clones observe the same flag, so a renderer can watch it while the owning
/// form is mutably borrowed by a submission.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn raise(&self) -> BusyGuard {
        self.0.store(true, Ordering::SeqCst);
        BusyGuard(self.0.clone())
    }
}

/// Lowers the flag when dropped, including when the call future is dropped
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// =============================================================================
// Shared lifecycle
// =============================================================================

/// Busy flag, error, result and cancellation for one form
#[derive(Debug)]
pub struct FormState<T> {
    busy: BusyFlag,
    parent: CancellationToken,
    cancel: CancellationToken,
    error: Option<String>,
    result: Option<T>,
}

impl<T> FormState<T> {
    /// New form state whose requests are cancelled along with `parent`
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            busy: BusyFlag::default(),
            parent: parent.clone(),
            cancel: parent.child_token(),
            error: None,
            result: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Handle on the busy flag for observers
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    /// Token that cancels the current (or next) submission
    pub fn canceller(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Record a failure found before any call was made
    fn reject(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Run one call; returns true on success
    async fn drive<F, Fut>(&mut self, call: F) -> bool
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.error = None;
        let outcome = {
            let _busy = self.busy.raise();
            call(self.cancel.clone()).await
        };

        // A fired token stays fired; give the next submission a fresh one
        if self.cancel.is_cancelled() && !self.parent.is_cancelled() {
            self.cancel = self.parent.child_token();
        }

        match outcome {
            Ok(value) => {
                self.result = Some(value);
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }
}

/// Presence check matching an HTML `required` field
fn required(value: &str, message: &str) -> std::result::Result<(), String> {
    if value.trim().is_empty() {
        Err(message.to_string())
    } else {
        Ok(())
    }
}

// =============================================================================
// Signup
// =============================================================================

/// Account creation form
#[derive(Debug)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    state: FormState<SignupReceipt>,
}

impl SignupForm {
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            state: FormState::new(parent),
        }
    }

    pub fn state(&self) -> &FormState<SignupReceipt> {
        &self.state
    }

    /// Success text, e.g. `Account created! Wallet: 0xABC`
    pub fn success_message(&self) -> Option<String> {
        self.state.result().map(|r| r.message())
    }

    /// Submit; clears both fields on success. Does not log in.
    pub async fn submit(&mut self, client: &SessionClient) -> bool {
        if let Err(msg) = required(&self.email, "Email is required")
            .and_then(|_| required(&self.password, "Password is required"))
        {
            self.state.reject(msg);
            return false;
        }

        let credentials = Credentials::new(self.email.clone(), self.password.clone());
        let ok = self
            .state
            .drive(|cancel| async move { client.create_account(&credentials, &cancel).await })
            .await;

        if ok {
            self.email.clear();
            self.password.clear();
        }
        ok
    }
}

// =============================================================================
// Login
// =============================================================================

/// Login form
#[derive(Debug)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    state: FormState<Session>,
}

impl LoginForm {
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            state: FormState::new(parent),
        }
    }

    pub fn state(&self) -> &FormState<Session> {
        &self.state
    }

    /// Submit; on success the session is live and both fields are cleared
    pub async fn submit(&mut self, client: &SessionClient) -> bool {
        if let Err(msg) = required(&self.email, "Email is required")
            .and_then(|_| required(&self.password, "Password is required"))
        {
            self.state.reject(msg);
            return false;
        }

        let credentials = Credentials::new(self.email.clone(), self.password.clone());
        let ok = self
            .state
            .drive(|cancel| async move { client.authenticate(&credentials, &cancel).await })
            .await;

        if ok {
            self.email.clear();
            self.password.clear();
        }
        ok
    }
}

// =============================================================================
// Wallet
// =============================================================================

/// Wallet info panel
#[derive(Debug)]
pub struct WalletPanel {
    state: FormState<WalletSnapshot>,
}

impl WalletPanel {
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            state: FormState::new(parent),
        }
    }

    pub fn state(&self) -> &FormState<WalletSnapshot> {
        &self.state
    }

    pub fn snapshot(&self) -> Option<&WalletSnapshot> {
        self.state.result()
    }

    /// Fetch; a failure keeps the previously shown snapshot
    pub async fn fetch(&mut self, client: &SessionClient) -> bool {
        self.state
            .drive(|cancel| async move { client.fetch_wallet(&cancel).await })
            .await
    }
}

// =============================================================================
// Send
// =============================================================================

/// Send funds form
#[derive(Debug)]
pub struct SendForm {
    pub to: String,
    pub amount: String,
    state: FormState<TransferResult>,
}

impl SendForm {
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            to: String::new(),
            amount: String::new(),
            state: FormState::new(parent),
        }
    }

    pub fn state(&self) -> &FormState<TransferResult> {
        &self.state
    }

    /// Hash of the last successful transfer
    pub fn transaction_hash(&self) -> Option<&str> {
        self.state.result().map(|r| r.transaction_hash.as_str())
    }

    /// Submit; clears `to`/`amount` only on success
    pub async fn submit(&mut self, client: &SessionClient) -> bool {
        if let Err(msg) = required(&self.to, "Recipient address is required")
            .and_then(|_| required(&self.amount, "Amount is required"))
        {
            self.state.reject(msg);
            return false;
        }

        let request = TransferRequest::new(self.to.clone(), self.amount.clone());
        let ok = self
            .state
            .drive(|cancel| async move { client.submit_transfer(&request, &cancel).await })
            .await;

        if ok {
            self.to.clear();
            self.amount.clear();
        }
        ok
    }
}
