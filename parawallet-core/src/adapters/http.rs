//! Wallet backend HTTP client
//!
//! Talks JSON to the custodial wallet backend:
//! - POST /signup  `{email, password}` -> `{wallet_address}`
//! - POST /login   `{email, password}` -> `{accessToken, user?}`
//! - GET  /wallet  (bearer)            -> `{address, balance_eth}`
//! - POST /send    (bearer) `{to, amount}` -> `{transaction_hash}`
//!
//! Any failure response may carry `{error}`; it is shown to the user verbatim.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value as JsonValue;
use url::Url;

use crate::domain::result::{Error as DomainError, Result as DomainResult};
use crate::domain::{
    Credentials, LoginGrant, SignupReceipt, TransferRequest, TransferResult, WalletSnapshot,
};
use crate::ports::WalletApi;

/// Default backend URL (local development server)
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

// =============================================================================
// Endpoints
// =============================================================================

/// The four backend calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    CreateAccount,
    Authenticate,
    FetchWallet,
    SubmitTransfer,
}

impl Endpoint {
    /// Path relative to the base URL
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::CreateAccount => "signup",
            Endpoint::Authenticate => "login",
            Endpoint::FetchWallet => "wallet",
            Endpoint::SubmitTransfer => "send",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::FetchWallet => Method::GET,
            _ => Method::POST,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::CreateAccount => "create-account",
            Endpoint::Authenticate => "authenticate",
            Endpoint::FetchWallet => "fetch-wallet",
            Endpoint::SubmitTransfer => "submit-transfer",
        }
    }

    /// Message used when the backend gives no usable `error`
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Endpoint::CreateAccount => "Signup failed",
            Endpoint::Authenticate => "Login failed",
            Endpoint::FetchWallet => "Failed to fetch wallet",
            Endpoint::SubmitTransfer => "Transaction failed",
        }
    }

    /// Wrap a message in this call's error kind
    pub fn error(&self, message: impl Into<String>) -> DomainError {
        match self {
            Endpoint::CreateAccount | Endpoint::Authenticate => DomainError::auth(message),
            Endpoint::FetchWallet => DomainError::wallet(message),
            Endpoint::SubmitTransfer => DomainError::transfer(message),
        }
    }
}

// =============================================================================
// Wire models
// =============================================================================

#[derive(Debug, Deserialize)]
struct SignupResponse {
    wallet_address: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(default)]
    user: Option<LoginUser>,
}

#[derive(Debug, Deserialize)]
struct LoginUser {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WalletResponse {
    address: String,
    #[serde(deserialize_with = "deserialize_balance")]
    balance_eth: Decimal,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    transaction_hash: String,
}

/// Balance arrives as a number or a decimal string depending on the backend.
///
/// Numbers are read from their raw JSON text so wei-level digits survive;
/// going through `f64` would round them.
fn deserialize_balance<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let raw: Box<RawValue> = Deserialize::deserialize(deserializer)?;
    let text = raw.get().trim();

    let digits = if text.starts_with('"') {
        serde_json::from_str::<String>(text).map_err(D::Error::custom)?
    } else if text.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
        text.to_string()
    } else {
        return Err(D::Error::custom("expected number or string for balance"));
    };
    let digits = digits.trim();

    digits
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(digits))
        .map_err(|e| D::Error::custom(format!("invalid balance: {}", e)))
}

/// Pull a displayable message out of a failure body
fn backend_error_message(body: &[u8]) -> Option<String> {
    let value: JsonValue = serde_json::from_slice(body).ok()?;
    let message = match value.get("error")? {
        JsonValue::String(s) => s.clone(),
        JsonValue::Object(obj) => obj.get("message")?.as_str()?.to_string(),
        _ => return None,
    };
    let trimmed = message.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// =============================================================================
// HTTP client
// =============================================================================

/// reqwest-backed [`WalletApi`]
#[derive(Debug, Clone)]
pub struct HttpWalletApi {
    client: Client,
    base_url: Url,
    timeout: Option<Duration>,
}

impl HttpWalletApi {
    /// Create a client for `base_url`.
    ///
    /// `timeout` of `None` leaves requests unbounded; they can still be
    /// cancelled by the caller.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;

        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> DomainResult<Url> {
        self.base_url
            .join(endpoint.path())
            .map_err(|e| DomainError::Config(format!("Invalid endpoint URL: {}", e)))
    }

    /// Issue one call and decode the success body
    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        token: Option<&str>,
        body: Option<JsonValue>,
    ) -> DomainResult<T> {
        let url = self.endpoint_url(endpoint)?;

        let mut request = self
            .client
            .request(endpoint.method(), url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(t) = token {
            request = request.bearer_auth(t);
        }
        if let Some(b) = body {
            request = request.json(&b);
        }

        let response = request
            .send()
            .await
            .map_err(|e| endpoint.error(self.map_request_error(e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| endpoint.error(self.map_request_error(e)))?;

        if !status.is_success() {
            let message = backend_error_message(&bytes)
                .unwrap_or_else(|| endpoint.fallback_message().to_string());
            return Err(endpoint.error(message));
        }

        serde_json::from_slice(&bytes)
            .map_err(|_| endpoint.error("Malformed response from wallet backend"))
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> String {
        if error.is_timeout() {
            match self.timeout {
                Some(t) => format!("Connection timed out after {} seconds", t.as_secs()),
                None => "Connection timed out".to_string(),
            }
        } else if error.is_connect() {
            format!("Unable to connect to wallet backend at {}", self.base_url)
        } else {
            format!("Wallet backend request failed: {}", error)
        }
    }
}

/// Parse the base URL and make sure relative joins append instead of replace
fn normalize_base_url(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        anyhow::bail!("Wallet backend URL cannot be empty");
    }

    let mut url = Url::parse(trimmed).context("Invalid URL format")?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("Wallet backend URL must use http or https");
    }
    if url.cannot_be_a_base() {
        anyhow::bail!("Wallet backend URL cannot be used as a base");
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

#[async_trait]
impl WalletApi for HttpWalletApi {
    async fn create_account(&self, credentials: &Credentials) -> DomainResult<SignupReceipt> {
        let body = serde_json::to_value(credentials)?;
        let response: SignupResponse = self
            .call(Endpoint::CreateAccount, None, Some(body))
            .await?;

        Ok(SignupReceipt {
            wallet_address: response.wallet_address,
        })
    }

    async fn authenticate(&self, credentials: &Credentials) -> DomainResult<LoginGrant> {
        let body = serde_json::to_value(credentials)?;
        let response: LoginResponse = self
            .call(Endpoint::Authenticate, None, Some(body))
            .await?;

        Ok(LoginGrant {
            access_token: response.access_token,
            account_identifier: response
                .user
                .and_then(|u| u.email)
                .filter(|e| !e.trim().is_empty()),
        })
    }

    async fn fetch_wallet(&self, token: &str) -> DomainResult<WalletSnapshot> {
        let response: WalletResponse = self.call(Endpoint::FetchWallet, Some(token), None).await?;

        Ok(WalletSnapshot {
            address: response.address,
            balance_eth: response.balance_eth,
        })
    }

    async fn submit_transfer(
        &self,
        token: &str,
        request: &TransferRequest,
    ) -> DomainResult<TransferResult> {
        let body = serde_json::to_value(request)?;
        let response: SendResponse = self
            .call(Endpoint::SubmitTransfer, Some(token), Some(body))
            .await?;

        Ok(TransferResult {
            transaction_hash: response.transaction_hash,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
