//! Configuration management
//!
//! Settings live in `<app dir>/settings.json`:
//! ```json
//! {
//!   "api": { "baseUrl": "http://localhost:3000", "timeoutSecs": 30 },
//!   "explorer": {
//!     "txUrl": "https://sepolia.etherscan.io/tx/",
//!     "faucetUrl": "https://sepolia-faucet.pk910.de/"
//!   }
//! }
//! ```
//! Fields this crate does not manage are preserved when saving.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::adapters::DEFAULT_API_BASE_URL;
use crate::domain::DEFAULT_EXPLORER_TX_URL;

/// Environment variable overriding `api.baseUrl`
pub const API_URL_ENV: &str = "PARAWALLET_API_URL";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_FAUCET_URL: &str = "https://sepolia-faucet.pk910.de/";

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api: ApiSettings,
    #[serde(default)]
    explorer: ExplorerSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExplorerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tx_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    faucet_url: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Para Wallet configuration (resolved view of settings)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Wallet backend root, always ending in `/`
    pub api_base_url: String,
    /// Per-request timeout in seconds; 0 disables it
    pub timeout_secs: u64,
    /// Transaction hashes are appended to this
    pub explorer_tx_url: String,
    pub faucet_url: String,
    /// Set when `api_base_url` came from the environment rather than the file
    pub api_url_from_env: bool,
    /// Problems found while loading; the affected values fell back
    pub warnings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: format!("{}/", DEFAULT_API_BASE_URL),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            explorer_tx_url: DEFAULT_EXPLORER_TX_URL.to_string(),
            faucet_url: DEFAULT_FAUCET_URL.to_string(),
            api_url_from_env: false,
            warnings: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from the app directory
    ///
    /// The backend URL can be overridden with `PARAWALLET_API_URL`.
    /// A missing or unreadable settings file yields the defaults. An invalid
    /// URL is skipped with a warning so the settings can still be repaired.
    pub fn load(app_dir: &Path) -> Result<Self> {
        let env_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());
        Self::load_with_override(app_dir, env_url)
    }

    fn load_with_override(app_dir: &Path, env_url: Option<String>) -> Result<Self> {
        let raw = read_settings(app_dir)?;
        let defaults = Config::default();
        let mut warnings = Vec::new();

        let from_env = env_url.and_then(|url| match normalize_url(&url) {
            Ok(u) => Some(u),
            Err(e) => {
                warnings.push(format!("Ignoring {}: {}", API_URL_ENV, e));
                None
            }
        });
        let from_file = raw
            .api
            .base_url
            .as_deref()
            .and_then(|url| match normalize_url(url) {
                Ok(u) => Some(u),
                Err(e) => {
                    warnings.push(format!("Ignoring api.baseUrl in {}: {}", SETTINGS_FILE, e));
                    None
                }
            });

        let (api_base_url, api_url_from_env) = match (from_env, from_file) {
            (Some(url), _) => (url, true),
            (None, Some(url)) => (url, false),
            (None, None) => (defaults.api_base_url, false),
        };

        Ok(Self {
            api_base_url,
            timeout_secs: raw.api.timeout_secs.unwrap_or(defaults.timeout_secs),
            explorer_tx_url: raw.explorer.tx_url.unwrap_or(defaults.explorer_tx_url),
            faucet_url: raw.explorer.faucet_url.unwrap_or(defaults.faucet_url),
            api_url_from_env,
            warnings,
        })
    }

    /// Save config to the app directory
    ///
    /// An environment-provided backend URL is never written back.
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        let mut settings = read_settings(app_dir)?;

        if !self.api_url_from_env {
            settings.api.base_url = Some(self.api_base_url.clone());
        }
        settings.api.timeout_secs = Some(self.timeout_secs);
        settings.explorer.tx_url = Some(self.explorer_tx_url.clone());
        settings.explorer.faucet_url = Some(self.faucet_url.clone());

        std::fs::create_dir_all(app_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(app_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    /// Point the client at another backend
    pub fn set_api_url(&mut self, url: &str) -> Result<()> {
        self.api_base_url = normalize_url(url)?;
        self.api_url_from_env = false;
        Ok(())
    }

    pub fn set_timeout_secs(&mut self, secs: u64) {
        self.timeout_secs = secs;
    }

    pub fn set_explorer_tx_url(&mut self, url: &str) -> Result<()> {
        validate_url(url)?;
        self.explorer_tx_url = url.to_string();
        Ok(())
    }

    pub fn set_faucet_url(&mut self, url: &str) -> Result<()> {
        validate_url(url)?;
        self.faucet_url = url.to_string();
        Ok(())
    }

    /// Request timeout for the HTTP client, `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn read_settings(app_dir: &Path) -> Result<SettingsFile> {
    let settings_path = app_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

fn validate_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!("Unsupported URL scheme '{}': expected http or https", other),
    }
}

fn normalize_url(raw: &str) -> Result<String> {
    let url = validate_url(raw)?;
    let mut s = url.to_string();
    if !s.ends_with('/') {
        s.push('/');
    }
    Ok(s)
}
