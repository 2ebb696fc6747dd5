//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::models::endpoint::Platform;
use crate::{AppError, Result};

/// Remote data gateway connectivity settings.
///
/// The API key is loaded at runtime via OS keychain or environment
/// variables, not from the TOML config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DataGatewayConfig {
    /// Query/mutation endpoint URL.
    pub endpoint: String,
    /// Deployment region identifier, sent with every request.
    #[serde(default = "default_region")]
    pub region: String,
    /// API key authorizing gateway calls (populated at runtime).
    #[serde(skip)]
    pub api_key: String,
}

fn default_region() -> String {
    "us-east-1".into()
}

/// Push gateway connectivity and per-platform application identifiers.
///
/// A missing application ARN degrades gracefully: endpoints of that
/// platform are skipped during dispatch, never fatal.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct PushConfig {
    /// Push gateway base URL.
    pub endpoint: String,
    /// Platform application ARN for iOS endpoints.
    #[serde(default)]
    pub ios_application_arn: Option<String>,
    /// Platform application ARN for Android endpoints.
    #[serde(default)]
    pub android_application_arn: Option<String>,
}

impl PushConfig {
    /// Select the configured application ARN for a device platform.
    #[must_use]
    pub fn application_arn(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Ios => self.ios_application_arn.as_deref(),
            Platform::Android => self.android_application_arn.as_deref(),
        }
    }
}

/// Periodic escalation scan cadence and fetch bounds.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ScanConfig {
    /// Whether the periodic scan task is started.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between scan ticks.
    #[serde(default = "default_scan_interval_seconds")]
    pub interval_seconds: u64,
    /// Postings fetched per page.
    #[serde(default = "default_scan_page_size")]
    pub page_size: usize,
    /// Hard cap on postings fetched per scan.
    #[serde(default = "default_scan_max_postings")]
    pub max_postings: usize,
}

fn default_true() -> bool {
    true
}

fn default_scan_interval_seconds() -> u64 {
    300
}

fn default_scan_page_size() -> usize {
    50
}

fn default_scan_max_postings() -> usize {
    500
}

/// Endpoint resolution bounds for dispatch requests.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DispatchConfig {
    /// Endpoints fetched per concrete user lookup (single page).
    #[serde(default = "default_user_page_limit")]
    pub user_page_limit: usize,
    /// Endpoints fetched per broadcast page.
    #[serde(default = "default_broadcast_page_size")]
    pub broadcast_page_size: usize,
    /// Hard cap on endpoints fetched for one broadcast.
    #[serde(default = "default_broadcast_max_endpoints")]
    pub broadcast_max_endpoints: usize,
}

fn default_user_page_limit() -> usize {
    25
}

fn default_broadcast_page_size() -> usize {
    100
}

fn default_broadcast_max_endpoints() -> usize {
    1000
}

fn default_http_port() -> u16 {
    3000
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: default_scan_interval_seconds(),
            page_size: default_scan_page_size(),
            max_postings: default_scan_max_postings(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            user_page_limit: default_user_page_limit(),
            broadcast_page_size: default_broadcast_page_size(),
            broadcast_max_endpoints: default_broadcast_max_endpoints(),
        }
    }
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Remote data gateway settings.
    pub data_gateway: DataGatewayConfig,
    /// Push gateway settings.
    pub push: PushConfig,
    /// Escalation scan cadence.
    #[serde(default)]
    pub scan: ScanConfig,
    /// Endpoint resolution bounds.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// HTTP port for the trigger surface.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the data gateway API key from OS keychain with env-var fallback.
    ///
    /// Tries the `shift-sentinel` keyring service first, then falls back
    /// to the `DATA_GATEWAY_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither keychain nor env var provide
    /// the credential.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.data_gateway.api_key =
            load_credential("data_gateway_api_key", "DATA_GATEWAY_API_KEY").await?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.data_gateway.endpoint.is_empty() {
            return Err(AppError::Config(
                "data_gateway.endpoint must not be empty".into(),
            ));
        }

        if self.push.endpoint.is_empty() {
            return Err(AppError::Config("push.endpoint must not be empty".into()));
        }

        if self.scan.interval_seconds == 0 {
            return Err(AppError::Config(
                "scan.interval_seconds must be greater than zero".into(),
            ));
        }

        if self.scan.page_size == 0 || self.scan.max_postings == 0 {
            return Err(AppError::Config(
                "scan.page_size and scan.max_postings must be greater than zero".into(),
            ));
        }

        if self.dispatch.user_page_limit == 0
            || self.dispatch.broadcast_page_size == 0
            || self.dispatch.broadcast_max_endpoints == 0
        {
            return Err(AppError::Config(
                "dispatch limits must be greater than zero".into(),
            ));
        }

        if self.push.ios_application_arn.is_none() && self.push.android_application_arn.is_none() {
            warn!("no platform application ARN configured; all device endpoints will be skipped");
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // Keyring is synchronous I/O, so it runs on the blocking pool.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new("shift-sentinel", &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    env::var(env_key).map_err(|_| {
        AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var"
        ))
    })
}
