//! Client configuration structures and loaders.
use std::env;
use std::time::Duration;

use board_runtime::RuntimeConfig;
use client_frontend_core::FrontendConfig;

/// Configuration required to bootstrap a client runtime and UI.
#[derive(Clone, Debug)]
pub struct BootstrapConfig {
    pub runtime: RuntimeConfig,
    pub frontend: FrontendConfig,
    /// REST backend base URL; the offline demo backend is used when absent.
    pub backend_url: Option<String>,
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
    pub session_id: Option<String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            frontend: FrontendConfig::default(),
            backend_url: None,
            auth_token: None,
            request_timeout: Duration::from_secs(10),
            session_id: None,
        }
    }
}

impl BootstrapConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `MERGE_BACKEND_URL` - REST backend base URL (default: offline demo)
    /// - `MERGE_BACKEND_TOKEN` - Bearer token for the backend (optional)
    /// - `MERGE_BACKEND_TIMEOUT_MS` - Request timeout (default: 10000)
    /// - `MERGE_SESSION_ID` - Session identifier sent with requests (optional)
    ///
    /// Board, runtime and frontend settings are read by
    /// [`RuntimeConfig::from_env`] and [`FrontendConfig::from_env`].
    pub fn from_env() -> Self {
        let mut config = Self {
            runtime: RuntimeConfig::from_env(),
            frontend: FrontendConfig::from_env(),
            ..Self::default()
        };

        config.backend_url = read_non_empty("MERGE_BACKEND_URL");
        config.auth_token = read_non_empty("MERGE_BACKEND_TOKEN");
        config.session_id = read_non_empty("MERGE_SESSION_ID");

        if let Some(timeout) = read_env::<u64>("MERGE_BACKEND_TIMEOUT_MS") {
            config.request_timeout = Duration::from_millis(timeout.max(1));
        }

        config
    }

    pub fn uses_rest_backend(&self) -> bool {
        self.backend_url.is_some()
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
