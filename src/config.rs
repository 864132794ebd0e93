//! Client configuration.
//!
//! A [`Config`] is built once and handed to
//! [`GitHubClient::new`](crate::github::GitHubClient::new), which resolves
//! the secrets it carries.

use std::env;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::secret::Secret;

/// Default API URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default `User-Agent` header; the API rejects requests without one.
pub const DEFAULT_USER_AGENT: &str = concat!("bulk-update/", env!("CARGO_PKG_VERSION"));

/// Settings for talking to the platform.
#[derive(Debug)]
pub struct Config {
    /// Base URL of the REST API (e.g. `https://ghe.example.com/api/v3`)
    pub api_url: String,
    /// Whether requests go through the proxy in `proxy_address`
    pub use_proxy: bool,
    /// Per-request timeout; requests wait indefinitely when `None`
    pub timeout: Option<Duration>,
    /// `User-Agent` sent with every request
    pub user_agent: String,
    /// Access token
    pub access_token: Secret,
    /// Proxy address, only consulted when `use_proxy` is set
    pub proxy_address: Secret,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            use_proxy: false,
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            access_token: Secret::access_token(),
            proxy_address: Secret::proxy_address(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `BULK_UPDATE_API_URL` - API base URL (default: <https://api.github.com>)
    /// * `BULK_UPDATE_USE_PROXY` - `true`/`1`/`yes` to route through a proxy
    /// * `BULK_UPDATE_TIMEOUT_SECS` - per-request timeout in seconds
    ///
    /// The token and proxy address are resolved later, from
    /// `GITHUB_ACCESS_TOKEN` and `HTTPS_PROXY`/`https_proxy`/`HTTP_PROXY`/`http_proxy`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a variable holds an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(api_url) = lookup("BULK_UPDATE_API_URL").filter(|v| !v.is_empty()) {
            config.api_url = api_url;
        }

        if let Some(flag) = lookup("BULK_UPDATE_USE_PROXY") {
            config.use_proxy = parse_flag(&flag).ok_or_else(|| {
                Error::Configuration(format!("Invalid value for BULK_UPDATE_USE_PROXY: {flag}"))
            })?;
        }

        if let Some(secs) = lookup("BULK_UPDATE_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Configuration(format!("Invalid value for BULK_UPDATE_TIMEOUT_SECS: {secs}"))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Use an explicit access token instead of the environment.
    #[must_use]
    pub fn with_token(mut self, token: &str) -> Self {
        self.access_token = Secret::from_value("github-access-token", token);
        self
    }

    /// Use an explicit API URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.to_string();
        self
    }

    /// Route requests through `proxy`.
    #[must_use]
    pub fn with_proxy(mut self, proxy: &str) -> Self {
        self.use_proxy = true;
        self.proxy_address = Secret::from_value("proxy-address", proxy);
        self
    }

    /// Set a per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
