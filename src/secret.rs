//! Secrets resolved from an ordered list of environment variables.

use std::env;
use std::fmt;
use std::sync::OnceLock;

use tracing::debug;

use crate::error::{Error, Result};

/// Environment variables consulted for the access token.
pub const ACCESS_TOKEN_LOCATIONS: &[&str] = &["GITHUB_ACCESS_TOKEN"];

/// Environment variables consulted for the proxy address, in order.
pub const PROXY_LOCATIONS: &[&str] = &["HTTPS_PROXY", "https_proxy", "HTTP_PROXY", "http_proxy"];

/// A secret value that may live in any one of several equivalent locations.
///
/// The first location holding a non-empty value wins. The value is memoized
/// on first successful resolution; later changes to the environment are not
/// observed.
///
/// # Example
///
/// ```rust
/// use bulk_update::Secret;
///
/// let secret = Secret::new("token", ["PRIMARY", "FALLBACK"]);
/// let value = secret
///     .value_with(|name| (name == "FALLBACK").then(|| "s3cret".to_string()))
///     .unwrap();
/// assert_eq!(value, "s3cret");
/// ```
pub struct Secret {
    name: String,
    locations: Vec<String>,
    value: OnceLock<String>,
}

impl Secret {
    /// Create an unresolved secret.
    pub fn new<I, S>(name: &str, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            locations: locations.into_iter().map(Into::into).collect(),
            value: OnceLock::new(),
        }
    }

    /// The GitHub access token secret.
    #[must_use]
    pub fn access_token() -> Self {
        Self::new("github-access-token", ACCESS_TOKEN_LOCATIONS.iter().copied())
    }

    /// The proxy address secret.
    #[must_use]
    pub fn proxy_address() -> Self {
        Self::new("proxy-address", PROXY_LOCATIONS.iter().copied())
    }

    /// Create a secret that is already resolved.
    #[must_use]
    pub fn from_value(name: &str, value: impl Into<String>) -> Self {
        let secret = Self::new(name, Vec::<String>::new());
        let _ = secret.value.set(value.into());
        secret
    }

    /// Name used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Locations consulted, in order.
    #[must_use]
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// Whether the value has already been resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.value.get().is_some()
    }

    /// Resolve the secret from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no location holds a value.
    pub fn value(&self) -> Result<&str> {
        self.value_with(|location| env::var(location).ok())
    }

    /// Resolve the secret through `lookup` instead of the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `lookup` yields no non-empty value
    /// for any location.
    pub fn value_with<F>(&self, lookup: F) -> Result<&str>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let (location, found) = self
            .locations
            .iter()
            .find_map(|location| {
                lookup(location)
                    .filter(|value| !value.is_empty())
                    .map(|value| (location, value))
            })
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "No matching environment variable found in locations \"{}\".",
                    self.locations.join(", ")
                ))
            })?;

        debug!(secret = %self.name, location = %location, "Resolved secret");

        // A concurrent resolution may have won; either value is equivalent.
        Ok(self.value.get_or_init(|| found))
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("name", &self.name)
            .field("locations", &self.locations)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
