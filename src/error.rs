//! Error types for bulk updates.

use thiserror::Error;

use crate::content::DecodeError;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for bulk updates.
///
/// Every remote variant keeps the underlying [`ApiError`] as its source, so
/// callers can inspect the HTTP category of the failure.
#[derive(Error, Debug)]
pub enum Error {
    /// A required secret or setting could not be resolved.
    #[error("{0}")]
    Configuration(String),

    /// Listing the repositories of an organization failed.
    #[error("Failed to list repositories for \"{org}\": {source}")]
    RemoteList {
        org: String,
        #[source]
        source: ApiError,
    },

    /// Looking up a repository by name failed.
    #[error("Failed to get repository \"{org}/{repo}\": {source}")]
    RemoteLookup {
        org: String,
        repo: String,
        #[source]
        source: ApiError,
    },

    /// Reading a file from a repository failed.
    #[error("Failed to read \"{path}\" in \"{owner}/{repo}\": {source}")]
    RemoteRead {
        owner: String,
        repo: String,
        path: String,
        #[source]
        source: ApiError,
    },

    /// The content of a file could not be decoded into text.
    #[error("Failed to decode \"{path}\" in \"{owner}/{repo}\": {source}")]
    Decode {
        owner: String,
        repo: String,
        path: String,
        #[source]
        source: DecodeError,
    },

    /// Committing a file to a repository failed.
    #[error("Failed to update \"{path}\" in \"{owner}/{repo}\": {source}")]
    RemoteWrite {
        owner: String,
        repo: String,
        path: String,
        #[source]
        source: ApiError,
    },

    /// Target resolution yielded no repositories.
    #[error("No repository data found for \"{org}\".")]
    NoRepositoriesFound { org: String },
}

impl Error {
    /// Get the underlying remote error, if this error came from the API.
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::RemoteList { source, .. }
            | Self::RemoteLookup { source, .. }
            | Self::RemoteRead { source, .. }
            | Self::RemoteWrite { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Typed errors returned by a [`RepositoryApi`](crate::api::RepositoryApi).
///
/// Each status variant corresponds to an HTTP error category.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Bad or missing credentials (401).
    #[error("[401] {message}")]
    Authentication { message: String },

    /// Credentials lack access to the resource (403).
    #[error("[403] {message}")]
    Authorization { message: String },

    /// Resource not found (404).
    #[error("[404] {message}")]
    NotFound { message: String },

    /// The sha sent with a write no longer matches the file (409).
    #[error("[409] {message}")]
    Conflict { message: String },

    /// Rate limited (429).
    #[error("[429] {message} (retry after {retry_after}s)")]
    RateLimited { message: String, retry_after: u32 },

    /// Request rejected as invalid (422 and other 4xx).
    #[error("[{status}] {message}")]
    Validation { status: u16, message: String },

    /// Server error (5xx).
    #[error("[{status}] {message}")]
    Server { status: u16, message: String },

    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response body could not be parsed.
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

impl ApiError {
    /// Build the error matching an HTTP status code.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>, retry_after: Option<u32>) -> Self {
        let message = message.into();
        match status {
            401 => Self::Authentication { message },
            403 => Self::Authorization { message },
            404 => Self::NotFound { message },
            409 => Self::Conflict { message },
            429 => Self::RateLimited {
                message,
                retry_after: retry_after.unwrap_or(60),
            },
            s if s >= 500 => Self::Server { status: s, message },
            s => Self::Validation { status: s, message },
        }
    }

    /// Get the HTTP status, if the error came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::Authorization { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::RateLimited { .. } => Some(429),
            Self::Validation { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Http(_) | Self::Deserialize(_) => None,
        }
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Authentication { message }
            | Self::Authorization { message }
            | Self::NotFound { message }
            | Self::Conflict { message }
            | Self::RateLimited { message, .. }
            | Self::Validation { message, .. }
            | Self::Server { message, .. } => message,
            Self::Http(message) | Self::Deserialize(message) => message,
        }
    }

    /// Get the retry-after value for rate limited errors.
    #[must_use]
    pub fn retry_after(&self) -> Option<u32> {
        match self {
            Self::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// Whether a write was rejected because the file changed since it was read.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_categories() {
        assert!(matches!(ApiError::from_status(401, "x", None), ApiError::Authentication { .. }));
        assert!(matches!(ApiError::from_status(403, "x", None), ApiError::Authorization { .. }));
        assert!(matches!(ApiError::from_status(404, "x", None), ApiError::NotFound { .. }));
        assert!(ApiError::from_status(409, "sha mismatch", None).is_conflict());
        assert!(matches!(
            ApiError::from_status(422, "x", None),
            ApiError::Validation { status: 422, .. }
        ));
        assert!(matches!(
            ApiError::from_status(502, "x", None),
            ApiError::Server { status: 502, .. }
        ));
    }

    #[test]
    fn test_rate_limited_defaults_retry_after() {
        let error = ApiError::from_status(429, "Too many requests", None);
        assert_eq!(error.retry_after(), Some(60));
        assert_eq!(error.status(), Some(429));

        let error = ApiError::from_status(429, "Too many requests", Some(5));
        assert_eq!(error.retry_after(), Some(5));
    }

    #[test]
    fn test_transport_errors_have_no_status() {
        let error = ApiError::Http("connection reset".to_string());
        assert_eq!(error.status(), None);
        assert_eq!(error.message(), "connection reset");
    }

    #[test]
    fn test_no_repositories_message() {
        let error = Error::NoRepositoriesFound {
            org: "fakeOrg".to_string(),
        };
        assert_eq!(error.to_string(), "No repository data found for \"fakeOrg\".");
        assert!(error.api_error().is_none());
    }

    #[test]
    fn test_remote_error_keeps_source() {
        use std::error::Error as _;

        let error = Error::RemoteWrite {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            path: "README.md".to_string(),
            source: ApiError::from_status(409, "README.md does not match", None),
        };

        assert_eq!(
            error.to_string(),
            "Failed to update \"README.md\" in \"acme/widgets\": [409] README.md does not match"
        );
        assert!(error.api_error().is_some_and(ApiError::is_conflict));
        assert!(error.source().is_some());
    }
}
