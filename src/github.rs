//! REST client for GitHub and GitHub Enterprise.
//!
//! Implements [`RepositoryApi`] over the repositories and contents endpoints
//! of the v3 REST API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, Proxy, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::RepositoryApi;
use crate::config::Config;
use crate::error::{ApiError, Error};
use crate::types::{CommitResult, FileContent, RepositoryMetadata, WriteFileRequest};

const MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";
const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// HTTP client for the platform's REST API.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
///
/// use bulk_update::{BulkUpdater, Config, GitHubClient};
///
/// let client = GitHubClient::new(&Config::from_env()?)?;
/// let updater = BulkUpdater::new(Arc::new(client));
/// ```
#[derive(Debug, Clone)]
pub struct GitHubClient {
    api_url: Url,
    client: Client,
}

impl GitHubClient {
    /// Create a client, resolving the secrets in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the access token (or, with
    /// `use_proxy`, the proxy address) cannot be resolved, or if the API URL
    /// or proxy address is malformed.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let api_url = Url::parse(&config.api_url)
            .map_err(|e| Error::Configuration(format!("Invalid API URL {}: {e}", config.api_url)))?;
        if api_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "Invalid API URL {}: not a base URL",
                config.api_url
            )));
        }

        let token = config.access_token.value()?;
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            Error::Configuration("Access token contains characters not allowed in a header".to_string())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        builder = if config.use_proxy {
            let address = config.proxy_address.value()?;
            let proxy = Proxy::all(address)
                .map_err(|e| Error::Configuration(format!("Invalid proxy address {address}: {e}")))?;
            debug!("Routing API requests through proxy");
            builder.proxy(proxy)
        } else {
            builder.no_proxy()
        };

        let client = builder
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { api_url, client })
    }

    /// Get the API base URL.
    #[must_use]
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Build an endpoint URL; every segment is percent-encoded on its own.
    fn endpoint<'a, I>(&self, segments: I) -> Result<Url, ApiError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.api_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ApiError::Http(format!("{} cannot be a base URL", self.api_url)))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn contents_endpoint(&self, owner: &str, repo: &str, path: &str) -> Result<Url, ApiError> {
        let file_segments = path.split('/').filter(|s| !s.is_empty());
        self.endpoint(["repos", owner, repo, "contents"].into_iter().chain(file_segments))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Http(e.to_string()))?;

        if response.status().is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Deserialize(e.to_string()));
        }

        Err(parse_error_response(response).await)
    }
}

#[async_trait]
impl RepositoryApi for GitHubClient {
    async fn list_repositories_by_org(&self, org: &str) -> Result<Vec<RepositoryMetadata>, ApiError> {
        let url = self.endpoint(["orgs", org, "repos"])?;
        debug!(%url, "GET");
        self.send(self.client.get(url)).await
    }

    async fn get_repository(&self, owner: &str, repo: &str) -> Result<RepositoryMetadata, ApiError> {
        let url = self.endpoint(["repos", owner, repo])?;
        debug!(%url, "GET");
        self.send(self.client.get(url)).await
    }

    async fn read_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<FileContent, ApiError> {
        let mut url = self.contents_endpoint(owner, repo, path)?;
        if let Some(git_ref) = git_ref {
            url.query_pairs_mut().append_pair("ref", git_ref);
        }
        debug!(%url, "GET");
        self.send(self.client.get(url)).await
    }

    async fn write_file(&self, request: WriteFileRequest) -> Result<CommitResult, ApiError> {
        let url = self.contents_endpoint(&request.owner, &request.repo, &request.path)?;
        debug!(%url, "PUT");
        self.send(self.client.put(url).json(&request)).await
    }
}

/// Parse an error response into a typed error.
async fn parse_error_response(response: Response) -> ApiError {
    let status = response.status();
    let headers = response.headers();

    let retry_after = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u32>().ok());
    let rate_limit_exhausted = headers
        .get(RATE_LIMIT_REMAINING_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");

    let body: Value = response.json().await.unwrap_or_else(|_| serde_json::json!({}));
    let error = error_from_parts(status, &body, retry_after, rate_limit_exhausted);

    warn!(status = %status, error = %error, "API request failed");
    error
}

/// Classify an error response.
///
/// The platform reports an exhausted primary rate limit as 403 with
/// `x-ratelimit-remaining: 0`; that case is reported as rate limiting.
fn error_from_parts(
    status: StatusCode,
    body: &Value,
    retry_after: Option<u32>,
    rate_limit_exhausted: bool,
) -> ApiError {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string);

    if status == StatusCode::FORBIDDEN && rate_limit_exhausted {
        return ApiError::from_status(StatusCode::TOO_MANY_REQUESTS.as_u16(), message, retry_after);
    }

    ApiError::from_status(status.as_u16(), message, retry_after)
}
