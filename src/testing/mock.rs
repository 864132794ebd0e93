//! Mock repository API for testing.
//!
//! Provides a `MockRepositoryApi` that implements [`RepositoryApi`] in memory
//! and records every call made through it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Map;

use crate::api::RepositoryApi;
use crate::error::ApiError;
use crate::types::{CommitInfo, CommitResult, FileContent, RepositoryMetadata, WriteFileRequest};

/// Record of a method call.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// Method name (e.g., "read_file", "write_file")
    pub method: String,
    /// Arguments passed to the method
    pub args: Vec<String>,
    /// Timestamp of the call
    pub timestamp: DateTime<Utc>,
}

impl MockCall {
    /// Create a new mock call record.
    pub fn new(method: &str, args: Vec<String>) -> Self {
        Self {
            method: method.to_string(),
            args,
            timestamp: Utc::now(),
        }
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub struct MockResponse<T: Clone> {
    /// The data to return
    pub data: Option<T>,
    /// The error to return instead of data
    pub error: Option<ApiError>,
    /// Number of times this response has been used
    pub call_count: u32,
}

impl<T: Clone> Default for MockResponse<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            call_count: 0,
        }
    }
}

impl<T: Clone> MockResponse<T> {
    /// Create a new mock response with data.
    pub fn with_data(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            call_count: 0,
        }
    }

    /// Create a new mock response with an error.
    pub fn with_error(error: ApiError) -> Self {
        Self {
            data: None,
            error: Some(error),
            call_count: 0,
        }
    }

    /// Get the result, returning either the configured data or error.
    fn get_result(&mut self, default: impl FnOnce() -> T) -> Result<T, ApiError> {
        self.call_count += 1;
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(self.data.clone().unwrap_or_else(default))
    }
}

type RepoKey = (String, String);
type FileKey = (String, String, String);

fn repo_key(owner: &str, repo: &str) -> RepoKey {
    (owner.to_string(), repo.to_string())
}

/// Internal state for the mock.
#[derive(Default)]
struct MockState {
    calls: Vec<MockCall>,
    writes: Vec<WriteFileRequest>,
    org_listings: HashMap<String, MockResponse<Vec<RepositoryMetadata>>>,
    repositories: HashMap<RepoKey, MockResponse<RepositoryMetadata>>,
    files: HashMap<FileKey, MockResponse<FileContent>>,
    repo_writes: HashMap<RepoKey, MockResponse<CommitResult>>,
    write_response: MockResponse<CommitResult>,
    delays: HashMap<RepoKey, Duration>,
}

impl MockState {
    fn record_call(&mut self, method: &str, args: Vec<String>) {
        self.calls.push(MockCall::new(method, args));
    }

    fn delay_for(&self, owner: &str, repo: &str) -> Option<Duration> {
        self.delays.get(&repo_key(owner, repo)).copied()
    }
}

/// In-memory [`RepositoryApi`] for tests.
///
/// Unconfigured calls succeed with plausible defaults: organizations have no
/// repositories, repositories exist, files are empty, and writes produce a
/// commit. Configure specific responses or errors with the `configure_*`
/// methods.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use bulk_update::testing::{MockRepositoryApi, MockResponse};
/// use bulk_update::{BulkUpdater, RepositoryMetadata, TargetSpec};
///
/// let mock = Arc::new(MockRepositoryApi::new());
/// mock.configure_org("acme", MockResponse::with_data(vec![
///     RepositoryMetadata::new("acme", "widgets"),
/// ]));
///
/// let updater = BulkUpdater::new(mock.clone());
/// let target = TargetSpec::new("acme", "README.md", "chore: update", |content, _| {
///     Some(format!("{content}\nfooter"))
/// });
/// # let _ = (updater, target);
/// assert!(!mock.was_called("write_file"));
/// ```
pub struct MockRepositoryApi {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockRepositoryApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRepositoryApi {
    /// Create a new mock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Configure the listing returned for `org`.
    pub fn configure_org(&self, org: &str, response: MockResponse<Vec<RepositoryMetadata>>) {
        self.lock().org_listings.insert(org.to_string(), response);
    }

    /// Configure the metadata returned for `owner/repo`.
    pub fn configure_repository(
        &self,
        owner: &str,
        repo: &str,
        response: MockResponse<RepositoryMetadata>,
    ) {
        self.lock().repositories.insert(repo_key(owner, repo), response);
    }

    /// Configure the file returned for `path` in `owner/repo`.
    pub fn configure_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        response: MockResponse<FileContent>,
    ) {
        self.lock()
            .files
            .insert((owner.to_string(), repo.to_string(), path.to_string()), response);
    }

    /// Configure the response for every write.
    pub fn configure_write(&self, response: MockResponse<CommitResult>) {
        self.lock().write_response = response;
    }

    /// Configure the response for writes to `owner/repo` only.
    pub fn configure_write_for(&self, owner: &str, repo: &str, response: MockResponse<CommitResult>) {
        self.lock().repo_writes.insert(repo_key(owner, repo), response);
    }

    /// Delay every call touching `owner/repo` by `delay`.
    pub fn configure_delay(&self, owner: &str, repo: &str, delay: Duration) {
        self.lock().delays.insert(repo_key(owner, repo), delay);
    }

    /// Check if a method was called.
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.lock().calls.iter().any(|call| call.method == method)
    }

    /// Get the number of times a method was called.
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    /// Get recorded calls, optionally filtered by method.
    #[must_use]
    pub fn get_calls(&self, method: Option<&str>) -> Vec<MockCall> {
        let state = self.lock();
        match method {
            Some(m) => state.calls.iter().filter(|call| call.method == m).cloned().collect(),
            None => state.calls.clone(),
        }
    }

    /// Get every write request received, in arrival order.
    #[must_use]
    pub fn writes(&self) -> Vec<WriteFileRequest> {
        self.lock().writes.clone()
    }

    /// Reset all recorded calls and writes.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.calls.clear();
        state.writes.clear();
    }

    async fn pause(&self, delay: Option<Duration>) {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl RepositoryApi for MockRepositoryApi {
    async fn list_repositories_by_org(&self, org: &str) -> Result<Vec<RepositoryMetadata>, ApiError> {
        let mut state = self.lock();
        state.record_call("list_repositories_by_org", vec![org.to_string()]);

        state
            .org_listings
            .entry(org.to_string())
            .or_default()
            .get_result(Vec::new)
    }

    async fn get_repository(&self, owner: &str, repo: &str) -> Result<RepositoryMetadata, ApiError> {
        let delay = {
            let mut state = self.lock();
            state.record_call("get_repository", vec![owner.to_string(), repo.to_string()]);
            state.delay_for(owner, repo)
        };
        self.pause(delay).await;

        self.lock()
            .repositories
            .entry(repo_key(owner, repo))
            .or_default()
            .get_result(|| RepositoryMetadata::new(owner, repo))
    }

    async fn read_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<FileContent, ApiError> {
        let delay = {
            let mut state = self.lock();
            state.record_call("read_file", vec![
                owner.to_string(),
                repo.to_string(),
                path.to_string(),
                format!("{git_ref:?}"),
            ]);
            state.delay_for(owner, repo)
        };
        self.pause(delay).await;

        self.lock()
            .files
            .entry((owner.to_string(), repo.to_string(), path.to_string()))
            .or_default()
            .get_result(|| FileContent::from_text("", &format!("mock-sha-{owner}-{repo}")))
    }

    async fn write_file(&self, request: WriteFileRequest) -> Result<CommitResult, ApiError> {
        let delay = {
            let mut state = self.lock();
            state.record_call("write_file", vec![
                request.owner.clone(),
                request.repo.clone(),
                request.path.clone(),
                request.message.clone(),
            ]);
            state.delay_for(&request.owner, &request.repo)
        };
        self.pause(delay).await;

        let mut guard = self.lock();
        let state = &mut *guard;
        state.writes.push(request.clone());

        let default = || CommitResult {
            content: None,
            commit: CommitInfo {
                sha: format!("mock-commit-{}-{}", request.owner, request.repo),
                message: Some(request.message.clone()),
                html_url: None,
                extra: Map::new(),
            },
        };

        let key = repo_key(&request.owner, &request.repo);
        match state.repo_writes.get_mut(&key) {
            Some(response) => response.get_result(default),
            None => state.write_response.get_result(default),
        }
    }
}
