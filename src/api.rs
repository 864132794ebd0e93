//! The remote operations bulk updates are built on.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::{CommitResult, FileContent, RepositoryMetadata, WriteFileRequest};

/// Repository API backend trait.
///
/// Implementations include [`GitHubClient`](crate::github::GitHubClient) for
/// the real platform and [`MockRepositoryApi`](crate::testing::MockRepositoryApi)
/// for tests.
#[async_trait]
pub trait RepositoryApi: Send + Sync {
    /// List the repositories of an organization.
    ///
    /// Only the first page the platform returns is used.
    async fn list_repositories_by_org(&self, org: &str) -> Result<Vec<RepositoryMetadata>, ApiError>;

    /// Get a single repository.
    async fn get_repository(&self, owner: &str, repo: &str) -> Result<RepositoryMetadata, ApiError>;

    /// Read a file.
    ///
    /// `git_ref` selects a branch, tag or commit; the default branch is read
    /// when it is `None`.
    async fn read_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<FileContent, ApiError>;

    /// Replace a file, conditional on `request.sha` still being current.
    async fn write_file(&self, request: WriteFileRequest) -> Result<CommitResult, ApiError>;
}
