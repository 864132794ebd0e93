//! Targets of a bulk update and their resolution into repositories.

use std::fmt;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use crate::api::RepositoryApi;
use crate::error::{Error, Result};
use crate::types::{CommitIdentity, RepositoryMetadata};

/// Computes the new content of a file from its current content.
///
/// Returning `None` leaves the file untouched.
pub type ContentTransformer = Arc<dyn Fn(&str, &RepositoryMetadata) -> Option<String> + Send + Sync>;

/// One file to update across a set of repositories.
///
/// The repositories are either every repository in `org` or, when `repos` is
/// non-empty, the named repositories in `org`.
#[derive(Clone)]
pub struct TargetSpec {
    /// Organization (or user) owning the repositories
    pub org: String,
    /// Explicit repository names; all repositories of `org` when empty
    pub repos: Option<Vec<String>>,
    /// Path of the file to update
    pub file_path: String,
    /// Commit message
    pub update_message: String,
    /// Produces the new file content
    pub content_transformer: ContentTransformer,
    /// Commit author
    pub author: Option<CommitIdentity>,
    /// Commit committer
    pub committer: Option<CommitIdentity>,
    /// Branch to commit to
    pub branch: Option<String>,
}

impl TargetSpec {
    /// Create a target covering every repository in `org`.
    pub fn new<F>(org: &str, file_path: &str, update_message: &str, content_transformer: F) -> Self
    where
        F: Fn(&str, &RepositoryMetadata) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            org: org.to_string(),
            repos: None,
            file_path: file_path.to_string(),
            update_message: update_message.to_string(),
            content_transformer: Arc::new(content_transformer),
            author: None,
            committer: None,
            branch: None,
        }
    }

    /// Restrict the target to the named repositories.
    #[must_use]
    pub fn with_repos<I, S>(mut self, repos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.repos = Some(repos.into_iter().map(Into::into).collect());
        self
    }

    /// Set the commit author.
    #[must_use]
    pub fn with_author(mut self, author: CommitIdentity) -> Self {
        self.author = Some(author);
        self
    }

    /// Set the commit committer.
    #[must_use]
    pub fn with_committer(mut self, committer: CommitIdentity) -> Self {
        self.committer = Some(committer);
        self
    }

    /// Commit to `branch` instead of the default branch.
    #[must_use]
    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branch = Some(branch.to_string());
        self
    }

    /// The explicit repository names, if name-based resolution applies.
    #[must_use]
    pub fn named_repos(&self) -> Option<&[String]> {
        self.repos.as_deref().filter(|repos| !repos.is_empty())
    }
}

impl fmt::Debug for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetSpec")
            .field("org", &self.org)
            .field("repos", &self.repos)
            .field("file_path", &self.file_path)
            .field("update_message", &self.update_message)
            .field("author", &self.author)
            .field("committer", &self.committer)
            .field("branch", &self.branch)
            .finish_non_exhaustive()
    }
}

/// Resolve the repositories a target applies to.
///
/// # Errors
///
/// Propagates the errors of [`repositories_by_name`] or
/// [`repositories_by_org`], whichever applies.
pub async fn resolve_repositories(api: &dyn RepositoryApi, target: &TargetSpec) -> Result<Vec<RepositoryMetadata>> {
    match target.named_repos() {
        Some(names) => repositories_by_name(api, &target.org, names).await,
        None => repositories_by_org(api, &target.org).await,
    }
}

/// Look up each named repository in `org`, concurrently.
///
/// The result is index-aligned with `names`, whatever order the lookups
/// complete in.
///
/// # Errors
///
/// Returns [`Error::RemoteLookup`] for the first lookup that fails.
pub async fn repositories_by_name(
    api: &dyn RepositoryApi,
    org: &str,
    names: &[String],
) -> Result<Vec<RepositoryMetadata>> {
    debug!(org = %org, count = names.len(), "Resolving repositories by name");

    let lookups = names.iter().map(|name| async move {
        api.get_repository(org, name)
            .await
            .map_err(|source| Error::RemoteLookup {
                org: org.to_string(),
                repo: name.clone(),
                source,
            })
    });

    try_join_all(lookups).await
}

/// List every repository in `org`, as returned by the platform.
///
/// # Errors
///
/// Returns [`Error::RemoteList`] if the listing fails.
pub async fn repositories_by_org(api: &dyn RepositoryApi, org: &str) -> Result<Vec<RepositoryMetadata>> {
    debug!(org = %org, "Resolving repositories by organization");

    api.list_repositories_by_org(org)
        .await
        .map_err(|source| Error::RemoteList {
            org: org.to_string(),
            source,
        })
}
