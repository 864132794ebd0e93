//! A single repository and the file operations bulk updates perform on it.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::api::RepositoryApi;
use crate::content;
use crate::error::{Error, Result};
use crate::types::{CommitIdentity, CommitResult, RepositoryFile, RepositoryMetadata, WriteFileRequest};

/// Options for [`Repository::update_file`].
pub struct UpdateFileOptions<'a> {
    /// Path of the file to update
    pub file_path: &'a str,
    /// Commit message
    pub message: &'a str,
    /// Produces the new content, or `None` to leave the file alone
    pub content_transformer: &'a (dyn Fn(&str) -> Option<String> + Send + Sync),
    /// Commit author
    pub author: Option<&'a CommitIdentity>,
    /// Commit committer
    pub committer: Option<&'a CommitIdentity>,
    /// Branch to commit to
    pub branch: Option<&'a str>,
}

impl fmt::Debug for UpdateFileOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateFileOptions")
            .field("file_path", &self.file_path)
            .field("message", &self.message)
            .field("author", &self.author)
            .field("committer", &self.committer)
            .field("branch", &self.branch)
            .finish_non_exhaustive()
    }
}

/// Handle binding repository metadata to file operations.
pub struct Repository {
    api: Arc<dyn RepositoryApi>,
    metadata: RepositoryMetadata,
}

impl Repository {
    /// Create a handle for `metadata`.
    pub fn new(api: Arc<dyn RepositoryApi>, metadata: RepositoryMetadata) -> Self {
        Self { api, metadata }
    }

    /// The underlying metadata.
    #[must_use]
    pub fn metadata(&self) -> &RepositoryMetadata {
        &self.metadata
    }

    fn owner(&self) -> &str {
        &self.metadata.owner.login
    }

    fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Read `file_path` from the default branch and decode it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteRead`] if the read fails and [`Error::Decode`]
    /// if the content is not text in a known encoding.
    pub async fn get_content(&self, file_path: &str) -> Result<RepositoryFile> {
        self.read(file_path, None).await
    }

    async fn read(&self, file_path: &str, git_ref: Option<&str>) -> Result<RepositoryFile> {
        debug!(owner = %self.owner(), repo = %self.name(), path = %file_path, "Reading file");

        let file = self
            .api
            .read_file(self.owner(), self.name(), file_path, git_ref)
            .await
            .map_err(|source| Error::RemoteRead {
                owner: self.owner().to_string(),
                repo: self.name().to_string(),
                path: file_path.to_string(),
                source,
            })?;

        let text = content::decode(&file.content, &file.encoding).map_err(|source| Error::Decode {
            owner: self.owner().to_string(),
            repo: self.name().to_string(),
            path: file_path.to_string(),
            source,
        })?;

        Ok(RepositoryFile {
            path: file_path.to_string(),
            content: text,
            sha: file.sha,
        })
    }

    /// Read a file, transform it, and commit the result.
    ///
    /// The write carries the sha of the version just read, so the platform
    /// rejects it if the file changed in between. Returns `Ok(None)` without
    /// writing when the transformer returns `None`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Repository::get_content`], and
    /// [`Error::RemoteWrite`] if the commit fails.
    pub async fn update_file(&self, options: UpdateFileOptions<'_>) -> Result<Option<CommitResult>> {
        let current = self.read(options.file_path, options.branch).await?;

        let Some(new_content) = (options.content_transformer)(&current.content) else {
            info!(
                owner = %self.owner(),
                repo = %self.name(),
                path = %options.file_path,
                "Transformer declined, skipping write"
            );
            return Ok(None);
        };

        let request = WriteFileRequest {
            owner: self.owner().to_string(),
            repo: self.name().to_string(),
            path: options.file_path.to_string(),
            message: options.message.to_string(),
            content: content::encode(&new_content),
            sha: current.sha,
            author: options.author.cloned(),
            committer: options.committer.cloned(),
            branch: options.branch.map(str::to_string),
        };

        debug!(
            owner = %self.owner(),
            repo = %self.name(),
            path = %options.file_path,
            sha = %request.sha,
            "Writing file"
        );

        let result = self.api.write_file(request).await.map_err(|source| Error::RemoteWrite {
            owner: self.owner().to_string(),
            repo: self.name().to_string(),
            path: options.file_path.to_string(),
            source,
        })?;

        info!(
            owner = %self.owner(),
            repo = %self.name(),
            path = %options.file_path,
            commit = %result.commit.sha,
            "File updated"
        );

        Ok(Some(result))
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}
