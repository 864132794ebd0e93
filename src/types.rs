//! Data models exchanged with the repository API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Owner of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// User or organization login
    pub login: String,
}

/// Repository metadata as returned by the API.
///
/// Only the fields the crate relies on are typed; everything else the API
/// sends is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    /// Repository name
    pub name: String,
    /// Repository owner
    pub owner: Owner,
    /// "owner/name"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Default branch name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    /// Remaining remote fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RepositoryMetadata {
    /// Create metadata with just a name and owner login.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: Owner {
                login: owner.into(),
            },
            full_name: None,
            default_branch: None,
            extra: Map::new(),
        }
    }

    /// "owner/name", computed when the API did not send it.
    #[must_use]
    pub fn slug(&self) -> String {
        self.full_name
            .clone()
            .unwrap_or_else(|| format!("{}/{}", self.owner.login, self.name))
    }
}

/// Raw file body as returned by a read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    /// Encoded file body
    #[serde(default)]
    pub content: String,
    /// Encoding of `content`, normally "base64"
    pub encoding: String,
    /// Blob sha of the file, required to update it
    pub sha: String,
    /// Path within the repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl FileContent {
    /// Build a base64 file body from text.
    #[must_use]
    pub fn from_text(text: &str, sha: &str) -> Self {
        Self {
            content: crate::content::encode(text),
            encoding: "base64".to_string(),
            sha: sha.to_string(),
            path: None,
            size: Some(text.len() as u64),
        }
    }
}

/// A file read from a repository with its content decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryFile {
    /// Path within the repository
    pub path: String,
    /// Decoded text
    pub content: String,
    /// Blob sha of the version read
    pub sha: String,
}

/// Author or committer of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitIdentity {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// ISO 8601 timestamp; the server uses the current time when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl CommitIdentity {
    /// Create an identity without a date.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            date: None,
        }
    }
}

/// Everything a write needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteFileRequest {
    /// Repository owner login
    #[serde(skip)]
    pub owner: String,
    /// Repository name
    #[serde(skip)]
    pub repo: String,
    /// Path within the repository
    #[serde(skip)]
    pub path: String,
    /// Commit message
    pub message: String,
    /// Base64 encoded new content
    pub content: String,
    /// Blob sha of the version being replaced
    pub sha: String,
    /// Commit author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<CommitIdentity>,
    /// Commit committer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committer: Option<CommitIdentity>,
    /// Target branch, default branch when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Commit created by a write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit sha
    pub sha: String,
    /// Commit message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Web URL of the commit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
    /// Remaining remote fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitResult {
    /// The file as stored after the commit
    #[serde(default)]
    pub content: Option<Value>,
    /// The commit itself
    pub commit: CommitInfo,
}
