//! Bulk file updates across GitHub repositories.
//!
//! Given one or more [`TargetSpec`]s (an organization or explicit repository
//! list, a file path, and a content transformer) the [`BulkUpdater`] reads the
//! file from every matching repository, applies the transformer, and commits
//! the result back. Repositories where the transformer returns `None` are left
//! untouched.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use bulk_update::{BulkUpdater, Config, GitHubClient, TargetSpec};
//!
//! # async fn run() -> Result<(), bulk_update::Error> {
//! let client = GitHubClient::new(&Config::from_env()?)?;
//! let updater = BulkUpdater::new(Arc::new(client));
//!
//! let target = TargetSpec::new("acme", "README.md", "docs: add footer", |content, _repo| {
//!     Some(format!("{content}\n---\nMaintained by the platform team.\n"))
//! });
//!
//! let outcomes = updater.bulk_update(&[target]).await?;
//! println!("{} commits", outcomes[0].committed());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod bulk;
pub mod config;
pub mod content;
pub mod error;
pub mod github;
pub mod repository;
pub mod secret;
pub mod target;
pub mod testing;
pub mod types;

// Re-exports
pub use api::RepositoryApi;
pub use bulk::{BulkUpdater, TargetResult};
pub use config::Config;
pub use error::{ApiError, Error, Result};
pub use github::GitHubClient;
pub use repository::{Repository, UpdateFileOptions};
pub use secret::Secret;
pub use target::{ContentTransformer, TargetSpec};
pub use types::{
    CommitIdentity, CommitInfo, CommitResult, FileContent, Owner, RepositoryFile,
    RepositoryMetadata, WriteFileRequest,
};
