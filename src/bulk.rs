//! Bulk update orchestration.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{info, warn};

use crate::api::RepositoryApi;
use crate::error::{Error, Result};
use crate::repository::{Repository, UpdateFileOptions};
use crate::target::{resolve_repositories, TargetSpec};
use crate::types::CommitResult;

/// Outcome of one target.
#[derive(Debug, Clone)]
pub struct TargetResult {
    /// Organization of the target
    pub org: String,
    /// Path of the file updated
    pub file_path: String,
    /// One entry per resolved repository, in resolution order; `None` where
    /// the transformer declined to change the file
    pub results: Vec<Option<CommitResult>>,
}

impl TargetResult {
    /// Number of repositories that received a commit.
    #[must_use]
    pub fn committed(&self) -> usize {
        self.results.iter().filter(|r| r.is_some()).count()
    }

    /// Number of repositories left untouched.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.results.len() - self.committed()
    }
}

/// Runs bulk updates against a [`RepositoryApi`].
///
/// Targets are processed one after another. Within a target every
/// repository is read, transformed and written concurrently, and the first
/// failure fails the whole call. Writes that already landed are not undone.
#[derive(Clone)]
pub struct BulkUpdater {
    api: Arc<dyn RepositoryApi>,
}

impl BulkUpdater {
    /// Create an updater.
    pub fn new(api: Arc<dyn RepositoryApi>) -> Self {
        Self { api }
    }

    /// Update every target, returning one [`TargetResult`] per target.
    ///
    /// An empty `targets` list makes no remote calls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRepositoriesFound`] when a target resolves to no
    /// repositories, and otherwise the first resolution, read or write error
    /// encountered.
    pub async fn bulk_update(&self, targets: &[TargetSpec]) -> Result<Vec<TargetResult>> {
        let mut outcomes = Vec::with_capacity(targets.len());

        for target in targets {
            outcomes.push(self.update_target(target).await?);
        }

        Ok(outcomes)
    }

    /// Update a single target.
    ///
    /// # Errors
    ///
    /// See [`BulkUpdater::bulk_update`].
    pub async fn update_target(&self, target: &TargetSpec) -> Result<TargetResult> {
        let repositories = resolve_repositories(self.api.as_ref(), target).await?;

        if repositories.is_empty() {
            warn!(org = %target.org, "No repositories resolved for target");
            return Err(Error::NoRepositoriesFound {
                org: target.org.clone(),
            });
        }

        info!(
            org = %target.org,
            path = %target.file_path,
            repositories = repositories.len(),
            "Updating repositories"
        );

        let handles: Vec<Repository> = repositories
            .into_iter()
            .map(|metadata| Repository::new(Arc::clone(&self.api), metadata))
            .collect();

        let updates = handles.iter().map(|repo| async move {
            let metadata = repo.metadata();
            let transformer = |content: &str| (target.content_transformer)(content, metadata);

            repo.update_file(UpdateFileOptions {
                file_path: &target.file_path,
                message: &target.update_message,
                content_transformer: &transformer,
                author: target.author.as_ref(),
                committer: target.committer.as_ref(),
                branch: target.branch.as_deref(),
            })
            .await
        });

        let results = try_join_all(updates).await?;

        let outcome = TargetResult {
            org: target.org.clone(),
            file_path: target.file_path.clone(),
            results,
        };

        info!(
            org = %outcome.org,
            committed = outcome.committed(),
            skipped = outcome.skipped(),
            "Target complete"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::testing::{MockRepositoryApi, MockResponse};
    use crate::types::{FileContent, RepositoryMetadata};

    fn setup() -> (Arc<MockRepositoryApi>, BulkUpdater) {
        let mock = Arc::new(MockRepositoryApi::new());
        let updater = BulkUpdater::new(mock.clone());
        (mock, updater)
    }

    fn fake_target() -> TargetSpec {
        TargetSpec::new("fakeOrg", "fake/file/path.md", "fakeUpdateMessage", |_, _| {
            Some("expectedContent".to_string())
        })
    }

    #[tokio::test]
    async fn test_empty_targets_do_nothing() {
        let (mock, updater) = setup();

        let outcomes = updater.bulk_update(&[]).await.unwrap();

        assert!(outcomes.is_empty());
        assert!(mock.get_calls(None).is_empty());
    }

    #[tokio::test]
    async fn test_no_repositories_fails_before_any_read() {
        let (mock, updater) = setup();
        mock.configure_org("fakeOrg", MockResponse::with_data(vec![]));

        let err = updater.bulk_update(&[fake_target()]).await.unwrap_err();

        assert!(matches!(&err, Error::NoRepositoriesFound { org } if org == "fakeOrg"));
        assert_eq!(err.to_string(), "No repository data found for \"fakeOrg\".");
        assert_eq!(mock.call_count("list_repositories_by_org"), 1);
        assert!(!mock.was_called("read_file"));
        assert!(!mock.was_called("write_file"));
    }

    #[tokio::test]
    async fn test_updates_every_listed_repository() {
        let (mock, updater) = setup();
        mock.configure_org(
            "fakeOrg",
            MockResponse::with_data(vec![RepositoryMetadata::new("fakeOrg", "fakeRepo")]),
        );
        mock.configure_file(
            "fakeOrg",
            "fakeRepo",
            "fake/file/path.md",
            MockResponse::with_data(FileContent::from_text("TuRtLe", "sha-1")),
        );

        let outcomes = updater.bulk_update(&[fake_target()]).await.unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].results.len(), 1);
        assert_eq!(outcomes[0].committed(), 1);

        let writes = mock.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].content, "ZXhwZWN0ZWRDb250ZW50");
        assert_eq!(writes[0].message, "fakeUpdateMessage");
        assert_eq!(writes[0].sha, "sha-1");
    }

    #[tokio::test]
    async fn test_transformer_sees_repository_metadata() {
        let (mock, updater) = setup();
        mock.configure_org(
            "fakeOrg",
            MockResponse::with_data(vec![
                RepositoryMetadata::new("fakeOrg", "keep"),
                RepositoryMetadata::new("fakeOrg", "change"),
            ]),
        );

        let target = TargetSpec::new("fakeOrg", "README.md", "msg", |content, repo| {
            (repo.name == "change").then(|| format!("{content}{}", repo.slug()))
        });
        let outcomes = updater.bulk_update(&[target]).await.unwrap();

        assert!(outcomes[0].results[0].is_none());
        assert!(outcomes[0].results[1].is_some());
        assert_eq!(outcomes[0].skipped(), 1);

        let writes = mock.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].repo, "change");
        assert_eq!(writes[0].content, crate::content::encode("fakeOrg/change"));
    }

    #[tokio::test]
    async fn test_processes_every_target_in_order() {
        let (mock, updater) = setup();
        mock.configure_org(
            "first",
            MockResponse::with_data(vec![RepositoryMetadata::new("first", "a")]),
        );

        let second = TargetSpec::new("second", "README.md", "msg", |_, _| Some("x".to_string()))
            .with_repos(["b", "c"]);
        let first = TargetSpec::new("first", "README.md", "msg", |_, _| Some("y".to_string()));

        let outcomes = updater.bulk_update(&[first, second]).await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].org, "first");
        assert_eq!(outcomes[0].results.len(), 1);
        assert_eq!(outcomes[1].org, "second");
        assert_eq!(outcomes[1].results.len(), 2);
        assert_eq!(mock.call_count("write_file"), 3);
    }

    #[tokio::test]
    async fn test_write_failure_fails_target_without_rollback() {
        let (mock, updater) = setup();
        mock.configure_org(
            "fakeOrg",
            MockResponse::with_data(vec![
                RepositoryMetadata::new("fakeOrg", "ok"),
                RepositoryMetadata::new("fakeOrg", "broken"),
            ]),
        );
        mock.configure_write_for(
            "fakeOrg",
            "broken",
            MockResponse::with_error(ApiError::from_status(409, "conflict", None)),
        );

        let err = updater.bulk_update(&[fake_target()]).await.unwrap_err();

        assert!(matches!(&err, Error::RemoteWrite { repo, .. } if repo == "broken"));
        assert!(mock.writes().iter().any(|w| w.repo == "ok"));
    }

    #[tokio::test]
    async fn test_failure_stops_later_targets() {
        let (mock, updater) = setup();
        mock.configure_org("empty", MockResponse::with_data(vec![]));
        mock.configure_org(
            "later",
            MockResponse::with_data(vec![RepositoryMetadata::new("later", "repo")]),
        );

        let empty = TargetSpec::new("empty", "README.md", "msg", |_, _| Some(String::new()));
        let later = TargetSpec::new("later", "README.md", "msg", |_, _| Some(String::new()));

        assert!(updater.bulk_update(&[empty, later]).await.is_err());
        assert_eq!(mock.call_count("list_repositories_by_org"), 1);
    }
}
