//! Integration tests against a live GitHub (or GitHub Enterprise) instance.
//!
//! These tests need a token with write access to a scratch repository that
//! already contains the test file.
//!
//! To run these tests:
//! ```bash
//! BULK_UPDATE_INTEGRATION_TESTS=1 \
//! GITHUB_ACCESS_TOKEN=... \
//! BULK_UPDATE_TEST_ORG=my-org \
//! BULK_UPDATE_TEST_REPO=scratch \
//! cargo test --test integration_tests -- --ignored
//! ```
//!
//! `BULK_UPDATE_TEST_FILE` names the file to rewrite (default
//! `bulk-update-test.md`); `BULK_UPDATE_API_URL` points at an Enterprise host.

use std::env;
use std::sync::Arc;

use bulk_update::{
    ApiError, BulkUpdater, Config, Error, GitHubClient, Repository, RepositoryApi, TargetSpec,
};
use uuid::Uuid;

/// Check if integration tests should run.
fn should_run_integration_tests() -> bool {
    env::var("BULK_UPDATE_INTEGRATION_TESTS").map_or(false, |v| v == "1")
}

fn test_org() -> String {
    env::var("BULK_UPDATE_TEST_ORG").expect("BULK_UPDATE_TEST_ORG must be set")
}

fn test_repo() -> String {
    env::var("BULK_UPDATE_TEST_REPO").expect("BULK_UPDATE_TEST_REPO must be set")
}

fn test_file() -> String {
    env::var("BULK_UPDATE_TEST_FILE").unwrap_or_else(|_| "bulk-update-test.md".to_string())
}

/// Generate a unique name for test resources.
fn generate_unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().to_string()[..8])
}

fn create_client() -> Arc<GitHubClient> {
    let config = Config::from_env().expect("Config should load");
    Arc::new(GitHubClient::new(&config).expect("Client creation should succeed"))
}

mod lookups {
    use super::*;

    #[tokio::test]
    #[ignore = "Integration test requires BULK_UPDATE_INTEGRATION_TESTS=1 and a GitHub token"]
    async fn test_get_repository() {
        if !should_run_integration_tests() {
            return;
        }

        let client = create_client();
        let repo = client
            .get_repository(&test_org(), &test_repo())
            .await
            .expect("Repository lookup should succeed");

        assert_eq!(repo.name, test_repo());
        assert!(repo.owner.login.eq_ignore_ascii_case(&test_org()));
        assert!(repo.default_branch.is_some());
    }

    #[tokio::test]
    #[ignore = "Integration test requires BULK_UPDATE_INTEGRATION_TESTS=1 and a GitHub token"]
    async fn test_list_includes_scratch_repository() {
        if !should_run_integration_tests() {
            return;
        }

        let client = create_client();
        let repos = client
            .list_repositories_by_org(&test_org())
            .await
            .expect("Listing should succeed");

        assert!(!repos.is_empty());
    }

    #[tokio::test]
    #[ignore = "Integration test requires BULK_UPDATE_INTEGRATION_TESTS=1 and a GitHub token"]
    async fn test_missing_repository_is_not_found() {
        if !should_run_integration_tests() {
            return;
        }

        let client = create_client();
        let result = client
            .get_repository(&test_org(), &generate_unique_name("missing"))
            .await;

        match result {
            Err(ApiError::NotFound { .. }) => {}
            Err(e) => panic!("Expected NotFound error, got: {e:?}"),
            Ok(_) => panic!("Expected error, got success"),
        }
    }

    #[tokio::test]
    #[ignore = "Integration test requires BULK_UPDATE_INTEGRATION_TESTS=1 and a GitHub token"]
    async fn test_missing_file_is_remote_read() {
        if !should_run_integration_tests() {
            return;
        }

        let client = create_client();
        let metadata = client
            .get_repository(&test_org(), &test_repo())
            .await
            .expect("Repository lookup should succeed");
        let repo = Repository::new(client, metadata);

        let err = repo
            .get_content(&format!("{}.md", generate_unique_name("missing")))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::RemoteRead { .. }));
        assert!(matches!(err.api_error(), Some(ApiError::NotFound { .. })));
    }
}

mod updates {
    use super::*;

    #[tokio::test]
    #[ignore = "Integration test requires BULK_UPDATE_INTEGRATION_TESTS=1 and a GitHub token"]
    async fn test_bulk_update_appends_marker() {
        if !should_run_integration_tests() {
            return;
        }

        let client = create_client();
        let marker = generate_unique_name("bulk-update");

        let line = marker.clone();
        let target = TargetSpec::new(&test_org(), &test_file(), "test: append marker", move |content, _| {
            Some(format!("{}\n{line}\n", content.trim_end()))
        })
        .with_repos([test_repo()]);

        let outcomes = BulkUpdater::new(client.clone())
            .bulk_update(&[target])
            .await
            .expect("Bulk update should succeed");
        assert_eq!(outcomes[0].committed(), 1);

        let metadata = client
            .get_repository(&test_org(), &test_repo())
            .await
            .expect("Repository lookup should succeed");
        let file = Repository::new(client, metadata)
            .get_content(&test_file())
            .await
            .expect("Read back should succeed");

        assert!(file.content.trim_end().ends_with(&marker));
    }

    #[tokio::test]
    #[ignore = "Integration test requires BULK_UPDATE_INTEGRATION_TESTS=1 and a GitHub token"]
    async fn test_declined_transform_leaves_file_unchanged() {
        if !should_run_integration_tests() {
            return;
        }

        let client = create_client();
        let metadata = client
            .get_repository(&test_org(), &test_repo())
            .await
            .expect("Repository lookup should succeed");
        let repo = Repository::new(client.clone(), metadata);
        let before = repo.get_content(&test_file()).await.expect("Read should succeed");

        let target = TargetSpec::new(&test_org(), &test_file(), "test: no-op", |_, _| None)
            .with_repos([test_repo()]);
        let outcomes = BulkUpdater::new(client)
            .bulk_update(&[target])
            .await
            .expect("Bulk update should succeed");
        assert_eq!(outcomes[0].skipped(), 1);

        let after = repo.get_content(&test_file()).await.expect("Read should succeed");
        assert_eq!(before.sha, after.sha);
    }
}
