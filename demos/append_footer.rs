//! Append a footer to `README.md` in every repository of an organization.
//!
//! ```bash
//! GITHUB_ACCESS_TOKEN=... cargo run --example append_footer -- my-org [footer.md]
//! ```
//!
//! The footer defaults to `demos/update-message.md`. Repositories whose README
//! already ends with the footer are left alone.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use bulk_update::{BulkUpdater, Config, GitHubClient, TargetSpec};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SEPARATOR: &str = "\n---\n";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bulk_update=info,append_footer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = env::args().skip(1);
    let org = args.next().unwrap_or_else(|| "bulk-update".to_string());
    let footer_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/update-message.md"));

    let footer = fs::read_to_string(&footer_path)?;
    let footer = footer.trim_end().to_string();

    let config = Config::from_env()?;
    let client = GitHubClient::new(&config)?;
    info!(api_url = %client.api_url(), org = %org, "Starting bulk update");

    let target = TargetSpec::new(&org, "README.md", "docs: update README footer", move |content, repo| {
        if content.trim_end().ends_with(&footer) {
            info!(repo = %repo.slug(), "Footer already present");
            return None;
        }

        info!(repo = %repo.slug(), "Updating");
        Some(format!("{content}{SEPARATOR}{footer}\n"))
    });

    let outcomes = BulkUpdater::new(Arc::new(client)).bulk_update(&[target]).await?;

    for outcome in &outcomes {
        info!(
            org = %outcome.org,
            committed = outcome.committed(),
            skipped = outcome.skipped(),
            "Done"
        );
    }

    Ok(())
}
