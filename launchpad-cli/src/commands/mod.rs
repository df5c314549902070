//! Subcommand handlers and the context they share.

pub mod branches;
pub mod config;
pub mod images;
pub mod listings;
pub mod pr;
pub mod release;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use launchpad_core::config::{find_project_root_at, git_origin_url_at, store_path_at};
use launchpad_core::{
    CredentialStore, GithubConfig, GithubOptions, PackageName, PlayOptions, Resolver,
};
use launchpad_remote::{GithubClient, PlayClient};
use launchpad_sync::metadata::metadata_dir_at;

/// Google Play connection flags. Unset values fall back to the environment,
/// then to `launchpad.yaml`.
#[derive(Args, Debug, Clone, Default)]
pub struct PlayArgs {
    /// Application package name (GOOGLE_PLAY_PACKAGE_NAME).
    #[arg(long = "package")]
    pub package_name: Option<String>,

    /// Play Developer API access token (GOOGLE_PLAY_ACCESS_TOKEN).
    #[arg(long = "token")]
    pub access_token: Option<String>,
}

/// GitHub connection flags. Owner and repository default to the `origin`
/// remote.
#[derive(Args, Debug, Clone, Default)]
pub struct GithubArgs {
    /// Repository owner (GITHUB_OWNER).
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name (GITHUB_REPO).
    #[arg(long)]
    pub repo: Option<String>,

    /// API token (GITHUB_TOKEN).
    #[arg(long)]
    pub token: Option<String>,

    /// Branch that cleanup never deletes and new pull requests target
    /// (GITHUB_DEFAULT_BRANCH, default `master`).
    #[arg(long)]
    pub default_branch: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct MetadataArgs {
    /// Local metadata tree (default: <project>/metadata/android).
    #[arg(long)]
    pub metadata_dir: Option<PathBuf>,
}

/// The enclosing project: its root and credential store.
pub struct Workspace {
    pub root: PathBuf,
    pub store: CredentialStore,
}

impl Workspace {
    pub fn discover() -> Result<Self> {
        let cwd = std::env::current_dir().context("could not determine working directory")?;
        let root = find_project_root_at(&cwd)?;
        let store_path = store_path_at(&root);
        let store = CredentialStore::load_at(&store_path)
            .with_context(|| format!("failed to load {}", store_path.display()))?;
        Ok(Self { root, store })
    }

    pub fn metadata_dir(&self, args: MetadataArgs) -> PathBuf {
        args.metadata_dir
            .unwrap_or_else(|| metadata_dir_at(&self.root))
    }

    pub fn play(&self, args: PlayArgs) -> Result<(PackageName, PlayClient)> {
        let resolver = Resolver::new(&self.store);
        let config = PlayOptions {
            package_name: args.package_name,
            access_token: args.access_token,
        }
        .resolve(&resolver)
        .context("Google Play is not configured")?;
        tracing::info!(app = %config.package_name, "using Google Play");
        Ok((config.package_name, PlayClient::new(config.access_token)))
    }

    pub fn github(&self, args: GithubArgs) -> Result<(GithubConfig, GithubClient)> {
        let resolver = Resolver::new(&self.store);
        let config = GithubOptions {
            token: args.token,
            owner: args.owner,
            repo: args.repo,
            default_branch: args.default_branch,
        }
        .resolve(&resolver, || git_origin_url_at(&self.root))
        .context("GitHub is not configured")?;
        tracing::info!(repo = %config.repo, default_branch = %config.default_branch, "using GitHub");
        let client = GithubClient::new(config.token.clone());
        Ok((config, client))
    }
}
