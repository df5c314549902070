//! `launchpad pr open` — open a pull request on the hosted repository.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use launchpad_core::config::git_current_branch_at;
use launchpad_sync::pulls;

use super::{GithubArgs, Workspace};

#[derive(Subcommand, Debug)]
pub enum PrCommand {
    /// Open a pull request merging a branch into the default branch.
    Open(OpenArgs),
}

pub fn run(command: PrCommand) -> Result<()> {
    match command {
        PrCommand::Open(args) => args.run(),
    }
}

/// Arguments for `launchpad pr open`.
#[derive(Args, Debug)]
pub struct OpenArgs {
    #[command(flatten)]
    pub github: GithubArgs,

    /// Branch to merge (default: the checked-out branch).
    #[arg(long)]
    pub head: Option<String>,

    /// Branch to merge into (default: the default branch).
    #[arg(long)]
    pub base: Option<String>,

    /// Pull request title (default: the head branch name).
    #[arg(long)]
    pub title: Option<String>,

    /// Pull request description.
    #[arg(long)]
    pub body: Option<String>,
}

impl OpenArgs {
    pub fn run(self) -> Result<()> {
        let workspace = Workspace::discover()?;
        let (config, client) = workspace.github(self.github)?;

        let head = match self.head {
            Some(head) => head,
            None => git_current_branch_at(&workspace.root)
                .context("could not determine the branch to merge; pass --head")?,
        };
        let base = self.base.unwrap_or_else(|| config.default_branch.clone());
        let draft = pulls::draft(&head, &base, self.title, self.body)?;

        println!(
            "Opening pull request to merge {} into {} on {}",
            draft.head.yellow(),
            draft.base.yellow(),
            config.repo
        );
        let opened = pulls::open(&client, &config.repo, &draft)
            .with_context(|| format!("failed to open a pull request on {}", config.repo))?;
        println!("{} #{} {}", "✓".green(), opened.number, opened.url);
        Ok(())
    }
}
