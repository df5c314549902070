//! `launchpad branches clean` — delete branches whose work has landed.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use regex::Regex;

use launchpad_core::SourceControlService;
use launchpad_sync::{delete_branches, deletable};

use super::{GithubArgs, Workspace};
use crate::prompt;

#[derive(Subcommand, Debug)]
pub enum BranchesCommand {
    /// Delete branches whose pull requests are all merged or closed.
    Clean(CleanArgs),
}

pub fn run(command: BranchesCommand) -> Result<()> {
    match command {
        BranchesCommand::Clean(args) => args.run(),
    }
}

/// Arguments for `launchpad branches clean`.
#[derive(Args, Debug)]
pub struct CleanArgs {
    #[command(flatten)]
    pub github: GithubArgs,

    /// Keep every branch whose name matches this regular expression.
    #[arg(long)]
    pub exclude: Option<String>,

    /// List deletable branches without deleting anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Delete without asking for confirmation.
    #[arg(long, short)]
    pub yes: bool,
}

impl CleanArgs {
    pub fn run(self) -> Result<()> {
        let exclude = self
            .exclude
            .as_deref()
            .map(Regex::new)
            .transpose()
            .context("invalid --exclude pattern")?;

        let workspace = Workspace::discover()?;
        let (config, client) = workspace.github(self.github)?;

        let branches = client
            .list_branches_with_pull_requests(&config.repo)
            .with_context(|| format!("failed to list branches of {}", config.repo))?;
        let names = deletable(&branches, &config.default_branch, |name| {
            exclude.as_ref().map_or(false, |re| re.is_match(name))
        });

        if names.is_empty() {
            println!("No branches to delete in {}.", config.repo);
            return Ok(());
        }

        println!(
            "{} of {} branches in {} can be deleted:",
            names.len(),
            branches.len(),
            config.repo
        );
        for name in &names {
            println!("  {}", name.yellow());
        }

        if self.dry_run {
            println!("[dry-run] nothing deleted");
            return Ok(());
        }
        if !self.yes && !prompt::confirm("Delete these branches?")? {
            println!("Aborted.");
            return Ok(());
        }

        let report = delete_branches(&client, &config.repo, &names);
        for name in &report.deleted {
            println!("  {} {name}", "✓".green());
        }
        for (name, err) in &report.failed {
            eprintln!("  {} {name}: {err}", "✗".red());
        }
        if report.has_failures() {
            bail!(
                "{} of {} branch deletions failed",
                report.failed.len(),
                names.len()
            );
        }
        println!("Deleted {} branches.", report.deleted.len());
        Ok(())
    }
}
