//! `launchpad listings` — store listing text.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use launchpad_core::ListingRecord;
use launchpad_sync::{listing, metadata, with_edit, ListingChanges, WriteResult};

use super::{MetadataArgs, PlayArgs, Workspace};
use crate::prompt;

#[derive(Subcommand, Debug)]
pub enum ListingsCommand {
    /// Replace the local listing text with the published one.
    Pull(PullArgs),

    /// Show how the local listings differ from the published ones.
    Diff(DiffArgs),

    /// Publish the local listings, removing languages deleted locally.
    Push(PushArgs),
}

pub fn run(command: ListingsCommand) -> Result<()> {
    match command {
        ListingsCommand::Pull(args) => args.run(),
        ListingsCommand::Diff(args) => args.run(),
        ListingsCommand::Push(args) => args.run(),
    }
}

#[derive(Args, Debug)]
pub struct PullArgs {
    #[command(flatten)]
    pub play: PlayArgs,

    #[command(flatten)]
    pub metadata: MetadataArgs,
}

impl PullArgs {
    pub fn run(self) -> Result<()> {
        let workspace = Workspace::discover()?;
        let dir = workspace.metadata_dir(self.metadata);
        let (app, client) = workspace.play(self.play)?;

        let remote = with_edit(&client, &app, |session| listing::fetch_remote(session))
            .context("failed to fetch listings")?;

        let removed = metadata::clear_cached_listings(&dir)
            .with_context(|| format!("failed to clear {}", dir.display()))?;
        tracing::info!(removed, "cleared cached listings");
        let writes = metadata::write_listings(&dir, &remote)
            .with_context(|| format!("failed to write listings to {}", dir.display()))?;

        print_writes(&dir, remote.len(), &writes);
        Ok(())
    }
}

fn print_writes(dir: &Path, languages: usize, writes: &[WriteResult]) {
    let written = writes
        .iter()
        .filter(|w| matches!(w, WriteResult::Written { .. }))
        .count();
    println!(
        "{} pulled {languages} languages into {} ({written} written, {} unchanged)",
        "✓".green(),
        dir.display(),
        writes.len() - written
    );
    for write in writes {
        match write {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
        }
    }
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub play: PlayArgs,

    #[command(flatten)]
    pub metadata: MetadataArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let workspace = Workspace::discover()?;
        let dir = workspace.metadata_dir(self.metadata);
        let local = load_local(&dir)?;
        let (app, client) = workspace.play(self.play)?;

        let remote = with_edit(&client, &app, |session| listing::fetch_remote(session))
            .context("failed to fetch listings")?;
        let changes = listing::diff(&local, &remote);
        if changes.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for update in &changes.updates {
            let published = remote.iter().find(|r| r.language == update.language);
            for diff in listing::field_diffs(update, published) {
                print!("{}", diff.unified_diff);
                if !diff.unified_diff.ends_with('\n') {
                    println!();
                }
            }
        }
        for language in &changes.removals {
            println!("{}", format!("--- {language} (removed locally)").red());
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct PushArgs {
    #[command(flatten)]
    pub play: PlayArgs,

    #[command(flatten)]
    pub metadata: MetadataArgs,

    /// Push without asking for confirmation.
    #[arg(long, short)]
    pub yes: bool,
}

impl PushArgs {
    pub fn run(self) -> Result<()> {
        let workspace = Workspace::discover()?;
        let dir = workspace.metadata_dir(self.metadata);
        let local = load_local(&dir)?;
        let (app, client) = workspace.play(self.play)?;

        let remote = with_edit(&client, &app, |session| listing::fetch_remote(session))
            .context("failed to fetch listings")?;
        let changes = listing::diff(&local, &remote);
        if changes.is_empty() {
            println!("Nothing to update.");
            return Ok(());
        }

        describe(&changes);
        if !self.yes && !prompt::confirm("Are you sure you want to proceed?")? {
            println!("Aborted.");
            return Ok(());
        }

        with_edit(&client, &app, |session| listing::apply(session, &changes))
            .context("failed to publish listings")?;
        println!("{} listings published", "✓".green());
        Ok(())
    }
}

fn load_local(dir: &Path) -> Result<Vec<ListingRecord>> {
    metadata::ensure_exists(dir)?;
    metadata::load_listings(dir).with_context(|| format!("failed to read {}", dir.display()))
}

fn describe(changes: &ListingChanges) {
    if !changes.updates.is_empty() {
        let languages: Vec<&str> = changes.updates.iter().map(|r| r.language.as_str()).collect();
        println!("You're about to UPDATE languages: {}", languages.join(", ").yellow());
    }
    if !changes.removals.is_empty() {
        let languages: Vec<&str> = changes.removals.iter().map(|l| l.as_str()).collect();
        println!("You're about to REMOVE languages: {}", languages.join(", ").red());
    }
}
