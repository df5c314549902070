//! `launchpad config` — inspect and edit `launchpad.yaml`.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use super::Workspace;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print a stored value.
    Get {
        /// Key, e.g. GITHUB_TOKEN.
        key: String,
    },

    /// Store a value.
    Set {
        /// Key, e.g. GOOGLE_PLAY_PACKAGE_NAME.
        key: String,
        value: String,
    },
}

pub fn run(command: ConfigCommand) -> Result<()> {
    let mut workspace = Workspace::discover()?;
    match command {
        ConfigCommand::Get { key } => {
            let value = workspace.store.get_or_fail(&key)?;
            println!("{value}");
        }
        ConfigCommand::Set { key, value } => {
            workspace
                .store
                .put(&key, &value)
                .with_context(|| format!("failed to save {key}"))?;
            println!(
                "{} {key} saved to {}",
                "✓".green(),
                workspace.store.path().display()
            );
        }
    }
    Ok(())
}
