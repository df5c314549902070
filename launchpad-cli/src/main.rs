//! launchpad — store listing, release and branch hygiene CLI.
//!
//! # Usage
//!
//! ```text
//! launchpad branches clean [--exclude <regex>] [--dry-run] [--yes]
//! launchpad listings pull|diff|push
//! launchpad images list|pull
//! launchpad images push <category> [--language <code>] [--keep-existing]
//! launchpad release beta <artifact> [--version-code N] [--release-name NAME --replace-version-code N]
//! launchpad release promote <version-code> --rollout <percent>
//! launchpad release notes <version-code>
//! launchpad pr open [--head <branch>] [--base <branch>] [--title <text>] [--body <text>]
//! launchpad config get <KEY>
//! launchpad config set <KEY> <VALUE>
//! ```

mod commands;
mod prompt;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    branches::BranchesCommand, config::ConfigCommand, images::ImagesCommand,
    listings::ListingsCommand, pr::PrCommand, release::ReleaseCommand,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "launchpad",
    version,
    about = "Reconcile app-store listings, releases and repository branches",
    long_about = None,
)]
struct Cli {
    /// Log every remote operation.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clean up branches on the hosted repository.
    Branches {
        #[command(subcommand)]
        command: BranchesCommand,
    },

    /// Open pull requests on the hosted repository.
    Pr {
        #[command(subcommand)]
        command: PrCommand,
    },

    /// Pull, preview and push store listing text.
    Listings {
        #[command(subcommand)]
        command: ListingsCommand,
    },

    /// Inspect, download and replace store images.
    Images {
        #[command(subcommand)]
        command: ImagesCommand,
    },

    /// Upload builds, promote them and attach release notes.
    Release {
        #[command(subcommand)]
        command: ReleaseCommand,
    },

    /// Read and write the project credential store.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Branches { command } => commands::branches::run(command),
        Commands::Pr { command } => commands::pr::run(command),
        Commands::Listings { command } => commands::listings::run(command),
        Commands::Images { command } => commands::images::run(command),
        Commands::Release { command } => commands::release::run(command),
        Commands::Config { command } => commands::config::run(command),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
