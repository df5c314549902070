//! `launchpad release` — beta uploads, production rollouts, release notes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use launchpad_core::Track;
use launchpad_sync::{metadata, rollout, with_edit, BetaUpload, Promotion, VersionOverride};

use super::{MetadataArgs, PlayArgs, Workspace};

#[derive(Subcommand, Debug)]
pub enum ReleaseCommand {
    /// Upload a bundle or APK and make it the beta release.
    Beta(BetaArgs),

    /// Roll a version out to production.
    Promote(PromoteArgs),

    /// Attach local changelogs to a release.
    Notes(NotesArgs),
}

pub fn run(command: ReleaseCommand) -> Result<()> {
    match command {
        ReleaseCommand::Beta(args) => args.run(),
        ReleaseCommand::Promote(args) => args.run(),
        ReleaseCommand::Notes(args) => args.run(),
    }
}

#[derive(Args, Debug)]
pub struct BetaArgs {
    /// Path to the .aab or .apk to upload.
    pub artifact: PathBuf,

    /// Version code of the artifact, used when it was already uploaded.
    #[arg(long)]
    pub version_code: Option<i64>,

    /// Production release whose version codes the beta release reuses.
    #[arg(long, requires = "replace_version_code")]
    pub release_name: Option<String>,

    /// Version code in that release to swap for the uploaded one.
    #[arg(long, requires = "release_name")]
    pub replace_version_code: Option<i64>,

    #[command(flatten)]
    pub play: PlayArgs,
}

impl BetaArgs {
    pub fn run(self) -> Result<()> {
        let version_override = match (self.release_name, self.replace_version_code) {
            (Some(release_name), Some(replace_version_code)) => Some(VersionOverride {
                release_name,
                replace_version_code,
            }),
            _ => None,
        };
        let upload = BetaUpload::prepare(&self.artifact, self.version_code, version_override)?;

        let workspace = Workspace::discover()?;
        let (app, client) = workspace.play(self.play)?;
        let outcome = with_edit(&client, &app, |session| rollout::upload_to_beta(session, &upload))
            .with_context(|| format!("beta upload of {} failed", self.artifact.display()))?;

        if outcome.already_uploaded {
            println!(
                "{} version {} was already uploaded",
                "!".yellow(),
                outcome.version_code
            );
        }
        let codes: Vec<String> = outcome.version_codes.iter().map(i64::to_string).collect();
        println!(
            "{} beta now serves version codes [{}]",
            "✓".green(),
            codes.join(", ")
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct PromoteArgs {
    /// Version code (release name) to promote.
    pub version_code: i64,

    /// Percentage of production users receiving the release (1-100).
    #[arg(long)]
    pub rollout: u8,

    #[command(flatten)]
    pub play: PlayArgs,
}

impl PromoteArgs {
    pub fn run(self) -> Result<()> {
        let promotion = Promotion::prepare(self.version_code, self.rollout)?;

        let workspace = Workspace::discover()?;
        let (app, client) = workspace.play(self.play)?;
        let first_rollout = with_edit(&client, &app, |session| rollout::promote(session, &promotion))
            .with_context(|| format!("promotion of version {} failed", self.version_code))?;

        let stage = if first_rollout {
            "released to"
        } else {
            "rollout updated for"
        };
        println!(
            "{} version {} {stage} {}% of production users ({})",
            "✓".green(),
            self.version_code,
            self.rollout,
            promotion.rollout().status()
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct NotesArgs {
    /// Version code (release name) the notes belong to.
    pub version_code: i64,

    #[command(flatten)]
    pub play: PlayArgs,

    #[command(flatten)]
    pub metadata: MetadataArgs,
}

impl NotesArgs {
    pub fn run(self) -> Result<()> {
        let workspace = Workspace::discover()?;
        let dir = workspace.metadata_dir(self.metadata);
        metadata::ensure_exists(&dir)?;
        let (app, client) = workspace.play(self.play)?;

        let version_code = self.version_code;
        let (languages, tracks) = with_edit(&client, &app, |session| {
            let notes = rollout::collect_release_notes(session, |language| {
                metadata::read_release_notes(&dir, language, version_code)
            })?;
            if notes.is_empty() {
                return Ok((0, Vec::new()));
            }
            let tracks = rollout::update_release_notes(session, version_code, &notes)?;
            Ok((notes.len(), tracks))
        })
        .with_context(|| format!("failed to update release notes of {version_code}"))?;

        if languages == 0 {
            println!("No changelogs/{version_code}.txt found in any language folder.");
            return Ok(());
        }
        if tracks.is_empty() {
            eprintln!(
                "{} no release named {version_code} on {} or {}",
                "!".yellow(),
                Track::Beta,
                Track::Production
            );
            return Ok(());
        }
        let names: Vec<&str> = tracks.iter().map(Track::as_str).collect();
        println!(
            "{} release notes in {languages} languages set on {}",
            "✓".green(),
            names.join(", ")
        );
        Ok(())
    }
}
