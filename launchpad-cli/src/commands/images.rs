//! `launchpad images` — store images per language and category.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use launchpad_core::{DistributionService, ImageAsset, ImageCategory, LanguageCode};
use launchpad_remote::PlayClient;
use launchpad_sync::{images, listing, metadata, with_edit};

use super::{MetadataArgs, PlayArgs, Workspace};
use crate::prompt;

#[derive(Subcommand, Debug)]
pub enum ImagesCommand {
    /// List every published image.
    List(ListArgs),

    /// Download every published image into the metadata tree.
    Pull(PullArgs),

    /// Replace the published images of one category with the local ones.
    Push(PushArgs),
}

pub fn run(command: ImagesCommand) -> Result<()> {
    match command {
        ImagesCommand::List(args) => args.run(),
        ImagesCommand::Pull(args) => args.run(),
        ImagesCommand::Push(args) => args.run(),
    }
}

/// Every published image, across listing languages and categories.
fn fetch_inventory(workspace: &Workspace, play: PlayArgs) -> Result<(Vec<ImageAsset>, PlayClient)> {
    let (app, client) = workspace.play(play)?;
    let assets = with_edit(&client, &app, |session| {
        let languages: Vec<LanguageCode> = listing::fetch_remote(session)?
            .into_iter()
            .map(|record| record.language)
            .collect();
        images::list_remote(session, &languages)
    })
    .context("failed to list images")?;
    Ok((assets, client))
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub play: PlayArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ImageRow {
    #[tabled(rename = "language")]
    language: String,
    #[tabled(rename = "category")]
    category: String,
    #[tabled(rename = "id")]
    id: String,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let workspace = Workspace::discover()?;
        let (assets, _) = fetch_inventory(&workspace, self.play)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&assets)?);
            return Ok(());
        }
        if assets.is_empty() {
            println!("No published images.");
            return Ok(());
        }
        let rows: Vec<ImageRow> = assets
            .iter()
            .map(|asset| ImageRow {
                language: asset.language.to_string(),
                category: asset.category.to_string(),
                id: asset.id.clone(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
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
        let (assets, client) = fetch_inventory(&workspace, self.play)?;

        for asset in &assets {
            let bytes = client
                .download(&asset.url)
                .with_context(|| format!("failed to download {}", asset.url))?;
            let path = metadata::write_image(&dir, asset, &bytes)
                .with_context(|| format!("failed to store image {}", asset.id))?;
            println!("  ✎  {}", path.display());
        }
        println!("{} downloaded {} images", "✓".green(), assets.len());
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct PushArgs {
    /// Image category, e.g. phoneScreenshots or featureGraphic.
    pub category: ImageCategory,

    /// Only push this language folder.
    #[arg(long)]
    pub language: Option<String>,

    /// Upload next to the published images instead of replacing them.
    #[arg(long)]
    pub keep_existing: bool,

    /// Push without asking for confirmation.
    #[arg(long, short)]
    pub yes: bool,

    #[command(flatten)]
    pub play: PlayArgs,

    #[command(flatten)]
    pub metadata: MetadataArgs,
}

impl PushArgs {
    pub fn run(self) -> Result<()> {
        let workspace = Workspace::discover()?;
        let dir = workspace.metadata_dir(self.metadata);
        metadata::ensure_exists(&dir)?;

        let language = self.language.map(LanguageCode::from);
        let buckets = metadata::image_buckets(&dir, self.category, language.as_ref())
            .with_context(|| format!("failed to read images under {}", dir.display()))?;
        if let (Some(language), true) = (&language, buckets.is_empty()) {
            bail!("no folder for language {language} under {}", dir.display());
        }

        let overwrite = !self.keep_existing;
        let plans = buckets
            .iter()
            .filter(|(_, files)| overwrite || !files.is_empty())
            .map(|(bucket, files)| images::plan_replacement(bucket.clone(), files, overwrite))
            .collect::<Result<Vec<_>, _>>()?;
        if plans.is_empty() {
            println!("No {} images to upload.", self.category);
            return Ok(());
        }

        let joined = |with_files: bool| {
            plans
                .iter()
                .filter(|p| !with_files || !p.uploads.is_empty())
                .map(|p| p.bucket.language.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        if overwrite {
            println!(
                "This will DELETE all {} images from the store for {}",
                self.category,
                joined(false).red()
            );
        }
        println!(
            "Then, this will upload the local {} images for {}",
            self.category,
            joined(true).yellow()
        );
        if !self.yes && !prompt::confirm("Are you sure you want to proceed?")? {
            println!("Aborted.");
            return Ok(());
        }

        let (app, client) = workspace.play(self.play)?;
        let uploaded = with_edit(&client, &app, |session| {
            let mut uploaded = 0;
            for plan in &plans {
                println!("Updating images for {}", plan.bucket);
                uploaded += images::replace_bucket(session, plan)?;
            }
            Ok(uploaded)
        })
        .context("failed to publish images")?;
        println!("{} uploaded {uploaded} images", "✓".green());
        Ok(())
    }
}
