//! launchpad core library — domain types, collaborator contracts, errors,
//! credential store.
//!
//! - [`types`] — newtypes and domain records
//! - [`service`] — [`DistributionService`] and [`SourceControlService`]
//! - [`error`] — [`ConfigError`] and [`RemoteError`]
//! - [`config`] — credential store and configuration resolution

pub mod config;
pub mod error;
pub mod service;
pub mod types;

pub use config::{CredentialStore, GithubConfig, GithubOptions, PlayConfig, PlayOptions, Resolver};
pub use error::{ConfigError, RemoteError};
pub use service::{DistributionService, RemoteResult, SourceControlService};
pub use types::{
    ArtifactKind, BranchRef, EditHandle, EditId, ImageAsset, ImageBucket, ImageCategory,
    LanguageCode, ListingRecord, LocalImage, LocalizedText, OpenedPullRequest, PackageName,
    PullRequestDraft, PullRequestInfo, RepoSlug, Rollout, Track, TrackRelease, UploadSource,
};
