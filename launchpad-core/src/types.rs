//! Domain types shared by the reconcilers and the remote adapters.
//!
//! Records are plain values: reconciliation never mutates a fetched record in
//! place, it builds new ones.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Application identifier on the distribution console (e.g. `com.example.app`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageName(pub String);

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PackageName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A store language code such as `en-US` or `fr-FR`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LanguageCode(pub String);

impl LanguageCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for LanguageCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LanguageCode {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Server-side identifier of an open edit session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditId(pub String);

impl fmt::Display for EditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EditId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EditId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Everything a staged operation needs to address its edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditHandle {
    pub app: PackageName,
    pub id: EditId,
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// Localized store listing text for one language.
///
/// Absent fields mean "leave the published value alone" when pushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub language: LanguageCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

impl ListingRecord {
    /// An empty record for `language`; all fields absent.
    pub fn new(language: impl Into<LanguageCode>) -> Self {
        Self {
            language: language.into(),
            title: None,
            short_description: None,
            full_description: None,
            video: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_short_description(mut self, text: impl Into<String>) -> Self {
        self.short_description = Some(text.into());
        self
    }

    pub fn with_full_description(mut self, text: impl Into<String>) -> Self {
        self.full_description = Some(text.into());
        self
    }

    pub fn with_video(mut self, url: impl Into<String>) -> Self {
        self.video = Some(url.into());
        self
    }

    /// Overlay the present fields of `update` onto `self`.
    ///
    /// Absent fields in `update` leave the existing value untouched, which is
    /// the partial-field semantics the console applies on a listing patch.
    pub fn merged_with(&self, update: &ListingRecord) -> ListingRecord {
        ListingRecord {
            language: self.language.clone(),
            title: update.title.clone().or_else(|| self.title.clone()),
            short_description: update
                .short_description
                .clone()
                .or_else(|| self.short_description.clone()),
            full_description: update
                .full_description
                .clone()
                .or_else(|| self.full_description.clone()),
            video: update.video.clone().or_else(|| self.video.clone()),
        }
    }

    /// Trimmed copy; fields that are blank after trimming become absent.
    pub fn normalized(&self) -> ListingRecord {
        let clean = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        };
        ListingRecord {
            language: self.language.clone(),
            title: clean(&self.title),
            short_description: clean(&self.short_description),
            full_description: clean(&self.full_description),
            video: clean(&self.video),
        }
    }
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Fixed set of store image categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageCategory {
    FeatureGraphic,
    Icon,
    PhoneScreenshots,
    PromoGraphic,
    SevenInchScreenshots,
    TenInchScreenshots,
    TvBanner,
    TvScreenshots,
    WearScreenshots,
}

impl ImageCategory {
    pub fn all() -> &'static [ImageCategory] {
        &[
            ImageCategory::FeatureGraphic,
            ImageCategory::Icon,
            ImageCategory::PhoneScreenshots,
            ImageCategory::PromoGraphic,
            ImageCategory::SevenInchScreenshots,
            ImageCategory::TenInchScreenshots,
            ImageCategory::TvBanner,
            ImageCategory::TvScreenshots,
            ImageCategory::WearScreenshots,
        ]
    }

    /// Wire name, also used as the local folder name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageCategory::FeatureGraphic => "featureGraphic",
            ImageCategory::Icon => "icon",
            ImageCategory::PhoneScreenshots => "phoneScreenshots",
            ImageCategory::PromoGraphic => "promoGraphic",
            ImageCategory::SevenInchScreenshots => "sevenInchScreenshots",
            ImageCategory::TenInchScreenshots => "tenInchScreenshots",
            ImageCategory::TvBanner => "tvBanner",
            ImageCategory::TvScreenshots => "tvScreenshots",
            ImageCategory::WearScreenshots => "wearScreenshots",
        }
    }
}

impl fmt::Display for ImageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageCategory::all()
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| {
                let names: Vec<&str> = ImageCategory::all().iter().map(|c| c.as_str()).collect();
                format!(
                    "unknown image category '{s}'; expected one of: {}",
                    names.join(", ")
                )
            })
    }
}

/// An image already published on the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub id: String,
    pub url: String,
    pub language: LanguageCode,
    pub category: ImageCategory,
}

impl ImageAsset {
    /// Stable identifier of a published image: the last segment of its URL.
    pub fn id_from_url(url: &str) -> String {
        let without_query = url.split(['?', '#']).next().unwrap_or(url);
        without_query
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(without_query)
            .to_string()
    }
}

/// Grouping key for bulk image operations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageBucket {
    pub category: ImageCategory,
    pub language: LanguageCode,
}

impl fmt::Display for ImageBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.language, self.category)
    }
}

/// A local image file destined for one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    pub file: PathBuf,
    pub language: LanguageCode,
    pub category: ImageCategory,
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// A file-backed upload body.
///
/// Length and stream are derived from the file on every call so a transport
/// can retry an upload without buffering the whole payload in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSource {
    pub path: PathBuf,
    pub mime: &'static str,
}

impl UploadSource {
    pub fn new(path: impl Into<PathBuf>, mime: &'static str) -> Self {
        Self {
            path: path.into(),
            mime,
        }
    }

    pub fn content_length(&self) -> std::io::Result<u64> {
        Ok(std::fs::metadata(&self.path)?.len())
    }

    pub fn open(&self) -> std::io::Result<File> {
        File::open(&self.path)
    }
}

/// Binary artifact flavour accepted by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Bundle,
    Apk,
}

impl ArtifactKind {
    /// Classify by extension: `.aab` is a bundle, `.apk` an APK.
    pub fn from_path(path: &Path) -> Option<ArtifactKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "aab" => Some(ArtifactKind::Bundle),
            "apk" => Some(ArtifactKind::Apk),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Bundle => write!(f, "bundle"),
            ArtifactKind::Apk => write!(f, "apk"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tracks
// ---------------------------------------------------------------------------

/// Distribution channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    Beta,
    Production,
}

impl Track {
    pub fn as_str(&self) -> &'static str {
        match self {
            Track::Beta => "beta",
            Track::Production => "production",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release status. A user fraction exists only while the rollout is staged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rollout {
    Completed,
    InProgress { user_fraction: f64 },
}

impl Rollout {
    /// `100` completes the release; anything lower stages it at `percent / 100`.
    pub fn from_percent(percent: u8) -> Rollout {
        if percent >= 100 {
            Rollout::Completed
        } else {
            Rollout::InProgress {
                user_fraction: f64::from(percent) / 100.0,
            }
        }
    }

    /// Wire status string.
    pub fn status(&self) -> &'static str {
        match self {
            Rollout::Completed => "completed",
            Rollout::InProgress { .. } => "inProgress",
        }
    }

    pub fn user_fraction(&self) -> Option<f64> {
        match self {
            Rollout::Completed => None,
            Rollout::InProgress { user_fraction } => Some(*user_fraction),
        }
    }
}

/// Release notes for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub language: LanguageCode,
    pub text: String,
}

/// The release definition held by a track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRelease {
    /// By convention the version code as text.
    pub name: String,
    pub version_codes: Vec<i64>,
    pub rollout: Rollout,
    pub release_notes: Vec<LocalizedText>,
}

impl TrackRelease {
    pub fn new(name: impl Into<String>, version_codes: Vec<i64>, rollout: Rollout) -> Self {
        Self {
            name: name.into(),
            version_codes,
            rollout,
            release_notes: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------------

/// A pull request associated with a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestInfo {
    pub number: u64,
    pub merged: bool,
    pub closed: bool,
    /// Branch this pull request targets.
    #[serde(default)]
    pub base_ref_name: Option<String>,
}

impl PullRequestInfo {
    /// Neither merged nor closed.
    pub fn is_open(&self) -> bool {
        !self.merged && !self.closed
    }
}

/// A pull request to open, merging `head` into `base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDraft {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: Option<String>,
}

/// A pull request the forge created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenedPullRequest {
    pub number: u64,
    /// Browser URL of the pull request.
    pub url: String,
}

/// A remote branch head with its pull requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRef {
    pub name: String,
    #[serde(default)]
    pub pull_requests: Vec<PullRequestInfo>,
}

/// Owner and name of a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
