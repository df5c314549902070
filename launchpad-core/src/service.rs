//! Collaborator contracts consumed by the reconcilers.
//!
//! Implementations live in `launchpad-remote`; tests substitute in-memory
//! fakes. All calls are blocking and complete before the next one starts.

use crate::error::RemoteError;
use crate::types::{
    ArtifactKind, BranchRef, EditHandle, EditId, ImageAsset, ImageCategory, LanguageCode,
    ListingRecord, OpenedPullRequest, PackageName, PullRequestDraft, RepoSlug, Track,
    TrackRelease, UploadSource,
};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// The app-distribution console and its staged edit protocol.
pub trait DistributionService {
    /// Open a staging session for `app`.
    fn open_edit(&self, app: &PackageName) -> RemoteResult<EditId>;

    /// Publish everything staged in `edit`.
    fn commit_edit(&self, edit: &EditHandle) -> RemoteResult<()>;

    fn get_track(&self, edit: &EditHandle, track: Track) -> RemoteResult<Vec<TrackRelease>>;

    /// Replace the releases held by `track`.
    fn update_track(
        &self,
        edit: &EditHandle,
        track: Track,
        releases: &[TrackRelease],
    ) -> RemoteResult<()>;

    fn list_listings(&self, edit: &EditHandle) -> RemoteResult<Vec<ListingRecord>>;

    /// Patch the listing for `listing.language`; absent fields are not sent.
    fn update_listing(&self, edit: &EditHandle, listing: &ListingRecord) -> RemoteResult<()>;

    fn delete_listing(&self, edit: &EditHandle, language: &LanguageCode) -> RemoteResult<()>;

    fn list_images(
        &self,
        edit: &EditHandle,
        language: &LanguageCode,
        category: ImageCategory,
    ) -> RemoteResult<Vec<ImageAsset>>;

    fn upload_image(
        &self,
        edit: &EditHandle,
        language: &LanguageCode,
        category: ImageCategory,
        image: &UploadSource,
    ) -> RemoteResult<()>;

    fn delete_all_images(
        &self,
        edit: &EditHandle,
        language: &LanguageCode,
        category: ImageCategory,
    ) -> RemoteResult<()>;

    /// Upload a bundle or APK and return its version code.
    ///
    /// A version code that already exists surfaces as
    /// [`RemoteError::Conflict`].
    fn upload_artifact(
        &self,
        edit: &EditHandle,
        artifact: &UploadSource,
        kind: ArtifactKind,
    ) -> RemoteResult<i64>;

    /// Fetch the bytes behind a published image URL.
    fn download(&self, url: &str) -> RemoteResult<Vec<u8>>;
}

/// The hosted git forge.
pub trait SourceControlService {
    /// Every branch head with its associated pull requests, in forge order.
    fn list_branches_with_pull_requests(&self, repo: &RepoSlug) -> RemoteResult<Vec<BranchRef>>;

    fn delete_branch(&self, repo: &RepoSlug, name: &str) -> RemoteResult<()>;

    fn open_pull_request(
        &self,
        repo: &RepoSlug,
        draft: &PullRequestDraft,
    ) -> RemoteResult<OpenedPullRequest>;
}
