#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use launchpad_core::{
    ArtifactKind, BranchRef, DistributionService, EditHandle, EditId, ImageAsset, ImageCategory,
    LanguageCode, ListingRecord, OpenedPullRequest, PackageName, PullRequestDraft, RemoteError,
    RemoteResult, RepoSlug, SourceControlService, Track, TrackRelease, UploadSource,
};

pub fn app() -> PackageName {
    PackageName::from("com.example.app")
}

fn injected(operation: &str) -> RemoteError {
    RemoteError::Status {
        status: 500,
        message: format!("injected failure in {operation}"),
        reason: None,
    }
}

/// In-memory distribution console. Mutations apply immediately; every call
/// is recorded as `"<operation> <detail>"`.
#[derive(Default)]
pub struct FakeConsole {
    pub calls: RefCell<Vec<String>>,
    pub listings: RefCell<Vec<ListingRecord>>,
    pub tracks: RefCell<HashMap<Track, Vec<TrackRelease>>>,
    pub images: RefCell<Vec<ImageAsset>>,
    /// Version code returned by the next artifact upload; `None` reports a
    /// version-code conflict.
    pub next_version_code: Cell<Option<i64>>,
    /// Operation name that fails with a 500.
    pub fail_on: RefCell<Option<String>>,
}

impl FakeConsole {
    pub fn with_listings(listings: Vec<ListingRecord>) -> Self {
        let console = Self::default();
        *console.listings.borrow_mut() = listings;
        console
    }

    pub fn set_track(&self, track: Track, releases: Vec<TrackRelease>) {
        self.tracks.borrow_mut().insert(track, releases);
    }

    pub fn track(&self, track: Track) -> Vec<TrackRelease> {
        self.tracks.borrow().get(&track).cloned().unwrap_or_default()
    }

    pub fn fail_on(&self, operation: &str) {
        *self.fail_on.borrow_mut() = Some(operation.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Operation names only.
    pub fn operations(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|c| c.split(' ').next().unwrap_or_default().to_string())
            .collect()
    }

    fn record(&self, operation: &str, detail: impl AsRef<str>) -> RemoteResult<()> {
        let detail = detail.as_ref();
        let entry = if detail.is_empty() {
            operation.to_string()
        } else {
            format!("{operation} {detail}")
        };
        self.calls.borrow_mut().push(entry);
        if self.fail_on.borrow().as_deref() == Some(operation) {
            return Err(injected(operation));
        }
        Ok(())
    }
}

impl DistributionService for FakeConsole {
    fn open_edit(&self, app: &PackageName) -> RemoteResult<EditId> {
        self.record("open_edit", app.to_string())?;
        Ok(EditId::from("edit-1"))
    }

    fn commit_edit(&self, _edit: &EditHandle) -> RemoteResult<()> {
        self.record("commit_edit", "")
    }

    fn get_track(&self, _edit: &EditHandle, track: Track) -> RemoteResult<Vec<TrackRelease>> {
        self.record("get_track", track.as_str())?;
        Ok(self.track(track))
    }

    fn update_track(
        &self,
        _edit: &EditHandle,
        track: Track,
        releases: &[TrackRelease],
    ) -> RemoteResult<()> {
        self.record("update_track", track.as_str())?;
        self.set_track(track, releases.to_vec());
        Ok(())
    }

    fn list_listings(&self, _edit: &EditHandle) -> RemoteResult<Vec<ListingRecord>> {
        self.record("list_listings", "")?;
        Ok(self.listings.borrow().clone())
    }

    fn update_listing(&self, _edit: &EditHandle, listing: &ListingRecord) -> RemoteResult<()> {
        self.record("update_listing", listing.language.as_str())?;
        let mut listings = self.listings.borrow_mut();
        match listings.iter_mut().find(|r| r.language == listing.language) {
            Some(existing) => *existing = existing.merged_with(listing),
            None => listings.push(listing.clone()),
        }
        Ok(())
    }

    fn delete_listing(&self, _edit: &EditHandle, language: &LanguageCode) -> RemoteResult<()> {
        self.record("delete_listing", language.as_str())?;
        self.listings.borrow_mut().retain(|r| &r.language != language);
        Ok(())
    }

    fn list_images(
        &self,
        _edit: &EditHandle,
        language: &LanguageCode,
        category: ImageCategory,
    ) -> RemoteResult<Vec<ImageAsset>> {
        self.record("list_images", format!("{language}/{category}"))?;
        Ok(self
            .images
            .borrow()
            .iter()
            .filter(|i| &i.language == language && i.category == category)
            .cloned()
            .collect())
    }

    fn upload_image(
        &self,
        _edit: &EditHandle,
        language: &LanguageCode,
        category: ImageCategory,
        image: &UploadSource,
    ) -> RemoteResult<()> {
        let name = image
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.record("upload_image", format!("{language}/{category}/{name}"))
    }

    fn delete_all_images(
        &self,
        _edit: &EditHandle,
        language: &LanguageCode,
        category: ImageCategory,
    ) -> RemoteResult<()> {
        self.record("delete_all_images", format!("{language}/{category}"))
    }

    fn upload_artifact(
        &self,
        _edit: &EditHandle,
        _artifact: &UploadSource,
        kind: ArtifactKind,
    ) -> RemoteResult<i64> {
        self.record("upload_artifact", kind.to_string())?;
        self.next_version_code
            .get()
            .ok_or_else(|| RemoteError::Conflict {
                reason: "apkUpgradeVersionConflict".into(),
                message: "APK specifies a version code that has already been used.".into(),
            })
    }

    fn download(&self, url: &str) -> RemoteResult<Vec<u8>> {
        self.record("download", url)?;
        Ok(b"\x89PNG\r\n\x1a\n".to_vec())
    }
}

/// In-memory forge.
#[derive(Default)]
pub struct FakeForge {
    pub branches: Vec<BranchRef>,
    pub deleted: RefCell<Vec<String>>,
    /// Branch names whose deletion fails.
    pub failing: Vec<String>,
    pub opened: RefCell<Vec<PullRequestDraft>>,
}

impl SourceControlService for FakeForge {
    fn list_branches_with_pull_requests(&self, _repo: &RepoSlug) -> RemoteResult<Vec<BranchRef>> {
        Ok(self.branches.clone())
    }

    fn delete_branch(&self, _repo: &RepoSlug, name: &str) -> RemoteResult<()> {
        if self.failing.iter().any(|f| f == name) {
            return Err(RemoteError::Status {
                status: 422,
                message: format!("Reference does not exist: {name}"),
                reason: None,
            });
        }
        self.deleted.borrow_mut().push(name.to_string());
        Ok(())
    }

    fn open_pull_request(
        &self,
        repo: &RepoSlug,
        draft: &PullRequestDraft,
    ) -> RemoteResult<OpenedPullRequest> {
        let mut opened = self.opened.borrow_mut();
        opened.push(draft.clone());
        let number = opened.len() as u64;
        Ok(OpenedPullRequest {
            number,
            url: format!("https://github.com/{repo}/pull/{number}"),
        })
    }
}
