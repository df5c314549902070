//! Staged edit sessions.
//!
//! Every mutation of the distribution console goes through one edit:
//! open, stage operations, commit. [`with_edit`] commits only when the body
//! returns `Ok`.
//!
//! ## Known limitation
//!
//! Staging is best-effort, not transactional. When the body fails, the edit
//! is left uncommitted and nothing it staged is published, but the calls it
//! already made are neither retried nor rolled back; the console discards
//! the abandoned edit on its own.

use launchpad_core::{
    ArtifactKind, DistributionService, EditHandle, ImageAsset, ImageCategory, LanguageCode,
    ListingRecord, PackageName, Track, TrackRelease, UploadSource,
};

use crate::SyncError;

/// An open edit against one application.
///
/// Dropping a session without calling [`EditSession::commit`] abandons it.
pub struct EditSession<'s, S: DistributionService + ?Sized> {
    service: &'s S,
    handle: EditHandle,
    committed: bool,
}

impl<'s, S: DistributionService + ?Sized> EditSession<'s, S> {
    /// Open a new edit for `app`.
    pub fn open(service: &'s S, app: &PackageName) -> Result<Self, SyncError> {
        let id = service.open_edit(app)?;
        tracing::debug!(app = %app, edit_id = %id, "created edit");
        Ok(Self {
            service,
            handle: EditHandle {
                app: app.clone(),
                id,
            },
            committed: false,
        })
    }

    pub fn handle(&self) -> &EditHandle {
        &self.handle
    }

    /// Publish everything staged in this edit.
    pub fn commit(mut self) -> Result<(), SyncError> {
        self.service.commit_edit(&self.handle)?;
        self.committed = true;
        tracing::debug!(app = %self.handle.app, edit_id = %self.handle.id, "edit committed");
        Ok(())
    }

    pub fn get_track(&self, track: Track) -> Result<Vec<TrackRelease>, SyncError> {
        Ok(self.service.get_track(&self.handle, track)?)
    }

    pub fn update_track(&self, track: Track, releases: &[TrackRelease]) -> Result<(), SyncError> {
        Ok(self.service.update_track(&self.handle, track, releases)?)
    }

    pub fn list_listings(&self) -> Result<Vec<ListingRecord>, SyncError> {
        Ok(self.service.list_listings(&self.handle)?)
    }

    pub fn update_listing(&self, listing: &ListingRecord) -> Result<(), SyncError> {
        Ok(self.service.update_listing(&self.handle, listing)?)
    }

    pub fn delete_listing(&self, language: &LanguageCode) -> Result<(), SyncError> {
        Ok(self.service.delete_listing(&self.handle, language)?)
    }

    pub fn list_images(
        &self,
        language: &LanguageCode,
        category: ImageCategory,
    ) -> Result<Vec<ImageAsset>, SyncError> {
        Ok(self.service.list_images(&self.handle, language, category)?)
    }

    pub fn upload_image(
        &self,
        language: &LanguageCode,
        category: ImageCategory,
        image: &UploadSource,
    ) -> Result<(), SyncError> {
        Ok(self
            .service
            .upload_image(&self.handle, language, category, image)?)
    }

    pub fn delete_all_images(
        &self,
        language: &LanguageCode,
        category: ImageCategory,
    ) -> Result<(), SyncError> {
        Ok(self
            .service
            .delete_all_images(&self.handle, language, category)?)
    }

    pub fn upload_artifact(
        &self,
        artifact: &UploadSource,
        kind: ArtifactKind,
    ) -> Result<i64, SyncError> {
        Ok(self.service.upload_artifact(&self.handle, artifact, kind)?)
    }
}

impl<S: DistributionService + ?Sized> Drop for EditSession<'_, S> {
    fn drop(&mut self) {
        if !self.committed {
            tracing::warn!(
                app = %self.handle.app,
                edit_id = %self.handle.id,
                "edit abandoned without commit; staged changes were not published"
            );
        }
    }
}

/// Open an edit, run `body` against it, and commit on success.
///
/// An error from `body` is returned as-is and the edit is never committed.
pub fn with_edit<'s, S, T, F>(service: &'s S, app: &PackageName, body: F) -> Result<T, SyncError>
where
    S: DistributionService + ?Sized,
    F: FnOnce(&EditSession<'s, S>) -> Result<T, SyncError>,
{
    let session = EditSession::open(service, app)?;
    let value = body(&session)?;
    session.commit()?;
    Ok(value)
}
