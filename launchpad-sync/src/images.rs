//! Store image reconciliation.
//!
//! Images are managed per bucket, i.e. per (category, language) pair.
//! Replacing a bucket is planned first, which validates every file, and only
//! then executed against an edit.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use launchpad_core::{
    DistributionService, ImageAsset, ImageBucket, ImageCategory, LanguageCode, LocalImage,
    UploadSource,
};

use crate::edit::EditSession;
use crate::SyncError;

/// Group local image files by bucket, keeping file order within a bucket.
pub fn group_by_bucket(images: Vec<LocalImage>) -> BTreeMap<ImageBucket, Vec<PathBuf>> {
    let mut buckets: BTreeMap<ImageBucket, Vec<PathBuf>> = BTreeMap::new();
    for image in images {
        buckets
            .entry(ImageBucket {
                category: image.category,
                language: image.language,
            })
            .or_default()
            .push(image.file);
    }
    buckets
}

/// MIME type for an uploadable image; only png, jpg and jpeg are accepted.
pub fn mime_type(path: &Path) -> Result<&'static str, SyncError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => Ok("image/png"),
        Some("jpg") | Some("jpeg") => Ok("image/jpeg"),
        _ => Err(SyncError::Validation(format!(
            "only jpg, jpeg and png images can be uploaded ({})",
            path.display()
        ))),
    }
}

/// A validated bucket replacement, ready to run against an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReplacement {
    pub bucket: ImageBucket,
    pub uploads: Vec<UploadSource>,
    pub overwrite: bool,
}

/// Validate `files` for `bucket`. No remote call is made.
pub fn plan_replacement(
    bucket: ImageBucket,
    files: &[PathBuf],
    overwrite: bool,
) -> Result<ImageReplacement, SyncError> {
    let uploads = files
        .iter()
        .map(|file| mime_type(file).map(|mime| UploadSource::new(file.clone(), mime)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ImageReplacement {
        bucket,
        uploads,
        overwrite,
    })
}

/// Run a planned replacement: optionally clear the bucket, then upload.
///
/// Returns the number of uploaded files.
pub fn replace_bucket<S: DistributionService + ?Sized>(
    session: &EditSession<'_, S>,
    replacement: &ImageReplacement,
) -> Result<usize, SyncError> {
    let bucket = &replacement.bucket;
    if replacement.overwrite {
        tracing::info!(bucket = %bucket, "deleting all remote images");
        session.delete_all_images(&bucket.language, bucket.category)?;
    }
    for upload in &replacement.uploads {
        tracing::debug!(bucket = %bucket, file = %upload.path.display(), "uploading image");
        session.upload_image(&bucket.language, bucket.category, upload)?;
    }
    Ok(replacement.uploads.len())
}

/// List every published image of every category for `languages`.
pub fn list_remote<S: DistributionService + ?Sized>(
    session: &EditSession<'_, S>,
    languages: &[LanguageCode],
) -> Result<Vec<ImageAsset>, SyncError> {
    let mut assets = Vec::new();
    for language in languages {
        for category in ImageCategory::all() {
            assets.extend(session.list_images(language, *category)?);
        }
    }
    Ok(assets)
}
