//! Local metadata tree.
//!
//! Layout under `<project>/metadata/android/`:
//!
//! ```text
//! <language>/title.txt
//! <language>/short_description.txt
//! <language>/full_description.txt
//! <language>/video.txt
//! <language>/images/<category>/<file>
//! <language>/changelogs/<versionCode>.txt
//! ```
//!
//! Text is trimmed on read and written back as the trimmed text plus a
//! trailing newline. A missing or blank file is an absent field.

use std::path::{Path, PathBuf};

use launchpad_core::{ImageAsset, ImageBucket, ImageCategory, LanguageCode, ListingRecord, LocalImage};

use crate::error::{io_err, SyncError};
use crate::images::group_by_bucket;

const TITLE_FILE: &str = "title.txt";
const SHORT_DESCRIPTION_FILE: &str = "short_description.txt";
const FULL_DESCRIPTION_FILE: &str = "full_description.txt";
const VIDEO_FILE: &str = "video.txt";
const IMAGES_DIR: &str = "images";
const CHANGELOGS_DIR: &str = "changelogs";

/// `<root>/metadata/android`.
pub fn metadata_dir_at(root: &Path) -> PathBuf {
    root.join("metadata").join("android")
}

/// Fail with a hint when the metadata tree has never been pulled.
pub fn ensure_exists(dir: &Path) -> Result<(), SyncError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(SyncError::NotFound(format!(
            "{} (run `launchpad listings pull` first or create the tree manually)",
            dir.display()
        )))
    }
}

/// Language folders in the tree, sorted by name.
pub fn languages(dir: &Path) -> Result<Vec<LanguageCode>, SyncError> {
    let mut languages = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        if entry.path().is_dir() {
            languages.push(LanguageCode::from(
                entry.file_name().to_string_lossy().into_owned(),
            ));
        }
    }
    languages.sort();
    Ok(languages)
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// One record per language folder.
pub fn load_listings(dir: &Path) -> Result<Vec<ListingRecord>, SyncError> {
    languages(dir)?
        .into_iter()
        .map(|language| {
            let folder = dir.join(language.as_str());
            Ok(ListingRecord {
                title: read_text(&folder.join(TITLE_FILE))?,
                short_description: read_text(&folder.join(SHORT_DESCRIPTION_FILE))?,
                full_description: read_text(&folder.join(FULL_DESCRIPTION_FILE))?,
                video: read_text(&folder.join(VIDEO_FILE))?,
                language,
            })
        })
        .collect()
}

/// Write one folder per record. Absent fields leave no file behind.
pub fn write_listings(dir: &Path, records: &[ListingRecord]) -> Result<Vec<WriteResult>, SyncError> {
    let mut writes = Vec::new();
    for record in records {
        let folder = dir.join(record.language.as_str());
        std::fs::create_dir_all(&folder).map_err(|e| io_err(&folder, e))?;
        let fields = [
            (TITLE_FILE, &record.title),
            (SHORT_DESCRIPTION_FILE, &record.short_description),
            (FULL_DESCRIPTION_FILE, &record.full_description),
            (VIDEO_FILE, &record.video),
        ];
        for (file, value) in fields {
            if let Some(text) = value {
                writes.push(write_text(&folder.join(file), text)?);
            }
        }
    }
    Ok(writes)
}

/// Delete cached listing text, then drop language folders left empty.
///
/// Images and changelogs are kept. Returns the number of removed files.
pub fn clear_cached_listings(dir: &Path) -> Result<usize, SyncError> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let mut removed = 0;
    for language in languages(dir)? {
        let folder = dir.join(language.as_str());
        for file in [TITLE_FILE, SHORT_DESCRIPTION_FILE, FULL_DESCRIPTION_FILE, VIDEO_FILE] {
            let path = folder.join(file);
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(io_err(&path, e)),
            }
        }
        if remove_empty_dirs(&folder)? {
            tracing::debug!(language = %language, "removed empty language folder");
        }
    }
    Ok(removed)
}

/// Remove empty directories bottom-up. Returns `true` if `dir` itself went.
fn remove_empty_dirs(dir: &Path) -> Result<bool, SyncError> {
    let mut empty = true;
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let path = entry.map_err(|e| io_err(dir, e))?.path();
        if !(path.is_dir() && remove_empty_dirs(&path)?) {
            empty = false;
        }
    }
    if empty {
        std::fs::remove_dir(dir).map_err(|e| io_err(dir, e))?;
    }
    Ok(empty)
}

// ---------------------------------------------------------------------------
// Text files
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File already held this content.
    Unchanged { path: PathBuf },
}

/// Trimmed file content; `None` when missing or blank.
pub fn read_text(path: &Path) -> Result<Option<String>, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => {
            let text = raw.trim();
            Ok((!text.is_empty()).then(|| text.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(path, e)),
    }
}

/// Write `text` trimmed plus a newline, through a `.launchpad.tmp` sibling.
pub fn write_text(path: &Path, text: &str) -> Result<WriteResult, SyncError> {
    let tmp = PathBuf::from(format!("{}.launchpad.tmp", path.display()));
    write_text_with_tmp(path, text, &tmp)
}

fn write_text_with_tmp(path: &Path, text: &str, tmp: &Path) -> Result<WriteResult, SyncError> {
    let content = format!("{}\n", text.trim());
    if std::fs::read_to_string(path).ok().as_deref() == Some(content.as_str()) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }
    write_atomic(path, content.as_bytes(), tmp)?;
    tracing::debug!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

fn write_atomic(path: &Path, bytes: &[u8], tmp: &Path) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, bytes).map_err(|e| io_err(tmp, e))?;
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Local images of `category`, one bucket per language folder.
///
/// Language folders without images still get an (empty) bucket so that an
/// overwriting push clears the remote set. `language` restricts the result
/// to one folder.
pub fn image_buckets(
    dir: &Path,
    category: ImageCategory,
    language: Option<&LanguageCode>,
) -> Result<Vec<(ImageBucket, Vec<PathBuf>)>, SyncError> {
    let selected: Vec<LanguageCode> = languages(dir)?
        .into_iter()
        .filter(|l| language.map_or(true, |wanted| wanted == l))
        .collect();

    let mut images = Vec::new();
    for language in &selected {
        let folder = dir
            .join(language.as_str())
            .join(IMAGES_DIR)
            .join(category.as_str());
        if !folder.is_dir() {
            continue;
        }
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&folder).map_err(|e| io_err(&folder, e))? {
            let path = entry.map_err(|e| io_err(&folder, e))?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        images.extend(files.into_iter().map(|file| LocalImage {
            file,
            language: language.clone(),
            category,
        }));
    }

    let mut grouped = group_by_bucket(images);
    Ok(selected
        .into_iter()
        .map(|language| {
            let bucket = ImageBucket { category, language };
            let files = grouped.remove(&bucket).unwrap_or_default();
            (bucket, files)
        })
        .collect())
}

const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// File extension matching the image's magic bytes.
fn image_extension(bytes: &[u8]) -> Result<&'static str, SyncError> {
    if bytes.starts_with(JPEG_SIGNATURE) {
        Ok("jpg")
    } else if bytes.starts_with(PNG_SIGNATURE) {
        Ok("png")
    } else {
        Err(SyncError::Validation(
            "downloaded image is neither jpg nor png".to_string(),
        ))
    }
}

/// Store a downloaded image as `<language>/images/<category>/<id>.<ext>`.
///
/// Bytes without a jpg or png signature are rejected and nothing is written.
pub fn write_image(dir: &Path, asset: &ImageAsset, bytes: &[u8]) -> Result<PathBuf, SyncError> {
    let extension = image_extension(bytes)?;
    let path = dir
        .join(asset.language.as_str())
        .join(IMAGES_DIR)
        .join(asset.category.as_str())
        .join(format!("{}.{extension}", asset.id));
    let tmp = PathBuf::from(format!("{}.launchpad.tmp", path.display()));
    write_atomic(&path, bytes, &tmp)?;
    tracing::debug!("wrote: {}", path.display());
    Ok(path)
}

// ---------------------------------------------------------------------------
// Release notes
// ---------------------------------------------------------------------------

/// Notes for `version_code` in `language`, if any.
pub fn read_release_notes(
    dir: &Path,
    language: &LanguageCode,
    version_code: i64,
) -> Result<Option<String>, SyncError> {
    read_text(
        &dir.join(language.as_str())
            .join(CHANGELOGS_DIR)
            .join(format!("{version_code}.txt")),
    )
}
