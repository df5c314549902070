//! Beta uploads, production promotion and release notes.
//!
//! Inputs are validated by the `prepare` constructors before an edit is
//! opened; the operations themselves run inside a caller-provided edit.

use std::path::Path;

use launchpad_core::{
    ArtifactKind, DistributionService, LanguageCode, LocalizedText, RemoteError, Rollout, Track,
    TrackRelease, UploadSource,
};

use crate::edit::EditSession;
use crate::SyncError;

const ARTIFACT_MIME: &str = "application/octet-stream";

/// Base the new beta release on an existing production release, swapping
/// one of its version codes for the uploaded one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionOverride {
    pub release_name: String,
    pub replace_version_code: i64,
}

/// A validated beta upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetaUpload {
    artifact: UploadSource,
    kind: ArtifactKind,
    version_code_hint: Option<i64>,
    version_override: Option<VersionOverride>,
}

impl BetaUpload {
    /// Validate the artifact. `version_code_hint` is used only when the
    /// console reports the artifact as already uploaded.
    pub fn prepare(
        artifact: &Path,
        version_code_hint: Option<i64>,
        version_override: Option<VersionOverride>,
    ) -> Result<Self, SyncError> {
        let kind = ArtifactKind::from_path(artifact).ok_or_else(|| {
            SyncError::Validation(format!(
                "unsupported archive {} (expected .aab or .apk)",
                artifact.display()
            ))
        })?;
        if !artifact.is_file() {
            return Err(SyncError::Validation(format!(
                "archive {} does not exist",
                artifact.display()
            )));
        }
        Ok(Self {
            artifact: UploadSource::new(artifact, ARTIFACT_MIME),
            kind,
            version_code_hint,
            version_override,
        })
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }
}

/// Result of [`upload_to_beta`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetaOutcome {
    pub version_code: i64,
    /// Version codes assigned to the beta release.
    pub version_codes: Vec<i64>,
    /// The console already had this artifact.
    pub already_uploaded: bool,
}

/// Replace `target` with `replacement` at its existing position.
///
/// Returns `None` when `target` is not in `codes`.
pub fn substitute_version_code(codes: &[i64], target: i64, replacement: i64) -> Option<Vec<i64>> {
    let index = codes.iter().position(|code| *code == target)?;
    let mut substituted = codes.to_vec();
    substituted[index] = replacement;
    Some(substituted)
}

/// Upload the artifact and point the beta track at it.
pub fn upload_to_beta<S: DistributionService + ?Sized>(
    session: &EditSession<'_, S>,
    upload: &BetaUpload,
) -> Result<BetaOutcome, SyncError> {
    tracing::debug!(kind = %upload.kind, file = %upload.artifact.path.display(), "uploading archive");
    let (version_code, already_uploaded) =
        match session.upload_artifact(&upload.artifact, upload.kind) {
            Ok(code) => {
                tracing::info!(version_code = code, "archive uploaded");
                (code, false)
            }
            Err(SyncError::Remote(RemoteError::Conflict { reason, .. })) => {
                let code = upload.version_code_hint.ok_or_else(|| {
                    SyncError::NotFound(format!(
                        "archive was already uploaded ({reason}) and its version code is unknown; pass it explicitly"
                    ))
                })?;
                tracing::warn!(version_code = code, "this version code has already been uploaded");
                (code, true)
            }
            Err(err) => return Err(err),
        };

    let version_codes = match &upload.version_override {
        Some(version_override) => {
            let production = session.get_track(Track::Production)?;
            let release = production
                .iter()
                .find(|r| r.name == version_override.release_name)
                .ok_or_else(|| {
                    SyncError::NotFound(format!(
                        "release '{}' on track {}",
                        version_override.release_name,
                        Track::Production
                    ))
                })?;
            tracing::debug!(codes = ?release.version_codes, "current production configuration");
            substitute_version_code(
                &release.version_codes,
                version_override.replace_version_code,
                version_code,
            )
            .ok_or_else(|| {
                SyncError::NotFound(format!(
                    "version code {} in release '{}'",
                    version_override.replace_version_code, version_override.release_name
                ))
            })?
        }
        None => vec![version_code],
    };

    let release = TrackRelease::new(
        version_code.to_string(),
        version_codes.clone(),
        Rollout::Completed,
    );
    session.update_track(Track::Beta, &[release])?;
    tracing::info!(track = %Track::Beta, codes = ?version_codes, "track updated");

    Ok(BetaOutcome {
        version_code,
        version_codes,
        already_uploaded,
    })
}

/// A validated promotion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Promotion {
    version_code: i64,
    rollout: Rollout,
}

impl Promotion {
    /// `rollout_percent` must be within `1..=100`.
    pub fn prepare(version_code: i64, rollout_percent: u8) -> Result<Self, SyncError> {
        if !(1..=100).contains(&rollout_percent) {
            return Err(SyncError::Validation(format!(
                "rollout must be between 1 and 100 percent, got {rollout_percent}"
            )));
        }
        Ok(Self {
            version_code,
            rollout: Rollout::from_percent(rollout_percent),
        })
    }

    pub fn rollout(&self) -> Rollout {
        self.rollout
    }
}

/// Write the release named after the version code to production.
///
/// Returns `true` when the release was not on production before, i.e. this
/// is its first rollout.
///
/// Halted and draft releases are not returned by the track adapter, so a
/// release that only exists on production in one of those states is taken
/// from beta and reported as a first rollout.
pub fn promote<S: DistributionService + ?Sized>(
    session: &EditSession<'_, S>,
    promotion: &Promotion,
) -> Result<bool, SyncError> {
    let name = promotion.version_code.to_string();
    let beta = find_release(session, Track::Beta, &name)?;
    let production = find_release(session, Track::Production, &name)?;

    let first_rollout = production.is_none();
    tracing::debug!(first_rollout, version_code = promotion.version_code, "promotion lookup");

    let source = production.or(beta).ok_or_else(|| {
        SyncError::NotFound(format!(
            "version {name} on track {} or {}; upload a beta version first",
            Track::Beta,
            Track::Production
        ))
    })?;

    let release = TrackRelease {
        name,
        version_codes: source.version_codes,
        rollout: promotion.rollout,
        release_notes: source.release_notes,
    };
    session.update_track(Track::Production, &[release])?;
    tracing::info!(
        track = %Track::Production,
        status = promotion.rollout.status(),
        fraction = ?promotion.rollout.user_fraction(),
        "track updated"
    );
    Ok(first_rollout)
}

/// Collect release notes for every published listing language.
///
/// `notes_for` returns `None` for languages without notes; those are skipped.
pub fn collect_release_notes<S, F>(
    session: &EditSession<'_, S>,
    notes_for: F,
) -> Result<Vec<LocalizedText>, SyncError>
where
    S: DistributionService + ?Sized,
    F: Fn(&LanguageCode) -> Result<Option<String>, SyncError>,
{
    let mut notes = Vec::new();
    for listing in session.list_listings()? {
        if let Some(text) = notes_for(&listing.language)? {
            tracing::debug!(language = %listing.language, "release notes found");
            notes.push(LocalizedText {
                language: listing.language,
                text,
            });
        }
    }
    Ok(notes)
}

/// Attach `notes` to the release named after `version_code` on the beta and
/// production tracks, wherever it exists.
///
/// Returns the tracks that were updated.
pub fn update_release_notes<S: DistributionService + ?Sized>(
    session: &EditSession<'_, S>,
    version_code: i64,
    notes: &[LocalizedText],
) -> Result<Vec<Track>, SyncError> {
    let name = version_code.to_string();
    let mut updated = Vec::new();
    for track in [Track::Beta, Track::Production] {
        let Some(release) = find_release(session, track, &name)? else {
            continue;
        };
        let release = TrackRelease {
            release_notes: notes.to_vec(),
            ..release
        };
        session.update_track(track, &[release])?;
        tracing::info!(track = %track, version_code, "release notes updated");
        updated.push(track);
    }
    Ok(updated)
}

fn find_release<S: DistributionService + ?Sized>(
    session: &EditSession<'_, S>,
    track: Track,
    name: &str,
) -> Result<Option<TrackRelease>, SyncError> {
    Ok(session
        .get_track(track)?
        .into_iter()
        .find(|release| release.name == name))
}
