//! Google Play Developer API (v3) adapter.

use serde::{Deserialize, Serialize};

use launchpad_core::{
    ArtifactKind, DistributionService, EditHandle, EditId, ImageAsset, ImageCategory,
    LanguageCode, ListingRecord, LocalizedText, PackageName, RemoteError, RemoteResult, Rollout,
    Track, TrackRelease, UploadSource,
};

use crate::http::{call_empty, call_json, send_json, HttpClient};

pub const PLAY_API_BASE: &str = "https://androidpublisher.googleapis.com";

/// [`DistributionService`] backed by the Play Developer API.
pub struct PlayClient {
    http: HttpClient,
    base_url: String,
}

impl PlayClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, PLAY_API_BASE)
    }

    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(access_token),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn app_url(&self, app: &PackageName) -> String {
        format!(
            "{}/androidpublisher/v3/applications/{app}/edits",
            self.base_url
        )
    }

    fn edit_url(&self, edit: &EditHandle, path: &str) -> String {
        format!("{}/{}{path}", self.app_url(&edit.app), edit.id)
    }

    fn upload_url(&self, edit: &EditHandle, path: &str) -> String {
        format!(
            "{}/upload/androidpublisher/v3/applications/{}/edits/{}{path}",
            self.base_url, edit.app, edit.id
        )
    }

    fn image_path(language: &LanguageCode, category: ImageCategory) -> String {
        format!("/listings/{language}/{category}")
    }
}

impl DistributionService for PlayClient {
    fn open_edit(&self, app: &PackageName) -> RemoteResult<EditId> {
        let edit: AppEdit = call_json(
            self.http
                .request("POST", &self.app_url(app))
                .set("Content-Length", "0"),
        )?;
        Ok(EditId(edit.id))
    }

    fn commit_edit(&self, edit: &EditHandle) -> RemoteResult<()> {
        call_empty(
            self.http
                .request("POST", &self.edit_url(edit, ":commit"))
                .set("Content-Length", "0"),
        )
    }

    fn get_track(&self, edit: &EditHandle, track: Track) -> RemoteResult<Vec<TrackRelease>> {
        let url = self.edit_url(edit, &format!("/tracks/{track}"));
        let wire: WireTrack = call_json(self.http.request("GET", &url))?;
        releases_from_wire(wire)
    }

    fn update_track(
        &self,
        edit: &EditHandle,
        track: Track,
        releases: &[TrackRelease],
    ) -> RemoteResult<()> {
        let url = self.edit_url(edit, &format!("/tracks/{track}"));
        let body = WireTrack {
            track: track.as_str().to_string(),
            releases: releases.iter().map(release_to_wire).collect(),
        };
        let _: serde_json::Value = send_json(self.http.request("PUT", &url), &body)?;
        Ok(())
    }

    fn list_listings(&self, edit: &EditHandle) -> RemoteResult<Vec<ListingRecord>> {
        let url = self.edit_url(edit, "/listings");
        let wire: WireListings = call_json(self.http.request("GET", &url))?;
        Ok(wire.listings.into_iter().map(listing_from_wire).collect())
    }

    fn update_listing(&self, edit: &EditHandle, listing: &ListingRecord) -> RemoteResult<()> {
        let url = self.edit_url(edit, &format!("/listings/{}", listing.language));
        let _: serde_json::Value =
            send_json(self.http.request("PATCH", &url), &listing_to_wire(listing))?;
        Ok(())
    }

    fn delete_listing(&self, edit: &EditHandle, language: &LanguageCode) -> RemoteResult<()> {
        let url = self.edit_url(edit, &format!("/listings/{language}"));
        call_empty(self.http.request("DELETE", &url))
    }

    fn list_images(
        &self,
        edit: &EditHandle,
        language: &LanguageCode,
        category: ImageCategory,
    ) -> RemoteResult<Vec<ImageAsset>> {
        let url = self.edit_url(edit, &Self::image_path(language, category));
        let wire: WireImages = call_json(self.http.request("GET", &url))?;
        Ok(wire
            .images
            .into_iter()
            .map(|image| ImageAsset {
                id: ImageAsset::id_from_url(&image.url),
                url: image.url,
                language: language.clone(),
                category,
            })
            .collect())
    }

    fn upload_image(
        &self,
        edit: &EditHandle,
        language: &LanguageCode,
        category: ImageCategory,
        image: &UploadSource,
    ) -> RemoteResult<()> {
        let url = self.upload_url(edit, &Self::image_path(language, category));
        let _: serde_json::Value = self.http.upload(&url, image)?;
        Ok(())
    }

    fn delete_all_images(
        &self,
        edit: &EditHandle,
        language: &LanguageCode,
        category: ImageCategory,
    ) -> RemoteResult<()> {
        let url = self.edit_url(edit, &Self::image_path(language, category));
        call_empty(self.http.request("DELETE", &url))
    }

    fn upload_artifact(
        &self,
        edit: &EditHandle,
        artifact: &UploadSource,
        kind: ArtifactKind,
    ) -> RemoteResult<i64> {
        let path = match kind {
            ArtifactKind::Bundle => "/bundles",
            ArtifactKind::Apk => "/apks",
        };
        let uploaded: UploadedArtifact = self.http.upload(&self.upload_url(edit, path), artifact)?;
        Ok(uploaded.version_code)
    }

    fn download(&self, url: &str) -> RemoteResult<Vec<u8>> {
        self.http.get_bytes(url)
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AppEdit {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedArtifact {
    version_code: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireTrack {
    track: String,
    #[serde(default)]
    releases: Vec<WireRelease>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRelease {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    /// Version codes travel as decimal strings.
    #[serde(default)]
    version_codes: Vec<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_fraction: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    release_notes: Vec<WireText>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireText {
    language: String,
    text: String,
}

#[derive(Deserialize)]
struct WireListings {
    #[serde(default)]
    listings: Vec<WireListing>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireListing {
    language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    full_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    video: Option<String>,
}

#[derive(Deserialize)]
struct WireImages {
    #[serde(default)]
    images: Vec<WireImage>,
}

#[derive(Deserialize)]
struct WireImage {
    url: String,
}

/// Releases with a status other than completed or inProgress (draft,
/// halted) are not addressable here and are skipped.
fn releases_from_wire(track: WireTrack) -> RemoteResult<Vec<TrackRelease>> {
    let mut releases = Vec::new();
    for wire in track.releases {
        let rollout = match (wire.status.as_deref(), wire.user_fraction) {
            (Some("completed"), _) => Rollout::Completed,
            (Some("inProgress"), Some(user_fraction)) => Rollout::InProgress { user_fraction },
            (status, _) => {
                tracing::debug!(track = %track.track, ?status, name = ?wire.name, "skipping release");
                continue;
            }
        };
        let version_codes = wire
            .version_codes
            .iter()
            .map(|code| {
                code.parse::<i64>().map_err(|_| {
                    RemoteError::InvalidResponse(format!("version code '{code}' is not a number"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        releases.push(TrackRelease {
            name: wire.name.unwrap_or_default(),
            version_codes,
            rollout,
            release_notes: wire
                .release_notes
                .into_iter()
                .map(|note| LocalizedText {
                    language: LanguageCode(note.language),
                    text: note.text,
                })
                .collect(),
        });
    }
    Ok(releases)
}

fn release_to_wire(release: &TrackRelease) -> WireRelease {
    WireRelease {
        name: Some(release.name.clone()),
        version_codes: release.version_codes.iter().map(i64::to_string).collect(),
        status: Some(release.rollout.status().to_string()),
        user_fraction: release.rollout.user_fraction(),
        release_notes: release
            .release_notes
            .iter()
            .map(|note| WireText {
                language: note.language.0.clone(),
                text: note.text.clone(),
            })
            .collect(),
    }
}

/// Remote text is trimmed and blank fields read as absent, matching how the
/// local tree is read back.
fn listing_from_wire(wire: WireListing) -> ListingRecord {
    let present = |value: Option<String>| {
        value
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    };
    ListingRecord {
        language: LanguageCode(wire.language),
        title: present(wire.title),
        short_description: present(wire.short_description),
        full_description: present(wire.full_description),
        video: present(wire.video),
    }
}

fn listing_to_wire(listing: &ListingRecord) -> WireListing {
    WireListing {
        language: listing.language.0.clone(),
        title: listing.title.clone(),
        short_description: listing.short_description.clone(),
        full_description: listing.full_description.clone(),
        video: listing.video.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn handle() -> EditHandle {
        EditHandle {
            app: PackageName::from("com.example.app"),
            id: EditId::from("123"),
        }
    }

    #[test]
    fn urls_follow_the_v3_layout() {
        let client = PlayClient::with_base_url("t", "https://play.test/");
        assert_eq!(
            client.edit_url(&handle(), "/tracks/beta"),
            "https://play.test/androidpublisher/v3/applications/com.example.app/edits/123/tracks/beta"
        );
        assert_eq!(
            client.upload_url(&handle(), "/bundles"),
            "https://play.test/upload/androidpublisher/v3/applications/com.example.app/edits/123/bundles"
        );
    }

    #[test]
    fn completed_release_omits_user_fraction() {
        let release = TrackRelease::new("42", vec![41, 42], Rollout::Completed);
        let value = serde_json::to_value(release_to_wire(&release)).unwrap();
        assert_eq!(
            value,
            json!({"name": "42", "versionCodes": ["41", "42"], "status": "completed"})
        );
    }

    #[test]
    fn staged_release_carries_fraction_and_notes() {
        let mut release =
            TrackRelease::new("42", vec![42], Rollout::InProgress { user_fraction: 0.5 });
        release.release_notes.push(LocalizedText {
            language: LanguageCode::from("en-US"),
            text: "Fixes".into(),
        });
        let value = serde_json::to_value(release_to_wire(&release)).unwrap();
        assert_eq!(value["status"], "inProgress");
        assert_eq!(value["userFraction"], 0.5);
        assert_eq!(value["releaseNotes"][0]["language"], "en-US");
    }

    #[test]
    fn track_parsing_skips_unaddressable_releases() {
        let wire: WireTrack = serde_json::from_value(json!({
            "track": "production",
            "releases": [
                {"name": "41", "versionCodes": ["41"], "status": "halted", "userFraction": 0.2},
                {"name": "42", "versionCodes": ["42", "43"], "status": "inProgress", "userFraction": 0.1},
                {"name": "40", "versionCodes": ["40"], "status": "completed"}
            ]
        }))
        .unwrap();
        let releases = releases_from_wire(wire).unwrap();
        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].version_codes, vec![42, 43]);
        assert_eq!(releases[0].rollout.user_fraction(), Some(0.1));
        assert_eq!(releases[1].rollout, Rollout::Completed);
    }

    #[test]
    fn non_numeric_version_code_is_invalid() {
        let wire: WireTrack = serde_json::from_value(json!({
            "track": "beta",
            "releases": [{"name": "x", "versionCodes": ["abc"], "status": "completed"}]
        }))
        .unwrap();
        assert!(matches!(
            releases_from_wire(wire),
            Err(RemoteError::InvalidResponse(_))
        ));
    }

    #[test]
    fn halted_only_track_reads_as_empty() {
        let wire: WireTrack = serde_json::from_value(json!({
            "track": "production",
            "releases": [
                {"name": "41", "versionCodes": ["41"], "status": "halted", "userFraction": 0.2},
                {"name": "42", "versionCodes": ["42"], "status": "draft"}
            ]
        }))
        .unwrap();
        assert!(releases_from_wire(wire).unwrap().is_empty());
    }

    #[test]
    fn empty_track_has_no_releases() {
        let wire: WireTrack = serde_json::from_value(json!({"track": "beta"})).unwrap();
        assert!(releases_from_wire(wire).unwrap().is_empty());
    }

    #[test]
    fn listing_patch_sends_only_present_fields() {
        let listing = ListingRecord::new("fr-FR").with_title("Bonjour");
        let value = serde_json::to_value(listing_to_wire(&listing)).unwrap();
        assert_eq!(value, json!({"language": "fr-FR", "title": "Bonjour"}));
    }

    #[test]
    fn blank_remote_fields_are_absent() {
        let wire: WireListing = serde_json::from_value(json!({
            "language": "en-US",
            "title": "App",
            "shortDescription": "Short",
            "fullDescription": "Full",
            "video": ""
        }))
        .unwrap();
        let record = listing_from_wire(wire);
        assert_eq!(record.video, None);
        assert_eq!(record.short_description.as_deref(), Some("Short"));
    }

    #[test]
    fn remote_text_is_trimmed() {
        let wire: WireListing = serde_json::from_value(json!({
            "language": "en-US",
            "title": "  App ",
            "fullDescription": "Line one\nLine two\n",
            "video": "\n"
        }))
        .unwrap();
        let record = listing_from_wire(wire);
        assert_eq!(record.title.as_deref(), Some("App"));
        assert_eq!(record.full_description.as_deref(), Some("Line one\nLine two"));
        assert_eq!(record.video, None);
    }
}
