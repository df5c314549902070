//! Store listing reconciliation.
//!
//! [`diff`] compares local and remote listing sets keyed by language;
//! [`apply`] pushes the result through an open edit.

use std::collections::{HashMap, HashSet};

use similar::TextDiff;

use launchpad_core::{DistributionService, LanguageCode, ListingRecord};

use crate::edit::EditSession;
use crate::SyncError;

/// Proposed listing changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingChanges {
    /// Local records that are new or would change a remote field, in local
    /// order.
    pub updates: Vec<ListingRecord>,
    /// Languages published remotely but absent locally.
    pub removals: Vec<LanguageCode>,
}

impl ListingChanges {
    /// Nothing to push; callers skip confirmation and apply.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.removals.is_empty()
    }
}

/// Compute the updates and removals that make the remote match `local`.
///
/// A local record is an update when patching its present fields onto the
/// remote record would change it. Text is compared trimmed, so a field the
/// local tree leaves out never counts as a change.
pub fn diff(local: &[ListingRecord], remote: &[ListingRecord]) -> ListingChanges {
    let remote_by_language: HashMap<&LanguageCode, &ListingRecord> =
        remote.iter().map(|r| (&r.language, r)).collect();
    let local_languages: HashSet<&LanguageCode> = local.iter().map(|r| &r.language).collect();

    let updates = local
        .iter()
        .filter(|record| match remote_by_language.get(&record.language) {
            Some(remote) => changes_remote(record, remote),
            None => true,
        })
        .cloned()
        .collect();

    let removals = remote
        .iter()
        .filter(|record| !local_languages.contains(&record.language))
        .map(|record| record.language.clone())
        .collect();

    ListingChanges { updates, removals }
}

fn changes_remote(local: &ListingRecord, remote: &ListingRecord) -> bool {
    let remote = remote.normalized();
    remote.merged_with(&local.normalized()) != remote
}

/// Read every published listing through `session`.
pub fn fetch_remote<S: DistributionService + ?Sized>(
    session: &EditSession<'_, S>,
) -> Result<Vec<ListingRecord>, SyncError> {
    session.list_listings()
}

/// Push `changes` through `session`.
///
/// Updates only overwrite the fields present locally; removals delete the
/// whole listing for a language. The first failure stops the remaining
/// staged operations and leaves the edit uncommitted.
pub fn apply<S: DistributionService + ?Sized>(
    session: &EditSession<'_, S>,
    changes: &ListingChanges,
) -> Result<(), SyncError> {
    for record in &changes.updates {
        tracing::debug!(
            language = %record.language,
            title = ?record.title,
            short_description = ?record.short_description,
            video = ?record.video,
            "updating listing"
        );
        session.update_listing(record)?;
    }
    for language in &changes.removals {
        tracing::debug!(language = %language, "removing listing");
        session.delete_listing(language)?;
    }
    tracing::info!(
        updated = changes.updates.len(),
        removed = changes.removals.len(),
        "listing changes staged"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Field previews
// ---------------------------------------------------------------------------

/// Unified diff of one listing field, remote text on the `a/` side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    pub language: LanguageCode,
    pub field: &'static str,
    pub unified_diff: String,
}

/// Per-field diffs for an update against the remote record it replaces.
///
/// Only fields present in `update` are compared since absent fields are
/// never pushed.
pub fn field_diffs(update: &ListingRecord, remote: Option<&ListingRecord>) -> Vec<FieldDiff> {
    let fields: [(&'static str, &Option<String>, &str); 4] = [
        (
            "title",
            &update.title,
            remote.and_then(|r| r.title.as_deref()).unwrap_or(""),
        ),
        (
            "short_description",
            &update.short_description,
            remote
                .and_then(|r| r.short_description.as_deref())
                .unwrap_or(""),
        ),
        (
            "full_description",
            &update.full_description,
            remote
                .and_then(|r| r.full_description.as_deref())
                .unwrap_or(""),
        ),
        (
            "video",
            &update.video,
            remote.and_then(|r| r.video.as_deref()).unwrap_or(""),
        ),
    ];

    let mut diffs = Vec::new();
    for (field, local, remote_text) in fields {
        let Some(local_text) = local.as_deref() else {
            continue;
        };
        if local_text.trim() == remote_text.trim() {
            continue;
        }
        let old_text = with_trailing_newline(remote_text);
        let new_text = with_trailing_newline(local_text);
        let old_header = format!("a/{}/{field}", update.language);
        let new_header = format!("b/{}/{field}", update.language);
        let unified_diff = TextDiff::from_lines(&old_text, &new_text)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();
        diffs.push(FieldDiff {
            language: update.language.clone(),
            field,
            unified_diff,
        });
    }
    diffs
}

fn with_trailing_newline(text: &str) -> String {
    if text.is_empty() || text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en(title: &str) -> ListingRecord {
        ListingRecord::new("en-US").with_title(title)
    }

    #[test]
    fn identical_sets_produce_no_changes() {
        let records = vec![en("A"), ListingRecord::new("fr-FR").with_title("B")];
        assert!(diff(&records, &records).is_empty());
    }

    #[test]
    fn remote_only_language_is_removed() {
        let local = vec![en("A")];
        let remote = vec![en("A"), ListingRecord::new("fr-FR").with_title("B")];
        let changes = diff(&local, &remote);
        assert!(changes.updates.is_empty());
        assert_eq!(changes.removals, vec![LanguageCode::from("fr-FR")]);
    }

    #[test]
    fn new_and_changed_languages_are_updates_in_local_order() {
        let local = vec![
            ListingRecord::new("de-DE").with_title("Neu"),
            en("A2"),
            ListingRecord::new("fr-FR").with_title("B"),
        ];
        let remote = vec![en("A"), ListingRecord::new("fr-FR").with_title("B")];
        let changes = diff(&local, &remote);
        let languages: Vec<&str> = changes.updates.iter().map(|r| r.language.as_str()).collect();
        assert_eq!(languages, vec!["de-DE", "en-US"]);
        assert!(changes.removals.is_empty());
    }

    #[test]
    fn any_field_difference_is_a_change() {
        let local = vec![en("A").with_video("https://youtu.be/1")];
        let remote = vec![en("A")];
        assert_eq!(diff(&local, &remote).updates.len(), 1);
    }

    #[test]
    fn field_missing_locally_is_not_a_change() {
        let local = vec![en("A")];
        let remote = vec![en("A").with_video("https://youtu.be/1")];
        assert!(diff(&local, &remote).is_empty());
    }

    #[test]
    fn surrounding_whitespace_is_not_a_change() {
        let local = vec![en("A").with_full_description("Line one\nLine two")];
        let remote = vec![en(" A").with_full_description("Line one\nLine two\n")];
        assert!(diff(&local, &remote).is_empty());
    }

    #[test]
    fn field_diffs_skip_absent_and_equal_fields() {
        let remote = en("Old").with_short_description("same");
        let update = ListingRecord::new("en-US")
            .with_title("New")
            .with_short_description("same");
        let diffs = field_diffs(&update, Some(&remote));
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].field, "title");
        assert!(diffs[0].unified_diff.contains("--- a/en-US/title"));
        assert!(diffs[0].unified_diff.contains("-Old"));
        assert!(diffs[0].unified_diff.contains("+New"));
    }

    #[test]
    fn field_diffs_for_new_language_show_additions() {
        let update = en("Hello");
        let diffs = field_diffs(&update, None);
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].unified_diff.contains("+Hello"));
    }
}
