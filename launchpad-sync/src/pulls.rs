//! Opening pull requests on the hosted repository.

use launchpad_core::{OpenedPullRequest, PullRequestDraft, RepoSlug, SourceControlService};

use crate::SyncError;

/// Build a pull request merging `head` into `base`.
///
/// The title defaults to the head branch name.
pub fn draft(
    head: &str,
    base: &str,
    title: Option<String>,
    body: Option<String>,
) -> Result<PullRequestDraft, SyncError> {
    let head = head.trim();
    let draft = PullRequestDraft {
        head: head.to_string(),
        base: base.trim().to_string(),
        title: title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| head.to_string()),
        body: body.filter(|b| !b.trim().is_empty()),
    };
    check(&draft)?;
    Ok(draft)
}

fn check(draft: &PullRequestDraft) -> Result<(), SyncError> {
    if draft.head.is_empty() || draft.base.is_empty() {
        return Err(SyncError::Validation(
            "head and base branch names must not be empty".to_string(),
        ));
    }
    if draft.head == draft.base {
        return Err(SyncError::Validation(format!(
            "cannot open a pull request with the same head and base ({})",
            draft.head
        )));
    }
    Ok(())
}

/// Open `draft` on `repo`. An invalid draft is rejected without a remote call.
pub fn open<S: SourceControlService + ?Sized>(
    service: &S,
    repo: &RepoSlug,
    draft: &PullRequestDraft,
) -> Result<OpenedPullRequest, SyncError> {
    check(draft)?;
    tracing::debug!(repo = %repo, head = %draft.head, base = %draft.base, "opening pull request");
    let opened = service.open_pull_request(repo, draft)?;
    tracing::info!(repo = %repo, number = opened.number, url = %opened.url, "pull request opened");
    Ok(opened)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_defaults_to_head() {
        let draft = draft("feature/login", "master", None, None).unwrap();
        assert_eq!(draft.title, "feature/login");
        assert_eq!(draft.base, "master");
        assert_eq!(draft.body, None);
    }

    #[test]
    fn blank_title_and_body_fall_back() {
        let draft = draft("fix", "main", Some("  ".into()), Some("\n".into())).unwrap();
        assert_eq!(draft.title, "fix");
        assert_eq!(draft.body, None);
    }

    #[test]
    fn same_head_and_base_is_rejected() {
        let err = draft("master", " master", None, None).unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
        assert!(err.to_string().contains("same head and base (master)"));
    }

    #[test]
    fn empty_head_is_rejected() {
        assert!(matches!(
            draft(" ", "master", None, None),
            Err(SyncError::Validation(_))
        ));
    }
}
