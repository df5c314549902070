//! Branch lifecycle analysis and cleanup.

use std::collections::HashSet;

use launchpad_core::{BranchRef, RemoteError, RepoSlug, SourceControlService};

/// Names of branches that some open pull request targets.
pub fn active_base_branches(branches: &[BranchRef]) -> HashSet<&str> {
    branches
        .iter()
        .flat_map(|branch| branch.pull_requests.iter())
        .filter(|pr| pr.is_open())
        .filter_map(|pr| pr.base_ref_name.as_deref())
        .collect()
}

/// Branches that are safe to delete, in input order.
///
/// A branch is kept when it is the default branch, matches `exclude`, has no
/// pull requests, has an open pull request, or is the base of another
/// branch's open pull request.
pub fn deletable<F>(branches: &[BranchRef], default_branch: &str, exclude: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let bases = active_base_branches(branches);
    branches
        .iter()
        .filter(|branch| {
            let name = branch.name.as_str();
            if name == default_branch || exclude(name) {
                return false;
            }
            if branch.pull_requests.is_empty() {
                tracing::debug!(branch = name, "kept: no pull requests");
                return false;
            }
            if branch.pull_requests.iter().any(|pr| pr.is_open()) {
                tracing::debug!(branch = name, "kept: open pull request");
                return false;
            }
            if bases.contains(name) {
                tracing::debug!(branch = name, "kept: base of an open pull request");
                return false;
            }
            true
        })
        .map(|branch| branch.name.clone())
        .collect()
}

/// Outcome of a batch of ref deletions.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, RemoteError)>,
}

impl CleanupReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Delete each branch ref; a failed deletion is recorded and the rest proceed.
pub fn delete_branches<S: SourceControlService + ?Sized>(
    service: &S,
    repo: &RepoSlug,
    names: &[String],
) -> CleanupReport {
    let mut report = CleanupReport::default();
    for name in names {
        match service.delete_branch(repo, name) {
            Ok(()) => {
                tracing::info!(repo = %repo, branch = %name, "branch deleted");
                report.deleted.push(name.clone());
            }
            Err(err) => {
                tracing::warn!(repo = %repo, branch = %name, error = %err, "could not delete branch");
                report.failed.push((name.clone(), err));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_core::PullRequestInfo;

    fn pr(number: u64, merged: bool, closed: bool, base: &str) -> PullRequestInfo {
        PullRequestInfo {
            number,
            merged,
            closed,
            base_ref_name: Some(base.to_string()),
        }
    }

    fn branch(name: &str, pull_requests: Vec<PullRequestInfo>) -> BranchRef {
        BranchRef {
            name: name.to_string(),
            pull_requests,
        }
    }

    fn keep_all(_: &str) -> bool {
        false
    }

    #[test]
    fn default_branch_is_never_deletable() {
        let branches = vec![branch("master", vec![pr(1, true, true, "release")])];
        assert!(deletable(&branches, "master", keep_all).is_empty());
    }

    #[test]
    fn custom_default_branch_is_respected() {
        let branches = vec![
            branch("main", vec![pr(1, true, true, "dev")]),
            branch("master", vec![pr(2, true, true, "main")]),
        ];
        assert_eq!(deletable(&branches, "main", keep_all), vec!["master"]);
    }

    #[test]
    fn branch_without_pull_requests_is_kept() {
        let branches = vec![branch("wip", vec![])];
        assert!(deletable(&branches, "master", keep_all).is_empty());
    }

    #[test]
    fn open_pull_request_keeps_branch() {
        let branches = vec![branch(
            "feature",
            vec![pr(1, true, true, "master"), pr(2, false, false, "master")],
        )];
        assert!(deletable(&branches, "master", keep_all).is_empty());
    }

    #[test]
    fn base_of_open_pull_request_is_kept() {
        let branches = vec![
            branch("a", vec![pr(1, false, false, "b")]),
            branch("b", vec![pr(2, true, true, "master")]),
        ];
        assert!(deletable(&branches, "master", keep_all).is_empty());
    }

    #[test]
    fn closed_branch_without_dependants_is_deletable() {
        let branches = vec![
            branch("a", vec![pr(1, true, true, "b")]),
            branch("c", vec![pr(2, false, true, "master")]),
        ];
        assert_eq!(deletable(&branches, "master", keep_all), vec!["a", "c"]);
    }

    #[test]
    fn exclusion_filter_keeps_matches() {
        let branches = vec![
            branch("release/1.0", vec![pr(1, true, true, "master")]),
            branch("fix", vec![pr(2, true, true, "master")]),
        ];
        let result = deletable(&branches, "master", |name| name.starts_with("release/"));
        assert_eq!(result, vec!["fix"]);
    }
}
