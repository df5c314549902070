mod common;

use common::FakeForge;
use launchpad_core::{BranchRef, PullRequestInfo, RepoSlug, SourceControlService};
use launchpad_sync::{delete_branches, deletable};

fn repo() -> RepoSlug {
    RepoSlug {
        owner: "acme".into(),
        name: "app".into(),
    }
}

fn branch(name: &str, prs: &[(u64, bool, bool, &str)]) -> BranchRef {
    BranchRef {
        name: name.into(),
        pull_requests: prs
            .iter()
            .map(|(number, merged, closed, base)| PullRequestInfo {
                number: *number,
                merged: *merged,
                closed: *closed,
                base_ref_name: Some(base.to_string()),
            })
            .collect(),
    }
}

fn forge() -> FakeForge {
    FakeForge {
        branches: vec![
            branch("master", &[(1, true, true, "master")]),
            branch("feature/login", &[(2, true, true, "master")]),
            branch("feature/base", &[(3, true, true, "master")]),
            branch("feature/stacked", &[(4, false, false, "feature/base")]),
            branch("spike", &[]),
            branch("fix/typo", &[(5, false, true, "master")]),
            branch("release/1.0", &[(6, true, true, "master")]),
        ],
        ..FakeForge::default()
    }
}

#[test]
fn cleanup_selects_finished_branches_in_forge_order() {
    let forge = forge();
    let branches = forge
        .list_branches_with_pull_requests(&repo())
        .expect("branches");

    let names = deletable(&branches, "master", |name| name.starts_with("release/"));

    assert_eq!(names, vec!["feature/login", "fix/typo"]);
}

#[test]
fn one_failed_deletion_does_not_stop_the_rest() {
    let forge = FakeForge {
        failing: vec!["b".into()],
        ..FakeForge::default()
    };
    let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];

    let report = delete_branches(&forge, &repo(), &names);

    assert_eq!(report.deleted, vec!["a", "c"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "b");
    assert!(report.has_failures());
    assert_eq!(*forge.deleted.borrow(), vec!["a", "c"]);
}

#[test]
fn clean_report_has_no_failures() {
    let forge = FakeForge::default();
    let report = delete_branches(&forge, &repo(), &["x".to_string()]);
    assert!(!report.has_failures());
}
