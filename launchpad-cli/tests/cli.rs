use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const CONFIG_KEYS: [&str; 6] = [
    "GOOGLE_PLAY_PACKAGE_NAME",
    "GOOGLE_PLAY_ACCESS_TOKEN",
    "GITHUB_TOKEN",
    "GITHUB_OWNER",
    "GITHUB_REPO",
    "GITHUB_DEFAULT_BRANCH",
];

fn launchpad_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("launchpad"));
    cmd.current_dir(dir).env_remove("RUST_LOG");
    for key in CONFIG_KEYS {
        cmd.env_remove(key);
    }
    cmd
}

fn project() -> TempDir {
    let dir = TempDir::new().expect("project dir");
    fs::create_dir(dir.path().join(".git")).expect("create .git");
    dir
}

fn metadata_folder(project: &TempDir, relative: &str) -> std::path::PathBuf {
    let path = project.path().join("metadata/android").join(relative);
    fs::create_dir_all(&path).expect("create metadata folder");
    path
}

#[test]
fn help_lists_every_command_group() {
    let dir = project();
    launchpad_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("branches"))
        .stdout(contains("listings"))
        .stdout(contains("images"))
        .stdout(contains("release"))
        .stdout(contains("Open pull requests"))
        .stdout(contains("config"));
}

#[test]
fn config_set_then_get_round_trips_through_the_store() {
    let dir = project();
    launchpad_cmd(dir.path())
        .args(["config", "set", "GITHUB_OWNER", "acme"])
        .assert()
        .success()
        .stdout(contains("GITHUB_OWNER saved"));
    assert!(dir.path().join("launchpad.yaml").is_file());

    launchpad_cmd(dir.path())
        .args(["config", "get", "GITHUB_OWNER"])
        .assert()
        .success()
        .stdout(contains("acme"));
}

#[test]
fn config_set_from_a_subdirectory_writes_at_the_project_root() {
    let dir = project();
    let nested = dir.path().join("app/src");
    fs::create_dir_all(&nested).expect("nested dir");

    launchpad_cmd(&nested)
        .args(["config", "set", "GITHUB_REPO", "mobile"])
        .assert()
        .success();

    assert!(dir.path().join("launchpad.yaml").is_file());
    assert!(!nested.join("launchpad.yaml").exists());
}

#[test]
fn config_get_of_missing_key_names_the_key() {
    let dir = project();
    launchpad_cmd(dir.path())
        .args(["config", "get", "GITHUB_TOKEN"])
        .assert()
        .failure()
        .stderr(contains("GITHUB_TOKEN"));
}

#[test]
fn commands_outside_a_git_repository_fail() {
    let dir = TempDir::new().expect("plain dir");
    launchpad_cmd(dir.path())
        .args(["config", "get", "GITHUB_TOKEN"])
        .assert()
        .failure()
        .stderr(contains("no project root found"));
}

#[test]
fn listings_push_without_metadata_tree_suggests_pull() {
    let dir = project();
    launchpad_cmd(dir.path())
        .args(["listings", "push", "--yes"])
        .assert()
        .failure()
        .stderr(contains("listings pull"));
}

#[test]
fn listings_push_without_play_config_fails_before_any_request() {
    let dir = project();
    let en = metadata_folder(&dir, "en-US");
    fs::write(en.join("title.txt"), "Example\n").expect("title");

    launchpad_cmd(dir.path())
        .args(["listings", "push", "--yes"])
        .assert()
        .failure()
        .stderr(contains("Google Play is not configured"));
}

#[test]
fn images_push_rejects_unsupported_files() {
    let dir = project();
    let screenshots = metadata_folder(&dir, "en-US/images/phoneScreenshots");
    fs::write(screenshots.join("1.png"), b"png").expect("png");
    fs::write(screenshots.join("2.gif"), b"gif").expect("gif");

    launchpad_cmd(dir.path())
        .args(["images", "push", "phoneScreenshots", "--yes"])
        .assert()
        .failure()
        .stderr(contains("only jpg"));
}

#[test]
fn images_push_rejects_unknown_category() {
    let dir = project();
    launchpad_cmd(dir.path())
        .args(["images", "push", "screenshots"])
        .assert()
        .failure()
        .stderr(contains("screenshots"));
}

#[test]
fn images_push_keeping_existing_with_no_files_does_nothing() {
    let dir = project();
    metadata_folder(&dir, "en-US/images/featureGraphic");
    metadata_folder(&dir, "fr-FR");

    launchpad_cmd(dir.path())
        .args(["images", "push", "featureGraphic", "--keep-existing"])
        .assert()
        .success()
        .stdout(contains("No featureGraphic images to upload."));
}

#[test]
fn release_beta_rejects_unknown_archive_type() {
    let dir = project();
    fs::write(dir.path().join("app.zip"), b"zip").expect("archive");

    launchpad_cmd(dir.path())
        .args(["release", "beta", "app.zip"])
        .assert()
        .failure()
        .stderr(contains("unsupported archive"));
}

#[test]
fn release_beta_release_name_requires_replacement_code() {
    let dir = project();
    launchpad_cmd(dir.path())
        .args(["release", "beta", "app.aab", "--release-name", "2.1.0"])
        .assert()
        .failure()
        .stderr(contains("--replace-version-code"));
}

#[test]
fn release_promote_rejects_zero_rollout() {
    let dir = project();
    launchpad_cmd(dir.path())
        .args(["release", "promote", "42", "--rollout", "0"])
        .assert()
        .failure()
        .stderr(contains("between 1 and 100"));
}

#[test]
fn branches_clean_rejects_invalid_exclude_pattern() {
    let dir = project();
    launchpad_cmd(dir.path())
        .args(["branches", "clean", "--exclude", "(", "--yes"])
        .assert()
        .failure()
        .stderr(contains("invalid --exclude pattern"));
}

#[test]
fn pr_open_rejects_same_head_and_base() {
    let dir = project();
    launchpad_cmd(dir.path())
        .args(["pr", "open", "--token", "t", "--owner", "acme", "--repo", "app"])
        .args(["--head", "release/2.0", "--base", "release/2.0"])
        .assert()
        .failure()
        .stderr(contains("same head and base (release/2.0)"));
}

#[test]
fn pr_open_targets_the_default_branch() {
    let dir = project();
    launchpad_cmd(dir.path())
        .args(["pr", "open", "--token", "t", "--owner", "acme", "--repo", "app"])
        .args(["--head", "master"])
        .assert()
        .failure()
        .stderr(contains("same head and base (master)"));
}
