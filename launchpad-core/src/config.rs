//! Credential store and configuration resolution.
//!
//! # Storage layout
//!
//! ```text
//! <project root>/            (nearest ancestor holding `.git`)
//!   launchpad.yaml           (flat key/value map, mode 0600)
//! ```
//!
//! # Resolution precedence
//!
//! 1. explicit value (a CLI flag)
//! 2. process environment variable named after the key
//! 3. value stored in `launchpad.yaml`
//! 4. [`ConfigError::MissingKey`]
//!
//! As in the rest of the workspace, file operations come in two forms:
//! `fn_at(path, …)` for tests and `fn(…)` deriving the path from the
//! working directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Utc;

use crate::error::ConfigError;
use crate::types::{PackageName, RepoSlug};

pub const STORE_FILE_NAME: &str = "launchpad.yaml";
pub const DEFAULT_BRANCH: &str = "master";
const GITHUB_HOST: &str = "github.com";

/// Well-known configuration keys.
pub mod keys {
    pub const GOOGLE_PLAY_PACKAGE_NAME: &str = "GOOGLE_PLAY_PACKAGE_NAME";
    pub const GOOGLE_PLAY_ACCESS_TOKEN: &str = "GOOGLE_PLAY_ACCESS_TOKEN";
    pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
    pub const GITHUB_OWNER: &str = "GITHUB_OWNER";
    pub const GITHUB_REPO: &str = "GITHUB_REPO";
    pub const GITHUB_DEFAULT_BRANCH: &str = "GITHUB_DEFAULT_BRANCH";
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// Walk up from `start` to the first directory containing `.git`.
pub fn find_project_root_at(start: &Path) -> Result<PathBuf, ConfigError> {
    let mut dir = Some(start);
    while let Some(candidate) = dir {
        if candidate.join(".git").exists() {
            return Ok(candidate.to_path_buf());
        }
        dir = candidate.parent();
    }
    Err(ConfigError::ProjectRootNotFound {
        start: start.to_path_buf(),
    })
}

/// `find_project_root_at` from the current working directory.
pub fn find_project_root() -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir()?;
    find_project_root_at(&cwd)
}

/// `<root>/launchpad.yaml` — pure, no I/O.
pub fn store_path_at(root: &Path) -> PathBuf {
    root.join(STORE_FILE_NAME)
}

// ---------------------------------------------------------------------------
// 2. Credential store
// ---------------------------------------------------------------------------

/// Process-wide key/value store persisted next to the repository.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl CredentialStore {
    /// Load the store at `path`.
    ///
    /// A missing file yields an empty store; a malformed one is a
    /// [`ConfigError::Parse`] naming the path.
    pub fn load_at(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self {
                path: path.to_path_buf(),
                values: BTreeMap::new(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        let blank = contents.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#')
        });
        if blank {
            return Ok(Self {
                path: path.to_path_buf(),
                values: BTreeMap::new(),
            });
        }
        let values: Option<BTreeMap<String, String>> = serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            values: values.unwrap_or_default(),
        })
    }

    /// `load_at` for the store of the enclosing project.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_at(&store_path_at(&find_project_root()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_or_fail(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::MissingKey {
            key: key.to_string(),
        })
    }

    /// Set `key` and persist the whole store.
    ///
    /// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
    pub fn put(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let body = serde_yaml::to_string(&self.values)?;
        let content = format!(
            "# launchpad configuration, updated {}\n{body}",
            Utc::now().to_rfc3339()
        );
        let tmp = self.path.with_extension("yaml.tmp");
        std::fs::write(&tmp, content)?;
        set_file_permissions(&tmp)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 3. Resolution
// ---------------------------------------------------------------------------

type EnvLookup<'a> = Box<dyn Fn(&str) -> Option<String> + 'a>;

/// Applies the explicit → environment → store precedence.
pub struct Resolver<'a> {
    store: &'a CredentialStore,
    env: EnvLookup<'a>,
}

impl<'a> Resolver<'a> {
    /// Resolver reading the process environment.
    pub fn new(store: &'a CredentialStore) -> Self {
        Self::with_env(store, |key| std::env::var(key).ok())
    }

    /// Resolver with an injected environment; used by tests.
    pub fn with_env(store: &'a CredentialStore, env: impl Fn(&str) -> Option<String> + 'a) -> Self {
        Self {
            store,
            env: Box::new(env),
        }
    }

    pub fn optional(&self, key: &str, explicit: Option<String>) -> Option<String> {
        explicit
            .filter(|v| !v.is_empty())
            .or_else(|| (self.env)(key).filter(|v| !v.is_empty()))
            .or_else(|| self.store.get(key).map(str::to_string))
    }

    pub fn required(&self, key: &str, explicit: Option<String>) -> Result<String, ConfigError> {
        self.optional(key, explicit)
            .ok_or_else(|| ConfigError::MissingKey {
                key: key.to_string(),
            })
    }
}

/// Explicit distribution-console options, usually straight from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    pub package_name: Option<String>,
    pub access_token: Option<String>,
}

/// Fully resolved distribution-console settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayConfig {
    pub package_name: PackageName,
    pub access_token: String,
}

impl PlayOptions {
    pub fn resolve(self, resolver: &Resolver<'_>) -> Result<PlayConfig, ConfigError> {
        let package_name =
            resolver.required(keys::GOOGLE_PLAY_PACKAGE_NAME, self.package_name)?;
        let access_token =
            resolver.required(keys::GOOGLE_PLAY_ACCESS_TOKEN, self.access_token)?;
        Ok(PlayConfig {
            package_name: PackageName::from(package_name),
            access_token,
        })
    }
}

/// Explicit forge options, usually straight from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct GithubOptions {
    pub token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub default_branch: Option<String>,
}

/// Fully resolved forge settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubConfig {
    pub token: String,
    pub repo: RepoSlug,
    pub default_branch: String,
}

impl GithubOptions {
    /// Resolve every forge setting.
    ///
    /// Owner and repository fall back to the slug parsed from `origin_url`,
    /// which is only invoked when at least one of them is unresolved.
    pub fn resolve(
        self,
        resolver: &Resolver<'_>,
        origin_url: impl FnOnce() -> Result<String, ConfigError>,
    ) -> Result<GithubConfig, ConfigError> {
        let token = resolver.required(keys::GITHUB_TOKEN, self.token)?;
        let owner = resolver.optional(keys::GITHUB_OWNER, self.owner);
        let name = resolver.optional(keys::GITHUB_REPO, self.repo);

        let repo = match (owner, name) {
            (Some(owner), Some(name)) => RepoSlug { owner, name },
            (owner, name) => {
                let origin = RepoSlug::from_remote_url(&origin_url()?)?;
                RepoSlug {
                    owner: owner.unwrap_or(origin.owner),
                    name: name.unwrap_or(origin.name),
                }
            }
        };

        let default_branch = resolver
            .optional(keys::GITHUB_DEFAULT_BRANCH, self.default_branch)
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

        Ok(GithubConfig {
            token,
            repo,
            default_branch,
        })
    }
}

/// URL of the `origin` remote of the repository at `root`.
pub fn git_origin_url_at(root: &Path) -> Result<String, ConfigError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(root)
        .args(["remote", "get-url", "origin"])
        .output()?;
    if !output.status.success() {
        return Err(ConfigError::InvalidRemote {
            url: "origin".to_string(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Name of the branch checked out in the repository at `root`.
pub fn git_current_branch_at(root: &Path) -> Result<String, ConfigError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(root)
        .args(["symbolic-ref", "--quiet", "--short", "HEAD"])
        .output()?;
    let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !output.status.success() || branch.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ConfigError::NoCurrentBranch {
            root: root.to_path_buf(),
            reason: if stderr.is_empty() {
                "HEAD is detached".to_string()
            } else {
                stderr
            },
        });
    }
    Ok(branch)
}

impl RepoSlug {
    /// Parse `owner/name` out of a GitHub remote URL.
    ///
    /// Accepts `https://github.com/owner/name(.git)`,
    /// `ssh://git@github.com/owner/name.git` and the scp-like
    /// `git@github.com:owner/name.git`. Any other host is rejected.
    pub fn from_remote_url(url: &str) -> Result<RepoSlug, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidRemote {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let (authority, path) = match url.split_once("://") {
            Some((_scheme, rest)) => rest.split_once('/').unwrap_or((rest, "")),
            None => url
                .split_once(':')
                .ok_or_else(|| invalid("not a URL"))?,
        };

        let host = authority.rsplit('@').next().unwrap_or(authority);
        let host = host.split(':').next().unwrap_or(host);
        if !host.eq_ignore_ascii_case(GITHUB_HOST) {
            return Err(invalid("only github.com remotes are supported"));
        }

        let mut segments = path.trim_matches('/').split('/');
        let owner = segments.next().unwrap_or_default();
        let name = segments
            .next()
            .unwrap_or_default()
            .trim_end_matches(".git");
        if owner.is_empty() || name.is_empty() {
            return Err(invalid("expected <owner>/<repository> in the path"));
        }

        Ok(RepoSlug {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
