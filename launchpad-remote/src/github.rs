//! GitHub adapter: GraphQL for branch discovery, REST for ref deletion and
//! pull request creation.

use serde::{Deserialize, Serialize};
use serde_json::json;

use launchpad_core::{
    BranchRef, OpenedPullRequest, PullRequestDraft, PullRequestInfo, RemoteError, RemoteResult,
    RepoSlug, SourceControlService,
};

use crate::http::{call_empty, send_json, HttpClient};

pub const GITHUB_API: &str = "https://api.github.com";

const PAGE_SIZE: u32 = 100;

const REFS_QUERY: &str = r#"
query($owner: String!, $name: String!, $pageSize: Int!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    refs(refPrefix: "refs/heads/", first: $pageSize, after: $cursor) {
      pageInfo { hasNextPage endCursor }
      nodes {
        name
        associatedPullRequests(first: 100) {
          nodes { number merged closed baseRefName }
        }
      }
    }
  }
}
"#;

/// [`SourceControlService`] backed by api.github.com.
pub struct GithubClient {
    http: HttpClient,
    api_url: String,
}

impl GithubClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_url(token, GITHUB_API)
    }

    pub fn with_api_url(token: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(token),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn ref_url(&self, repo: &RepoSlug, branch: &str) -> String {
        format!(
            "{}/repos/{}/{}/git/refs/heads/{}",
            self.api_url,
            repo.owner,
            repo.name,
            encode_ref(branch)
        )
    }

    fn pulls_url(&self, repo: &RepoSlug) -> String {
        format!("{}/repos/{}/{}/pulls", self.api_url, repo.owner, repo.name)
    }
}

impl SourceControlService for GithubClient {
    fn list_branches_with_pull_requests(&self, repo: &RepoSlug) -> RemoteResult<Vec<BranchRef>> {
        let url = format!("{}/graphql", self.api_url);
        let mut branches = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let body = json!({
                "query": REFS_QUERY,
                "variables": {
                    "owner": repo.owner,
                    "name": repo.name,
                    "pageSize": PAGE_SIZE,
                    "cursor": cursor,
                },
            });
            let response: GraphqlResponse<RefsData> =
                send_json(self.http.request("POST", &url), &body)?;
            let refs = refs_from_response(response, repo)?;
            tracing::debug!(repo = %repo, count = refs.nodes.len(), "fetched ref page");
            let next = next_cursor(&refs.page_info);
            branches.extend(branches_from_nodes(refs.nodes));
            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(branches)
    }

    fn delete_branch(&self, repo: &RepoSlug, name: &str) -> RemoteResult<()> {
        call_empty(self.http.request("DELETE", &self.ref_url(repo, name)))
    }

    fn open_pull_request(
        &self,
        repo: &RepoSlug,
        draft: &PullRequestDraft,
    ) -> RemoteResult<OpenedPullRequest> {
        let created: WireCreatedPull = send_json(
            self.http.request("POST", &self.pulls_url(repo)),
            &WireNewPull::from(draft),
        )?;
        Ok(OpenedPullRequest {
            number: created.number,
            url: created.html_url,
        })
    }
}

/// Percent-encode a branch name for a URL path, keeping `/` separators.
fn encode_ref(name: &str) -> String {
    name.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
struct RefsData {
    repository: Option<RepositoryNode>,
}

#[derive(Deserialize)]
struct RepositoryNode {
    refs: RefConnection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefConnection {
    page_info: PageInfo,
    #[serde(default)]
    nodes: Vec<RefNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefNode {
    name: String,
    associated_pull_requests: PullRequestConnection,
}

#[derive(Deserialize)]
struct PullRequestConnection {
    #[serde(default)]
    nodes: Vec<PullRequestNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    number: u64,
    merged: bool,
    closed: bool,
    base_ref_name: Option<String>,
}

#[derive(Serialize)]
struct WireNewPull<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

impl<'a> From<&'a PullRequestDraft> for WireNewPull<'a> {
    fn from(draft: &'a PullRequestDraft) -> Self {
        Self {
            title: &draft.title,
            head: &draft.head,
            base: &draft.base,
            body: draft.body.as_deref(),
        }
    }
}

#[derive(Deserialize)]
struct WireCreatedPull {
    number: u64,
    html_url: String,
}

fn refs_from_response(
    response: GraphqlResponse<RefsData>,
    repo: &RepoSlug,
) -> RemoteResult<RefConnection> {
    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(RemoteError::InvalidResponse(messages.join("; ")));
    }
    response
        .data
        .and_then(|data| data.repository)
        .map(|repository| repository.refs)
        .ok_or_else(|| RemoteError::InvalidResponse(format!("repository {repo} not found")))
}

fn next_cursor(page: &PageInfo) -> Option<String> {
    if page.has_next_page {
        page.end_cursor.clone()
    } else {
        None
    }
}

fn branches_from_nodes(nodes: Vec<RefNode>) -> Vec<BranchRef> {
    nodes
        .into_iter()
        .map(|node| BranchRef {
            name: node.name,
            pull_requests: node
                .associated_pull_requests
                .nodes
                .into_iter()
                .map(|pr| PullRequestInfo {
                    number: pr.number,
                    merged: pr.merged,
                    closed: pr.closed,
                    base_ref_name: pr.base_ref_name,
                })
                .collect(),
        })
        .collect()
}
