//! Shared fixtures for adapter tests.

use std::sync::Arc;

use super::client::{API_VERSION, VstsClient};
use super::repo::{VstsRepo, init_repo};
use crate::http::{HttpMethod, MockTransport};

pub const HOST: &str = "https://dev.azure.com/acme";
pub const REPO_ID: &str = "repo-id";

pub fn client(transport: &MockTransport) -> VstsClient {
    VstsClient::new_with_transport(HOST, "token", None, Arc::new(transport.clone()))
}

pub fn repos_url() -> String {
    format!("{HOST}/_apis/git/repositories?api-version={API_VERSION}")
}

/// URL of a repository-scoped endpoint; `query` is already encoded.
pub fn repo_api(path: &str, query: &str) -> String {
    if query.is_empty() {
        format!("{HOST}/_apis/git/repositories/{REPO_ID}/{path}?api-version={API_VERSION}")
    } else {
        format!("{HOST}/_apis/git/repositories/{REPO_ID}/{path}?{query}&api-version={API_VERSION}")
    }
}

pub fn branch_stats_json(name: &str, commit_id: &str, ahead: u64) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "aheadCount": ahead,
        "behindCount": 0,
        "commit": {
            "commitId": commit_id,
            "committer": {"name": "bot", "date": "2024-03-01T12:00:00Z"}
        }
    })
}

pub fn pr_json(id: u64, branch: &str, title: &str, status: u8) -> serde_json::Value {
    serde_json::json!({
        "pullRequestId": id,
        "sourceRefName": format!("refs/heads/{branch}"),
        "targetRefName": "refs/heads/master",
        "title": title,
        "status": status
    })
}

pub fn pull_requests_url() -> String {
    repo_api(
        "pullrequests",
        "searchCriteria.status=all&%24top=100&%24skip=0",
    )
}

/// A repository `proj/repo` on `master` at commit `1234`, with the
/// initialisation requests already cleared from the transport.
pub async fn init_fixture() -> (MockTransport, VstsRepo) {
    let transport = MockTransport::new();
    transport.push_json(
        HttpMethod::Get,
        repos_url(),
        200,
        serde_json::json!({"value": [{
            "id": REPO_ID,
            "name": "repo",
            "defaultBranch": "refs/heads/master",
            "project": {"name": "proj"}
        }]}),
    );
    transport.push_json(
        HttpMethod::Get,
        repo_api("stats/branches", "name=master"),
        200,
        branch_stats_json("master", "1234", 0),
    );

    let repo = init_repo(client(&transport), "repo")
        .await
        .expect("fixture repository should initialise");
    transport.clear_requests();
    (transport, repo)
}
