//! End-to-end tests for the Azure DevOps adapter.
//!
//! These tests drive the public API against an in-memory Azure DevOps
//! stand-in implemented as an [`HttpTransport`]. The stand-in keeps real
//! state (refs, commits, files, pull requests, threads), so each scenario
//! exercises the full request/response cycle of a dependency-update run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use steward::http::{HttpError, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use steward::{
    BranchStatus, CommitFile, Platform, PlatformError, PrState, VstsClient, VstsRepo, init_repo,
};
use url::Url;

/// If exceeded, a request loop is likely stuck.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

const ENDPOINT: &str = "https://dev.azure.com/acme";
const REPO_ID: &str = "3f1c9a2e-repo";
const ZERO: &str = "0000000000000000000000000000000000000000";

#[derive(Default)]
struct FakeState {
    /// Full ref name -> commit id.
    refs: HashMap<String, String>,
    /// Commit id -> parent ids.
    parents: HashMap<String, Vec<String>>,
    /// (branch, path) -> content.
    files: HashMap<(String, String), String>,
    prs: Vec<Value>,
    /// PR number -> threads.
    threads: HashMap<u64, Vec<Value>>,
    labels: Vec<(u64, String)>,
    next_id: u64,
    requests: usize,
}

/// Minimal in-memory Azure DevOps Git service.
#[derive(Clone, Default)]
struct FakeAzureDevOps {
    state: Arc<Mutex<FakeState>>,
}

impl FakeAzureDevOps {
    fn seeded() -> Self {
        let fake = Self::default();
        {
            let mut state = fake.state.lock().unwrap();
            state
                .refs
                .insert("refs/heads/master".to_string(), "base-1".to_string());
            state.parents.insert("base-1".to_string(), Vec::new());
            state.files.insert(
                ("master".to_string(), "/package.json".to_string()),
                "{\"dependencies\":{\"lodash\":\"4.17.20\"}}".to_string(),
            );
            state.files.insert(
                ("master".to_string(), "/src/index.js".to_string()),
                "module.exports = 1;".to_string(),
            );
            state.next_id = 100;
        }
        fake
    }

    fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests
    }

    fn labels(&self) -> Vec<(u64, String)> {
        self.state.lock().unwrap().labels.clone()
    }

    fn json(status: u16, body: Value) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.to_string().into_bytes(),
        }
    }

    fn not_found(message: &str) -> HttpResponse {
        Self::json(404, json!({"message": message}))
    }

    fn branch_stats(state: &FakeState, branch: &str) -> Option<Value> {
        let commit = state.refs.get(&format!("refs/heads/{branch}"))?;
        let ahead = u64::from(branch != "master");
        Some(json!({
            "name": branch,
            "aheadCount": ahead,
            "behindCount": 0,
            "commit": {
                "commitId": commit,
                "committer": {"name": "bot", "date": "2024-05-01T08:30:00Z"}
            }
        }))
    }

    fn route(&self, request: &HttpRequest) -> HttpResponse {
        let mut state = self.state.lock().unwrap();
        state.requests += 1;

        let url = Url::parse(&request.url).expect("adapter sends absolute URLs");
        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let path = url
            .path()
            .strip_prefix("/acme/_apis/git/")
            .expect("git API path")
            .to_string();
        let segments: Vec<&str> = path.split('/').collect();
        let body: Value = if request.body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&request.body).expect("JSON request body")
        };

        match (request.method, segments.as_slice()) {
            (HttpMethod::Get, ["repositories"]) => Self::json(
                200,
                json!({"value": [{
                    "id": REPO_ID,
                    "name": "website",
                    "defaultBranch": "refs/heads/master",
                    "project": {"name": "tools"}
                }]}),
            ),
            (HttpMethod::Get, ["repositories", _, "stats", "branches"]) => match query.get("name") {
                Some(name) => match Self::branch_stats(&state, name) {
                    Some(stats) => Self::json(200, stats),
                    None => Self::not_found("branch not found"),
                },
                None => {
                    let mut names: Vec<String> = state
                        .refs
                        .keys()
                        .filter_map(|r| r.strip_prefix("refs/heads/"))
                        .map(str::to_string)
                        .collect();
                    names.sort();
                    let value: Vec<Value> = names
                        .iter()
                        .filter_map(|n| Self::branch_stats(&state, n))
                        .collect();
                    Self::json(200, json!({ "value": value }))
                }
            },
            (HttpMethod::Get, ["repositories", _, "refs"]) => {
                let filter = format!("refs/{}", query.get("filter").cloned().unwrap_or_default());
                let value: Vec<Value> = state
                    .refs
                    .iter()
                    .filter(|(name, _)| name.starts_with(&filter))
                    .map(|(name, id)| json!({"name": name, "objectId": id}))
                    .collect();
                Self::json(200, json!({ "value": value }))
            }
            (HttpMethod::Post, ["repositories", _, "refs"]) => {
                let mut value = Vec::new();
                for update in body.as_array().expect("ref updates") {
                    let name = update["name"].as_str().unwrap().to_string();
                    let old = update["oldObjectId"].as_str().unwrap().to_string();
                    let new = update["newObjectId"].as_str().unwrap().to_string();
                    let success = state.refs.get(&name) == Some(&old);
                    if success && new == ZERO {
                        state.refs.remove(&name);
                    }
                    value.push(json!({
                        "name": name,
                        "oldObjectId": old,
                        "newObjectId": new,
                        "success": success,
                        "updateStatus": if success { "succeeded" } else { "staleOldObjectId" }
                    }));
                }
                Self::json(200, json!({ "value": value }))
            }
            (HttpMethod::Get, ["repositories", _, "commits", id]) => {
                match state.parents.get(*id) {
                    Some(parents) => Self::json(200, json!({"commitId": id, "parents": parents})),
                    None => Self::not_found("commit not found"),
                }
            }
            (HttpMethod::Get, ["repositories", _, "items"]) => {
                let branch = query
                    .get("versionDescriptor.version")
                    .cloned()
                    .unwrap_or_default();
                if let Some(path) = query.get("path") {
                    return match state.files.get(&(branch, path.clone())) {
                        Some(content) => {
                            Self::json(200, json!({"path": path, "content": content}))
                        }
                        None => Self::json(
                            404,
                            json!({"typeKey": "GitItemNotFoundException", "message": "no item"}),
                        ),
                    };
                }
                let mut value = vec![json!({"path": "/", "isFolder": true})];
                for (file_branch, file_path) in state.files.keys() {
                    if *file_branch == branch {
                        value.push(json!({"path": file_path, "gitObjectType": "blob"}));
                    }
                }
                value.push(json!({"path": "/src", "isFolder": true, "gitObjectType": "tree"}));
                Self::json(200, json!({ "value": value }))
            }
            (HttpMethod::Post, ["repositories", _, "pushes"]) => {
                let update = &body["refUpdates"][0];
                let name = update["name"].as_str().unwrap().to_string();
                let old = update["oldObjectId"].as_str().unwrap().to_string();
                let branch = name.strip_prefix("refs/heads/").unwrap().to_string();

                if let Some(current) = state.refs.get(&name)
                    && *current != old
                {
                    return Self::json(409, json!({"message": "TF401028: stale ref"}));
                }

                // A new branch starts with the files of the branch it forks from.
                if !state.refs.contains_key(&name) {
                    let source = state
                        .refs
                        .iter()
                        .find(|(_, id)| **id == old)
                        .map(|(r, _)| r.strip_prefix("refs/heads/").unwrap().to_string())
                        .expect("parent commit is a branch head");
                    let inherited: Vec<_> = state
                        .files
                        .iter()
                        .filter(|((b, _), _)| *b == source)
                        .map(|((_, p), c)| ((branch.clone(), p.clone()), c.clone()))
                        .collect();
                    state.files.extend(inherited);
                }

                state.next_id += 1;
                let commit = format!("commit-{}", state.next_id);
                state.parents.insert(commit.clone(), vec![old]);
                state.refs.insert(name, commit);
                for change in body["commits"][0]["changes"].as_array().unwrap() {
                    let path = change["item"]["path"].as_str().unwrap().to_string();
                    let exists = state.files.contains_key(&(branch.clone(), path.clone()));
                    let expected = if exists { "edit" } else { "add" };
                    if change["changeType"] != expected {
                        return Self::json(400, json!({"message": "wrong change type"}));
                    }
                    let content = change["newContent"]["content"].as_str().unwrap().to_string();
                    state.files.insert((branch.clone(), path), content);
                }
                Self::json(201, json!({"pushId": state.next_id}))
            }
            (HttpMethod::Get, ["repositories", _, "pullrequests"]) => {
                let skip: usize = query.get("$skip").and_then(|s| s.parse().ok()).unwrap_or(0);
                let value: Vec<Value> = state.prs.iter().skip(skip).cloned().collect();
                Self::json(200, json!({ "value": value }))
            }
            (HttpMethod::Post, ["repositories", _, "pullrequests"]) => {
                state.next_id += 1;
                let pr = json!({
                    "pullRequestId": state.next_id,
                    "sourceRefName": body["sourceRefName"],
                    "targetRefName": body["targetRefName"],
                    "title": body["title"],
                    "description": body["description"],
                    "status": "active",
                    "mergeStatus": "succeeded",
                    "creationDate": "2024-05-01T09:00:00Z"
                });
                state.prs.push(pr.clone());
                Self::json(201, pr)
            }
            (HttpMethod::Patch, ["repositories", _, "pullrequests", number]) => {
                let number: u64 = number.parse().unwrap();
                let Some(pr) = state
                    .prs
                    .iter_mut()
                    .find(|pr| pr["pullRequestId"] == number)
                else {
                    return Self::not_found("pull request not found");
                };
                if let Some(obj) = body.as_object() {
                    for (key, value) in obj {
                        pr[key] = value.clone();
                    }
                }
                let pr = pr.clone();
                Self::json(200, pr)
            }
            (HttpMethod::Post, ["repositories", _, "pullRequests", number, "labels"]) => {
                let number: u64 = number.parse().unwrap();
                let name = body["name"].as_str().unwrap().to_string();
                if name == "forbidden" {
                    return Self::json(403, json!({"message": "label not allowed"}));
                }
                state.labels.push((number, name.clone()));
                Self::json(200, json!({"name": name, "active": true}))
            }
            (HttpMethod::Get, ["repositories", _, "pullRequests", number, "threads"]) => {
                let number: u64 = number.parse().unwrap();
                let value = state.threads.get(&number).cloned().unwrap_or_default();
                Self::json(200, json!({ "value": value }))
            }
            (HttpMethod::Post, ["repositories", _, "pullRequests", number, "threads"]) => {
                let number: u64 = number.parse().unwrap();
                state.next_id += 1;
                let thread = json!({
                    "id": state.next_id,
                    "comments": body["comments"],
                    "status": body["status"]
                });
                state.threads.entry(number).or_default().push(thread.clone());
                Self::json(200, thread)
            }
            (HttpMethod::Patch, ["repositories", _, "pullRequests", number, "threads", id]) => {
                let number: u64 = number.parse().unwrap();
                let id: u64 = id.parse().unwrap();
                let thread = state
                    .threads
                    .get_mut(&number)
                    .and_then(|threads| threads.iter_mut().find(|t| t["id"] == id));
                match thread {
                    Some(thread) => {
                        thread["status"] = body["status"].clone();
                        let thread = thread.clone();
                        Self::json(200, thread)
                    }
                    None => Self::not_found("thread not found"),
                }
            }
            _ => Self::json(
                400,
                json!({"message": format!("unexpected {} {}", request.method.as_str(), path)}),
            ),
        }
    }

    fn thread_statuses(&self, number: u64) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .threads
            .get(&number)
            .map(|threads| {
                threads
                    .iter()
                    .map(|t| t["status"].as_str().unwrap_or_default().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl HttpTransport for FakeAzureDevOps {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        Ok(self.route(&request))
    }
}

async fn setup() -> (FakeAzureDevOps, VstsRepo) {
    let fake = FakeAzureDevOps::seeded();
    let client =
        VstsClient::new_with_transport(ENDPOINT, "pat", None, Arc::new(fake.clone()));
    let repo = tokio::time::timeout(TEST_TIMEOUT, init_repo(client, "Tools/Website"))
        .await
        .expect("init should not hang")
        .expect("repository should initialise");
    (fake, repo)
}

#[tokio::test]
async fn update_run_creates_branch_pr_and_comment() {
    let (fake, repo) = setup().await;
    let branch = "renovate/lodash-4.x";

    assert_eq!(repo.repo_name(), "tools/website");
    assert_eq!(repo.base_commit(), "base-1");
    assert!(!repo.branch_exists(branch).await);

    let files = repo.get_file_list().await.or_absent();
    assert_eq!(files, vec!["package.json".to_string(), "src/index.js".to_string()]);

    repo.commit_files_to_branch(
        branch,
        &[
            CommitFile::new(
                "package.json",
                "{\"dependencies\":{\"lodash\":\"4.17.21\"}}",
            ),
            CommitFile::new("renovate.json", "{}"),
        ],
        "Update dependency lodash to v4.17.21",
        None,
    )
    .await
    .expect("commit should succeed");

    assert!(repo.branch_exists(branch).await);
    assert!(!repo.is_branch_stale(branch).await.unwrap());
    assert_eq!(
        repo.get_file("package.json", Some(branch))
            .await
            .unwrap()
            .as_deref(),
        Some("{\"dependencies\":{\"lodash\":\"4.17.21\"}}")
    );
    assert_eq!(
        repo.get_managed_branches("renovate/").await.unwrap(),
        vec![branch.to_string()]
    );
    assert_eq!(
        repo.get_branch_status(branch, Some(&[])).await.unwrap(),
        BranchStatus::Pending
    );

    let pr = repo
        .create_pr(
            branch,
            "Update dependency lodash to v4.17.21",
            "This PR updates lodash.",
            &["dependencies".to_string(), "forbidden".to_string()],
            false,
        )
        .await
        .expect("PR creation should succeed despite a rejected label");
    assert_eq!(pr.target_branch.as_deref(), Some("master"));
    assert_eq!(fake.labels(), vec![(pr.number, "dependencies".to_string())]);

    let found = repo
        .get_branch_pr(branch)
        .await
        .or_absent()
        .expect("open PR for branch");
    assert_eq!(found.number, pr.number);
    assert_eq!(found.display_number, format!("Pull Request #{}", pr.number));

    repo.update_pr(pr.number, "Update lodash (security)", None)
        .await
        .unwrap();
    let updated = repo.get_pr(Some(pr.number)).await.unwrap().unwrap();
    assert_eq!(updated.title, "Update lodash (security)");
    assert_eq!(updated.body.as_deref(), Some("This PR updates lodash."));

    repo.ensure_comment(pr.number, "Release Notes", "lodash 4.17.21")
        .await
        .unwrap();
    repo.ensure_comment(pr.number, "Other", "unrelated")
        .await
        .unwrap();
    repo.ensure_comment_removal(Some(pr.number), "Release Notes")
        .await
        .unwrap();
    assert_eq!(
        fake.thread_statuses(pr.number),
        vec!["closed".to_string(), "active".to_string()]
    );
}

#[tokio::test]
async fn second_commit_moves_existing_branch_and_edits_files() {
    let (_fake, repo) = setup().await;
    let branch = "renovate/pin";

    repo.commit_files_to_branch(branch, &[CommitFile::new("a.txt", "1")], "first", None)
        .await
        .unwrap();
    repo.commit_files_to_branch(branch, &[CommitFile::new("a.txt", "2")], "second", None)
        .await
        .expect("existing file should be pushed as an edit");

    assert_eq!(
        repo.get_file("a.txt", Some(branch)).await.unwrap().as_deref(),
        Some("2")
    );
    // The branch head's parent is now the first commit, not the base commit.
    assert!(repo.is_branch_stale(branch).await.unwrap());
}

#[tokio::test]
async fn delete_branch_removes_ref_and_closes_lookup() {
    let (_fake, repo) = setup().await;
    let branch = "renovate/old";

    repo.commit_files_to_branch(branch, &[CommitFile::new("x", "y")], "m", None)
        .await
        .unwrap();
    let updates = repo.delete_branch(branch).await.unwrap();
    assert_eq!(updates.len(), 1);
    assert!(updates[0].success);
    assert!(!repo.branch_exists(branch).await);

    let err = repo.delete_branch(branch).await.unwrap_err();
    assert!(matches!(err, PlatformError::NotFound { .. }));
}

#[tokio::test]
async fn base_branch_switch_failure_keeps_context() {
    let (_fake, mut repo) = setup().await;

    let err = repo.set_base_branch(Some("does-not-exist")).await.unwrap_err();
    assert!(matches!(err, PlatformError::NotFound { .. }));
    assert_eq!(repo.base_branch(), "master");
    assert_eq!(repo.base_commit(), "base-1");
}

#[tokio::test]
async fn read_only_queries_are_cheap() {
    let (fake, repo) = setup().await;
    let before = fake.request_count();

    assert!(repo.get_pr(None).await.unwrap().is_none());
    assert_eq!(
        repo.get_branch_status("anything", None).await.unwrap(),
        BranchStatus::Success
    );
    repo.ensure_comment_removal(None, "subject").await.unwrap();
    let _ = repo.get_file_list().await;
    let _ = repo.get_file_list().await;

    // Only the first file listing reaches the server.
    assert_eq!(fake.request_count(), before + 1);
    assert!(
        repo.find_pr("renovate/none", None, PrState::All)
            .await
            .or_absent()
            .is_none()
    );
}
