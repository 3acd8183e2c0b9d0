//! Azure DevOps API client.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::form_urlencoded;

use super::convert::{is_missing_item, item_path, ref_filter, repo_full_name};
use super::error::VstsError;
use super::types::{
    CreatePullRequest, CreateThread, GitBranchStats, GitCommentThread, GitCommitRef, GitItem,
    GitPullRequest, GitPush, GitRef, GitRefUpdate, GitRefUpdateResult, GitRepository,
    LabelDefinition, ListResponse, UpdatePullRequest, UpdateThread, VstsErrorBody,
};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpHeaders, HttpMethod, HttpRequest, HttpResponse, HttpTransport, header_get};
use crate::platform::ApiRateLimiter;

/// REST API version sent with every request.
pub const API_VERSION: &str = "7.0";

/// Pull request labels are only exposed as a preview resource.
const LABELS_API_VERSION: &str = "7.0-preview.1";

/// Page size for pull request listings.
const PR_PAGE_SIZE: usize = 100;

/// Azure DevOps Git API client.
///
/// Every request is authenticated with a personal access token and scoped to
/// a collection (organisation) endpoint such as `https://dev.azure.com/acme`.
#[derive(Clone)]
pub struct VstsClient {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
    token: String,
    /// Optional limiter for pacing API requests.
    rate_limiter: Option<ApiRateLimiter>,
}

impl std::fmt::Debug for VstsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VstsClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl VstsClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Collection URL (e.g. "https://dev.azure.com/acme")
    /// * `token` - Personal access token
    /// * `rate_limiter` - Optional request pacing
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = VstsClient::new("https://dev.azure.com/acme", "token", None)?;
    /// ```
    pub fn new(
        endpoint: &str,
        token: &str,
        rate_limiter: Option<ApiRateLimiter>,
    ) -> Result<Self, VstsError> {
        Self::with_timeout(endpoint, token, rate_limiter, StdDuration::from_secs(30))
    }

    /// Create a new client with a custom request timeout.
    pub fn with_timeout(
        endpoint: &str,
        token: &str,
        rate_limiter: Option<ApiRateLimiter>,
        timeout: StdDuration,
    ) -> Result<Self, VstsError> {
        if endpoint.trim().is_empty() {
            return Err(VstsError::Config("endpoint must not be empty".to_string()));
        }
        if token.is_empty() {
            return Err(VstsError::Config("token must not be empty".to_string()));
        }
        let transport =
            ReqwestTransport::with_timeout(timeout).map_err(|e| VstsError::Config(e.to_string()))?;

        Ok(Self::new_with_transport(
            endpoint,
            token,
            rate_limiter,
            Arc::new(transport),
        ))
    }

    pub fn new_with_transport(
        endpoint: &str,
        token: &str,
        rate_limiter: Option<ApiRateLimiter>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.to_string(),
            rate_limiter,
        }
    }

    /// Get the collection endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Wait for rate limiter if one is configured.
    async fn wait_for_rate_limit(&self) {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }
    }

    /// Build a Git API URL with the default API version.
    fn git_url(&self, path: &str, query: &[(&str, &str)]) -> String {
        self.git_url_versioned(path, query, API_VERSION)
    }

    fn git_url_versioned(&self, path: &str, query: &[(&str, &str)], version: &str) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in query {
            serializer.append_pair(key, value);
        }
        serializer.append_pair("api-version", version);
        format!(
            "{}/_apis/git/{}?{}",
            self.endpoint,
            path,
            serializer.finish()
        )
    }

    /// Basic credentials with an empty user name, as PATs expect.
    fn authorization(&self) -> String {
        format!("Basic {}", BASE64.encode(format!(":{}", self.token)))
    }

    /// Send a request and return the raw response, whatever its status.
    async fn execute(
        &self,
        method: HttpMethod,
        url: String,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, VstsError> {
        self.wait_for_rate_limit().await;
        tracing::trace!("{} {}", method.as_str(), url);

        let mut request = HttpRequest::new(method, url)
            .with_header("Accept", "application/json")
            .with_header("User-Agent", "steward")
            .with_header("Authorization", self.authorization());
        if let Some(body) = body {
            request = request.with_json_body(body);
        }

        Ok(self.transport.send(request).await?)
    }

    /// Turn non-success responses into errors.
    fn check(response: HttpResponse) -> Result<HttpResponse, VstsError> {
        match response.status {
            // An invalid or expired PAT is answered with the HTML sign-in page.
            203 => Err(VstsError::Auth(
                "server returned the sign-in page".to_string(),
            )),
            429 => Err(VstsError::RateLimited {
                reset_at: Self::parse_rate_limit_reset(&response.headers)
                    .unwrap_or_else(|| Utc::now() + chrono::Duration::minutes(1)),
            }),
            status if !(200..300).contains(&status) => Err(VstsError::Api {
                status,
                message: Self::error_message(&response),
            }),
            _ => Ok(response),
        }
    }

    /// The `message` field of a JSON error body, or the raw body.
    fn error_message(response: &HttpResponse) -> String {
        serde_json::from_slice::<VstsErrorBody>(&response.body)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| response.text())
    }

    /// When throttling lifts, from `Retry-After` (seconds) or
    /// `X-RateLimit-Reset` (epoch seconds).
    fn parse_rate_limit_reset(headers: &HttpHeaders) -> Option<DateTime<Utc>> {
        if let Some(seconds) = header_get(headers, "retry-after").and_then(|v| v.parse::<i64>().ok())
        {
            return Some(Utc::now() + chrono::Duration::seconds(seconds));
        }
        let epoch = header_get(headers, "x-ratelimit-reset")?
            .parse::<i64>()
            .ok()?;
        DateTime::from_timestamp(epoch, 0)
    }

    /// Make an authenticated GET request.
    async fn get<T: DeserializeOwned>(&self, url: String) -> Result<T, VstsError> {
        let response = Self::check(self.execute(HttpMethod::Get, url, None).await?)?;
        serde_json::from_slice(&response.body).map_err(VstsError::Json)
    }

    /// Send a JSON body and decode the JSON response.
    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: String,
        body: &B,
    ) -> Result<T, VstsError> {
        let payload = serde_json::to_vec(body)?;
        let response = Self::check(self.execute(method, url, Some(payload)).await?)?;
        serde_json::from_slice(&response.body).map_err(VstsError::Json)
    }

    /// Send a JSON body, ignoring the response payload.
    async fn send_json_discard<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        url: String,
        body: &B,
    ) -> Result<(), VstsError> {
        let payload = serde_json::to_vec(body)?;
        Self::check(self.execute(method, url, Some(payload)).await?)?;
        Ok(())
    }

    // ─── Repositories ────────────────────────────────────────────────────────

    /// List every repository visible to the token.
    pub async fn list_repositories(&self) -> Result<Vec<GitRepository>, VstsError> {
        let list: ListResponse<GitRepository> = self.get(self.git_url("repositories", &[])).await?;
        Ok(list.value)
    }

    /// Canonical `project/name` of every repository visible to the token.
    pub async fn get_repos(&self) -> Result<Vec<String>, VstsError> {
        let repos = self.list_repositories().await?;
        Ok(repos.iter().map(repo_full_name).collect())
    }

    // ─── Branches and refs ───────────────────────────────────────────────────

    /// Statistics (including head commit) for one branch.
    pub async fn get_branch(&self, repo_id: &str, branch: &str) -> Result<GitBranchStats, VstsError> {
        self.get(self.git_url(
            &format!("repositories/{}/stats/branches", repo_id),
            &[("name", branch)],
        ))
        .await
    }

    /// Statistics for every branch.
    pub async fn list_branches(&self, repo_id: &str) -> Result<Vec<GitBranchStats>, VstsError> {
        let list: ListResponse<GitBranchStats> = self
            .get(self.git_url(&format!("repositories/{}/stats/branches", repo_id), &[]))
            .await?;
        Ok(list.value)
    }

    /// Refs whose name starts with `refs/heads/{branch}`.
    pub async fn get_refs(&self, repo_id: &str, branch: &str) -> Result<Vec<GitRef>, VstsError> {
        let list: ListResponse<GitRef> = self
            .get(self.git_url(
                &format!("repositories/{}/refs", repo_id),
                &[("filter", ref_filter(branch).as_str())],
            ))
            .await?;
        Ok(list.value)
    }

    pub async fn update_refs(
        &self,
        repo_id: &str,
        updates: &[GitRefUpdate],
    ) -> Result<Vec<GitRefUpdateResult>, VstsError> {
        let list: ListResponse<GitRefUpdateResult> = self
            .send_json(
                HttpMethod::Post,
                self.git_url(&format!("repositories/{}/refs", repo_id), &[]),
                updates,
            )
            .await?;
        Ok(list.value)
    }

    // ─── Commits ─────────────────────────────────────────────────────────────

    /// Commits reachable from `branch`, newest first.
    pub async fn list_commits(
        &self,
        repo_id: &str,
        branch: &str,
    ) -> Result<Vec<GitCommitRef>, VstsError> {
        let list: ListResponse<GitCommitRef> = self
            .get(self.git_url(
                &format!("repositories/{}/commits", repo_id),
                &[("searchCriteria.itemVersion.version", branch)],
            ))
            .await?;
        Ok(list.value)
    }

    pub async fn get_commit(&self, repo_id: &str, commit_id: &str) -> Result<GitCommitRef, VstsError> {
        self.get(self.git_url(
            &format!("repositories/{}/commits/{}", repo_id, commit_id),
            &[],
        ))
        .await
    }

    /// Push commits and the ref updates that move branches onto them.
    pub async fn create_push(&self, repo_id: &str, push: &GitPush) -> Result<(), VstsError> {
        self.send_json_discard(
            HttpMethod::Post,
            self.git_url(&format!("repositories/{}/pushes", repo_id), &[]),
            push,
        )
        .await
    }

    // ─── Items ───────────────────────────────────────────────────────────────

    /// Full recursive tree listing of `branch`.
    pub async fn list_items(&self, repo_id: &str, branch: &str) -> Result<Vec<GitItem>, VstsError> {
        let list: ListResponse<GitItem> = self
            .get(self.git_url(
                &format!("repositories/{}/items", repo_id),
                &[
                    ("scopePath", "/"),
                    ("recursionLevel", "Full"),
                    ("versionDescriptor.version", branch),
                    ("versionDescriptor.versionType", "branch"),
                ],
            ))
            .await?;
        Ok(list.value)
    }

    /// One item with its content, or `None` when it does not exist on `branch`.
    pub async fn get_item(
        &self,
        repo_id: &str,
        path: &str,
        branch: &str,
    ) -> Result<Option<GitItem>, VstsError> {
        let url = self.git_url(
            &format!("repositories/{}/items", repo_id),
            &[
                ("path", item_path(path).as_str()),
                ("includeContent", "true"),
                ("versionDescriptor.version", branch),
                ("versionDescriptor.versionType", "branch"),
            ],
        );
        let response = self.execute(HttpMethod::Get, url, None).await?;
        if response.status == 404 {
            return Ok(None);
        }
        if !response.is_success()
            && let Ok(body) = serde_json::from_slice::<VstsErrorBody>(&response.body)
            && is_missing_item(&body)
        {
            return Ok(None);
        }
        let response = Self::check(response)?;
        Ok(Some(serde_json::from_slice(&response.body)?))
    }

    // ─── Pull requests ───────────────────────────────────────────────────────

    /// Every pull request in the repository, in any state.
    pub async fn list_pull_requests(&self, repo_id: &str) -> Result<Vec<GitPullRequest>, VstsError> {
        let mut all_prs = Vec::new();
        let mut skip = 0usize;
        let top = PR_PAGE_SIZE.to_string();

        loop {
            let list: ListResponse<GitPullRequest> = self
                .get(self.git_url(
                    &format!("repositories/{}/pullrequests", repo_id),
                    &[
                        ("searchCriteria.status", "all"),
                        ("$top", top.as_str()),
                        ("$skip", skip.to_string().as_str()),
                    ],
                ))
                .await?;

            let count = list.value.len();
            all_prs.extend(list.value);

            if count < PR_PAGE_SIZE {
                break;
            }

            skip += count;
        }

        Ok(all_prs)
    }

    pub async fn create_pull_request(
        &self,
        repo_id: &str,
        pr: &CreatePullRequest,
    ) -> Result<GitPullRequest, VstsError> {
        self.send_json(
            HttpMethod::Post,
            self.git_url(&format!("repositories/{}/pullrequests", repo_id), &[]),
            pr,
        )
        .await
    }

    pub async fn update_pull_request(
        &self,
        repo_id: &str,
        number: u64,
        update: &UpdatePullRequest,
    ) -> Result<(), VstsError> {
        self.send_json_discard(
            HttpMethod::Patch,
            self.git_url(
                &format!("repositories/{}/pullrequests/{}", repo_id, number),
                &[],
            ),
            update,
        )
        .await
    }

    pub async fn add_pull_request_label(
        &self,
        repo_id: &str,
        number: u64,
        label: &str,
    ) -> Result<(), VstsError> {
        self.send_json_discard(
            HttpMethod::Post,
            self.git_url_versioned(
                &format!("repositories/{}/pullRequests/{}/labels", repo_id, number),
                &[],
                LABELS_API_VERSION,
            ),
            &LabelDefinition {
                name: label.to_string(),
            },
        )
        .await
    }

    // ─── Comment threads ─────────────────────────────────────────────────────

    pub async fn list_threads(
        &self,
        repo_id: &str,
        number: u64,
    ) -> Result<Vec<GitCommentThread>, VstsError> {
        let list: ListResponse<GitCommentThread> = self
            .get(self.git_url(
                &format!("repositories/{}/pullRequests/{}/threads", repo_id, number),
                &[],
            ))
            .await?;
        Ok(list.value)
    }

    pub async fn create_thread(
        &self,
        repo_id: &str,
        number: u64,
        thread: &CreateThread,
    ) -> Result<(), VstsError> {
        self.send_json_discard(
            HttpMethod::Post,
            self.git_url(
                &format!("repositories/{}/pullRequests/{}/threads", repo_id, number),
                &[],
            ),
            thread,
        )
        .await
    }

    pub async fn update_thread(
        &self,
        repo_id: &str,
        number: u64,
        thread_id: u64,
        update: &UpdateThread,
    ) -> Result<(), VstsError> {
        self.send_json_discard(
            HttpMethod::Patch,
            self.git_url(
                &format!(
                    "repositories/{}/pullRequests/{}/threads/{}",
                    repo_id, number, thread_id
                ),
                &[],
            ),
            update,
        )
        .await
    }
}

/// Create an Azure DevOps client with default settings.
pub fn create_client(endpoint: &str, token: &str) -> Result<VstsClient, VstsError> {
    VstsClient::new(endpoint, token, None)
}
