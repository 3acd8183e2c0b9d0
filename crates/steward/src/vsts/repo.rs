//! Repository context: initialisation, base branch, and the [`Platform`] impl.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;

use super::client::VstsClient;
use super::convert::{branch_name, repo_full_name, repo_matches};
use super::error::VstsError;
use crate::platform::{
    self, Advisory, BranchStatus, CommitFile, Platform, PlatformType, PrState, PullRequest,
    RefUpdate,
};

/// An initialised Azure DevOps repository.
///
/// Holds everything later operations need: the repository id, the default
/// and base branch, the base branch head commit, and the lazily filled file
/// list of the base branch. Each handle is independent; initialising the same
/// repository twice yields two handles with separate caches.
#[derive(Debug)]
pub struct VstsRepo {
    pub(crate) client: VstsClient,
    pub(crate) repo_id: String,
    repo_name: String,
    pub(crate) default_branch: String,
    pub(crate) base_branch: String,
    pub(crate) base_commit: String,
    is_fork: bool,
    pub(crate) file_list: OnceCell<Vec<String>>,
}

/// Initialise a repository by name (`repo` or `project/repo`).
///
/// # Example
///
/// ```ignore
/// use steward::vsts::{VstsClient, init_repo};
///
/// let client = VstsClient::new("https://dev.azure.com/acme", "token", None)?;
/// let repo = init_repo(client, "tools/website").await?;
/// println!("base commit {}", repo.base_commit());
/// ```
pub async fn init_repo(client: VstsClient, repo_name: &str) -> platform::Result<VstsRepo> {
    VstsRepo::init(client, repo_name).await
}

impl VstsRepo {
    /// Look up `repo_name` among the repositories visible to the client and
    /// resolve the head commit of its default branch.
    pub async fn init(client: VstsClient, repo_name: &str) -> platform::Result<Self> {
        let repos = client.list_repositories().await?;
        let repo = repos
            .into_iter()
            .find(|r| repo_matches(r, repo_name))
            .ok_or_else(|| VstsError::RepoNotFound(repo_name.to_string()))?;

        let default_ref = repo.default_branch.as_deref().ok_or_else(|| {
            platform::PlatformError::api(format!(
                "repository {} has no default branch",
                repo_full_name(&repo)
            ))
        })?;
        let default_branch = branch_name(default_ref).to_string();
        let base_commit = branch_commit(&client, &repo.id, &default_branch).await?;

        let full_name = repo_full_name(&repo);
        tracing::info!(
            "Initialised {} (default branch {}, head {})",
            full_name,
            default_branch,
            base_commit
        );

        Ok(Self {
            client,
            repo_id: repo.id,
            repo_name: full_name,
            base_branch: default_branch.clone(),
            default_branch,
            base_commit,
            is_fork: repo.is_fork,
            file_list: OnceCell::new(),
        })
    }

    /// Switch the base branch, or revert to the default branch with `None`.
    ///
    /// The new head commit is resolved first; on failure the handle keeps
    /// its previous base branch and commit. A successful switch clears the
    /// cached file list.
    pub async fn set_base_branch(&mut self, branch: Option<&str>) -> platform::Result<()> {
        let target = branch.unwrap_or(&self.default_branch).to_string();
        let commit = branch_commit(&self.client, &self.repo_id, &target).await?;

        tracing::debug!("Base branch set to {} ({})", target, commit);
        self.base_branch = target;
        self.base_commit = commit;
        self.file_list = OnceCell::new();
        Ok(())
    }

    pub fn client(&self) -> &VstsClient {
        &self.client
    }

    /// Vendor id (GUID) of the repository.
    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }

    /// Head commit of the base branch as of the last (re)initialisation.
    pub fn base_commit(&self) -> &str {
        &self.base_commit
    }

    pub fn is_fork(&self) -> bool {
        self.is_fork
    }
}

/// Head commit id of `branch`.
pub(crate) async fn branch_commit(
    client: &VstsClient,
    repo_id: &str,
    branch: &str,
) -> Result<String, VstsError> {
    let stats = client.get_branch(repo_id, branch).await?;
    stats
        .commit
        .and_then(|c| c.commit_id)
        .ok_or_else(|| VstsError::NotFound(format!("head commit of {}", branch)))
}

#[async_trait]
impl Platform for VstsRepo {
    fn platform_type(&self) -> PlatformType {
        PlatformType::AzureDevOps
    }

    fn repo_name(&self) -> &str {
        &self.repo_name
    }

    fn default_branch(&self) -> &str {
        &self.default_branch
    }

    fn base_branch(&self) -> &str {
        &self.base_branch
    }

    async fn set_base_branch(&mut self, branch: Option<&str>) -> platform::Result<()> {
        VstsRepo::set_base_branch(self, branch).await
    }

    async fn get_file(&self, path: &str, branch: Option<&str>) -> platform::Result<Option<String>> {
        VstsRepo::get_file(self, path, branch).await
    }

    async fn get_file_list(&self) -> Advisory<Vec<String>> {
        VstsRepo::get_file_list(self).await
    }

    async fn branch_exists(&self, branch: &str) -> bool {
        VstsRepo::branch_exists(self, branch).await
    }

    async fn get_managed_branches(&self, prefix: &str) -> platform::Result<Vec<String>> {
        VstsRepo::get_managed_branches(self, prefix).await
    }

    async fn is_branch_stale(&self, branch: &str) -> platform::Result<bool> {
        VstsRepo::is_branch_stale(self, branch).await
    }

    async fn get_branch_last_commit_time(&self, branch: &str) -> Advisory<DateTime<Utc>> {
        VstsRepo::get_branch_last_commit_time(self, branch).await
    }

    async fn get_commit_messages(&self) -> Advisory<Vec<String>> {
        VstsRepo::get_commit_messages(self).await
    }

    async fn commit_files_to_branch(
        &self,
        branch: &str,
        files: &[CommitFile],
        message: &str,
        parent: Option<&str>,
    ) -> platform::Result<()> {
        VstsRepo::commit_files_to_branch(self, branch, files, message, parent).await
    }

    async fn delete_branch(&self, branch: &str) -> platform::Result<Vec<RefUpdate>> {
        VstsRepo::delete_branch(self, branch).await
    }

    async fn find_pr(
        &self,
        branch: &str,
        title: Option<&str>,
        state: PrState,
    ) -> Advisory<Option<PullRequest>> {
        VstsRepo::find_pr(self, branch, title, state).await
    }

    async fn get_pr(&self, number: Option<u64>) -> platform::Result<Option<PullRequest>> {
        VstsRepo::get_pr(self, number).await
    }

    async fn get_branch_pr(&self, branch: &str) -> Advisory<Option<PullRequest>> {
        VstsRepo::get_branch_pr(self, branch).await
    }

    async fn create_pr(
        &self,
        branch: &str,
        title: &str,
        body: &str,
        labels: &[String],
        use_default_branch: bool,
    ) -> platform::Result<PullRequest> {
        VstsRepo::create_pr(self, branch, title, body, labels, use_default_branch).await
    }

    async fn update_pr(&self, number: u64, title: &str, body: Option<&str>) -> platform::Result<()> {
        VstsRepo::update_pr(self, number, title, body).await
    }

    async fn get_branch_status(
        &self,
        branch: &str,
        required_checks: Option<&[String]>,
    ) -> platform::Result<BranchStatus> {
        VstsRepo::get_branch_status(self, branch, required_checks).await
    }

    async fn set_branch_status(
        &self,
        branch: &str,
        context: &str,
        _description: &str,
        state: BranchStatus,
        _target_url: Option<&str>,
    ) -> platform::Result<()> {
        tracing::debug!(
            "set_branch_status({}, {}, {}) is not supported on Azure DevOps",
            branch,
            context,
            state
        );
        Ok(())
    }

    async fn merge_branch(&self, branch: &str) -> platform::Result<()> {
        tracing::debug!("merge_branch({}) is not supported on Azure DevOps", branch);
        Ok(())
    }

    async fn merge_pr(&self, number: u64, _branch: &str) -> platform::Result<()> {
        tracing::debug!("merge_pr({}) is not supported on Azure DevOps", number);
        Ok(())
    }

    async fn add_assignees(&self, number: u64, _assignees: &[String]) -> platform::Result<()> {
        tracing::debug!("add_assignees({}) is not supported on Azure DevOps", number);
        Ok(())
    }

    async fn add_reviewers(&self, number: u64, _reviewers: &[String]) -> platform::Result<()> {
        tracing::debug!("add_reviewers({}) is not supported on Azure DevOps", number);
        Ok(())
    }

    async fn get_pr_files(&self, _number: u64) -> platform::Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn ensure_comment(&self, number: u64, subject: &str, content: &str) -> platform::Result<()> {
        VstsRepo::ensure_comment(self, number, subject, content).await
    }

    async fn ensure_comment_removal(
        &self,
        number: Option<u64>,
        subject: &str,
    ) -> platform::Result<()> {
        VstsRepo::ensure_comment_removal(self, number, subject).await
    }
}
