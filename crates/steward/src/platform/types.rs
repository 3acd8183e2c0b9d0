use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::advisory::Advisory;
use super::errors::Result;

/// Code forge behind a [`Platform`] implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformType {
    /// Azure DevOps Services / Server (formerly VSTS)
    #[serde(rename = "azure")]
    AzureDevOps,
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformType::AzureDevOps => write!(f, "azure"),
        }
    }
}

/// Pull request state, shared by every adapter.
///
/// Records only ever carry `Open` or `Closed`; `All` is the search
/// discriminator that accepts both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    Open,
    Closed,
    #[default]
    All,
}

impl PrState {
    /// Whether a pull request in state `state` passes this filter.
    #[must_use]
    pub fn matches(self, state: PrState) -> bool {
        match self {
            PrState::Open => state == PrState::Open,
            PrState::Closed => state == PrState::Closed,
            PrState::All => true,
        }
    }
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrState::Open => write!(f, "open"),
            PrState::Closed => write!(f, "closed"),
            PrState::All => write!(f, "all"),
        }
    }
}

impl FromStr for PrState {
    type Err = std::convert::Infallible;

    /// Unrecognised filters accept every state.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "open" => PrState::Open,
            "closed" => PrState::Closed,
            _ => PrState::All,
        })
    }
}

/// Combined status of the checks on a branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchStatus {
    Success,
    Pending,
    Failed,
}

impl fmt::Display for BranchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchStatus::Success => write!(f, "success"),
            BranchStatus::Pending => write!(f, "pending"),
            BranchStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A pull request from any platform (platform-agnostic representation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    /// Number callers use to address the pull request.
    pub number: u64,
    /// Human-readable label, e.g. `Pull Request #12`.
    pub display_number: String,
    /// Vendor's own identifier for the record.
    pub vendor_id: u64,
    /// Source ref in the vendor's qualified form.
    pub source_ref: String,
    /// Source branch name without the ref prefix.
    pub branch_name: String,
    /// Target branch name without the ref prefix.
    pub target_branch: Option<String>,
    pub title: String,
    pub body: Option<String>,
    /// `Open` or `Closed`.
    pub state: PrState,
    /// The platform reports merge conflicts.
    pub is_unmergeable: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == PrState::Closed
    }
}

/// A file to write as part of a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFile {
    /// Repository path, with or without a leading slash.
    pub name: String,
    pub contents: String,
}

impl CommitFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// Result of a ref update (creation, move or deletion).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefUpdate {
    pub name: String,
    pub old_object_id: String,
    pub new_object_id: String,
    pub success: bool,
}

/// Trait for an initialised repository on a code hosting platform.
///
/// Implementations hold the repository context (identity, default and base
/// branch, base commit, file-list cache) and translate every operation into
/// vendor calls. Method signatures, return shapes and the absent-on-failure
/// behavior of advisory reads are identical across adapters.
///
/// Operations the vendor cannot perform are no-ops returning `Ok` without a
/// network call.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Get the platform type this repository lives on.
    fn platform_type(&self) -> PlatformType;

    /// Canonical name of the repository (e.g. `project/repo`).
    fn repo_name(&self) -> &str;

    /// The default branch recorded at initialisation.
    fn default_branch(&self) -> &str;

    /// The branch pull requests target and staleness is measured against.
    fn base_branch(&self) -> &str;

    /// Switch the base branch (or revert to the default branch) and
    /// re-resolve its head commit.
    async fn set_base_branch(&mut self, branch: Option<&str>) -> Result<()>;

    /// Content of a file, or `None` when the file does not exist.
    async fn get_file(&self, path: &str, branch: Option<&str>) -> Result<Option<String>>;

    /// Paths of every file on the base branch, cached per repository handle.
    async fn get_file_list(&self) -> Advisory<Vec<String>>;

    /// Whether the branch exists. Errors count as absence.
    async fn branch_exists(&self, branch: &str) -> bool;

    /// Names of all branches starting with `prefix`.
    async fn get_managed_branches(&self, prefix: &str) -> Result<Vec<String>>;

    /// Whether `branch` was not forked from the current base commit.
    async fn is_branch_stale(&self, branch: &str) -> Result<bool>;

    /// Committer date of the branch head.
    async fn get_branch_last_commit_time(&self, branch: &str) -> Advisory<DateTime<Utc>>;

    /// Commit messages on the base branch.
    async fn get_commit_messages(&self) -> Advisory<Vec<String>>;

    /// Push `files` as a single commit onto `branch`, creating the branch from
    /// `parent` (default: base branch) when it does not exist yet.
    async fn commit_files_to_branch(
        &self,
        branch: &str,
        files: &[CommitFile],
        message: &str,
        parent: Option<&str>,
    ) -> Result<()>;

    async fn delete_branch(&self, branch: &str) -> Result<Vec<RefUpdate>>;

    /// First pull request from `branch` matching `title` (when given) and `state`.
    async fn find_pr(
        &self,
        branch: &str,
        title: Option<&str>,
        state: PrState,
    ) -> Advisory<Option<PullRequest>>;

    /// Fetch a pull request by number; `None` in, `None` out.
    async fn get_pr(&self, number: Option<u64>) -> Result<Option<PullRequest>>;

    /// The open pull request for `branch`.
    async fn get_branch_pr(&self, branch: &str) -> Advisory<Option<PullRequest>>;

    async fn create_pr(
        &self,
        branch: &str,
        title: &str,
        body: &str,
        labels: &[String],
        use_default_branch: bool,
    ) -> Result<PullRequest>;

    async fn update_pr(&self, number: u64, title: &str, body: Option<&str>) -> Result<()>;

    /// Combined check status; `None` means checks are disabled.
    async fn get_branch_status(
        &self,
        branch: &str,
        required_checks: Option<&[String]>,
    ) -> Result<BranchStatus>;

    async fn set_branch_status(
        &self,
        branch: &str,
        context: &str,
        description: &str,
        state: BranchStatus,
        target_url: Option<&str>,
    ) -> Result<()>;

    async fn merge_branch(&self, branch: &str) -> Result<()>;

    async fn merge_pr(&self, number: u64, branch: &str) -> Result<()>;

    async fn add_assignees(&self, number: u64, assignees: &[String]) -> Result<()>;

    async fn add_reviewers(&self, number: u64, reviewers: &[String]) -> Result<()>;

    async fn get_pr_files(&self, number: u64) -> Result<Vec<String>>;

    /// Add a comment thread headed `### {subject}`.
    async fn ensure_comment(&self, number: u64, subject: &str, content: &str) -> Result<()>;

    /// Close the first thread headed `### {subject}`, if any.
    async fn ensure_comment_removal(&self, number: Option<u64>, subject: &str) -> Result<()>;
}

/// Build the body of a managed comment.
#[must_use]
pub fn managed_comment_body(subject: &str, content: &str) -> String {
    format!("{}\n\n{}", managed_comment_header(subject), content)
}

/// Header line that marks a managed comment thread.
#[must_use]
pub fn managed_comment_header(subject: &str) -> String {
    format!("### {}", subject)
}
