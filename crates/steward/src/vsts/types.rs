//! Azure DevOps Git REST data types.
//!
//! Response structs declare only the fields the adapter reads, and mark
//! everything optional that older server versions or partial payloads may
//! omit.
//!
//! API docs: https://learn.microsoft.com/en-us/rest/api/azure/devops/git/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope used by every list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default)]
    pub count: usize,
}

/// Git repository.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepository {
    /// Repository GUID.
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Qualified default branch (`refs/heads/main`); missing for empty repos.
    pub default_branch: Option<String>,
    pub project: Option<TeamProjectReference>,
    #[serde(default)]
    pub is_fork: bool,
    pub remote_url: Option<String>,
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamProjectReference {
    pub id: Option<String>,
    pub name: String,
}

/// Branch statistics, including the head commit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitBranchStats {
    #[serde(default)]
    pub name: String,
    /// Commits on this branch that are not on the base version.
    #[serde(default)]
    pub ahead_count: u64,
    #[serde(default)]
    pub behind_count: u64,
    pub commit: Option<GitCommitRef>,
}

/// Commit as returned by the commits and branch stats endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitCommitRef {
    pub commit_id: Option<String>,
    pub comment: Option<String>,
    pub author: Option<GitUserDate>,
    pub committer: Option<GitUserDate>,
    #[serde(default)]
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitUserDate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// A ref (`refs/heads/...`, `refs/tags/...`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRef {
    #[serde(default)]
    pub name: String,
    pub object_id: String,
}

/// Requested change to a ref.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRefUpdate {
    pub name: String,
    pub old_object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_object_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRefUpdateResult {
    pub name: String,
    #[serde(default)]
    pub old_object_id: String,
    #[serde(default)]
    pub new_object_id: String,
    #[serde(default = "default_true")]
    pub success: bool,
    pub update_status: Option<String>,
    pub custom_message: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Item (file or folder) in a repository tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitItem {
    pub object_id: Option<String>,
    /// `blob`, `tree` or `commit` (submodule).
    #[serde(alias = "type")]
    pub git_object_type: Option<String>,
    #[serde(default)]
    pub path: String,
    pub is_folder: Option<bool>,
    pub content: Option<String>,
    pub content_metadata: Option<FileContentMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContentMetadata {
    #[serde(default)]
    pub is_binary: bool,
    pub encoding: Option<i32>,
}

/// Error payload returned in place of content for unresolvable items.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VstsErrorBody {
    pub type_key: Option<String>,
    pub message: Option<String>,
}

/// Pull request status as the vendor enumerates it.
///
/// The REST API serialises it as a string, the typed SDKs as its numeric
/// code; both forms are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "EnumRepr")]
pub enum PullRequestStatus {
    #[default]
    NotSet,
    Active,
    Abandoned,
    Completed,
    All,
}

impl From<EnumRepr> for PullRequestStatus {
    fn from(repr: EnumRepr) -> Self {
        match repr {
            EnumRepr::Code(1) => Self::Active,
            EnumRepr::Code(2) => Self::Abandoned,
            EnumRepr::Code(3) => Self::Completed,
            EnumRepr::Code(4) => Self::All,
            EnumRepr::Code(_) => Self::NotSet,
            EnumRepr::Name(name) => match name.to_ascii_lowercase().as_str() {
                "active" => Self::Active,
                "abandoned" => Self::Abandoned,
                "completed" => Self::Completed,
                "all" => Self::All,
                _ => Self::NotSet,
            },
        }
    }
}

/// Merge status of a pull request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "EnumRepr")]
pub enum MergeStatus {
    #[default]
    NotSet,
    Queued,
    Conflicts,
    Succeeded,
    RejectedByPolicy,
    Failure,
}

impl From<EnumRepr> for MergeStatus {
    fn from(repr: EnumRepr) -> Self {
        match repr {
            EnumRepr::Code(1) => Self::Queued,
            EnumRepr::Code(2) => Self::Conflicts,
            EnumRepr::Code(3) => Self::Succeeded,
            EnumRepr::Code(4) => Self::RejectedByPolicy,
            EnumRepr::Code(5) => Self::Failure,
            EnumRepr::Code(_) => Self::NotSet,
            EnumRepr::Name(name) => match name.to_ascii_lowercase().as_str() {
                "queued" => Self::Queued,
                "conflicts" => Self::Conflicts,
                "succeeded" => Self::Succeeded,
                "rejectedbypolicy" => Self::RejectedByPolicy,
                "failure" => Self::Failure,
                _ => Self::NotSet,
            },
        }
    }
}

/// Either wire form of a vendor enumeration.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EnumRepr {
    Code(i64),
    Name(String),
}

/// Pull request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPullRequest {
    pub pull_request_id: u64,
    pub source_ref_name: Option<String>,
    pub target_ref_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub status: PullRequestStatus,
    #[serde(default)]
    pub merge_status: MergeStatus,
    pub creation_date: Option<DateTime<Utc>>,
}

/// Comment thread on a pull request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitCommentThread {
    pub id: u64,
    #[serde(default)]
    pub comments: Vec<GitComment>,
    pub status: Option<EnumRepr>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitComment {
    pub id: Option<u64>,
    pub content: Option<String>,
}

// ─── Request bodies ──────────────────────────────────────────────────────────

/// Push of one or more commits together with the ref updates they move.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPush {
    pub ref_updates: Vec<GitRefUpdate>,
    pub commits: Vec<GitCommitPush>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitCommitPush {
    pub comment: String,
    pub changes: Vec<GitChange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Add,
    Edit,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitChange {
    pub change_type: ChangeType,
    pub item: GitItemPath,
    pub new_content: ItemContent,
}

#[derive(Debug, Clone, Serialize)]
pub struct GitItemPath {
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemContent {
    pub content: String,
    pub content_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePullRequest {
    pub source_ref_name: String,
    pub target_ref_name: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePullRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelDefinition {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateThread {
    pub comments: Vec<NewComment>,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub parent_comment_id: u64,
    pub content: String,
    pub comment_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateThread {
    pub status: &'static str,
}
