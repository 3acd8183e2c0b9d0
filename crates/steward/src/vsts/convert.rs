//! Translation between Azure DevOps wire shapes and platform records.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::error::VstsError;
use super::types::{
    GitItem, GitPullRequest, GitRef, GitRefUpdate, GitRefUpdateResult, GitRepository,
    MergeStatus, PullRequestStatus, VstsErrorBody,
};
use crate::platform::{PrState, PullRequest, RefUpdate};

/// Prefix of qualified branch refs.
pub const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Object id that deletes a ref when used as its new value.
pub const ZERO_OBJECT_ID: &str = "0000000000000000000000000000000000000000";

/// Folder whose entries are link placeholders rather than real files.
const SYMLINK_PREFIX: &str = "/symlinks/";

/// Item error keys meaning "no such file at this version".
const MISSING_ITEM_TYPE_KEYS: &[&str] = &[
    "GitItemNotFoundException",
    "GitUnresolvableToCommitException",
];

/// Qualified ref for a branch name (`main` → `refs/heads/main`).
///
/// Names that are already qualified pass through.
pub fn branch_ref(branch: &str) -> String {
    if branch.starts_with("refs/") {
        branch.to_string()
    } else {
        format!("{}{}", BRANCH_REF_PREFIX, branch)
    }
}

/// Branch name without the ref prefix.
pub fn branch_name(git_ref: &str) -> &str {
    git_ref.strip_prefix(BRANCH_REF_PREFIX).unwrap_or(git_ref)
}

/// Filter string for the refs endpoint (`main` → `heads/main`).
pub fn ref_filter(branch: &str) -> String {
    let qualified = branch_ref(branch);
    qualified
        .strip_prefix("refs/")
        .unwrap_or(&qualified)
        .to_string()
}

/// Keep only refs whose name is exactly `branch`.
///
/// The refs endpoint filters by prefix, so `renovate/a` also returns
/// `renovate/a-b`.
pub fn exact_refs(refs: Vec<GitRef>, branch: &str) -> Vec<GitRef> {
    let wanted = branch_ref(branch);
    refs.into_iter().filter(|r| r.name == wanted).collect()
}

/// Ref update that points `branch` at a new commit, moving it from `old_object_id`.
pub fn branch_update(branch: &str, old_object_id: &str) -> GitRefUpdate {
    GitRefUpdate {
        name: branch_ref(branch),
        old_object_id: old_object_id.to_string(),
        new_object_id: None,
    }
}

/// Ref update that deletes `git_ref`.
pub fn deletion_update(git_ref: &GitRef) -> GitRefUpdate {
    GitRefUpdate {
        name: git_ref.name.clone(),
        old_object_id: git_ref.object_id.clone(),
        new_object_id: Some(ZERO_OBJECT_ID.to_string()),
    }
}

pub fn to_ref_update(result: &GitRefUpdateResult) -> RefUpdate {
    RefUpdate {
        name: result.name.clone(),
        old_object_id: result.old_object_id.clone(),
        new_object_id: result.new_object_id.clone(),
        success: result.success,
    }
}

/// Canonical `project/name` form of a repository.
pub fn repo_full_name(repo: &GitRepository) -> String {
    match &repo.project {
        Some(project) => format!("{}/{}", project.name, repo.name),
        None => repo.name.clone(),
    }
}

/// Whether `repo` is the one named `wanted`, by bare or project-qualified
/// name, ignoring case.
pub fn repo_matches(repo: &GitRepository, wanted: &str) -> bool {
    repo.name.eq_ignore_ascii_case(wanted) || repo_full_name(repo).eq_ignore_ascii_case(wanted)
}

/// Pull request ids start at 1; `0` stands for "no pull request".
pub fn pr_number(number: Option<u64>) -> Option<u64> {
    number.filter(|n| *n != 0)
}

/// Collapse the vendor status into the shared two-state model.
pub fn pr_state(status: PullRequestStatus) -> PrState {
    match status {
        PullRequestStatus::Abandoned | PullRequestStatus::Completed => PrState::Closed,
        PullRequestStatus::NotSet | PullRequestStatus::Active | PullRequestStatus::All => {
            PrState::Open
        }
    }
}

/// Convert an Azure DevOps pull request to the platform-agnostic record.
pub fn to_pull_request(pr: &GitPullRequest) -> PullRequest {
    let source_ref = pr.source_ref_name.clone().unwrap_or_default();
    PullRequest {
        number: pr.pull_request_id,
        display_number: format!("Pull Request #{}", pr.pull_request_id),
        vendor_id: pr.pull_request_id,
        branch_name: branch_name(&source_ref).to_string(),
        source_ref,
        target_branch: pr
            .target_ref_name
            .as_deref()
            .map(|r| branch_name(r).to_string()),
        title: pr.title.clone().unwrap_or_default(),
        body: pr.description.clone(),
        state: pr_state(pr.status),
        is_unmergeable: pr.merge_status == MergeStatus::Conflicts,
        created_at: pr.creation_date,
    }
}

/// Whether a tree entry names a real file.
pub fn is_listed_file(item: &GitItem) -> bool {
    if item.is_folder == Some(true) {
        return false;
    }
    if let Some(kind) = item.git_object_type.as_deref()
        && kind != "blob"
    {
        return false;
    }
    !item.path.is_empty() && item.path != "/" && !item.path.starts_with(SYMLINK_PREFIX)
}

/// Repository-relative, sorted paths of every listed file.
pub fn file_paths(items: &[GitItem]) -> Vec<String> {
    let mut paths: Vec<String> = items
        .iter()
        .filter(|item| is_listed_file(item))
        .map(|item| item.path.trim_start_matches('/').to_string())
        .collect();
    paths.sort();
    paths
}

/// Absolute item path as the items and pushes endpoints expect it.
pub fn item_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Whether an error body says the item does not exist at that version.
pub fn is_missing_item(body: &VstsErrorBody) -> bool {
    body.type_key
        .as_deref()
        .is_some_and(|key| MISSING_ITEM_TYPE_KEYS.contains(&key))
}

/// Text content of an item, decoding base64 when the server marked it binary.
pub fn item_content(item: &GitItem) -> Result<Option<String>, VstsError> {
    let Some(content) = item.content.as_deref() else {
        return Ok(None);
    };
    let is_binary = item
        .content_metadata
        .as_ref()
        .is_some_and(|meta| meta.is_binary);
    if !is_binary {
        return Ok(Some(content.to_string()));
    }
    let bytes = BASE64
        .decode(content.trim())
        .map_err(|e| VstsError::Decode(format!("{}: {}", item.path, e)))?;
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| VstsError::Decode(format!("{}: {}", item.path, e)))
}
