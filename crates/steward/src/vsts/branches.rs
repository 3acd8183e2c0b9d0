//! Branch, commit and ref operations.

use chrono::{DateTime, Utc};

use super::convert::{
    branch_name, branch_update, deletion_update, exact_refs, item_path, to_ref_update,
};
use super::error::{VstsError, short_error_message};
use super::repo::{VstsRepo, branch_commit};
use super::types::{ChangeType, GitChange, GitCommitPush, GitItemPath, GitPush, GitRef, ItemContent};
use crate::platform::{self, Advisory, BranchStatus, CommitFile, PlatformError, RefUpdate};

impl VstsRepo {
    /// The ref named exactly `refs/heads/{branch}`, if it exists.
    async fn find_ref(&self, branch: &str) -> Result<Option<GitRef>, VstsError> {
        let refs = self.client.get_refs(&self.repo_id, branch).await?;
        Ok(exact_refs(refs, branch).into_iter().next())
    }

    /// Whether `branch` exists. Lookup failures count as absence.
    pub async fn branch_exists(&self, branch: &str) -> bool {
        match self.find_ref(branch).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                tracing::debug!(
                    "branch_exists({}) failed, treating as absent: {}",
                    branch,
                    short_error_message(&e)
                );
                false
            }
        }
    }

    /// Names of all branches starting with `prefix`.
    pub async fn get_managed_branches(&self, prefix: &str) -> platform::Result<Vec<String>> {
        let branches = self.client.list_branches(&self.repo_id).await?;
        Ok(branches
            .iter()
            .map(|b| branch_name(&b.name))
            .filter(|name| name.starts_with(prefix))
            .map(str::to_string)
            .collect())
    }

    /// Whether `branch` was forked from anything other than the current base
    /// commit.
    pub async fn is_branch_stale(&self, branch: &str) -> platform::Result<bool> {
        let head = branch_commit(&self.client, &self.repo_id, branch).await?;
        let commit = self.client.get_commit(&self.repo_id, &head).await?;
        let stale = !commit.parents.iter().any(|p| *p == self.base_commit);
        tracing::debug!(
            "{} parents {:?}, base {}: stale={}",
            branch,
            commit.parents,
            self.base_commit,
            stale
        );
        Ok(stale)
    }

    async fn branch_commit_date(&self, branch: &str) -> Result<DateTime<Utc>, VstsError> {
        let stats = self.client.get_branch(&self.repo_id, branch).await?;
        stats
            .commit
            .and_then(|c| c.committer)
            .and_then(|committer| committer.date)
            .ok_or_else(|| VstsError::NotFound(format!("commit date of {}", branch)))
    }

    /// Committer date of the head of `branch`.
    pub async fn get_branch_last_commit_time(&self, branch: &str) -> Advisory<DateTime<Utc>> {
        let result = self.branch_commit_date(branch).await;
        Advisory::from_result(result.map_err(PlatformError::from), "get_branch_last_commit_time")
    }

    /// Commit messages on the base branch, newest first.
    pub async fn get_commit_messages(&self) -> Advisory<Vec<String>> {
        let result = self
            .client
            .list_commits(&self.repo_id, &self.base_branch)
            .await
            .map(|commits| commits.into_iter().filter_map(|c| c.comment).collect());
        Advisory::from_result(result.map_err(PlatformError::from), "get_commit_messages")
    }

    /// Push `files` as one commit onto `branch`.
    ///
    /// An existing branch moves from its own head; a new branch is created
    /// from the head of `parent`, or of the base branch when `parent` is
    /// `None`. Each file is an `edit` when it already exists on that source
    /// branch and an `add` otherwise.
    pub async fn commit_files_to_branch(
        &self,
        branch: &str,
        files: &[CommitFile],
        message: &str,
        parent: Option<&str>,
    ) -> platform::Result<()> {
        let (source_branch, old_object_id) = match self.find_ref(branch).await? {
            Some(existing) => (branch.to_string(), existing.object_id),
            None => {
                let parent = parent.unwrap_or(&self.base_branch);
                let parent_ref = self
                    .find_ref(parent)
                    .await?
                    .ok_or_else(|| VstsError::NotFound(format!("branch {}", parent)))?;
                (parent.to_string(), parent_ref.object_id)
            }
        };

        let mut changes = Vec::with_capacity(files.len());
        for file in files {
            let exists = self
                .client
                .get_item(&self.repo_id, &file.name, &source_branch)
                .await?
                .is_some();
            changes.push(GitChange {
                change_type: if exists {
                    ChangeType::Edit
                } else {
                    ChangeType::Add
                },
                item: GitItemPath {
                    path: item_path(&file.name),
                },
                new_content: ItemContent {
                    content: file.contents.clone(),
                    content_type: "rawtext",
                },
            });
        }

        let push = GitPush {
            ref_updates: vec![branch_update(branch, &old_object_id)],
            commits: vec![GitCommitPush {
                comment: message.to_string(),
                changes,
            }],
        };
        self.client.create_push(&self.repo_id, &push).await?;

        tracing::debug!(
            "Pushed {} file(s) to {} from {}",
            files.len(),
            branch,
            source_branch
        );
        Ok(())
    }

    /// Delete `branch` by moving its ref to the zero object id.
    pub async fn delete_branch(&self, branch: &str) -> platform::Result<Vec<RefUpdate>> {
        let git_ref = self
            .find_ref(branch)
            .await?
            .ok_or_else(|| VstsError::NotFound(format!("branch {}", branch)))?;

        let results = self
            .client
            .update_refs(&self.repo_id, &[deletion_update(&git_ref)])
            .await?;

        if let Some(rejected) = results.iter().find(|r| !r.success) {
            let reason = rejected
                .custom_message
                .clone()
                .or_else(|| rejected.update_status.clone())
                .unwrap_or_else(|| "rejected".to_string());
            return Err(VstsError::RefRejected(format!("{}: {}", rejected.name, reason)).into());
        }

        tracing::debug!("Deleted branch {}", branch);
        Ok(results.iter().map(to_ref_update).collect())
    }

    /// Combined status of `branch`.
    ///
    /// Azure DevOps exposes no commit status API to this adapter, so required
    /// checks cannot be verified: a non-empty list always fails, and an empty
    /// list passes once the branch is not ahead of its base.
    pub async fn get_branch_status(
        &self,
        branch: &str,
        required_checks: Option<&[String]>,
    ) -> platform::Result<BranchStatus> {
        match required_checks {
            None => Ok(BranchStatus::Success),
            Some(checks) if !checks.is_empty() => Ok(BranchStatus::Failed),
            Some(_) => {
                let stats = self.client.get_branch(&self.repo_id, branch).await?;
                Ok(if stats.ahead_count == 0 {
                    BranchStatus::Success
                } else {
                    BranchStatus::Pending
                })
            }
        }
    }
}
