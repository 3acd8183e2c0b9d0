//! Pull request operations.

use super::convert::{branch_ref, pr_number, to_pull_request};
use super::error::{VstsError, short_error_message};
use super::repo::VstsRepo;
use super::types::{CreatePullRequest, UpdatePullRequest};
use crate::platform::{self, Advisory, PlatformError, PrState, PullRequest};

impl VstsRepo {
    /// Every pull request in the repository, translated.
    async fn list_prs(&self) -> Result<Vec<PullRequest>, VstsError> {
        let prs = self.client.list_pull_requests(&self.repo_id).await?;
        Ok(prs.iter().map(to_pull_request).collect())
    }

    /// First pull request from `branch` whose title equals `title` (when
    /// given) and whose state passes `state`.
    pub async fn find_pr(
        &self,
        branch: &str,
        title: Option<&str>,
        state: PrState,
    ) -> Advisory<Option<PullRequest>> {
        let source_ref = branch_ref(branch);
        let result = self.list_prs().await.map(|prs| {
            prs.into_iter().find(|pr| {
                pr.source_ref == source_ref
                    && title.is_none_or(|t| pr.title == t)
                    && state.matches(pr.state)
            })
        });
        Advisory::from_result(result.map_err(PlatformError::from), "find_pr")
    }

    /// Pull request by number. `None` or `0` yields `None` without a request.
    pub async fn get_pr(&self, number: Option<u64>) -> platform::Result<Option<PullRequest>> {
        let Some(number) = pr_number(number) else {
            return Ok(None);
        };
        let prs = self.list_prs().await?;
        Ok(prs.into_iter().find(|pr| pr.number == number))
    }

    /// The open pull request for `branch`.
    pub async fn get_branch_pr(&self, branch: &str) -> Advisory<Option<PullRequest>> {
        self.find_pr(branch, None, PrState::Open).await
    }

    /// Open a pull request from `branch` into the base branch (or the default
    /// branch when `use_default_branch` is set), then apply `labels`.
    ///
    /// Labels are best effort: a failed label is logged and skipped.
    pub async fn create_pr(
        &self,
        branch: &str,
        title: &str,
        body: &str,
        labels: &[String],
        use_default_branch: bool,
    ) -> platform::Result<PullRequest> {
        let target = if use_default_branch {
            &self.default_branch
        } else {
            &self.base_branch
        };
        let request = CreatePullRequest {
            source_ref_name: branch_ref(branch),
            target_ref_name: branch_ref(target),
            title: title.to_string(),
            description: body.to_string(),
        };
        let created = self
            .client
            .create_pull_request(&self.repo_id, &request)
            .await?;
        let pr = to_pull_request(&created);
        tracing::info!("Created {} from {} into {}", pr.display_number, branch, target);

        for label in labels {
            if let Err(e) = self
                .client
                .add_pull_request_label(&self.repo_id, pr.number, label)
                .await
            {
                tracing::warn!(
                    "Failed to add label {} to {}: {}",
                    label,
                    pr.display_number,
                    short_error_message(&e)
                );
            }
        }

        Ok(pr)
    }

    /// Replace the title, and the description when `body` is given.
    pub async fn update_pr(
        &self,
        number: u64,
        title: &str,
        body: Option<&str>,
    ) -> platform::Result<()> {
        let update = UpdatePullRequest {
            title: title.to_string(),
            description: body.map(str::to_string),
        };
        self.client
            .update_pull_request(&self.repo_id, number, &update)
            .await?;
        Ok(())
    }
}
