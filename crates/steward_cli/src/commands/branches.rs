use serde::Serialize;
use tabled::Tabled;

use super::{CommandResult, OutputFormat, open_repo, print_rows};
use crate::config::Config;

#[derive(Debug, Serialize, Tabled)]
pub(crate) struct BranchRow {
    #[tabled(rename = "Branch")]
    pub branch: String,
    #[tabled(rename = "Last Commit")]
    pub last_commit: String,
}

/// List managed branches starting with `prefix`, with their last commit time.
pub(crate) async fn handle_branches(
    config: &Config,
    repository: Option<&str>,
    prefix: &str,
    output: OutputFormat,
) -> CommandResult {
    let repo = open_repo(config, repository).await?;
    let branches = repo.get_managed_branches(prefix).await?;

    let mut rows = Vec::with_capacity(branches.len());
    for branch in branches {
        let last_commit = repo
            .get_branch_last_commit_time(&branch)
            .await
            .known()
            .map(|time| time.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        rows.push(BranchRow {
            branch,
            last_commit,
        });
    }

    print_rows(&rows, output)
}
