use serde::Serialize;
use steward::Platform;

use super::{CommandResult, OutputFormat, open_repo, print_value};
use crate::config::Config;

#[derive(Debug, Serialize)]
struct BranchStatusReport<'a> {
    branch: &'a str,
    status: String,
}

#[derive(Debug, Serialize)]
struct StalenessReport<'a> {
    branch: &'a str,
    base_branch: &'a str,
    stale: bool,
}

/// Show the combined check status of `branch`.
pub(crate) async fn handle_status(
    config: &Config,
    repository: Option<&str>,
    branch: &str,
    required_checks: &[String],
    output: OutputFormat,
) -> CommandResult {
    let repo = open_repo(config, repository).await?;
    let status = repo.get_branch_status(branch, Some(required_checks)).await?;

    let report = BranchStatusReport {
        branch,
        status: status.to_string(),
    };
    print_value(&report, &format!("{}: {}", branch, status), output)
}

/// Report whether `branch` was cut from something other than the base branch head.
pub(crate) async fn handle_stale(
    config: &Config,
    repository: Option<&str>,
    branch: &str,
    output: OutputFormat,
) -> CommandResult {
    let repo = open_repo(config, repository).await?;
    let stale = repo.is_branch_stale(branch).await?;

    let report = StalenessReport {
        branch,
        base_branch: repo.base_branch(),
        stale,
    };
    let text = if stale {
        format!("{} is behind {}", branch, report.base_branch)
    } else {
        format!("{} is up to date with {}", branch, report.base_branch)
    };
    print_value(&report, &text, output)
}
