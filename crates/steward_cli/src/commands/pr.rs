use clap::ValueEnum;
use serde::Serialize;
use steward::{PrState, PullRequest};
use tabled::Tabled;

use super::{CommandResult, OutputFormat, open_repo, print_rows};
use crate::config::Config;

/// Pull request state filter accepted on the command line.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum StateArg {
    Open,
    Closed,
    #[default]
    All,
}

impl From<StateArg> for PrState {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Open => PrState::Open,
            StateArg::Closed => PrState::Closed,
            StateArg::All => PrState::All,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub(crate) struct PullRequestRow {
    #[tabled(rename = "Number")]
    pub number: String,
    #[tabled(rename = "Branch")]
    pub branch: String,
    #[tabled(rename = "Target")]
    pub target: String,
    #[tabled(rename = "State")]
    pub state: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Conflicts")]
    pub conflicts: bool,
}

impl From<&PullRequest> for PullRequestRow {
    fn from(pr: &PullRequest) -> Self {
        Self {
            number: pr.display_number.clone(),
            branch: pr.branch_name.clone(),
            target: pr.target_branch.clone().unwrap_or_default(),
            state: pr.state.to_string(),
            title: pr.title.clone(),
            conflicts: pr.is_unmergeable,
        }
    }
}

/// Look up the pull request opened from `branch`.
pub(crate) async fn handle_pr(
    config: &Config,
    repository: Option<&str>,
    branch: &str,
    title: Option<&str>,
    state: StateArg,
    output: OutputFormat,
) -> CommandResult {
    let repo = open_repo(config, repository).await?;
    let found = repo.find_pr(branch, title, state.into()).await.into_result()?;

    match (found, output) {
        (Some(pr), OutputFormat::Json) => println!("{}", serde_json::to_string_pretty(&pr)?),
        (Some(pr), OutputFormat::Table) => print_rows(&[PullRequestRow::from(&pr)], output)?,
        (None, OutputFormat::Json) => println!("null"),
        (None, OutputFormat::Table) => println!("No matching pull request for {}", branch),
    }
    Ok(())
}
