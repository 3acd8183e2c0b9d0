use serde::Serialize;
use tabled::Tabled;

use super::{CommandResult, OutputFormat, client_from_config, print_rows};
use crate::config::Config;

#[derive(Debug, Serialize, Tabled)]
pub(crate) struct RepoRow {
    #[tabled(rename = "Repository")]
    pub name: String,
}

/// List every repository visible to the configured token.
pub(crate) async fn handle_repos(config: &Config, output: OutputFormat) -> CommandResult {
    let client = client_from_config(config)?;
    let repos = client.get_repos().await?;
    tracing::info!("Found {} repositories at {}", repos.len(), client.endpoint());

    let rows: Vec<RepoRow> = repos.into_iter().map(|name| RepoRow { name }).collect();
    print_rows(&rows, output)
}
