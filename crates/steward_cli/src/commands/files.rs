use serde::Serialize;
use tabled::Tabled;

use super::{CommandResult, OutputFormat, open_repo, print_rows};
use crate::config::Config;

#[derive(Debug, Serialize, Tabled)]
pub(crate) struct FileRow {
    #[tabled(rename = "Path")]
    pub path: String,
}

/// List every file on the base branch, optionally only those under `prefix`.
pub(crate) async fn handle_files(
    config: &Config,
    repository: Option<&str>,
    prefix: Option<&str>,
    output: OutputFormat,
) -> CommandResult {
    let repo = open_repo(config, repository).await?;
    let files = repo.get_file_list().await.into_result()?;

    let rows: Vec<FileRow> = files
        .into_iter()
        .filter(|path| prefix.is_none_or(|prefix| path.starts_with(prefix)))
        .map(|path| FileRow { path })
        .collect();
    tracing::debug!("Listing {} file(s)", rows.len());
    print_rows(&rows, output)
}
