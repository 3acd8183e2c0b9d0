pub(crate) mod branches;
pub(crate) mod files;
pub(crate) mod pr;
pub(crate) mod repos;
pub(crate) mod status;

use clap::ValueEnum;
use serde::Serialize;
use steward::{ApiRateLimiter, Platform, VstsClient, VstsRepo, init_repo};
use tabled::Tabled;

use crate::config::Config;

pub(crate) type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// Print `rows` as a rounded table or a pretty JSON array.
pub(crate) fn print_rows<T>(rows: &[T], format: OutputFormat) -> CommandResult
where
    T: Tabled + Serialize,
{
    match format {
        OutputFormat::Table => {
            let mut table = tabled::Table::new(rows);
            table.with(tabled::settings::Style::rounded());
            println!("{}", table);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows)?);
        }
    }
    Ok(())
}

/// Print a single JSON-serializable value, or `text` for table output.
pub(crate) fn print_value<T: Serialize>(value: &T, text: &str, format: OutputFormat) -> CommandResult {
    match format {
        OutputFormat::Table => println!("{}", text),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

/// Build an authenticated client from the loaded configuration.
pub(crate) fn client_from_config(config: &Config) -> Result<VstsClient, Box<dyn std::error::Error>> {
    let endpoint = config.vsts.endpoint.as_deref().ok_or(
        "No Azure DevOps endpoint configured. Set [vsts] endpoint, STEWARD_VSTS__ENDPOINT or VSTS_ENDPOINT.",
    )?;
    let token = config.vsts.token.as_deref().ok_or(
        "No Azure DevOps token configured. Set [vsts] token, STEWARD_VSTS__TOKEN or VSTS_TOKEN.",
    )?;

    let rate_limiter = match config.client.requests_per_second {
        0 => None,
        rps => Some(ApiRateLimiter::new(rps)),
    };

    Ok(VstsClient::with_timeout(
        endpoint,
        token,
        rate_limiter,
        config.timeout(),
    )?)
}

/// Initialise the repository named on the command line, or the configured one.
pub(crate) async fn open_repo(
    config: &Config,
    repository: Option<&str>,
) -> Result<VstsRepo, Box<dyn std::error::Error>> {
    let name = repository
        .or(config.vsts.repository.as_deref())
        .ok_or("No repository given. Pass --repo or set [vsts] repository.")?;
    let client = client_from_config(config)?;
    let repo = init_repo(client, name).await?;
    tracing::debug!(
        "Opened {} repository {} on {}",
        repo.platform_type(),
        repo.repo_name(),
        repo.base_branch()
    );
    Ok(repo)
}
