//! Steward CLI - read-only inspection of Azure DevOps repositories through
//! the same adapter the update agent uses.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::OutputFormat;
use crate::commands::pr::StateArg;

#[derive(Parser)]
#[command(name = "steward")]
#[command(version)]
#[command(about = "Inspect Azure DevOps repositories the way the update agent sees them")]
#[command(after_long_help = r#"EXAMPLES
    List repositories visible to the token:
        $ steward repos

    Show update branches and when they last moved:
        $ steward --repo Tools/Website branches --prefix renovate/

    Find the open pull request for a branch, as JSON:
        $ steward --output json pr --branch renovate/lodash-4.x --state open

CONFIGURATION
    Steward reads configuration from:
      1. ~/.config/steward/config.toml (or $XDG_CONFIG_HOME/steward/config.toml)
      2. ./steward.toml
      3. Environment variables (STEWARD_* prefix, e.g., STEWARD_VSTS__TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    STEWARD_VSTS__ENDPOINT            Collection URL (legacy: VSTS_ENDPOINT)
    STEWARD_VSTS__TOKEN               Personal access token (legacy: VSTS_TOKEN)
    STEWARD_VSTS__REPOSITORY          Default repository (project/name)
    STEWARD_CLIENT__REQUESTS_PER_SECOND  Request pacing, 0 disables (default: 10)
    STEWARD_CLIENT__TIMEOUT_SECS      Request timeout (default: 30)
"#)]
struct Cli {
    /// Repository as `project/name` or a bare name (default from config)
    #[arg(short, long, global = true)]
    repo: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List repositories visible to the configured token
    Repos,
    /// List managed branches
    Branches {
        /// Branch name prefix
        #[arg(short, long, default_value = "renovate/")]
        prefix: String,
    },
    /// Find the pull request opened from a branch
    Pr {
        /// Source branch name
        #[arg(short, long)]
        branch: String,

        /// Only match this exact title
        #[arg(short, long)]
        title: Option<String>,

        /// Pull request state to match
        #[arg(short, long, value_enum, default_value_t = StateArg::All)]
        state: StateArg,
    },
    /// List files on the base branch
    Files {
        /// Only show paths starting with this prefix
        #[arg(short, long)]
        prefix: Option<String>,
    },
    /// Show the combined check status of a branch
    Status {
        /// Branch name
        #[arg(short, long)]
        branch: String,

        /// Required check names (any required check reports failure)
        #[arg(long = "require")]
        required: Vec<String>,
    },
    /// Check whether a branch is behind the base branch head
    Stale {
        /// Branch name
        #[arg(short, long)]
        branch: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries command output
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("steward=info,steward_cli=info"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(Term::stderr().is_term())
        .with_target(false)
        .init();

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();
    let repo = cli.repo.as_deref();

    match cli.command {
        Commands::Repos => {
            commands::repos::handle_repos(&config, cli.output).await?;
        }
        Commands::Branches { prefix } => {
            commands::branches::handle_branches(&config, repo, &prefix, cli.output).await?;
        }
        Commands::Pr {
            branch,
            title,
            state,
        } => {
            commands::pr::handle_pr(&config, repo, &branch, title.as_deref(), state, cli.output)
                .await?;
        }
        Commands::Files { prefix } => {
            commands::files::handle_files(&config, repo, prefix.as_deref(), cli.output).await?;
        }
        Commands::Status { branch, required } => {
            commands::status::handle_status(&config, repo, &branch, &required, cli.output)
                .await?;
        }
        Commands::Stale { branch } => {
            commands::status::handle_stale(&config, repo, &branch, cli.output).await?;
        }
    }

    Ok(())
}
