//! Steward - code forge adapters for automated dependency-update agents.
//!
//! The update agent drives repositories through the vendor-neutral
//! [`Platform`] trait: it initialises a repository, inspects branches and
//! files, pushes commits, and opens and maintains pull requests. Each adapter
//! translates those operations into its vendor's REST API. This crate ships
//! the Azure DevOps (formerly VSTS) adapter.
//!
//! # Example
//!
//! ```ignore
//! use steward::{CommitFile, Platform, PrState, VstsClient, init_repo};
//!
//! let client = VstsClient::new("https://dev.azure.com/acme", "token", None)?;
//! let repo = init_repo(client, "tools/website").await?;
//!
//! let branch = "renovate/lodash-4.x";
//! repo.commit_files_to_branch(
//!     branch,
//!     &[CommitFile::new("package.json", updated)],
//!     "Update dependency lodash to v4.17.21",
//!     None,
//! )
//! .await?;
//!
//! if repo.get_branch_pr(branch).await.or_absent().is_none() {
//!     repo.create_pr(branch, "Update lodash", "Body", &[], false).await?;
//! }
//! ```

pub mod http;
pub mod platform;
pub mod vsts;

pub use platform::{
    Advisory, ApiRateLimiter, BranchStatus, CommitFile, Platform, PlatformError, PlatformType,
    PrState, PullRequest, RefUpdate, rate_limits,
};
pub use vsts::{VstsClient, VstsError, VstsRepo, init_repo};
