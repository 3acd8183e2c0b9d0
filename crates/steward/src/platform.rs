//! Platform-agnostic contract for code forge adapters.
//!
//! This module defines the [`Platform`] trait the update agent talks to, the
//! canonical records it exchanges, and the closed enumerations (`PrState`,
//! `BranchStatus`) every adapter translates its vendor codes into.
//!
//! # Example
//!
//! ```ignore
//! use steward::platform::{Platform, PrState};
//!
//! async fn open_pr_number<P: Platform>(repo: &P, branch: &str) -> Option<u64> {
//!     repo.find_pr(branch, None, PrState::Open)
//!         .await
//!         .or_absent()
//!         .map(|pr| pr.number)
//! }
//! ```

mod advisory;
mod errors;
mod rate_limit;
mod types;

pub use advisory::Advisory;
pub use errors::{PlatformError, Result, short_error_message};
pub use rate_limit::{ApiRateLimiter, rate_limits};
pub use types::{
    BranchStatus, CommitFile, Platform, PlatformType, PrState, PullRequest, RefUpdate,
    managed_comment_body, managed_comment_header,
};
