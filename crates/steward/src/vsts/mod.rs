//! Azure DevOps (formerly VSTS) adapter.
//!
//! This module implements the [`Platform`](crate::platform::Platform)
//! contract on top of the Azure DevOps Git REST API.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for Azure DevOps API operations
//! - [`types`] - Wire shapes of requests and responses
//! - [`client`] - Authenticated client with typed endpoints
//! - [`convert`] - Translation between wire shapes and platform records
//! - `repo` - The repository handle and its `Platform` implementation
//! - `branches`, `pulls`, `comments`, `files` - Operations on a handle
//!
//! # Example
//!
//! ```ignore
//! use steward::platform::{Platform, PrState};
//! use steward::vsts::{VstsClient, init_repo};
//!
//! let client = VstsClient::new("https://dev.azure.com/acme", "token", None)?;
//! let repo = init_repo(client, "tools/website").await?;
//!
//! if let Some(pr) = repo.find_pr("renovate/lodash-4.x", None, PrState::Open).await.or_absent() {
//!     println!("{} is open", pr.display_number);
//! }
//! ```

mod branches;
pub mod client;
mod comments;
pub mod convert;
pub mod error;
mod files;
mod pulls;
mod repo;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export error types
pub use error::VstsError;

// Re-export client
pub use client::{API_VERSION, VstsClient, create_client};

// Re-export the repository handle
pub use repo::{VstsRepo, init_repo};
