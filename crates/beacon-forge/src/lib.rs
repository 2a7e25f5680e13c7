//! Beacon Forge - Hosting platform access for release notes generation
//!
//! This crate provides the repository data model and read-only clients for
//! GitHub and Gitea behind the [`RepositoryClient`] trait.

mod client;
mod gitea;
mod github;
mod http;
mod registry;
pub mod types;
mod wire;

pub use client::{ForgeOptions, PullRequestState, RepositoryClient};
pub use gitea::GiteaClient;
pub use github::GitHubClient;
pub use registry::ClientRegistry;
pub use types::{CommitInfo, DiffInfo, PrState, PullRequestInfo, ReleaseInfo, TagInfo};

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, beacon_core::error::ForgeError>;
