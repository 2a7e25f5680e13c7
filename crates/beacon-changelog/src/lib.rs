//! Beacon Changelog - Release notes generation from pull request history
//!
//! This crate fetches, reconciles, classifies and renders the pull requests
//! of a tag range. [`ReleaseNotesBuilder`] runs the whole pipeline.

pub mod classifier;
pub mod fetcher;
pub mod generator;
pub mod reconciler;
pub mod renderer;
pub mod sort;
pub mod tags;
pub mod types;

#[cfg(test)]
mod testing;

pub use classifier::{classify, Classification, Classifier, UNCATEGORIZED};
pub use fetcher::{fetch_open_pull_requests, fetch_pull_requests_between, fetch_pull_requests_for_commits};
pub use generator::ReleaseNotesBuilder;
pub use reconciler::{reconcile_commits_to_prs, ReconciledCommit};
pub use renderer::{fill_template, render, Placeholders, Renderer};
pub use sort::sort_pull_requests;
pub use types::{CategorizedChanges, ReleaseNotesResult, ReleaseStats, Section};
