//! Beacon Core - Core library for release notes generation
//!
//! This crate provides the configuration model, the error taxonomy and the
//! per-run options shared by the Beacon crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::Configuration;
pub use error::{BeaconError, ChangelogError, ConfigError, ForgeError, Result};
pub use types::{Platform, RunOptions};
