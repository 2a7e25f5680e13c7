//! Platform client registry

use std::collections::BTreeMap;
use std::sync::Arc;

use beacon_core::error::ForgeError;
use tracing::debug;

use crate::client::{ForgeOptions, RepositoryClient};
use crate::gitea::GiteaClient;
use crate::github::GitHubClient;
use crate::Result;

/// Constructor for a platform client
type ClientConstructor = fn(ForgeOptions) -> Result<Arc<dyn RepositoryClient>>;

/// Maps platform names to client constructors.
///
/// The platform is chosen once per run; an unknown name fails before any
/// network activity.
pub struct ClientRegistry {
    constructors: BTreeMap<String, ClientConstructor>,
}

impl ClientRegistry {
    /// Create a new registry with all built-in platforms
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("github", github);
        registry.register("gitea", gitea);
        registry.register("forgejo", gitea);
        registry
    }

    fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Register a constructor under a platform name (case-insensitive)
    fn register(&mut self, name: &str, constructor: ClientConstructor) {
        self.constructors.insert(name.to_lowercase(), constructor);
    }

    /// Build the client for `platform`
    pub fn create(&self, platform: &str, options: ForgeOptions) -> Result<Arc<dyn RepositoryClient>> {
        let constructor = self
            .constructors
            .get(&platform.to_lowercase())
            .ok_or_else(|| ForgeError::UnsupportedPlatform(platform.to_string()))?;
        debug!(platform, owner = %options.owner, repo = %options.repo, "creating repository client");
        constructor(options)
    }
}

fn github(options: ForgeOptions) -> Result<Arc<dyn RepositoryClient>> {
    let client: Arc<dyn RepositoryClient> = Arc::new(GitHubClient::new(options)?);
    Ok(client)
}

fn gitea(options: ForgeOptions) -> Result<Arc<dyn RepositoryClient>> {
    let client: Arc<dyn RepositoryClient> = Arc::new(GiteaClient::new(options)?);
    Ok(client)
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
