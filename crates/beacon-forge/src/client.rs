//! Platform-agnostic repository client interface

use std::time::Duration;

use beacon_core::error::ForgeError;
use beacon_core::types::Platform;
use chrono::{DateTime, Utc};
use url::Url;

use crate::types::{DiffInfo, PullRequestInfo, ReleaseInfo, TagInfo};
use crate::Result;

/// Pull request state filter for list requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestState {
    /// Open pull requests
    Open,
    /// Closed pull requests, merged or not
    Closed,
}

impl PullRequestState {
    /// Query parameter value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Read access to one repository on a hosting platform.
///
/// Implementations are constructed once per run through
/// [`ClientRegistry`](crate::ClientRegistry); callers never inspect the
/// concrete platform.
#[async_trait::async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Platform this client talks to
    fn platform(&self) -> Platform;

    /// Repository owner
    fn owner(&self) -> &str;

    /// Repository name
    fn repo(&self) -> &str;

    /// Web URL of the repository (`https://github.com/owner/repo`)
    fn repository_url(&self) -> String;

    /// Tags, newest first, at most `max_tags`
    async fn get_tags(&self, max_tags: usize) -> Result<Vec<TagInfo>>;

    /// Commit timestamp of the commit a tag points to
    async fn get_tag_date(&self, tag: &TagInfo) -> Result<DateTime<Utc>>;

    /// Commits and change statistics between two refs
    async fn get_commits(&self, from: &str, to: &str) -> Result<DiffInfo>;

    /// One page (1-based) of pull requests, most recently updated first
    async fn get_pull_request_page(
        &self,
        state: PullRequestState,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequestInfo>>;

    /// A single pull request; `None` when the platform reports it missing
    async fn get_pull_request(&self, number: u64) -> Result<Option<PullRequestInfo>>;

    /// Release attached to a tag; `None` when there is none
    async fn get_release_info(&self, tag: &str) -> Result<Option<ReleaseInfo>>;

    /// Largest page size the platform accepts
    fn max_page_size(&self) -> u32 {
        100
    }

    /// `owner/repo`
    fn full_name(&self) -> String {
        format!("{}/{}", self.owner(), self.repo())
    }

    /// Web URL of a commit
    fn commit_url(&self, sha: &str) -> String {
        format!("{}/commit/{}", self.repository_url(), sha)
    }

    /// Web URL comparing two refs
    fn compare_url(&self, from: &str, to: &str) -> String {
        format!("{}/compare/{}...{}", self.repository_url(), from, to)
    }
}

/// Connection options for a platform client
#[derive(Debug, Clone)]
pub struct ForgeOptions {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Access token
    pub token: Option<String>,
    /// API root override (`https://ghe.example.com/api/v3`, `https://gitea.example.com/api/v1`)
    pub api_url: Option<String>,
    /// Web root override (`https://ghe.example.com`)
    pub web_url: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ForgeOptions {
    /// Create options for a repository
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            token: None,
            api_url: None,
            web_url: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the access token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    /// Set the API root
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Set the web root
    pub fn with_web_url(mut self, url: impl Into<String>) -> Self {
        self.web_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check owner, repo and URL overrides before any request is made
    pub fn validate(&self) -> Result<()> {
        if self.owner.trim().is_empty() || self.repo.trim().is_empty() {
            return Err(ForgeError::InvalidOptions(
                "owner and repo must not be empty".to_string(),
            ));
        }

        for url in [&self.api_url, &self.web_url].into_iter().flatten() {
            let parsed = Url::parse(url)
                .map_err(|e| ForgeError::InvalidOptions(format!("invalid URL '{}': {}", url, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ForgeError::InvalidOptions(format!(
                    "URL '{}' must use http or https",
                    url
                )));
            }
        }

        Ok(())
    }

    /// Resolved API root, without trailing slash
    pub(crate) fn api_root(&self, default: &str) -> String {
        self.api_url
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }

    /// Repository web URL
    pub(crate) fn repository_url(&self, default_web: &str) -> String {
        let web = self.web_url.as_deref().unwrap_or(default_web);
        format!("{}/{}/{}", web.trim_end_matches('/'), self.owner, self.repo)
    }
}
