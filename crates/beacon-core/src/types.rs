//! Core types for Beacon

use serde::{Deserialize, Serialize};

/// Hosting platform the repository lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// github.com or GitHub Enterprise
    GitHub,
    /// Gitea / Forgejo instances
    Gitea,
}

impl Platform {
    /// Returns the string representation of the platform
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::Gitea => "gitea",
        }
    }

    /// Web host used when no base URL is configured
    pub fn default_web_url(&self) -> &'static str {
        match self {
            Self::GitHub => "https://github.com",
            Self::Gitea => "https://gitea.com",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" => Ok(Self::GitHub),
            "gitea" | "forgejo" => Ok(Self::Gitea),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}

/// Options for a single release notes run, supplied by the CLI layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Older tag of the range; resolved from the tag list when absent
    pub from_tag: Option<String>,
    /// Newer tag of the range; the latest tag when absent
    pub to_tag: Option<String>,
    /// Include still-open pull requests in the `OPEN` section
    pub include_open: bool,
    /// Skip pre-release tags when resolving the range
    pub ignore_pre_releases: bool,
    /// Correlate commits between the tags to pull requests instead of listing pull requests
    pub fetch_via_commits: bool,
    /// Treat raw commits as release note items
    pub commit_mode: bool,
    /// Abort on transport failures instead of rendering partial output
    pub fail_on_error: bool,
}

impl RunOptions {
    /// Create options for a repository with all toggles off
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            from_tag: None,
            to_tag: None,
            include_open: false,
            ignore_pre_releases: false,
            fetch_via_commits: false,
            commit_mode: false,
            fail_on_error: false,
        }
    }

    /// Set the tag range
    pub fn with_range(mut self, from_tag: Option<String>, to_tag: Option<String>) -> Self {
        self.from_tag = from_tag;
        self.to_tag = to_tag;
        self
    }

    /// Set whether open pull requests are included
    pub fn with_include_open(mut self, include_open: bool) -> Self {
        self.include_open = include_open;
        self
    }

    /// Set whether pre-release tags are skipped
    pub fn with_ignore_pre_releases(mut self, ignore: bool) -> Self {
        self.ignore_pre_releases = ignore;
        self
    }

    /// Set whether pull requests are derived from commits
    pub fn with_fetch_via_commits(mut self, via_commits: bool) -> Self {
        self.fetch_via_commits = via_commits;
        self
    }

    /// Set whether raw commits are the release note items
    pub fn with_commit_mode(mut self, commit_mode: bool) -> Self {
        self.commit_mode = commit_mode;
        self
    }

    /// Set whether transport failures abort the run
    pub fn with_fail_on_error(mut self, fail: bool) -> Self {
        self.fail_on_error = fail;
        self
    }

    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}
