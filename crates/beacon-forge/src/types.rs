//! Repository data model shared by all platform clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Information about a commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit hash (full)
    pub sha: String,
    /// Short hash (first 7 characters)
    pub short_sha: String,
    /// Commit message (first line)
    pub summary: String,
    /// Rest of the commit message
    pub body: Option<String>,
    /// Author login, or the git author name when the platform has no account for it
    pub author: String,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    /// Create a new CommitInfo from a full commit message
    pub fn new(
        sha: impl Into<String>,
        message: &str,
        author: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let sha = sha.into();
        let short_sha = sha.chars().take(7).collect();
        let (summary, body) = split_message(message);

        Self {
            sha,
            short_sha,
            summary,
            body,
            author: author.into(),
            timestamp,
        }
    }
}

fn split_message(message: &str) -> (String, Option<String>) {
    match message.split_once('\n') {
        Some((summary, rest)) => {
            let rest = rest.trim();
            let body = (!rest.is_empty()).then(|| rest.to_string());
            (summary.trim_end().to_string(), body)
        }
        None => (message.trim_end().to_string(), None),
    }
}

/// Lifecycle state of a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    /// Still open
    Open,
    /// Closed with a merge
    Merged,
    /// Closed without merging
    Closed,
}

impl PrState {
    /// Returns the string representation of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Merged => "merged",
            Self::Closed => "closed",
        }
    }
}

/// Information about a pull request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestInfo {
    /// Pull request number (0 for items synthesized from commits)
    pub number: u64,
    /// Title
    pub title: String,
    /// Web URL
    pub html_url: String,
    /// Target branch
    pub base_branch: String,
    /// Source branch
    pub head_branch: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Merge timestamp
    pub merged_at: Option<DateTime<Utc>>,
    /// Merge commit hash
    pub merge_commit_sha: Option<String>,
    /// Author login
    pub author: String,
    /// `owner/repo` of the repository the pull request belongs to
    pub repo_name: String,
    /// Label names in API order
    pub labels: Vec<String>,
    /// Milestone title
    pub milestone: Option<String>,
    /// Body text
    pub body: String,
    /// Lifecycle state
    pub state: PrState,
}

impl PullRequestInfo {
    /// Create a merged pull request
    pub fn merged(
        number: u64,
        title: impl Into<String>,
        author: impl Into<String>,
        merged_at: DateTime<Utc>,
    ) -> Self {
        Self {
            number,
            title: title.into(),
            html_url: String::new(),
            base_branch: String::new(),
            head_branch: String::new(),
            created_at: merged_at,
            merged_at: Some(merged_at),
            merge_commit_sha: None,
            author: author.into(),
            repo_name: String::new(),
            labels: Vec::new(),
            milestone: None,
            body: String::new(),
            state: PrState::Merged,
        }
    }

    /// Synthesize a release note item from a commit
    pub fn from_commit(commit: &CommitInfo, commit_url: impl Into<String>, repo_name: &str) -> Self {
        Self {
            number: 0,
            title: commit.summary.clone(),
            html_url: commit_url.into(),
            base_branch: String::new(),
            head_branch: String::new(),
            created_at: commit.timestamp,
            merged_at: Some(commit.timestamp),
            merge_commit_sha: Some(commit.sha.clone()),
            author: commit.author.clone(),
            repo_name: repo_name.to_string(),
            labels: Vec::new(),
            milestone: None,
            body: commit.body.clone().unwrap_or_default(),
            state: PrState::Merged,
        }
    }

    /// Set the labels
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Set the body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the web URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.html_url = url.into();
        self
    }

    /// Set the base and head branches
    pub fn with_branches(mut self, base: impl Into<String>, head: impl Into<String>) -> Self {
        self.base_branch = base.into();
        self.head_branch = head.into();
        self
    }

    /// Mark the pull request open (drops the merge timestamp)
    pub fn into_open(mut self) -> Self {
        self.merged_at = None;
        self.merge_commit_sha = None;
        self.state = PrState::Open;
        self
    }

    /// Whether the pull request was merged
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }

    /// Timestamp used for ordering: merge time, or creation time while open
    pub fn sort_timestamp(&self) -> DateTime<Utc> {
        self.merged_at.unwrap_or(self.created_at)
    }
}

/// Information about a tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagInfo {
    /// Tag name
    pub name: String,
    /// Commit hash the tag points to
    pub commit_sha: String,
    /// Commit timestamp of the tagged commit, when known
    pub timestamp: Option<DateTime<Utc>>,
    /// Extracted version from tag name
    pub version: Option<String>,
}

impl TagInfo {
    /// Create a new TagInfo
    pub fn new(name: impl Into<String>, commit_sha: impl Into<String>) -> Self {
        let name = name.into();
        let version = extract_version(&name);

        Self {
            name,
            commit_sha: commit_sha.into(),
            timestamp: None,
            version,
        }
    }

    /// Set the timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Extract version from a tag name
pub fn extract_version(tag: &str) -> Option<String> {
    // Handle common tag formats: v1.0.0, 1.0.0, package@1.0.0, package-v1.0.0
    let tag = tag.strip_prefix('v').unwrap_or(tag);

    if let Some(pos) = tag.rfind('@') {
        let version_part = &tag[pos + 1..];
        let version = version_part.strip_prefix('v').unwrap_or(version_part);
        if looks_like_version(version) {
            return Some(version.to_string());
        }
    }

    if let Some(pos) = tag.rfind("-v") {
        let version = &tag[pos + 2..];
        if looks_like_version(version) {
            return Some(version.to_string());
        }
    }

    if looks_like_version(tag) {
        return Some(tag.to_string());
    }

    None
}

fn looks_like_version(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() < 2 {
        return false;
    }

    parts[0].parse::<u64>().is_ok()
}

/// Release metadata attached to a tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Tag the release points at
    pub tag_name: String,
    /// Release title
    pub name: Option<String>,
    /// Release body
    pub body: Option<String>,
    /// Draft release
    pub draft: bool,
    /// Pre-release
    pub prerelease: bool,
    /// Publication timestamp
    pub published_at: Option<DateTime<Utc>>,
}

/// Commits and change statistics between two refs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffInfo {
    /// Commits, oldest first
    pub commits: Vec<CommitInfo>,
    /// Number of changed files
    pub changed_files: u64,
    /// Added lines
    pub additions: u64,
    /// Deleted lines
    pub deletions: u64,
}
