//! JSON shapes returned by the GitHub and Gitea REST APIs
//!
//! Gitea mirrors GitHub's payloads closely enough that one set of structs
//! serves both; fields only one platform sends are optional.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{CommitInfo, PrState, PullRequestInfo, ReleaseInfo, TagInfo};

#[derive(Debug, Deserialize)]
pub(crate) struct ApiUser {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiLabel {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiMilestone {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRepo {
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiBranchRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub repo: Option<ApiRepo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiPullRequest {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub merge_commit_sha: Option<String>,
    pub user: Option<ApiUser>,
    #[serde(default)]
    pub labels: Vec<ApiLabel>,
    #[serde(default)]
    pub milestone: Option<ApiMilestone>,
    pub head: ApiBranchRef,
    pub base: ApiBranchRef,
}

impl ApiPullRequest {
    pub(crate) fn into_info(self, fallback_repo: &str) -> PullRequestInfo {
        let state = match (self.state.as_str(), self.merged_at.is_some()) {
            (_, true) => PrState::Merged,
            ("open", false) => PrState::Open,
            _ => PrState::Closed,
        };

        PullRequestInfo {
            number: self.number,
            title: self.title,
            html_url: self.html_url,
            base_branch: self.base.ref_name,
            head_branch: self.head.ref_name,
            created_at: self.created_at,
            merged_at: self.merged_at,
            merge_commit_sha: self.merge_commit_sha,
            author: self.user.map(|u| u.login).unwrap_or_default(),
            repo_name: self
                .base
                .repo
                .map(|r| r.full_name)
                .unwrap_or_else(|| fallback_repo.to_string()),
            labels: self.labels.into_iter().map(|l| l.name).collect(),
            milestone: self.milestone.map(|m| m.title),
            body: self.body.unwrap_or_default(),
            state,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiTagCommit {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiTag {
    pub name: String,
    pub commit: ApiTagCommit,
}

impl From<ApiTag> for TagInfo {
    fn from(tag: ApiTag) -> Self {
        TagInfo::new(tag.name, tag.commit.sha)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiGitSignature {
    #[serde(default)]
    pub name: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiGitCommit {
    pub message: String,
    pub author: Option<ApiGitSignature>,
    pub committer: Option<ApiGitSignature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCommitStats {
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCommit {
    pub sha: String,
    pub commit: ApiGitCommit,
    #[serde(default)]
    pub author: Option<ApiUser>,
    #[serde(default)]
    pub stats: Option<ApiCommitStats>,
}

impl ApiCommit {
    /// Committer date, falling back to the author date
    pub(crate) fn date(&self) -> Option<DateTime<Utc>> {
        self.commit
            .committer
            .as_ref()
            .or(self.commit.author.as_ref())
            .map(|s| s.date)
    }

    pub(crate) fn into_info(self) -> Option<CommitInfo> {
        let timestamp = self.date()?;
        let author = self
            .author
            .map(|u| u.login)
            .or_else(|| self.commit.author.and_then(|a| a.name))
            .unwrap_or_default();
        Some(CommitInfo::new(
            self.sha,
            &self.commit.message,
            author,
            timestamp,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiFile {
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCompare {
    #[serde(default)]
    pub total_commits: Option<u64>,
    #[serde(default)]
    pub commits: Vec<ApiCommit>,
    #[serde(default)]
    pub files: Option<Vec<ApiFile>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRelease {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl From<ApiRelease> for ReleaseInfo {
    fn from(release: ApiRelease) -> Self {
        ReleaseInfo {
            tag_name: release.tag_name,
            name: release.name,
            body: release.body,
            draft: release.draft,
            prerelease: release.prerelease,
            published_at: release.published_at,
        }
    }
}
