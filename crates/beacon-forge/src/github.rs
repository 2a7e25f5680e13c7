//! GitHub REST API client

use beacon_core::error::ForgeError;
use beacon_core::types::Platform;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::client::{ForgeOptions, PullRequestState, RepositoryClient};
use crate::http::{page_size, ApiTransport};
use crate::types::{DiffInfo, PullRequestInfo, ReleaseInfo, TagInfo};
use crate::wire::{ApiCommit, ApiCompare, ApiPullRequest, ApiRelease, ApiTag};
use crate::Result;

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_WEB_BASE: &str = "https://github.com";
const PAGE_SIZE: u32 = 100;

/// GitHub client scoped to one repository
pub struct GitHubClient {
    options: ForgeOptions,
    transport: ApiTransport,
}

impl GitHubClient {
    /// Create a new GitHub client
    pub fn new(options: ForgeOptions) -> Result<Self> {
        options.validate()?;
        let api_url = options.api_root(GITHUB_API_BASE);
        let auth = options.token.as_ref().map(|t| format!("Bearer {}", t));
        let transport = ApiTransport::new(&api_url, auth, options.timeout)?;
        debug!(api_url = %api_url, repo = %options.repo, "created GitHub client");
        Ok(Self { options, transport })
    }

    fn repo_path(&self) -> String {
        format!("/repos/{}/{}", self.options.owner, self.options.repo)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("owner", &self.options.owner)
            .field("repo", &self.options.repo)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl RepositoryClient for GitHubClient {
    fn platform(&self) -> Platform {
        Platform::GitHub
    }

    fn owner(&self) -> &str {
        &self.options.owner
    }

    fn repo(&self) -> &str {
        &self.options.repo
    }

    fn repository_url(&self) -> String {
        self.options.repository_url(GITHUB_WEB_BASE)
    }

    #[instrument(skip(self), fields(repo = %self.full_name()))]
    async fn get_tags(&self, max_tags: usize) -> Result<Vec<TagInfo>> {
        let per_page = page_size(max_tags, PAGE_SIZE);
        let mut tags = Vec::new();
        let mut page = 1;

        loop {
            let batch: Vec<ApiTag> = self
                .transport
                .get_json(
                    &format!("{}/tags", self.repo_path()),
                    &[("per_page", per_page.to_string()), ("page", page.to_string())],
                    "tags",
                )
                .await?;
            let batch_len = batch.len();
            tags.extend(batch.into_iter().map(TagInfo::from));

            if batch_len < per_page as usize || tags.len() >= max_tags {
                break;
            }
            page += 1;
        }

        tags.truncate(max_tags);
        info!(count = tags.len(), "fetched tags");
        Ok(tags)
    }

    async fn get_tag_date(&self, tag: &TagInfo) -> Result<DateTime<Utc>> {
        let resource = format!("commit of tag {}", tag.name);
        let commit: ApiCommit = self
            .transport
            .get_json(
                &format!("{}/commits/{}", self.repo_path(), tag.commit_sha),
                &[],
                &resource,
            )
            .await?;
        commit.date().ok_or(ForgeError::InvalidResponse {
            resource,
            message: "commit has no date".to_string(),
        })
    }

    #[instrument(skip(self), fields(repo = %self.full_name()))]
    async fn get_commits(&self, from: &str, to: &str) -> Result<DiffInfo> {
        let resource = format!("comparison {}...{}", from, to);
        let path = format!("{}/compare/{}...{}", self.repo_path(), from, to);
        let mut diff = DiffInfo::default();
        let mut page = 1;

        loop {
            let compare: ApiCompare = self
                .transport
                .get_json(
                    &path,
                    &[("per_page", PAGE_SIZE.to_string()), ("page", page.to_string())],
                    &resource,
                )
                .await?;

            if page == 1 {
                if let Some(files) = &compare.files {
                    diff.changed_files = files.len() as u64;
                    diff.additions = files.iter().map(|f| f.additions).sum();
                    diff.deletions = files.iter().map(|f| f.deletions).sum();
                }
            }

            let batch_len = compare.commits.len();
            let total = compare.total_commits.unwrap_or(0) as usize;
            diff.commits
                .extend(compare.commits.into_iter().filter_map(ApiCommit::into_info));

            if batch_len < PAGE_SIZE as usize || diff.commits.len() >= total {
                break;
            }
            page += 1;
        }

        info!(commits = diff.commits.len(), changed_files = diff.changed_files, "fetched comparison");
        Ok(diff)
    }

    async fn get_pull_request_page(
        &self,
        state: PullRequestState,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequestInfo>> {
        let full_name = self.full_name();
        let prs: Vec<ApiPullRequest> = self
            .transport
            .get_json(
                &format!("{}/pulls", self.repo_path()),
                &[
                    ("state", state.as_str().to_string()),
                    ("sort", "updated".to_string()),
                    ("direction", "desc".to_string()),
                    ("per_page", per_page.min(PAGE_SIZE).to_string()),
                    ("page", page.to_string()),
                ],
                "pull requests",
            )
            .await?;
        debug!(page, count = prs.len(), state = state.as_str(), "fetched pull request page");
        Ok(prs.into_iter().map(|pr| pr.into_info(&full_name)).collect())
    }

    async fn get_pull_request(&self, number: u64) -> Result<Option<PullRequestInfo>> {
        let pr: Option<ApiPullRequest> = self
            .transport
            .get_json_optional(
                &format!("{}/pulls/{}", self.repo_path(), number),
                &format!("pull request #{}", number),
            )
            .await?;
        if pr.is_none() {
            warn!(number, repo = %self.full_name(), "pull request not found, skipping");
        }
        Ok(pr.map(|pr| pr.into_info(&self.full_name())))
    }

    async fn get_release_info(&self, tag: &str) -> Result<Option<ReleaseInfo>> {
        let release: Option<ApiRelease> = self
            .transport
            .get_json_optional(
                &format!("{}/releases/tags/{}", self.repo_path(), tag),
                &format!("release {}", tag),
            )
            .await?;
        Ok(release.map(ReleaseInfo::from))
    }
}
