//! In-memory repository client for pipeline tests

use std::collections::HashMap;
use std::sync::Mutex;

use beacon_core::error::ForgeError;
use beacon_core::types::Platform;
use beacon_forge::{
    DiffInfo, PullRequestInfo, PullRequestState, ReleaseInfo, RepositoryClient, Result, TagInfo,
};
use chrono::{DateTime, TimeZone, Utc};

/// Day `n` of January 2024, noon UTC
pub fn day(n: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, n, 12, 0, 0).unwrap()
}

/// A merged pull request with labels
pub fn merged_pr(number: u64, title: &str, merged_day: u32, labels: &[&str]) -> PullRequestInfo {
    PullRequestInfo::merged(number, title, "octocat", day(merged_day))
        .with_labels(labels.iter().copied())
        .with_url(format!("https://github.com/octo/hello/pull/{}", number))
        .with_branches("main", format!("topic-{}", number))
}

#[derive(Default)]
pub struct MockClient {
    pub tags: Vec<TagInfo>,
    pub tag_dates: HashMap<String, DateTime<Utc>>,
    pub diff: DiffInfo,
    /// Closed pull requests, most recently updated first
    pub closed: Vec<PullRequestInfo>,
    pub open: Vec<PullRequestInfo>,
    pub by_number: HashMap<u64, PullRequestInfo>,
    pub page_size: u32,
    pub fail_pages: bool,
    pub fail_compare: bool,
    pub unauthorized: bool,
    pub requested_pages: Mutex<Vec<u32>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            page_size: 10,
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, name: &str, sha: &str, date: DateTime<Utc>) -> Self {
        self.tags.push(TagInfo::new(name, sha));
        self.tag_dates.insert(name.to_string(), date);
        self
    }

    pub fn pages_requested(&self) -> Vec<u32> {
        self.requested_pages.lock().unwrap().clone()
    }

    fn check_auth(&self, resource: &str) -> Result<()> {
        if self.unauthorized {
            return Err(ForgeError::Unauthorized {
                resource: resource.to_string(),
                message: "Bad credentials".to_string(),
            });
        }
        Ok(())
    }
}

fn page_of(items: &[PullRequestInfo], page: u32, per_page: u32) -> Vec<PullRequestInfo> {
    items
        .iter()
        .skip(((page - 1) * per_page) as usize)
        .take(per_page as usize)
        .cloned()
        .collect()
}

#[async_trait::async_trait]
impl RepositoryClient for MockClient {
    fn platform(&self) -> Platform {
        Platform::GitHub
    }

    fn owner(&self) -> &str {
        "octo"
    }

    fn repo(&self) -> &str {
        "hello"
    }

    fn repository_url(&self) -> String {
        "https://github.com/octo/hello".to_string()
    }

    fn max_page_size(&self) -> u32 {
        self.page_size
    }

    async fn get_tags(&self, max_tags: usize) -> Result<Vec<TagInfo>> {
        self.check_auth("tags")?;
        Ok(self.tags.iter().take(max_tags).cloned().collect())
    }

    async fn get_tag_date(&self, tag: &TagInfo) -> Result<DateTime<Utc>> {
        self.tag_dates
            .get(&tag.name)
            .copied()
            .ok_or_else(|| ForgeError::NotFound {
                resource: format!("commit of tag {}", tag.name),
            })
    }

    async fn get_commits(&self, from: &str, to: &str) -> Result<DiffInfo> {
        if self.fail_compare {
            return Err(ForgeError::Api {
                resource: format!("comparison {}...{}", from, to),
                status: 500,
                message: "boom".to_string(),
            });
        }
        Ok(self.diff.clone())
    }

    async fn get_pull_request_page(
        &self,
        state: PullRequestState,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<PullRequestInfo>> {
        self.requested_pages.lock().unwrap().push(page);
        if self.fail_pages {
            return Err(ForgeError::Api {
                resource: "pull requests".to_string(),
                status: 502,
                message: "bad gateway".to_string(),
            });
        }
        let source = match state {
            PullRequestState::Open => &self.open,
            PullRequestState::Closed => &self.closed,
        };
        Ok(page_of(source, page, per_page))
    }

    async fn get_pull_request(&self, number: u64) -> Result<Option<PullRequestInfo>> {
        Ok(self.by_number.get(&number).cloned())
    }

    async fn get_release_info(&self, tag: &str) -> Result<Option<ReleaseInfo>> {
        Ok(self.tags.iter().find(|t| t.name == tag).map(|t| ReleaseInfo {
            tag_name: t.name.clone(),
            name: None,
            body: None,
            draft: false,
            prerelease: t.name.contains('-'),
            published_at: None,
        }))
    }
}
