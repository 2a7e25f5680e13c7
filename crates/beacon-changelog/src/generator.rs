//! Release notes pipeline
//!
//! Tags → window → items → filter/sort → classify → render. Transport
//! failures are tolerated unless they are fatal or `fail_on_error` is set;
//! a tolerated failure marks the result failed and the run continues with
//! whatever was collected.

use std::collections::HashSet;
use std::sync::Arc;

use beacon_core::config::Configuration;
use beacon_core::error::{BeaconError, Result};
use beacon_core::types::RunOptions;
use beacon_forge::{DiffInfo, PullRequestInfo, RepositoryClient};
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, instrument, warn};

use crate::classifier::Classifier;
use crate::fetcher::{
    fetch_open_pull_requests, fetch_pull_requests_between, fetch_pull_requests_for_commits,
};
use crate::reconciler::{pull_request_numbers, reconcile_commits_to_prs};
use crate::renderer::Renderer;
use crate::sort::sort_pull_requests;
use crate::tags::{prepare_tags, resolve_range, ReleaseRange};
use crate::types::{ReleaseNotesResult, ReleaseStats};

/// Release range with the commit dates bounding it
#[derive(Debug, Clone)]
struct Window {
    range: ReleaseRange,
    from_date: DateTime<Utc>,
    to_date: DateTime<Utc>,
}

impl Window {
    fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.from_date <= timestamp && timestamp <= self.to_date
    }
}

/// Builds the release notes for one repository and tag range
pub struct ReleaseNotesBuilder {
    client: Arc<dyn RepositoryClient>,
    config: Configuration,
    options: RunOptions,
}

impl ReleaseNotesBuilder {
    /// Create a builder
    pub fn new(client: Arc<dyn RepositoryClient>, config: Configuration, options: RunOptions) -> Self {
        Self {
            client,
            config,
            options,
        }
    }

    /// Run the pipeline
    #[instrument(skip(self), fields(repo = %self.options.full_name()))]
    pub async fn build(&self) -> Result<ReleaseNotesResult> {
        info!(
            from = ?self.options.from_tag,
            to = ?self.options.to_tag,
            commit_mode = self.options.commit_mode,
            "building release notes"
        );
        let classifier = Classifier::from_config(&self.config)?;
        let renderer = Renderer::new(&self.config)?;

        let mut result = ReleaseNotesResult {
            owner: self.options.owner.clone(),
            repo: self.options.repo.clone(),
            ..Default::default()
        };
        let mut failures = Vec::new();

        let window = match self.resolve_window().await {
            Ok(window) => window,
            Err(err) => {
                let message = self.tolerate(err)?;
                return Ok(result.with_error(message));
            }
        };
        result.from_tag = window.range.from.as_ref().map(|t| t.name.clone());
        result.to_tag = Some(window.range.to.name.clone());

        let mut stats = ReleaseStats {
            owner: self.options.owner.clone(),
            repo: self.options.repo.clone(),
            from_tag: result.from_tag.clone(),
            to_tag: result.to_tag.clone(),
            from_date: Some(window.from_date),
            to_date: Some(window.to_date),
            ..Default::default()
        };

        let diff = match &window.range.from {
            Some(from) => match self.client.get_commits(&from.name, &window.range.to.name).await {
                Ok(diff) => Some(diff),
                Err(err) => {
                    failures.push(self.tolerate(err.into())?);
                    None
                }
            },
            None => None,
        };
        if let (Some(diff), Some(from)) = (&diff, &window.range.from) {
            stats.commits = diff.commits.len();
            stats.changed_files = diff.changed_files;
            stats.additions = diff.additions;
            stats.deletions = diff.deletions;
            stats.compare_url = Some(self.client.compare_url(&from.name, &window.range.to.name));
        }

        let items = match self.collect_items(&window, diff.as_ref()).await {
            Ok(items) => items,
            Err(err) => {
                failures.push(self.tolerate(err)?);
                Vec::new()
            }
        };
        let mut items = self.filter_items(dedupe(items), &window);
        sort_pull_requests(&mut items, &self.config.sort);

        let mut changes = classifier.categorize(items);

        if self.options.include_open {
            match fetch_open_pull_requests(self.client.as_ref(), self.config.max_pull_requests).await {
                Ok(mut open) => {
                    sort_pull_requests(&mut open, &self.config.sort);
                    changes.open = open;
                }
                Err(err) => failures.push(self.tolerate(err.into())?),
            }
        }

        result.changelog = renderer.render(&changes, &stats);
        result.categorized_prs = changes.categorized_count();
        result.uncategorized_prs = changes.uncategorized.len();
        result.open_prs = changes.open.len();
        result.ignored_prs = changes.ignored.len();

        info!(
            categorized = result.categorized_prs,
            uncategorized = result.uncategorized_prs,
            open = result.open_prs,
            ignored = result.ignored_prs,
            failures = failures.len(),
            "release notes built"
        );

        if failures.is_empty() {
            Ok(result)
        } else {
            Ok(result.with_error(failures.join("; ")))
        }
    }

    /// Return the message of a tolerable error, or the error itself
    fn tolerate(&self, err: BeaconError) -> Result<String> {
        if err.is_fatal() || self.options.fail_on_error {
            return Err(err);
        }
        warn!(error = %err, "continuing after error");
        Ok(err.to_string())
    }

    async fn resolve_window(&self) -> Result<Window> {
        let explicit = self.options.from_tag.is_some() && self.options.to_tag.is_some();
        let tags = if explicit {
            Vec::new()
        } else {
            let tags = self.client.get_tags(self.config.max_tags_to_fetch).await?;
            prepare_tags(
                tags,
                &self.config.tag_resolver,
                self.options.ignore_pre_releases,
            )?
        };

        let range = resolve_range(
            &tags,
            self.options.from_tag.as_deref(),
            self.options.to_tag.as_deref(),
        )?;

        let to_date = self.client.get_tag_date(&range.to).await?;
        let from_date = match &range.from {
            Some(tag) => self.client.get_tag_date(tag).await?,
            None => {
                debug!(
                    days = self.config.max_back_track_time_days,
                    "no previous tag, backtracking from the end of the range"
                );
                backtrack(to_date, self.config.max_back_track_time_days)
            }
        };

        info!(%from_date, %to_date, to = %range.to.name, "resolved release window");
        Ok(Window {
            range,
            from_date,
            to_date,
        })
    }

    /// Items for the window: commits in commit mode, pull requests derived
    /// from merge commits, or the pull request history.
    ///
    /// Without a comparison (first release, or the compare call failed) both
    /// commit-based modes fall back to the pull request history.
    async fn collect_items(
        &self,
        window: &Window,
        diff: Option<&DiffInfo>,
    ) -> Result<Vec<PullRequestInfo>> {
        let client = self.client.as_ref();
        match diff {
            Some(diff) if self.options.commit_mode => {
                let repo_name = client.full_name();
                Ok(diff
                    .commits
                    .iter()
                    .map(|commit| {
                        PullRequestInfo::from_commit(commit, client.commit_url(&commit.sha), &repo_name)
                    })
                    .collect())
            }
            Some(diff) if self.options.fetch_via_commits => {
                let reconciled =
                    reconcile_commits_to_prs(&diff.commits, &self.config.exclude_merge_branches);
                let mut numbers = pull_request_numbers(&reconciled);
                numbers.truncate(self.config.max_pull_requests);
                debug!(
                    commits = diff.commits.len(),
                    pull_requests = numbers.len(),
                    "reconciled commits"
                );
                Ok(fetch_pull_requests_for_commits(client, &numbers).await?)
            }
            _ => Ok(fetch_pull_requests_between(
                client,
                window.from_date,
                window.to_date,
                self.config.max_pull_requests,
            )
            .await?),
        }
    }

    /// Keep merged items inside the window that target a configured base branch
    fn filter_items(&self, items: Vec<PullRequestInfo>, window: &Window) -> Vec<PullRequestInfo> {
        let before = items.len();
        let kept: Vec<PullRequestInfo> = items
            .into_iter()
            .filter(|pr| pr.merged_at.is_some_and(|merged_at| window.contains(merged_at)))
            .filter(|pr| {
                pr.number == 0
                    || self.config.base_branches.is_empty()
                    || self.config.base_branches.contains(&pr.base_branch)
            })
            .collect();
        debug!(before, after = kept.len(), "filtered items to window");
        kept
    }
}

/// Drop repeated pull requests (by number) and repeated commits (by sha)
fn dedupe(items: Vec<PullRequestInfo>) -> Vec<PullRequestInfo> {
    let mut numbers = HashSet::new();
    let mut shas = HashSet::new();
    items
        .into_iter()
        .filter(|pr| {
            if pr.number > 0 {
                numbers.insert(pr.number)
            } else {
                pr.merge_commit_sha
                    .as_ref()
                    .map_or(true, |sha| shas.insert(sha.clone()))
            }
        })
        .collect()
}

/// Start of a first-release window, saturating at the earliest representable date
fn backtrack(to_date: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    TimeDelta::try_days(days)
        .and_then(|delta| to_date.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{day, merged_pr, MockClient};
    use beacon_core::error::ForgeError;
    use beacon_forge::CommitInfo;

    fn config() -> Configuration {
        Configuration {
            template: "#{{CHANGELOG}}\n---\n#{{UNCATEGORIZED}}".to_string(),
            pr_template: "- #{{TITLE}} (##{{NUMBER}})".to_string(),
            ..Default::default()
        }
    }

    fn tagged_client() -> MockClient {
        MockClient::new()
            .with_tag("v1.1.0", "sha-110", day(20))
            .with_tag("v1.0.0", "sha-100", day(5))
    }

    fn builder(client: MockClient, config: Configuration, options: RunOptions) -> ReleaseNotesBuilder {
        ReleaseNotesBuilder::new(Arc::new(client), config, options)
    }

    fn options() -> RunOptions {
        RunOptions::new("octo", "hello")
    }

    #[tokio::test]
    async fn test_builds_from_pull_request_history() {
        let client = MockClient {
            closed: vec![
                merged_pr(6, "late", 25, &["feature"]),
                merged_pr(5, "Fix crash", 15, &["bug"]),
                merged_pr(4, "Add widgets", 10, &["feature"]),
                merged_pr(3, "Chore", 8, &[]),
                merged_pr(2, "early", 3, &["feature"]),
            ],
            ..tagged_client()
        };

        let result = builder(client, config(), options()).build().await.unwrap();

        assert!(!result.failed);
        assert_eq!(result.from_tag.as_deref(), Some("v1.0.0"));
        assert_eq!(result.to_tag.as_deref(), Some("v1.1.0"));
        assert_eq!(
            result.changelog,
            "## 🚀 Features\n\n- Add widgets (#4)\n\n## 🐛 Fixes\n\n- Fix crash (#5)\n---\n- Chore (#3)"
        );
        assert_eq!(result.categorized_prs, 2);
        assert_eq!(result.uncategorized_prs, 1);
    }

    #[tokio::test]
    async fn test_transport_failure_degrades() {
        let client = MockClient {
            fail_pages: true,
            ..tagged_client()
        };

        let result = builder(client, config(), options()).build().await.unwrap();

        assert!(result.failed);
        assert!(result.error.unwrap().contains("bad gateway"));
        assert!(result.changelog.starts_with("- no changes"));
    }

    #[tokio::test]
    async fn test_fail_on_error_aborts() {
        let client = MockClient {
            fail_pages: true,
            ..tagged_client()
        };

        let err = builder(client, config(), options().with_fail_on_error(true))
            .build()
            .await
            .unwrap_err();
        assert!(matches!(err, BeaconError::Forge(ForgeError::Api { status: 502, .. })));
    }

    #[tokio::test]
    async fn test_unauthorized_is_fatal() {
        let client = MockClient {
            unauthorized: true,
            ..tagged_client()
        };

        let err = builder(client, config(), options()).build().await.unwrap_err();
        assert!(matches!(err, BeaconError::Forge(ForgeError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_no_tags_reports_failure() {
        let result = builder(MockClient::new(), config(), options())
            .build()
            .await
            .unwrap();
        assert!(result.failed);
        assert!(result.changelog.is_empty());
        assert!(result.error.unwrap().contains("No tags"));
    }

    #[tokio::test]
    async fn test_invalid_pattern_fails_before_fetching() {
        let mut config = config();
        config.categories[0].rules.push(beacon_core::config::Rule::title("("));
        let client = tagged_client();

        let err = builder(client, config, options()).build().await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_commit_mode_uses_raw_commits() {
        let client = MockClient {
            diff: DiffInfo {
                commits: vec![
                    CommitInfo::new("aaa1111", "feat: first", "octocat", day(8)),
                    CommitInfo::new("bbb2222", "fix: second", "octocat", day(9)),
                    CommitInfo::new("aaa1111", "feat: first", "octocat", day(8)),
                ],
                changed_files: 3,
                additions: 10,
                deletions: 2,
            },
            ..tagged_client()
        };
        let config = Configuration {
            template: "#{{UNCATEGORIZED}}|#{{CHANGED_FILES}}|#{{RELEASE_DIFF}}".to_string(),
            pr_template: "- #{{TITLE}} #{{URL}}".to_string(),
            ..Default::default()
        };

        let result = builder(client, config, options().with_commit_mode(true))
            .build()
            .await
            .unwrap();

        assert_eq!(
            result.changelog,
            "- feat: first https://github.com/octo/hello/commit/aaa1111\n\
             - fix: second https://github.com/octo/hello/commit/bbb2222\
             |3|https://github.com/octo/hello/compare/v1.0.0...v1.1.0"
        );
        assert_eq!(result.uncategorized_prs, 2);
        assert!(!result.failed);
    }

    #[tokio::test]
    async fn test_fetch_via_commits_skips_missing_pull_requests() {
        let mut client = MockClient {
            diff: DiffInfo {
                commits: vec![
                    CommitInfo::new("a", "Merge pull request #7 from octo/feature", "octocat", day(8)),
                    CommitInfo::new("b", "Merge pull request #8 from octo/deleted", "octocat", day(9)),
                    CommitInfo::new("c", "Merge pull request #9 from octo/develop", "octocat", day(9)),
                    CommitInfo::new("d", "direct commit", "octocat", day(10)),
                ],
                ..Default::default()
            },
            ..tagged_client()
        };
        client.by_number.insert(7, merged_pr(7, "Add feature", 8, &["feature"]));
        client.by_number.insert(9, merged_pr(9, "Sync develop", 9, &[]));
        let config = Configuration {
            exclude_merge_branches: vec!["from octo/develop".to_string()],
            ..config()
        };

        let result = builder(client, config, options().with_fetch_via_commits(true))
            .build()
            .await
            .unwrap();

        assert!(!result.failed);
        assert_eq!(result.categorized_prs, 1);
        assert_eq!(result.uncategorized_prs, 0);
        assert!(result.changelog.contains("- Add feature (#7)"));
        assert!(!result.changelog.contains("Sync develop"));
    }

    #[tokio::test]
    async fn test_include_open_pull_requests() {
        let client = MockClient {
            closed: vec![merged_pr(4, "Add widgets", 10, &["feature"])],
            open: vec![merged_pr(8, "WIP", 12, &[]).into_open()],
            ..tagged_client()
        };
        let config = Configuration {
            template: "#{{CHANGELOG}}\nOpen (#{{OPEN_COUNT}}):\n#{{OPEN}}".to_string(),
            open_template: Some("- [ ] #{{TITLE}}".to_string()),
            ..config()
        };

        let result = builder(client, config, options().with_include_open(true))
            .build()
            .await
            .unwrap();

        assert_eq!(result.open_prs, 1);
        assert!(result.changelog.ends_with("Open (1):\n- [ ] WIP"));
    }

    #[tokio::test]
    async fn test_first_release_backtracks() {
        let client = MockClient {
            closed: vec![merged_pr(2, "Initial feature", 3, &["feature"])],
            ..MockClient::new().with_tag("v1.0.0", "sha-100", day(20))
        };

        let result = builder(client, config(), options()).build().await.unwrap();

        assert!(result.from_tag.is_none());
        assert_eq!(result.categorized_prs, 1);
    }

    #[tokio::test]
    async fn test_huge_backtrack_saturates() {
        let client = MockClient {
            closed: vec![merged_pr(2, "Initial feature", 3, &["feature"])],
            ..MockClient::new().with_tag("v1.0.0", "sha-100", day(20))
        };
        let config = Configuration {
            max_back_track_time_days: 1_000_000_000,
            ..config()
        };

        let result = builder(client, config, options()).build().await.unwrap();

        assert!(!result.failed);
        assert_eq!(result.categorized_prs, 1);
    }

    #[test]
    fn test_backtrack_bounds() {
        assert_eq!(backtrack(day(20), 15), day(5));
        assert_eq!(backtrack(day(20), i64::MAX), DateTime::<Utc>::MIN_UTC);
    }

    #[tokio::test]
    async fn test_explicit_tags_skip_tag_listing() {
        let client = MockClient {
            closed: vec![merged_pr(4, "Add widgets", 10, &["feature"])],
            unauthorized: true,
            ..tagged_client()
        };

        let result = builder(
            client,
            config(),
            options().with_range(Some("v1.0.0".to_string()), Some("v1.1.0".to_string())),
        )
        .build()
        .await
        .unwrap();

        assert_eq!(result.categorized_prs, 1);
    }

    #[tokio::test]
    async fn test_base_branch_filter() {
        let client = MockClient {
            closed: vec![
                merged_pr(4, "Add widgets", 10, &["feature"]),
                merged_pr(5, "Backport", 11, &["feature"]).with_branches("release/1.x", "bp"),
            ],
            ..tagged_client()
        };
        let config = Configuration {
            base_branches: vec!["main".to_string()],
            ..config()
        };

        let result = builder(client, config, options()).build().await.unwrap();
        assert_eq!(result.categorized_prs, 1);
    }

    #[test]
    fn test_dedupe_by_number_and_sha() {
        let commit = CommitInfo::new("abc", "feat: x", "octocat", day(2));
        let synthesized = PullRequestInfo::from_commit(&commit, "u", "octo/hello");
        let items = vec![
            merged_pr(1, "a", 2, &[]),
            merged_pr(1, "a again", 3, &[]),
            synthesized.clone(),
            synthesized,
            merged_pr(2, "b", 4, &[]),
        ];
        let kept = dedupe(items);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].title, "a");
    }
}
