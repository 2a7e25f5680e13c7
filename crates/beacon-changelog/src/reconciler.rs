//! Commit to pull request reconciliation

use std::collections::HashSet;
use std::sync::LazyLock;

use beacon_forge::CommitInfo;
use regex::Regex;
use tracing::debug;

static MERGE_COMMIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Merge pull request #(\d+)").expect("valid regex"));

/// A commit and the pull request its merge message points at
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledCommit {
    /// The commit
    pub commit: CommitInfo,
    /// Pull request number parsed from the summary line
    pub pr_number: u64,
}

/// Pair each merge commit with the pull request it merged.
///
/// Commits whose summary contains any of `exclude_patterns` are dropped
/// before the merge message is inspected. Commits that are not pull request
/// merges are left out of the result.
pub fn reconcile_commits_to_prs(
    commits: &[CommitInfo],
    exclude_patterns: &[String],
) -> Vec<ReconciledCommit> {
    commits
        .iter()
        .filter(|commit| {
            let excluded = exclude_patterns
                .iter()
                .any(|pattern| commit.summary.contains(pattern.as_str()));
            if excluded {
                debug!(sha = %commit.short_sha, "commit excluded by pattern");
            }
            !excluded
        })
        .filter_map(|commit| {
            parse_merge_number(&commit.summary).map(|pr_number| ReconciledCommit {
                commit: commit.clone(),
                pr_number,
            })
        })
        .collect()
}

fn parse_merge_number(summary: &str) -> Option<u64> {
    MERGE_COMMIT_RE
        .captures(summary)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Distinct pull request numbers in first-seen order
pub fn pull_request_numbers(reconciled: &[ReconciledCommit]) -> Vec<u64> {
    let mut seen = HashSet::new();
    reconciled
        .iter()
        .map(|r| r.pr_number)
        .filter(|n| seen.insert(*n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::day;

    fn commit(sha: &str, message: &str) -> CommitInfo {
        CommitInfo::new(sha, message, "octocat", day(3))
    }

    #[test]
    fn test_merge_commit_is_linked_and_others_dropped() {
        let commits = vec![
            commit("a1", "Merge pull request #42 from octo/feature\n\nAdd feature"),
            commit("b2", "fix: direct push"),
        ];
        let reconciled = reconcile_commits_to_prs(&commits, &[]);

        assert_eq!(reconciled.len(), 1);
        assert_eq!(reconciled[0].pr_number, 42);
        assert_eq!(reconciled[0].commit.sha, "a1");
    }

    #[test]
    fn test_exclusion_wins_over_merge_pattern() {
        let commits = vec![commit("a1", "Merge pull request #42 from octo/develop")];
        let exclude = vec!["Merge pull request #42 from octo/develop".to_string()];

        assert!(reconcile_commits_to_prs(&commits, &exclude).is_empty());
    }

    #[test]
    fn test_exclusion_is_substring_match() {
        let commits = vec![
            commit("a1", "Merge pull request #1 from octo/develop"),
            commit("b2", "Merge pull request #2 from octo/topic"),
        ];
        let exclude = vec!["from octo/develop".to_string()];

        let reconciled = reconcile_commits_to_prs(&commits, &exclude);
        assert_eq!(reconciled.len(), 1);
        assert_eq!(reconciled[0].pr_number, 2);
    }

    #[test]
    fn test_pattern_must_anchor_at_start() {
        assert_eq!(parse_merge_number("Revert \"Merge pull request #7\""), None);
        assert_eq!(parse_merge_number("Merge pull request #7"), Some(7));
    }

    #[test]
    fn test_numbers_deduplicated_in_order() {
        let commits = vec![
            commit("a", "Merge pull request #5 from a/b"),
            commit("b", "Merge pull request #3 from a/b"),
            commit("c", "Merge pull request #5 from a/c"),
        ];
        let reconciled = reconcile_commits_to_prs(&commits, &[]);
        assert_eq!(pull_request_numbers(&reconciled), vec![5, 3]);
    }
}
