//! Release notes types

use beacon_forge::PullRequestInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A category section in the release notes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Section title
    pub title: String,
    /// Text rendered in place of the items when the section is empty
    pub empty_content: Option<String>,
    /// Pull requests in this section, in upstream order
    pub items: Vec<PullRequestInfo>,
}

impl Section {
    /// Create a new section
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            empty_content: None,
            items: Vec::new(),
        }
    }

    /// Set the content rendered when nothing matched
    pub fn with_empty_content(mut self, content: Option<String>) -> Self {
        self.empty_content = content;
        self
    }

    /// Add an item to the section
    pub fn add_item(&mut self, item: PullRequestInfo) {
        self.items.push(item);
    }

    /// Check if section is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Pull requests bucketed for rendering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorizedChanges {
    /// One section per configured category, in declaration order
    pub sections: Vec<Section>,
    /// Merged items no category matched
    pub uncategorized: Vec<PullRequestInfo>,
    /// Still-open pull requests
    pub open: Vec<PullRequestInfo>,
    /// Items carrying an ignore label
    pub ignored: Vec<PullRequestInfo>,
}

impl CategorizedChanges {
    /// Number of items placed in a category
    pub fn categorized_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    /// Check if nothing was categorized
    pub fn is_empty(&self) -> bool {
        self.categorized_count() == 0
    }
}

/// Summary figures for the release range
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseStats {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Start of the range
    pub from_tag: Option<String>,
    /// End of the range
    pub to_tag: Option<String>,
    /// Commit date of `from_tag`
    pub from_date: Option<DateTime<Utc>>,
    /// Commit date of `to_tag`
    pub to_date: Option<DateTime<Utc>>,
    /// Number of changed files
    pub changed_files: u64,
    /// Added lines
    pub additions: u64,
    /// Deleted lines
    pub deletions: u64,
    /// Commits in the range
    pub commits: usize,
    /// Web URL comparing the two tags
    pub compare_url: Option<String>,
}

impl ReleaseStats {
    /// Whole days between the two tag dates
    pub fn days_since(&self) -> Option<i64> {
        match (self.from_date, self.to_date) {
            (Some(from), Some(to)) => Some((to - from).num_days()),
            _ => None,
        }
    }
}

/// Outcome of one release notes run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseNotesResult {
    /// Rendered release notes
    pub changelog: String,
    /// Whether any error was caught during the run
    pub failed: bool,
    /// Message of the caught error
    pub error: Option<String>,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Resolved start tag
    pub from_tag: Option<String>,
    /// Resolved end tag
    pub to_tag: Option<String>,
    /// Items placed in a category
    pub categorized_prs: usize,
    /// Items no category matched
    pub uncategorized_prs: usize,
    /// Open pull requests listed
    pub open_prs: usize,
    /// Items dropped by ignore labels
    pub ignored_prs: usize,
}

impl ReleaseNotesResult {
    /// Record a caught error without discarding the collected output
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.failed = true;
        self.error = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{day, merged_pr};

    #[test]
    fn test_categorized_count() {
        let mut features = Section::new("Features");
        features.add_item(merged_pr(1, "a", 2, &[]));
        features.add_item(merged_pr(2, "b", 3, &[]));
        let changes = CategorizedChanges {
            sections: vec![features, Section::new("Fixes")],
            uncategorized: vec![merged_pr(3, "c", 4, &[])],
            ..Default::default()
        };

        assert_eq!(changes.categorized_count(), 2);
        assert!(!changes.is_empty());
        assert!(changes.sections[1].is_empty());
    }

    #[test]
    fn test_days_since() {
        let stats = ReleaseStats {
            from_date: Some(day(1)),
            to_date: Some(day(11)),
            ..Default::default()
        };
        assert_eq!(stats.days_since(), Some(10));
        assert_eq!(ReleaseStats::default().days_since(), None);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = ReleaseNotesResult::default().with_error("boom");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["failed"], true);
        assert_eq!(json["error"], "boom");
        assert!(json.get("categorizedPrs").is_some());
    }
}
