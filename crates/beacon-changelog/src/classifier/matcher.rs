//! Compiled category predicates

use beacon_core::config::{Category, PrProperty};
use beacon_core::error::ChangelogError;
use beacon_forge::PullRequestInfo;
use regex::Regex;

use super::labels::normalize_label;

/// Label that matches every item
pub const WILDCARD_LABEL: &str = "*";

/// Compile a configured pattern, naming it in the error
pub(crate) fn compile(pattern: &str) -> Result<Regex, ChangelogError> {
    Regex::new(pattern).map_err(|e| ChangelogError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Value of a pull request property as matched by rules and extractors
pub(crate) fn property_value(pr: &PullRequestInfo, property: PrProperty) -> &str {
    match property {
        PrProperty::Title => &pr.title,
        PrProperty::Author => &pr.author,
        PrProperty::Body => &pr.body,
        PrProperty::HeadBranch => &pr.head_branch,
        PrProperty::BaseBranch => &pr.base_branch,
        PrProperty::Milestone => pr.milestone.as_deref().unwrap_or(""),
    }
}

/// The predicate of one category.
///
/// An item matches when it carries none of the excluded labels and at least
/// one configured predicate kind holds: the label set (any label, or all of
/// them when exhaustive), any rule, or the author list. A category with no
/// predicates matches nothing.
#[derive(Debug, Clone)]
pub struct CategoryMatcher {
    labels: Vec<String>,
    exclude_labels: Vec<String>,
    rules: Vec<(PrProperty, Regex)>,
    authors: Vec<String>,
    exhaustive: bool,
}

impl CategoryMatcher {
    /// Compile the predicate of `category`
    pub fn new(category: &Category) -> Result<Self, ChangelogError> {
        let rules = category
            .rules
            .iter()
            .map(|rule| Ok((rule.on_property, compile(&rule.pattern)?)))
            .collect::<Result<Vec<_>, ChangelogError>>()?;

        Ok(Self {
            labels: category.labels.iter().map(|l| normalize_label(l)).collect(),
            exclude_labels: category
                .exclude_labels
                .iter()
                .map(|l| normalize_label(l))
                .collect(),
            rules,
            authors: category.authors.iter().map(|a| a.to_lowercase()).collect(),
            exhaustive: category.exhaustive,
        })
    }

    /// Whether `pr`, carrying the normalized `labels`, belongs to the category
    pub fn matches(&self, pr: &PullRequestInfo, labels: &[String]) -> bool {
        if self
            .exclude_labels
            .iter()
            .any(|excluded| labels.contains(excluded))
        {
            return false;
        }

        self.matches_labels(labels) || self.matches_rules(pr) || self.matches_author(pr)
    }

    fn matches_labels(&self, labels: &[String]) -> bool {
        if self.labels.is_empty() {
            return false;
        }
        if self.labels.iter().any(|l| l == WILDCARD_LABEL) {
            return true;
        }
        if self.exhaustive {
            self.labels.iter().all(|l| labels.contains(l))
        } else {
            self.labels.iter().any(|l| labels.contains(l))
        }
    }

    fn matches_rules(&self, pr: &PullRequestInfo) -> bool {
        self.rules
            .iter()
            .any(|(property, regex)| regex.is_match(property_value(pr, *property)))
    }

    fn matches_author(&self, pr: &PullRequestInfo) -> bool {
        let author = pr.author.to_lowercase();
        self.authors.iter().any(|a| *a == author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::merged_pr;
    use beacon_core::config::Rule;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_any_label_matches() {
        let matcher = CategoryMatcher::new(&Category::new("Fixes").with_labels(["Fix", "bug"])).unwrap();
        let pr = merged_pr(1, "t", 2, &[]);
        assert!(matcher.matches(&pr, &labels(&["bug"])));
        assert!(matcher.matches(&pr, &labels(&["fix"])));
        assert!(!matcher.matches(&pr, &labels(&["docs"])));
    }

    #[test]
    fn test_exhaustive_requires_all_labels() {
        let category = Category {
            exhaustive: true,
            ..Category::new("Breaking fixes").with_labels(["fix", "breaking"])
        };
        let matcher = CategoryMatcher::new(&category).unwrap();
        let pr = merged_pr(1, "t", 2, &[]);
        assert!(!matcher.matches(&pr, &labels(&["fix"])));
        assert!(matcher.matches(&pr, &labels(&["breaking", "fix"])));
    }

    #[test]
    fn test_exclude_label_vetoes() {
        let category = Category::new("Features")
            .with_labels(["feature"])
            .with_exclude_labels(["skip-changelog"]);
        let matcher = CategoryMatcher::new(&category).unwrap();
        let pr = merged_pr(1, "t", 2, &[]);
        assert!(!matcher.matches(&pr, &labels(&["feature", "skip-changelog"])));
    }

    #[test]
    fn test_wildcard_matches_unlabeled() {
        let matcher = CategoryMatcher::new(&Category::new("All").with_labels(["*"])).unwrap();
        assert!(matcher.matches(&merged_pr(1, "t", 2, &[]), &[]));
    }

    #[test]
    fn test_rules_on_properties() {
        let category = Category::new("Docs")
            .with_rule(Rule::title("^docs"))
            .with_rule(Rule::on(PrProperty::HeadBranch, "^docs/"));
        let matcher = CategoryMatcher::new(&category).unwrap();

        assert!(matcher.matches(&merged_pr(1, "docs: readme", 2, &[]), &[]));
        let branch = merged_pr(2, "update", 2, &[]).with_branches("main", "docs/guide");
        assert!(matcher.matches(&branch, &[]));
        assert!(!matcher.matches(&merged_pr(3, "feat: x", 2, &[]), &[]));
    }

    #[test]
    fn test_author_match_is_case_insensitive() {
        let matcher =
            CategoryMatcher::new(&Category::new("Bots").with_authors(["OctoCat"])).unwrap();
        assert!(matcher.matches(&merged_pr(1, "bump", 2, &[]), &[]));
    }

    #[test]
    fn test_category_without_predicates_matches_nothing() {
        let matcher = CategoryMatcher::new(&Category::new("Nothing")).unwrap();
        assert!(!matcher.matches(&merged_pr(1, "t", 2, &[]), &labels(&["bug"])));
    }

    #[test]
    fn test_invalid_rule_pattern() {
        let category = Category::new("Bad").with_rule(Rule::title("(unclosed"));
        let err = CategoryMatcher::new(&category).unwrap_err();
        assert!(matches!(err, ChangelogError::InvalidPattern { pattern, .. } if pattern == "(unclosed"));
    }
}
