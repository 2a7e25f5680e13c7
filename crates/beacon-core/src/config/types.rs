//! Configuration types

use serde::{Deserialize, Serialize};

use super::defaults;

/// Main configuration for Beacon
///
/// Every key is optional in the JSON file; missing keys take the built-in
/// default (see [`merge_configuration`](super::merge_configuration)).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Ordered categories; the first matching category wins
    pub categories: Vec<Category>,

    /// Labels that drop a pull request into the ignored bucket
    pub ignore_labels: Vec<String>,

    /// Item ordering
    pub sort: SortConfig,

    /// Top-level template
    pub template: String,

    /// Template for a single pull request line
    pub pr_template: String,

    /// Template for a single open pull request line (falls back to `pr_template`)
    pub open_template: Option<String>,

    /// Block wrapping the uncategorized items; empty when nothing is uncategorized
    pub uncategorized_template: String,

    /// Category header template
    pub category_template: String,

    /// Changelog text used when nothing was categorized
    pub empty_template: String,

    /// Separator placed between rendered items
    pub item_separator: String,

    /// Regex rules deriving extra labels from pull request properties
    pub label_extractor: Vec<Extractor>,

    /// Regex rewrites applied to each rendered item
    pub transformers: Vec<Transformer>,

    /// Upper bound of tags fetched while resolving the range
    pub max_tags_to_fetch: usize,

    /// Upper bound of pull requests fetched from the history
    pub max_pull_requests: usize,

    /// How far back the from-tag may be when it has to be inferred
    pub max_back_track_time_days: i64,

    /// Substrings marking merge commits that should be ignored
    pub exclude_merge_branches: Vec<String>,

    /// How tags are ordered when the range has to be inferred
    pub tag_resolver: TagResolver,

    /// Only pull requests targeting these branches are kept (empty keeps all)
    pub base_branches: Vec<String>,

    /// Extra placeholders derived from existing ones
    pub custom_placeholders: Vec<CustomPlaceholder>,

    /// Trim whitespace of values substituted into item templates
    pub trim_values: bool,

    /// Collapse pull requests that share an extracted key
    pub duplicate_filter: Option<Extractor>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            categories: vec![
                Category::new("🚀 Features").with_labels(["feature", "feat"]),
                Category::new("🐛 Fixes").with_labels(["fix", "bug"]),
                Category::new("🧪 Tests").with_labels(["test"]),
            ],
            ignore_labels: vec!["ignore".to_string()],
            sort: SortConfig::default(),
            template: defaults::DEFAULT_TEMPLATE.to_string(),
            pr_template: defaults::DEFAULT_PR_TEMPLATE.to_string(),
            open_template: None,
            uncategorized_template: defaults::DEFAULT_UNCATEGORIZED_TEMPLATE.to_string(),
            category_template: defaults::DEFAULT_CATEGORY_TEMPLATE.to_string(),
            empty_template: defaults::DEFAULT_EMPTY_TEMPLATE.to_string(),
            item_separator: "\n".to_string(),
            label_extractor: Vec::new(),
            transformers: Vec::new(),
            max_tags_to_fetch: 200,
            max_pull_requests: 200,
            max_back_track_time_days: 365,
            exclude_merge_branches: Vec::new(),
            tag_resolver: TagResolver::default(),
            base_branches: Vec::new(),
            custom_placeholders: Vec::new(),
            trim_values: false,
            duplicate_filter: None,
        }
    }
}

impl Configuration {
    /// Template for open pull request lines
    pub fn open_item_template(&self) -> &str {
        self.open_template.as_deref().unwrap_or(&self.pr_template)
    }
}

/// A release notes category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    /// Display title
    pub title: String,

    /// Labels selecting this category (`*` matches everything)
    pub labels: Vec<String>,

    /// Labels vetoing this category
    pub exclude_labels: Vec<String>,

    /// Regex rules on pull request properties
    pub rules: Vec<Rule>,

    /// Authors (logins) selecting this category
    pub authors: Vec<String>,

    /// Require all labels instead of any
    pub exhaustive: bool,

    /// Rendered instead of omitting the category when it has no items
    pub empty_content: Option<String>,
}

impl Category {
    /// Create a category with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the selecting labels
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Set the vetoing labels
    pub fn with_exclude_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Add a property rule
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Set the selecting authors
    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Set empty content
    pub fn with_empty_content(mut self, content: impl Into<String>) -> Self {
        self.empty_content = Some(content.into());
        self
    }
}

/// A regex rule evaluated against one pull request property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Regular expression
    pub pattern: String,

    /// Property the pattern is evaluated against
    #[serde(default)]
    pub on_property: PrProperty,
}

impl Rule {
    /// Create a rule matching the title
    pub fn title(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            on_property: PrProperty::Title,
        }
    }

    /// Create a rule on an arbitrary property
    pub fn on(property: PrProperty, pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            on_property: property,
        }
    }
}

/// Pull request property addressed by rules and extractors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrProperty {
    /// Title
    #[default]
    Title,
    /// Author login
    Author,
    /// Body text
    Body,
    /// Head branch
    #[serde(alias = "branch")]
    HeadBranch,
    /// Target branch
    BaseBranch,
    /// Milestone title
    Milestone,
}

/// Regex extracting a value from a pull request property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extractor {
    /// Regular expression
    pub pattern: String,

    /// Property the pattern is evaluated against
    #[serde(default)]
    pub on_property: PrProperty,

    /// Replacement expanded from the captures (`$1` by default)
    #[serde(default = "default_target")]
    pub target: String,
}

fn default_target() -> String {
    "$1".to_string()
}

/// Regex rewrite applied to rendered text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transformer {
    /// Regular expression
    pub pattern: String,

    /// Replacement (supports `$1` style references)
    #[serde(default)]
    pub target: String,
}

/// A placeholder computed from another placeholder's value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomPlaceholder {
    /// Name used in templates (`#{{NAME}}`)
    pub name: String,

    /// Placeholder the value is derived from
    pub source: String,

    /// Rewrite applied to the source value
    pub transformer: Transformer,
}

/// Sort configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Direction
    pub order: SortOrder,

    /// Sort key
    pub on_property: SortProperty,
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    /// Oldest / smallest first
    #[default]
    Asc,
    /// Newest / largest first
    Desc,
}

/// Sort key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortProperty {
    /// Merge timestamp (creation timestamp for open pull requests)
    #[default]
    #[serde(alias = "mergedAt")]
    MergedAt,
    /// Title
    Title,
    /// Number
    Number,
}

/// Tag resolution when the range is inferred
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TagResolver {
    /// Ordering method
    pub method: TagResolveMethod,

    /// Regex tag names must match to be considered
    pub filter: Option<String>,
}

/// Tag ordering method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagResolveMethod {
    /// Semantic version order; non-semver tags are skipped
    #[default]
    Semver,
    /// Order returned by the platform (newest first)
    Sort,
}
