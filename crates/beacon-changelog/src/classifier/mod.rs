//! Category classification
//!
//! Categories are tried in declaration order and the first match wins, so an
//! item never lands in two sections. Predicates need not be mutually
//! exclusive: reordering categories changes the output.

mod labels;
mod matcher;

pub use labels::{is_ignored, normalize_label, DuplicateFilter, LabelExtractor};
pub use matcher::{CategoryMatcher, WILDCARD_LABEL};
pub(crate) use matcher::compile as compile_pattern;

use beacon_core::config::{Category, Configuration};
use beacon_core::error::ChangelogError;
use beacon_forge::PullRequestInfo;
use tracing::{debug, instrument};

use crate::types::{CategorizedChanges, Section};

/// Title of the bucket holding items no category matched
pub const UNCATEGORIZED: &str = "uncategorized";

/// Where an item was placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Index into the configured categories
    Category(usize),
    /// No category matched
    Uncategorized,
}

struct CompiledCategory {
    title: String,
    empty_content: Option<String>,
    matcher: CategoryMatcher,
}

/// Compiled classification rules for one run
pub struct Classifier {
    categories: Vec<CompiledCategory>,
    extractor: LabelExtractor,
    ignore_labels: Vec<String>,
    duplicate_filter: Option<DuplicateFilter>,
}

impl Classifier {
    /// Compile the predicates of `categories`
    pub fn new(categories: &[Category]) -> Result<Self, ChangelogError> {
        let categories = categories
            .iter()
            .map(|category| {
                Ok(CompiledCategory {
                    title: category.title.clone(),
                    empty_content: category.empty_content.clone(),
                    matcher: CategoryMatcher::new(category)?,
                })
            })
            .collect::<Result<Vec<_>, ChangelogError>>()?;

        Ok(Self {
            categories,
            extractor: LabelExtractor::default(),
            ignore_labels: Vec::new(),
            duplicate_filter: None,
        })
    }

    /// Compile categories, label extractors, ignore labels and the duplicate filter
    pub fn from_config(config: &Configuration) -> Result<Self, ChangelogError> {
        let mut classifier = Self::new(&config.categories)?;
        classifier.extractor = LabelExtractor::new(&config.label_extractor)?;
        classifier.ignore_labels = config.ignore_labels.clone();
        classifier.duplicate_filter = config
            .duplicate_filter
            .as_ref()
            .map(DuplicateFilter::new)
            .transpose()?;
        Ok(classifier)
    }

    /// Place one item
    pub fn classify(&self, pr: &PullRequestInfo) -> Classification {
        let labels = self.extractor.effective_labels(pr);
        self.classify_labeled(pr, &labels)
    }

    fn classify_labeled(&self, pr: &PullRequestInfo, labels: &[String]) -> Classification {
        self.categories
            .iter()
            .position(|category| category.matcher.matches(pr, labels))
            .map_or(Classification::Uncategorized, Classification::Category)
    }

    /// Display title of a classification
    pub fn title_for(&self, classification: Classification) -> &str {
        match classification {
            Classification::Category(index) => self
                .categories
                .get(index)
                .map_or(UNCATEGORIZED, |c| c.title.as_str()),
            Classification::Uncategorized => UNCATEGORIZED,
        }
    }

    /// Bucket merged items, preserving their order inside every bucket.
    ///
    /// Each item's labels are replaced by its effective labels (normalized
    /// plus extracted) so rendering shows what classification saw.
    #[instrument(skip_all, fields(items = items.len()))]
    pub fn categorize(&self, items: Vec<PullRequestInfo>) -> CategorizedChanges {
        let items = match &self.duplicate_filter {
            Some(filter) => filter.apply(items),
            None => items,
        };

        let mut changes = CategorizedChanges {
            sections: self
                .categories
                .iter()
                .map(|c| Section::new(c.title.clone()).with_empty_content(c.empty_content.clone()))
                .collect(),
            ..Default::default()
        };

        for mut item in items {
            let labels = self.extractor.effective_labels(&item);
            if is_ignored(&labels, &self.ignore_labels) {
                debug!(number = item.number, "item carries an ignore label");
                item.labels = labels;
                changes.ignored.push(item);
                continue;
            }

            let classification = self.classify_labeled(&item, &labels);
            item.labels = labels;
            match classification {
                Classification::Category(index) => changes.sections[index].add_item(item),
                Classification::Uncategorized => changes.uncategorized.push(item),
            }
        }

        debug!(
            categorized = changes.categorized_count(),
            uncategorized = changes.uncategorized.len(),
            ignored = changes.ignored.len(),
            "categorized items"
        );
        changes
    }
}

/// Classify a single item against `categories`
pub fn classify(
    item: &PullRequestInfo,
    categories: &[Category],
) -> Result<Classification, ChangelogError> {
    Ok(Classifier::new(categories)?.classify(item))
}
