//! Label normalization, extraction and duplicate collapsing

use std::collections::HashSet;

use beacon_core::config::{Extractor, PrProperty};
use beacon_core::error::ChangelogError;
use beacon_forge::PullRequestInfo;
use regex::Regex;
use tracing::debug;

use super::matcher::{compile, property_value};

/// Lower-case and trim a label for comparison
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

#[derive(Debug, Clone)]
struct CompiledExtractor {
    property: PrProperty,
    regex: Regex,
    target: String,
}

impl CompiledExtractor {
    fn new(extractor: &Extractor) -> Result<Self, ChangelogError> {
        Ok(Self {
            property: extractor.on_property,
            regex: compile(&extractor.pattern)?,
            target: extractor.target.clone(),
        })
    }

    /// Expanded target for every match in the property value
    fn values<'a>(&'a self, pr: &'a PullRequestInfo) -> impl Iterator<Item = String> + 'a {
        self.regex
            .captures_iter(property_value(pr, self.property))
            .map(move |caps| {
                let mut value = String::new();
                caps.expand(&self.target, &mut value);
                value
            })
    }
}

/// Derives additional labels from pull request text
#[derive(Debug, Clone, Default)]
pub struct LabelExtractor {
    extractors: Vec<CompiledExtractor>,
}

impl LabelExtractor {
    /// Compile the configured extractors
    pub fn new(extractors: &[Extractor]) -> Result<Self, ChangelogError> {
        let extractors = extractors
            .iter()
            .map(CompiledExtractor::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { extractors })
    }

    /// Normalized labels of `pr` followed by extracted ones, without duplicates
    pub fn effective_labels(&self, pr: &PullRequestInfo) -> Vec<String> {
        let mut seen = HashSet::new();
        let extracted = self
            .extractors
            .iter()
            .flat_map(|extractor| extractor.values(pr));

        pr.labels
            .iter()
            .cloned()
            .chain(extracted)
            .map(|label| normalize_label(&label))
            .filter(|label| !label.is_empty())
            .filter(|label| seen.insert(label.clone()))
            .collect()
    }
}

/// Collapses pull requests that resolve to the same key
#[derive(Debug, Clone)]
pub struct DuplicateFilter {
    extractor: CompiledExtractor,
}

impl DuplicateFilter {
    /// Compile the configured duplicate key extractor
    pub fn new(extractor: &Extractor) -> Result<Self, ChangelogError> {
        Ok(Self {
            extractor: CompiledExtractor::new(extractor)?,
        })
    }

    /// Keep the first item of every key; items without a key are always kept
    pub fn apply(&self, items: Vec<PullRequestInfo>) -> Vec<PullRequestInfo> {
        let mut seen = HashSet::new();
        items
            .into_iter()
            .filter(|pr| match self.extractor.values(pr).next() {
                Some(key) if !key.is_empty() => {
                    let first = seen.insert(key);
                    if !first {
                        debug!(number = pr.number, "dropping duplicate pull request");
                    }
                    first
                }
                _ => true,
            })
            .collect()
    }
}

/// Whether any of the normalized `labels` is listed in `ignore_labels`
pub fn is_ignored(labels: &[String], ignore_labels: &[String]) -> bool {
    ignore_labels
        .iter()
        .any(|ignored| labels.contains(&normalize_label(ignored)))
}
