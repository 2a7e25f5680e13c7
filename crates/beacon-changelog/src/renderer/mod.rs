//! Release notes rendering
//!
//! Item lines are rendered from `pr_template`, grouped under a
//! `category_template` header per section, and the result is substituted
//! into the top-level `template`.

mod template;

pub use template::{fill_template, Placeholders};

use beacon_core::config::Configuration;
use beacon_core::error::ChangelogError;
use beacon_forge::PullRequestInfo;
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use tracing::{debug, instrument};

use crate::classifier::compile_pattern;
use crate::types::{CategorizedChanges, ReleaseStats, Section};

#[derive(Debug, Clone)]
struct CompiledCustomPlaceholder {
    name: String,
    source: String,
    regex: Regex,
    target: String,
}

/// Renders categorized changes with the configured templates
#[derive(Debug, Clone)]
pub struct Renderer {
    template: String,
    pr_template: String,
    open_template: String,
    uncategorized_template: String,
    category_template: String,
    empty_template: String,
    separator: String,
    trim_values: bool,
    transformers: Vec<(Regex, String)>,
    custom_placeholders: Vec<CompiledCustomPlaceholder>,
}

impl Renderer {
    /// Compile transformers and custom placeholders from the configuration
    pub fn new(config: &Configuration) -> Result<Self, ChangelogError> {
        let transformers = config
            .transformers
            .iter()
            .map(|t| Ok((compile_pattern(&t.pattern)?, t.target.clone())))
            .collect::<Result<Vec<_>, ChangelogError>>()?;

        let custom_placeholders = config
            .custom_placeholders
            .iter()
            .map(|p| {
                Ok(CompiledCustomPlaceholder {
                    name: p.name.clone(),
                    source: p.source.clone(),
                    regex: compile_pattern(&p.transformer.pattern)?,
                    target: p.transformer.target.clone(),
                })
            })
            .collect::<Result<Vec<_>, ChangelogError>>()?;

        Ok(Self {
            template: config.template.clone(),
            pr_template: config.pr_template.clone(),
            open_template: config.open_item_template().to_string(),
            uncategorized_template: config.uncategorized_template.clone(),
            category_template: config.category_template.clone(),
            empty_template: config.empty_template.clone(),
            separator: config.item_separator.clone(),
            trim_values: config.trim_values,
            transformers,
            custom_placeholders,
        })
    }

    /// Render the full release notes
    #[instrument(skip_all, fields(sections = changes.sections.len()))]
    pub fn render(&self, changes: &CategorizedChanges, stats: &ReleaseStats) -> String {
        let mut placeholders = release_placeholders(changes, stats);

        let changelog = self.render_sections(&changes.sections);
        let changelog = if changelog.is_empty() {
            debug!("no section rendered, using the empty template");
            self.empty_template.clone()
        } else {
            changelog
        };
        placeholders.insert("CHANGELOG", changelog);

        let uncategorized = self.render_items(&self.pr_template, &changes.uncategorized);
        let uncategorized_section = if changes.uncategorized.is_empty() {
            String::new()
        } else {
            fill_template(
                &self.uncategorized_template,
                &placeholders.clone().with("UNCATEGORIZED", uncategorized.as_str()),
            )
        };
        placeholders.insert("UNCATEGORIZED", uncategorized);
        placeholders.insert("UNCATEGORIZED_SECTION", uncategorized_section);
        placeholders.insert("OPEN", self.render_items(&self.open_template, &changes.open));
        placeholders.insert("IGNORED", self.render_items(&self.pr_template, &changes.ignored));
        self.apply_custom_placeholders(&mut placeholders);

        render(&self.template, &placeholders)
    }

    /// Render every non-empty section (or its `empty_content`), blank-line separated
    pub fn render_sections(&self, sections: &[Section]) -> String {
        sections
            .iter()
            .filter_map(|section| self.render_section(section))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn render_section(&self, section: &Section) -> Option<String> {
        let body = if section.is_empty() {
            section.empty_content.clone()?
        } else {
            self.render_items(&self.pr_template, &section.items)
        };

        let header = fill_template(
            &self.category_template,
            &Placeholders::new()
                .with("CATEGORY", section.title.as_str())
                .with("CATEGORY_COUNT", section.items.len().to_string()),
        );
        Some(format!("{}\n\n{}", header, body))
    }

    /// Expand `template` once per item, joined by the configured separator
    pub fn render_items(&self, template: &str, items: &[PullRequestInfo]) -> String {
        items
            .iter()
            .map(|item| self.render_item(template, item))
            .collect::<Vec<_>>()
            .join(&self.separator)
    }

    /// Expand `template` for one item and apply the transformers in order
    pub fn render_item(&self, template: &str, item: &PullRequestInfo) -> String {
        let mut placeholders = item_placeholders(item, self.trim_values);
        self.apply_custom_placeholders(&mut placeholders);

        let line = fill_template(template, &placeholders);
        self.transformers
            .iter()
            .fold(line, |line, (regex, target)| {
                regex.replace_all(&line, target.as_str()).into_owned()
            })
    }

    fn apply_custom_placeholders(&self, placeholders: &mut Placeholders) {
        for custom in &self.custom_placeholders {
            if let Some(source) = placeholders.get(&custom.source) {
                let value = custom
                    .regex
                    .replace_all(source, custom.target.as_str())
                    .into_owned();
                placeholders.insert(custom.name.clone(), value);
            }
        }
    }
}

/// Substitute top-level `placeholders` into `template`
pub fn render(template: &str, placeholders: &Placeholders) -> String {
    fill_template(template, placeholders)
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

/// Placeholders describing one pull request
pub fn item_placeholders(item: &PullRequestInfo, trim_values: bool) -> Placeholders {
    let text = |value: &str| {
        if trim_values {
            value.trim().to_string()
        } else {
            value.to_string()
        }
    };

    Placeholders::new()
        .with("NUMBER", item.number.to_string())
        .with("TITLE", text(&item.title))
        .with("URL", item.html_url.as_str())
        .with("MERGED_AT", format_date(item.merged_at))
        .with("CREATED_AT", format_date(Some(item.created_at)))
        .with("MERGE_SHA", item.merge_commit_sha.clone().unwrap_or_default())
        .with("AUTHOR", item.author.as_str())
        .with("LABELS", item.labels.join(", "))
        .with("MILESTONE", text(item.milestone.as_deref().unwrap_or("")))
        .with("BODY", text(&item.body))
        .with("BRANCH", item.head_branch.as_str())
        .with("BASE_BRANCH", item.base_branch.as_str())
        .with("REPO_NAME", item.repo_name.as_str())
}

/// Placeholders describing the release range and bucket sizes
pub fn release_placeholders(changes: &CategorizedChanges, stats: &ReleaseStats) -> Placeholders {
    Placeholders::new()
        .with("OWNER", stats.owner.as_str())
        .with("REPO", stats.repo.as_str())
        .with("FROM_TAG", stats.from_tag.clone().unwrap_or_default())
        .with("TO_TAG", stats.to_tag.clone().unwrap_or_default())
        .with("FROM_TAG_DATE", format_date(stats.from_date))
        .with("TO_TAG_DATE", format_date(stats.to_date))
        .with(
            "DAYS_SINCE",
            stats.days_since().map(|d| d.to_string()).unwrap_or_default(),
        )
        .with("CHANGED_FILES", stats.changed_files.to_string())
        .with("ADDITIONS", stats.additions.to_string())
        .with("DELETIONS", stats.deletions.to_string())
        .with("COMMITS", stats.commits.to_string())
        .with("CATEGORIZED_COUNT", changes.categorized_count().to_string())
        .with("UNCATEGORIZED_COUNT", changes.uncategorized.len().to_string())
        .with("OPEN_COUNT", changes.open.len().to_string())
        .with("IGNORED_COUNT", changes.ignored.len().to_string())
        .with("RELEASE_DIFF", stats.compare_url.clone().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{day, merged_pr};
    use beacon_core::config::{CustomPlaceholder, Transformer};

    fn config() -> Configuration {
        Configuration {
            template: "#{{CHANGELOG}}".to_string(),
            pr_template: "- #{{TITLE}} (##{{NUMBER}})".to_string(),
            ..Default::default()
        }
    }

    fn section(title: &str, items: Vec<PullRequestInfo>) -> Section {
        let mut section = Section::new(title);
        for item in items {
            section.add_item(item);
        }
        section
    }

    fn stats() -> ReleaseStats {
        ReleaseStats {
            owner: "octo".to_string(),
            repo: "hello".to_string(),
            from_tag: Some("v1.0.0".to_string()),
            to_tag: Some("v1.1.0".to_string()),
            from_date: Some(day(1)),
            to_date: Some(day(8)),
            commits: 12,
            compare_url: Some("https://github.com/octo/hello/compare/v1.0.0...v1.1.0".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_sections_in_order() {
        let renderer = Renderer::new(&config()).unwrap();
        let changes = CategorizedChanges {
            sections: vec![
                section("Features", vec![merged_pr(1, "Add a", 2, &[]), merged_pr(3, "Add b", 4, &[])]),
                section("Fixes", vec![merged_pr(2, "Fix c", 3, &[])]),
            ],
            ..Default::default()
        };

        assert_eq!(
            renderer.render(&changes, &stats()),
            "## Features\n\n- Add a (#1)\n- Add b (#3)\n\n## Fixes\n\n- Fix c (#2)"
        );
    }

    #[test]
    fn test_empty_category_omitted() {
        let renderer = Renderer::new(&config()).unwrap();
        let changes = CategorizedChanges {
            sections: vec![
                section("Features", vec![merged_pr(1, "Add a", 2, &[])]),
                section("Fixes", vec![]),
            ],
            ..Default::default()
        };

        let output = renderer.render(&changes, &stats());
        assert!(!output.contains("Fixes"));
    }

    #[test]
    fn test_empty_category_with_empty_content() {
        let renderer = Renderer::new(&config()).unwrap();
        let changes = CategorizedChanges {
            sections: vec![
                section("Features", vec![merged_pr(1, "Add a", 2, &[])]),
                section("Fixes", vec![]).with_empty_content(Some("- nothing fixed".to_string())),
            ],
            ..Default::default()
        };

        let output = renderer.render(&changes, &stats());
        assert!(output.ends_with("## Fixes\n\n- nothing fixed"));
    }

    #[test]
    fn test_empty_template_when_nothing_renders() {
        let renderer = Renderer::new(&config()).unwrap();
        let changes = CategorizedChanges {
            sections: vec![section("Features", vec![])],
            ..Default::default()
        };
        assert_eq!(renderer.render(&changes, &stats()), "- no changes");
    }

    #[test]
    fn test_default_template_renders_uncategorized() {
        let renderer = Renderer::new(&Configuration::default()).unwrap();
        let changes = CategorizedChanges {
            sections: vec![section("🚀 Features", vec![merged_pr(1, "Add a", 2, &[])])],
            uncategorized: vec![merged_pr(2, "Chore", 3, &[])],
            ..Default::default()
        };

        let output = renderer.render(&changes, &stats());
        assert!(output.starts_with("## 🚀 Features\n\n- Add a\n   - PR: #1"));
        assert!(output.contains("<summary>Uncategorized</summary>\n\n- Chore\n   - PR: #2\n</details>"));
    }

    #[test]
    fn test_default_template_omits_empty_uncategorized() {
        let renderer = Renderer::new(&Configuration::default()).unwrap();
        let changes = CategorizedChanges {
            sections: vec![section("🚀 Features", vec![merged_pr(4, "Add widgets", 2, &[])])],
            ..Default::default()
        };

        let output = renderer.render(&changes, &stats());
        assert_eq!(output, "## 🚀 Features\n\n- Add widgets\n   - PR: #4");
        assert!(!output.contains("Uncategorized"));
    }

    #[test]
    fn test_uncategorized_block_sees_counts() {
        let renderer = Renderer::new(&Configuration {
            template: "#{{CHANGELOG}}#{{UNCATEGORIZED_SECTION}}".to_string(),
            uncategorized_template: "\nOther (#{{UNCATEGORIZED_COUNT}}):\n#{{UNCATEGORIZED}}".to_string(),
            ..config()
        })
        .unwrap();
        let changes = CategorizedChanges {
            sections: vec![section("Features", vec![merged_pr(1, "Add a", 2, &[])])],
            uncategorized: vec![merged_pr(2, "Chore", 3, &[])],
            ..Default::default()
        };

        assert_eq!(
            renderer.render(&changes, &stats()),
            "## Features\n\n- Add a (#1)\nOther (1):\n- Chore (#2)"
        );
    }

    #[test]
    fn test_release_placeholders() {
        let renderer = Renderer::new(&Configuration {
            template: "#{{OWNER}}/#{{REPO}} #{{FROM_TAG}}..#{{TO_TAG}} in #{{DAYS_SINCE}} days, \
                       #{{COMMITS}} commits, #{{CATEGORIZED_COUNT}}+#{{UNCATEGORIZED_COUNT}} PRs, \
                       #{{RELEASE_DIFF}} #{{TO_TAG_DATE}}"
                .to_string(),
            ..config()
        })
        .unwrap();
        let changes = CategorizedChanges {
            sections: vec![section("Features", vec![merged_pr(1, "a", 2, &[])])],
            uncategorized: vec![merged_pr(2, "b", 3, &[]), merged_pr(3, "c", 4, &[])],
            ..Default::default()
        };

        assert_eq!(
            renderer.render(&changes, &stats()),
            "octo/hello v1.0.0..v1.1.0 in 7 days, 12 commits, 1+2 PRs, \
             https://github.com/octo/hello/compare/v1.0.0...v1.1.0 2024-01-08T12:00:00Z"
        );
    }

    #[test]
    fn test_unknown_top_level_token_survives() {
        let renderer = Renderer::new(&Configuration {
            template: "#{{CHANGELOG}}\n#{{CONTRIBUTORS}}".to_string(),
            ..config()
        })
        .unwrap();
        let changes = CategorizedChanges {
            sections: vec![section("Features", vec![merged_pr(1, "a", 2, &[])])],
            ..Default::default()
        };
        assert!(renderer.render(&changes, &stats()).ends_with("\n#{{CONTRIBUTORS}}"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let renderer = Renderer::new(&Configuration::default()).unwrap();
        let changes = CategorizedChanges {
            sections: vec![section("Features", vec![merged_pr(1, "a", 2, &["feature"])])],
            uncategorized: vec![merged_pr(2, "b", 3, &[])],
            open: vec![merged_pr(3, "c", 4, &[]).into_open()],
            ..Default::default()
        };
        assert_eq!(
            renderer.render(&changes, &stats()),
            renderer.render(&changes, &stats())
        );
    }

    #[test]
    fn test_item_placeholders() {
        let item = merged_pr(7, "Fix crash", 3, &["bug", "ui"])
            .with_body("Details")
            .with_url("https://example.com/7");
        let line = Renderer::new(&config()).unwrap().render_item(
            "#{{NUMBER}}|#{{URL}}|#{{AUTHOR}}|#{{LABELS}}|#{{BRANCH}}|#{{BASE_BRANCH}}|#{{MERGED_AT}}|#{{BODY}}",
            &item,
        );
        assert_eq!(
            line,
            "7|https://example.com/7|octocat|bug, ui|topic-7|main|2024-01-03T12:00:00Z|Details"
        );
    }

    #[test]
    fn test_separator_and_trim_values() {
        let renderer = Renderer::new(&Configuration {
            item_separator: " | ".to_string(),
            pr_template: "#{{TITLE}}".to_string(),
            trim_values: true,
            ..config()
        })
        .unwrap();
        let items = vec![merged_pr(1, "  spaced  ", 2, &[]), merged_pr(2, "b", 3, &[])];
        assert_eq!(renderer.render_items("#{{TITLE}}", &items), "spaced | b");
    }

    #[test]
    fn test_transformers_apply_in_order() {
        let renderer = Renderer::new(&Configuration {
            transformers: vec![
                Transformer {
                    pattern: r"^- (feat|fix): ".to_string(),
                    target: "- ".to_string(),
                },
                Transformer {
                    pattern: r"\(#(\d+)\)".to_string(),
                    target: "[#$1]".to_string(),
                },
            ],
            ..config()
        })
        .unwrap();
        let line = renderer.render_item("- #{{TITLE}} (##{{NUMBER}})", &merged_pr(9, "feat: widgets", 2, &[]));
        assert_eq!(line, "- widgets [#9]");
    }

    #[test]
    fn test_custom_placeholder_from_item_value() {
        let renderer = Renderer::new(&Configuration {
            custom_placeholders: vec![CustomPlaceholder {
                name: "TICKET".to_string(),
                source: "BODY".to_string(),
                transformer: Transformer {
                    pattern: r"(?s).*(JIRA-\d+).*".to_string(),
                    target: "$1".to_string(),
                },
            }],
            ..config()
        })
        .unwrap();
        let item = merged_pr(1, "t", 2, &[]).with_body("Fixes JIRA-42 in the parser");
        assert_eq!(renderer.render_item("#{{TITLE}} #{{TICKET}}", &item), "t JIRA-42");
    }

    #[test]
    fn test_invalid_transformer_pattern() {
        let result = Renderer::new(&Configuration {
            transformers: vec![Transformer {
                pattern: "(".to_string(),
                target: String::new(),
            }],
            ..config()
        });
        assert!(matches!(result, Err(ChangelogError::InvalidPattern { .. })));
    }
}
