//! `#{{NAME}}` placeholder substitution

use std::collections::BTreeMap;

const OPEN: &str = "#{{";
const CLOSE: &str = "}}";

/// Named values available to a template
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placeholders {
    values: BTreeMap<String, String>,
}

impl Placeholders {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Value of a placeholder
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Replace every known `#{{NAME}}` token in one left-to-right pass.
///
/// Unknown tokens are copied verbatim. Substituted values are never scanned
/// again, so a title containing `#{{BODY}}` renders literally.
pub fn fill_template(template: &str, placeholders: &Placeholders) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        output.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];

        match after.find(CLOSE).filter(|&end| is_name(&after[..end])) {
            Some(end) => {
                let name = &after[..end];
                match placeholders.get(name) {
                    Some(value) => output.push_str(value),
                    None => output.push_str(&rest[start..start + OPEN.len() + end + CLOSE.len()]),
                }
                rest = &after[end + CLOSE.len()..];
            }
            None => {
                output.push_str(OPEN);
                rest = after;
            }
        }
    }

    output.push_str(rest);
    output
}

fn is_name(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
