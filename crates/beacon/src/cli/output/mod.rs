//! Output formatting utilities

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use console::{style, Style};

/// Print a success message
pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

/// Create a styled key-value line
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

/// Style for tags
pub fn tag_style() -> Style {
    Style::new().yellow()
}

/// Style for paths
pub fn path_style() -> Style {
    Style::new().cyan()
}

/// Appends step outputs to the file named by `GITHUB_OUTPUT`.
///
/// Multi-line values use the heredoc form `key<<DELIM`, with a delimiter
/// that does not occur in the value.
#[derive(Debug, Default)]
pub struct ActionOutputs {
    entries: Vec<(String, String)>,
}

impl ActionOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output
    pub fn set(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.entries.push((key.to_string(), value.to_string()));
        self
    }

    /// Render all entries in the file format
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            if value.contains('\n') {
                let delimiter = heredoc_delimiter(value);
                out.push_str(&format!("{}<<{}\n{}\n{}\n", key, delimiter, value, delimiter));
            } else {
                out.push_str(&format!("{}={}\n", key, value));
            }
        }
        out
    }

    /// Append to `path`
    pub fn append_to(&self, path: &Path) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(self.render().as_bytes())
    }
}

fn heredoc_delimiter(value: &str) -> String {
    let mut delimiter = "EOF".to_string();
    let mut n = 0;
    while value.lines().any(|line| line == delimiter) {
        n += 1;
        delimiter = format!("EOF_{}", n);
    }
    delimiter
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_single_line_values() {
        let mut outputs = ActionOutputs::new();
        outputs.set("failed", false).set("open_prs", 3);
        assert_eq!(outputs.render(), "failed=false\nopen_prs=3\n");
    }

    #[test]
    fn test_multi_line_value_uses_heredoc() {
        let mut outputs = ActionOutputs::new();
        outputs.set("changelog", "## Features\n\n- one");
        assert_eq!(outputs.render(), "changelog<<EOF\n## Features\n\n- one\nEOF\n");
    }

    #[test]
    fn test_delimiter_avoids_value_lines() {
        let mut outputs = ActionOutputs::new();
        outputs.set("changelog", "a\nEOF\nb");
        assert_eq!(outputs.render(), "changelog<<EOF_1\na\nEOF\nb\nEOF_1\n");
    }

    #[test]
    fn test_append_keeps_existing_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("output");
        std::fs::write(&path, "previous=1\n").unwrap();

        let mut outputs = ActionOutputs::new();
        outputs.set("repo", "hello");
        outputs.append_to(&path).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "previous=1\nrepo=hello\n"
        );
    }
}
