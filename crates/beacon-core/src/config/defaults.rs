//! Default configuration values

use super::types::Configuration;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "beacon.json";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".beacon.json";

/// Default top-level template
pub const DEFAULT_TEMPLATE: &str = "#{{CHANGELOG}}#{{UNCATEGORIZED_SECTION}}";

/// Default uncategorized block, rendered into `UNCATEGORIZED_SECTION` only
/// when at least one item is uncategorized
pub const DEFAULT_UNCATEGORIZED_TEMPLATE: &str =
    "\n\n<details>\n<summary>Uncategorized</summary>\n\n#{{UNCATEGORIZED}}\n</details>";

/// Default item template
pub const DEFAULT_PR_TEMPLATE: &str = "- #{{TITLE}}\n   - PR: ##{{NUMBER}}";

/// Default category header
pub const DEFAULT_CATEGORY_TEMPLATE: &str = "## #{{CATEGORY}}";

/// Default changelog text when nothing was categorized
pub const DEFAULT_EMPTY_TEMPLATE: &str = "- no changes";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![ALT_CONFIG_FILE, DEFAULT_CONFIG_FILE]
}

/// Generate default configuration JSON
pub fn default_config_json() -> String {
    serde_json::to_string_pretty(&Configuration::default()).unwrap_or_else(|_| "{}".to_string())
}
