//! Configuration validation

use regex::Regex;
use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Configuration;

/// Upper bound on `max_back_track_time_days` (a century)
pub const MAX_BACK_TRACK_DAYS: i64 = 36_500;

/// Upper bound on the pull request and tag fetch limits
pub const MAX_FETCH_LIMIT: usize = 100_000;

/// Validate configuration
pub fn validate_config(config: &Configuration) -> Result<()> {
    debug!("validating configuration");
    validate_limits(config)?;
    validate_categories(config)?;
    validate_patterns(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_limits(config: &Configuration) -> Result<()> {
    if config.max_pull_requests == 0 {
        return Err(ConfigError::InvalidValue {
            field: "max_pull_requests".to_string(),
            message: "must be greater than zero".to_string(),
        }
        .into());
    }

    if config.max_tags_to_fetch == 0 {
        return Err(ConfigError::InvalidValue {
            field: "max_tags_to_fetch".to_string(),
            message: "must be greater than zero".to_string(),
        }
        .into());
    }

    if config.max_back_track_time_days < 0 {
        return Err(ConfigError::InvalidValue {
            field: "max_back_track_time_days".to_string(),
            message: "cannot be negative".to_string(),
        }
        .into());
    }

    if config.max_back_track_time_days > MAX_BACK_TRACK_DAYS {
        return Err(ConfigError::InvalidValue {
            field: "max_back_track_time_days".to_string(),
            message: format!("must be at most {}", MAX_BACK_TRACK_DAYS),
        }
        .into());
    }

    for (field, value) in [
        ("max_pull_requests", config.max_pull_requests),
        ("max_tags_to_fetch", config.max_tags_to_fetch),
    ] {
        if value > MAX_FETCH_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: format!("must be at most {}", MAX_FETCH_LIMIT),
            }
            .into());
        }
    }

    Ok(())
}

fn validate_categories(config: &Configuration) -> Result<()> {
    for (i, category) in config.categories.iter().enumerate() {
        if category.title.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("categories[{}].title", i),
                message: "category title cannot be empty".to_string(),
            }
            .into());
        }
    }

    Ok(())
}

fn validate_patterns(config: &Configuration) -> Result<()> {
    for (i, category) in config.categories.iter().enumerate() {
        for (j, rule) in category.rules.iter().enumerate() {
            check_regex(&format!("categories[{}].rules[{}].pattern", i, j), &rule.pattern)?;
        }
    }

    for (i, extractor) in config.label_extractor.iter().enumerate() {
        check_regex(&format!("label_extractor[{}].pattern", i), &extractor.pattern)?;
    }

    for (i, transformer) in config.transformers.iter().enumerate() {
        check_regex(&format!("transformers[{}].pattern", i), &transformer.pattern)?;
    }

    for (i, placeholder) in config.custom_placeholders.iter().enumerate() {
        check_regex(
            &format!("custom_placeholders[{}].transformer.pattern", i),
            &placeholder.transformer.pattern,
        )?;
    }

    if let Some(filter) = &config.duplicate_filter {
        check_regex("duplicate_filter.pattern", &filter.pattern)?;
    }

    if let Some(filter) = &config.tag_resolver.filter {
        check_regex("tag_resolver.filter", filter)?;
    }

    Ok(())
}

fn check_regex(field: &str, pattern: &str) -> Result<()> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        message: format!("invalid regular expression: {}", e),
    })?;
    Ok(())
}
