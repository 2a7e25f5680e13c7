//! Release range resolution from repository tags

use beacon_core::config::{TagResolveMethod, TagResolver};
use beacon_core::error::ChangelogError;
use beacon_forge::TagInfo;
use semver::Version;
use tracing::{debug, instrument};

use crate::classifier::compile_pattern;

/// The two tags bounding a release
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseRange {
    /// Older tag; `None` when the release is the first one
    pub from: Option<TagInfo>,
    /// Newer tag
    pub to: TagInfo,
}

/// Parse the version carried by a tag, padding `1.2` to `1.2.0`
pub fn parse_version(tag: &TagInfo) -> Option<Version> {
    let version = tag.version.as_deref()?;
    Version::parse(version).ok().or_else(|| {
        let (core, rest) = match version.find(['-', '+']) {
            Some(pos) => version.split_at(pos),
            None => (version, ""),
        };
        match core.split('.').count() {
            2 => Version::parse(&format!("{}.0{}", core, rest)).ok(),
            _ => None,
        }
    })
}

/// Whether the tag names a pre-release version
pub fn is_pre_release(tag: &TagInfo) -> bool {
    parse_version(tag).is_some_and(|v| !v.pre.is_empty())
}

/// Filter and order tags newest first according to the resolver
#[instrument(skip(tags, resolver), fields(count = tags.len()))]
pub fn prepare_tags(
    tags: Vec<TagInfo>,
    resolver: &TagResolver,
    ignore_pre_releases: bool,
) -> Result<Vec<TagInfo>, ChangelogError> {
    let filter = resolver
        .filter
        .as_deref()
        .map(compile_pattern)
        .transpose()?;

    let tags = tags.into_iter().filter(|tag| {
        filter.as_ref().map_or(true, |re| re.is_match(&tag.name))
            && !(ignore_pre_releases && is_pre_release(tag))
    });

    let prepared: Vec<TagInfo> = match resolver.method {
        TagResolveMethod::Sort => tags.collect(),
        TagResolveMethod::Semver => {
            let mut versioned: Vec<(TagInfo, Version)> = tags
                .filter_map(|tag| {
                    let version = parse_version(&tag);
                    if version.is_none() {
                        debug!(tag = %tag.name, "skipping tag without semantic version");
                    }
                    version.map(|v| (tag, v))
                })
                .collect();
            versioned.sort_by(|a, b| b.1.cmp(&a.1));
            versioned.into_iter().map(|(tag, _)| tag).collect()
        }
    };

    debug!(kept = prepared.len(), "prepared tags");
    Ok(prepared)
}

/// Resolve the release range from prepared (newest first) tags.
///
/// An explicit tag missing from `tags` is used as a plain ref. Without an
/// explicit end the newest tag is used; without an explicit start, the tag
/// following the end in `tags`.
pub fn resolve_range(
    tags: &[TagInfo],
    from_tag: Option<&str>,
    to_tag: Option<&str>,
) -> Result<ReleaseRange, ChangelogError> {
    let to = match to_tag {
        Some(name) => find_or_ref(tags, name),
        None => tags
            .first()
            .cloned()
            .ok_or_else(|| ChangelogError::NoTags("repository has no matching tags".to_string()))?,
    };

    let from = match from_tag {
        Some(name) => Some(find_or_ref(tags, name)),
        None => tags
            .iter()
            .position(|t| t.name == to.name)
            .and_then(|index| tags.get(index + 1))
            .cloned(),
    };

    debug!(from = ?from.as_ref().map(|t| &t.name), to = %to.name, "resolved release range");
    Ok(ReleaseRange { from, to })
}

fn find_or_ref(tags: &[TagInfo], name: &str) -> TagInfo {
    tags.iter()
        .find(|t| t.name == name)
        .cloned()
        .unwrap_or_else(|| {
            debug!(tag = name, "tag not in fetched list, using it as a ref");
            TagInfo::new(name, name)
        })
}
