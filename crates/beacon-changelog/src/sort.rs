//! Pull request ordering

use std::cmp::Ordering;

use beacon_core::config::{SortConfig, SortOrder, SortProperty};
use beacon_forge::PullRequestInfo;

/// Stable sort of `items` by the configured property and direction.
///
/// Open pull requests sort by creation time when ordering by merge time.
pub fn sort_pull_requests(items: &mut [PullRequestInfo], sort: &SortConfig) {
    items.sort_by(|a, b| {
        let ordering = compare(a, b, sort.on_property);
        match sort.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare(a: &PullRequestInfo, b: &PullRequestInfo, property: SortProperty) -> Ordering {
    match property {
        SortProperty::MergedAt => a.sort_timestamp().cmp(&b.sort_timestamp()),
        SortProperty::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortProperty::Number => a.number.cmp(&b.number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::merged_pr;

    fn shuffled() -> Vec<PullRequestInfo> {
        vec![
            merged_pr(3, "charlie", 7, &[]),
            merged_pr(1, "Alpha", 9, &[]),
            merged_pr(2, "bravo", 4, &[]),
        ]
    }

    fn numbers(items: &[PullRequestInfo]) -> Vec<u64> {
        items.iter().map(|p| p.number).collect()
    }

    #[test]
    fn test_sort_by_merge_time_ascending() {
        let mut items = shuffled();
        sort_pull_requests(&mut items, &SortConfig::default());
        assert!(items.windows(2).all(|w| w[0].merged_at <= w[1].merged_at));
        assert_eq!(numbers(&items), vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_by_merge_time_descending_is_reverse() {
        let mut ascending = shuffled();
        sort_pull_requests(&mut ascending, &SortConfig::default());

        let mut descending = shuffled();
        sort_pull_requests(
            &mut descending,
            &SortConfig {
                order: SortOrder::Desc,
                on_property: SortProperty::MergedAt,
            },
        );

        ascending.reverse();
        assert_eq!(numbers(&descending), numbers(&ascending));
    }

    #[test]
    fn test_sort_by_title_ignores_case() {
        let mut items = shuffled();
        sort_pull_requests(
            &mut items,
            &SortConfig {
                order: SortOrder::Asc,
                on_property: SortProperty::Title,
            },
        );
        assert_eq!(numbers(&items), vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let mut items = vec![
            merged_pr(5, "x", 3, &[]),
            merged_pr(4, "y", 3, &[]),
            merged_pr(6, "z", 1, &[]),
        ];
        sort_pull_requests(&mut items, &SortConfig::default());
        assert_eq!(numbers(&items), vec![6, 5, 4]);
    }

    #[test]
    fn test_open_items_sort_by_creation() {
        let mut items = vec![
            merged_pr(1, "open", 8, &[]).into_open(),
            merged_pr(2, "merged", 5, &[]),
        ];
        sort_pull_requests(&mut items, &SortConfig::default());
        assert_eq!(numbers(&items), vec![2, 1]);
    }
}
