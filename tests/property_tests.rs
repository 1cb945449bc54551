//! Property-based tests for the priority resolver invariants.

use std::path::PathBuf;

use baktidy::dedupe::{resolve, DuplicateGroup, PriorityList};
use proptest::prelude::*;

/// Folder names drawn from a small pool so groups regularly hit both
/// ranked and unranked members.
fn folder_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "alpha".to_string(),
        "beta".to_string(),
        "gamma".to_string(),
        "delta".to_string(),
        "omega".to_string(),
    ])
}

fn group_strategy() -> impl Strategy<Value = DuplicateGroup> {
    prop::collection::vec((folder_name(), 0u32..100), 2..8).prop_map(|members| {
        DuplicateGroup::new(
            members
                .into_iter()
                .map(|(folder, n)| PathBuf::from(format!("/data/{folder}/file{n}.bin")))
                .collect(),
        )
    })
}

fn priority_strategy() -> impl Strategy<Value = PriorityList> {
    prop::collection::vec(folder_name(), 0..4).prop_map(PriorityList::from_idents)
}

proptest! {
    #[test]
    fn kept_plus_deleted_equals_group_size(
        group in group_strategy(),
        priorities in priority_strategy(),
    ) {
        if let Some(decision) = resolve(&group, &priorities) {
            prop_assert_eq!(1 + decision.delete.len(), group.len());
            prop_assert!(!decision.delete.contains(&decision.keep));
            prop_assert!(group.paths.contains(&decision.keep));
        }
    }

    #[test]
    fn decision_exists_iff_some_member_is_ranked(
        group in group_strategy(),
        priorities in priority_strategy(),
    ) {
        let any_ranked = group.paths.iter().any(|p| priorities.rank(p).is_some());
        prop_assert_eq!(resolve(&group, &priorities).is_some(), any_ranked);
    }

    #[test]
    fn kept_file_has_minimal_rank(
        group in group_strategy(),
        priorities in priority_strategy(),
    ) {
        if let Some(decision) = resolve(&group, &priorities) {
            let min_rank = group
                .paths
                .iter()
                .filter_map(|p| priorities.rank(p))
                .min()
                .unwrap();
            prop_assert_eq!(decision.keep_rank, min_rank);
            prop_assert_eq!(priorities.rank(&decision.keep), Some(min_rank));
        }
    }

    #[test]
    fn tie_break_keeps_earliest_group_member(
        group in group_strategy(),
        priorities in priority_strategy(),
    ) {
        if let Some(decision) = resolve(&group, &priorities) {
            let first_at_min = group
                .paths
                .iter()
                .find(|p| priorities.rank(p) == Some(decision.keep_rank))
                .unwrap();
            prop_assert_eq!(&decision.keep, first_at_min);
        }
    }

    #[test]
    fn resolve_is_deterministic(
        group in group_strategy(),
        priorities in priority_strategy(),
    ) {
        prop_assert_eq!(resolve(&group, &priorities), resolve(&group, &priorities));
    }

    #[test]
    fn delete_list_preserves_report_order(
        group in group_strategy(),
        priorities in priority_strategy(),
    ) {
        if let Some(decision) = resolve(&group, &priorities) {
            // The keep path can occur more than once in a group; only its
            // first occurrence is the survivor, so the expected delete list
            // is the group minus exactly one keep instance.
            let mut expected = Vec::new();
            let mut removed = false;
            for path in &group.paths {
                if !removed && *path == decision.keep {
                    removed = true;
                    continue;
                }
                expected.push(path.clone());
            }
            prop_assert_eq!(decision.delete, expected);
        }
    }
}
