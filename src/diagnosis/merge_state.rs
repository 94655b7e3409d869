//! Merge state classification (pure)

use crate::diagnosis::report::Finding;
use crate::types::{MergeMetadata, MergeStateStatus, Mergeability};

/// Turn merge metadata into a conflict or behind-branch finding.
///
/// A conflict wins over a stale branch; a clean or unknown state yields
/// nothing.
pub fn classify_merge_state(merge: &MergeMetadata) -> Option<Finding> {
    let details_url = merge.url.clone().unwrap_or_default();
    let state = merge.merge_state();

    if merge.mergeability() == Mergeability::Conflicting || state == MergeStateStatus::Dirty {
        return Some(Finding::MergeConflict {
            details_url,
            merge: merge.clone(),
            note: "PR has merge conflicts and cannot be merged as-is.".to_string(),
        });
    }

    if state == MergeStateStatus::Behind {
        return Some(Finding::BehindBase {
            details_url,
            merge: merge.clone(),
            note: behind_note(merge),
        });
    }

    None
}

fn behind_note(merge: &MergeMetadata) -> String {
    let label = |name: Option<&str>| {
        name.filter(|n| !n.is_empty())
            .map(|n| format!(" '{n}'"))
            .unwrap_or_default()
    };
    format!(
        "PR branch{} is behind base{}; update the branch before re-running checks.",
        label(merge.head_ref_name.as_deref()),
        label(merge.base_ref_name.as_deref()),
    )
}
