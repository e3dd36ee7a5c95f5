//! Per-task exclusion lists.

use std::collections::HashSet;

use crate::expand::Positioned;

/// Build the exclusion list for the task planned from `own`.
///
/// Order: caller ignores, then negatives listed after the task's pattern,
/// then the paths of discovered ignore files. Duplicates keep their first
/// position. Nothing passed in is modified.
///
/// Caller ignores pass through untouched, so a leading `!` there still
/// re-includes. A `!` left on a negative pattern after classification is
/// part of the name and gets escaped.
pub(crate) fn exclusions_for(
    own: &Positioned,
    patterns: &[Positioned],
    caller_ignore: &[String],
    ignore_files: &[String],
) -> Vec<String> {
    let later_negatives = patterns
        .iter()
        .filter(|p| p.pattern.is_negative() && p.position > own.position)
        .map(|p| &p.pattern.value)
        .filter(|value| **value != own.pattern.value)
        .map(|value| {
            if value.starts_with('!') {
                format!("\\{value}")
            } else {
                value.clone()
            }
        });

    let mut seen = HashSet::new();
    caller_ignore
        .iter()
        .cloned()
        .chain(later_negatives)
        .chain(ignore_files.iter().cloned())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
