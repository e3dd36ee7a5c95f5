//! Merging per-task results.

use std::collections::HashSet;

use crate::error::SieveResult;

/// Concatenate task results in task order, keeping each path's first
/// occurrence. The first failure by task order wins over any results.
pub(crate) fn compose<I>(results: I) -> SieveResult<Vec<String>>
where
    I: IntoIterator<Item = SieveResult<Vec<String>>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for result in results {
        for path in result? {
            if seen.insert(path.clone()) {
                merged.push(path);
            }
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SieveError;
    use sieve_glob::WalkerError;

    fn ok(paths: &[&str]) -> SieveResult<Vec<String>> {
        Ok(paths.iter().map(|p| p.to_string()).collect())
    }

    fn failed(index: usize) -> SieveResult<Vec<String>> {
        Err(SieveError::Matcher {
            index,
            pattern: format!("task{index}"),
            source: WalkerError::Io("boom".into()),
        })
    }

    #[test]
    fn first_occurrence_wins() {
        let merged = compose([ok(&["a.tmp"]), ok(&["a.tmp", "b.tmp"]), ok(&["b.tmp", "c.tmp"])]);
        assert_eq!(merged.unwrap(), vec!["a.tmp", "b.tmp", "c.tmp"]);
    }

    #[test]
    fn first_failure_by_task_order() {
        let err = compose([ok(&["a.tmp"]), failed(1), failed(2)]).unwrap_err();
        assert_eq!(err.task_index(), Some(1));
    }

    #[test]
    fn nothing_to_compose() {
        assert!(compose(Vec::new()).unwrap().is_empty());
    }
}
