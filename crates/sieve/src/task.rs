//! Planned matcher invocations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::discover::VcsIgnore;
use crate::expand::Positioned;
use crate::ignore::exclusions_for;
use crate::options::FindOptions;

/// Everything the matcher needs besides the pattern.
#[derive(Debug, Clone)]
pub struct MatchOptions {
    /// Absolute directory the pattern is resolved against.
    pub cwd: PathBuf,
    /// Exclusion globs, de-duplicated, in precedence order.
    pub ignore: Vec<String>,
    pub only_files: bool,
    pub dot: bool,
    /// Deepest directory level listed below the walk start.
    pub max_depth: Option<usize>,
    pub follow_symlinks: bool,
    pub case_sensitive: bool,
    pub suppress_errors: bool,
    /// Gitignore rules shared by every task of one call.
    pub vcs: Option<Arc<VcsIgnore>>,
}

/// One positive pattern and the options to match it with.
#[derive(Debug, Clone)]
pub struct Task {
    pattern: String,
    position: usize,
    options: MatchOptions,
}

impl Task {
    /// The positive glob to match.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Index in the caller's pattern list this task came from.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Shorthand for `options().ignore`.
    pub fn ignore(&self) -> &[String] {
        &self.options.ignore
    }
}

/// One task per positive pattern, in list order.
pub(crate) fn build_tasks(
    patterns: &[Positioned],
    options: &FindOptions,
    cwd: &Path,
    vcs: Option<Arc<VcsIgnore>>,
) -> Vec<Task> {
    let ignore_files = vcs.as_deref().map(VcsIgnore::files).unwrap_or_default();

    patterns
        .iter()
        .filter(|p| !p.pattern.is_negative() && !p.pattern.value.is_empty())
        .map(|own| Task {
            pattern: own.pattern.value.clone(),
            position: own.position,
            options: MatchOptions {
                cwd: cwd.to_path_buf(),
                ignore: exclusions_for(own, patterns, &options.ignore, ignore_files),
                only_files: options.only_files,
                dot: options.dot,
                // `deep: n` reads n directory levels, the start included.
                max_depth: options.deep.map(|deep| deep.saturating_sub(1)),
                follow_symlinks: options.follow_symbolic_links,
                case_sensitive: options.case_sensitive_match,
                suppress_errors: options.suppress_errors,
                vcs: vcs.clone(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::classify;

    fn positioned(patterns: &[&str]) -> Vec<Positioned> {
        patterns
            .iter()
            .enumerate()
            .map(|(position, p)| Positioned {
                position,
                pattern: classify(p),
            })
            .collect()
    }

    #[test]
    fn one_task_per_positive_pattern() {
        let options = FindOptions::default().with_ignore(["c.tmp"]);
        let tasks = build_tasks(
            &positioned(&["*.tmp", "!b.tmp"]),
            &options,
            Path::new("/w"),
            None,
        );
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].pattern(), "*.tmp");
        assert_eq!(tasks[0].ignore(), ["c.tmp", "b.tmp"]);
        assert_eq!(options.ignore, vec!["c.tmp"]);
    }

    #[test]
    fn negatives_and_empty_patterns_plan_nothing() {
        let tasks = build_tasks(
            &positioned(&["!a.tmp", "!b.tmp", ""]),
            &FindOptions::default(),
            Path::new("/w"),
            None,
        );
        assert!(tasks.is_empty());
    }

    #[test]
    fn options_are_forwarded() {
        let options = FindOptions::default()
            .with_only_files(false)
            .with_dot(true)
            .with_deep(2)
            .with_case_sensitive_match(false)
            .with_suppress_errors(true);
        let tasks = build_tasks(&positioned(&["**"]), &options, Path::new("/w"), None);
        let forwarded = tasks[0].options();
        assert_eq!(forwarded.cwd, PathBuf::from("/w"));
        assert!(!forwarded.only_files);
        assert!(forwarded.dot);
        assert_eq!(forwarded.max_depth, Some(1));
        assert!(!forwarded.case_sensitive);
        assert!(forwarded.suppress_errors);
        assert!(forwarded.vcs.is_none());
    }

    #[test]
    fn tasks_share_discovered_rules() {
        let vcs = Arc::new(VcsIgnore::default());
        let tasks = build_tasks(
            &positioned(&["a", "b"]),
            &FindOptions::default(),
            Path::new("/w"),
            Some(vcs.clone()),
        );
        assert_eq!(Arc::strong_count(&vcs), 3);
        assert_eq!(tasks[1].position(), 1);
    }
}
