//! Runs a single task through the walker.

use sieve_glob::{
    EntryTypes, FileWalker, GlobPath, MatchFlags, WalkOptions, WalkerError, WalkerFs,
};

use crate::task::Task;

/// Match one task's pattern under its working directory.
pub(crate) async fn run_task<F: WalkerFs>(
    fs: &F,
    task: &Task,
) -> Result<Vec<String>, WalkerError> {
    let options = task.options();
    let flags = MatchFlags {
        dot: options.dot,
        case_sensitive: options.case_sensitive,
    };
    let Ok(pattern) = GlobPath::with_flags(task.pattern(), flags) else {
        return Ok(Vec::new());
    };

    let entry_types = if options.only_files {
        EntryTypes::files_only()
    } else {
        EntryTypes::all()
    };

    let mut walker = FileWalker::new(fs, &options.cwd)
        .with_pattern(pattern)
        .with_exclusions(&options.ignore)
        .with_options(WalkOptions {
            max_depth: options.max_depth,
            entry_types,
            flags,
            follow_symlinks: options.follow_symlinks,
            suppress_errors: options.suppress_errors,
        });
    if let Some(vcs) = &options.vcs {
        walker = walker.with_ignore(vcs.filter(), vcs.base());
    }

    walker.collect().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::discover;
    use crate::expand::Positioned;
    use crate::options::FindOptions;
    use crate::pattern::classify;
    use crate::task::build_tasks;
    use sieve_glob::MemoryFs;
    use std::path::Path;
    use std::sync::Arc;

    fn tasks(patterns: &[&str], options: &FindOptions) -> Vec<Task> {
        let positioned: Vec<Positioned> = patterns
            .iter()
            .enumerate()
            .map(|(position, p)| Positioned {
                position,
                pattern: classify(p),
            })
            .collect();
        build_tasks(&positioned, options, Path::new("/w"), None)
    }

    fn fixture() -> MemoryFs {
        let fs = MemoryFs::new();
        for name in ["a", "b", "c"] {
            fs.add_file(format!("/w/{name}.tmp"), b"");
        }
        fs.add_file("/w/tmp/d.tmp", b"");
        fs
    }

    #[tokio::test]
    async fn applies_task_exclusions() {
        let fs = fixture();
        let planned = tasks(&["*.tmp", "!b.tmp"], &FindOptions::default());
        let found = run_task(&fs, &planned[0]).await.unwrap();
        assert_eq!(found, vec!["a.tmp", "c.tmp"]);
    }

    #[tokio::test]
    async fn only_files_false_reports_directories() {
        let fs = fixture();
        let planned = tasks(&["*"], &FindOptions::default().with_only_files(false));
        let found = run_task(&fs, &planned[0]).await.unwrap();
        assert_eq!(found, vec!["a.tmp", "b.tmp", "c.tmp", "tmp"]);
    }

    #[tokio::test]
    async fn applies_discovered_gitignore_rules() {
        let fs = fixture();
        fs.add_file("/w/.gitignore", b"a.tmp\n");
        let options = FindOptions::default().with_gitignore(true);
        let vcs = discover(&fs, Path::new("/w"), &options).await.unwrap();

        let positioned = vec![Positioned {
            position: 0,
            pattern: classify("**/*.tmp"),
        }];
        let planned = build_tasks(&positioned, &options, Path::new("/w"), Some(Arc::new(vcs)));
        let found = run_task(&fs, &planned[0]).await.unwrap();
        assert_eq!(found, vec!["b.tmp", "c.tmp", "tmp/d.tmp"]);
    }

    #[tokio::test]
    async fn surfaces_walker_errors() {
        let fs = fixture();
        fs.deny("/w/tmp");
        let planned = tasks(&["**/*.tmp"], &FindOptions::default());
        let err = run_task(&fs, &planned[0]).await.unwrap_err();
        assert!(matches!(err, WalkerError::PermissionDenied(_)));
    }
}
