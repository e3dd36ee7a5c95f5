//! The planner and composer behind the public entry points.

use std::future::Future;
use std::io;
use std::sync::Arc;

use futures::future::join_all;
use sieve_glob::{LocalFs, WalkerFs};

use crate::compose::compose;
use crate::discover::discover;
use crate::error::{SieveError, SieveResult};
use crate::expand::{Positioned, expand_patterns};
use crate::matcher::run_task;
use crate::options::FindOptions;
use crate::pattern::{IntoPatterns, classify};
use crate::task::{Task, build_tasks};

/// Pattern resolution over a `WalkerFs`.
///
/// The free functions in the crate root use `Sieve<LocalFs>`. Any other
/// filesystem works the same way:
///
/// ```
/// use sieve::{FindOptions, Sieve};
/// use sieve_glob::MemoryFs;
///
/// let fs = MemoryFs::new();
/// for name in ["a", "b", "c"] {
///     fs.add_file(format!("/w/{name}.tmp"), b"");
/// }
///
/// let sieve = Sieve::new(fs);
/// let options = FindOptions::default().with_cwd("/w");
/// let found = sieve.find_sync(["*.tmp", "!b.tmp"], &options).unwrap();
/// assert_eq!(found, vec!["a.tmp", "c.tmp"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Sieve<F: WalkerFs = LocalFs> {
    fs: F,
}

impl Sieve<LocalFs> {
    /// Resolve patterns against the local filesystem.
    pub fn local() -> Self {
        Self { fs: LocalFs }
    }
}

impl<F: WalkerFs> Sieve<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Plan the matcher tasks for `patterns` without running them.
    ///
    /// Invalid input fails before the filesystem is touched. Input with no
    /// positive pattern plans nothing and touches nothing.
    #[tracing::instrument(level = "debug", skip_all, err)]
    pub async fn plan(
        &self,
        patterns: impl IntoPatterns,
        options: &FindOptions,
    ) -> SieveResult<Vec<Task>> {
        let classified: Vec<Positioned> = patterns
            .into_patterns()?
            .iter()
            .enumerate()
            .map(|(position, pattern)| Positioned {
                position,
                pattern: classify(pattern),
            })
            .collect();

        if !classified
            .iter()
            .any(|p| !p.pattern.is_negative() && !p.pattern.value.is_empty())
        {
            tracing::debug!(patterns = classified.len(), "no positive patterns");
            return Ok(Vec::new());
        }

        let cwd = options.resolved_cwd()?;
        let expanded =
            expand_patterns(&self.fs, &cwd, classified, &options.expand_directories).await;
        let vcs = if options.gitignore {
            Some(Arc::new(discover(&self.fs, &cwd, options).await?))
        } else {
            None
        };

        let tasks = build_tasks(&expanded, options, &cwd, vcs);
        tracing::debug!(tasks = tasks.len(), cwd = %cwd.display(), "planned tasks");
        Ok(tasks)
    }

    /// Blocking form of `plan`.
    ///
    /// Runs on a private single-threaded runtime. Called from inside an async
    /// context it fails with `SieveError::Runtime`.
    pub fn plan_tasks(
        &self,
        patterns: impl IntoPatterns,
        options: &FindOptions,
    ) -> SieveResult<Vec<Task>> {
        block_on(self.plan(patterns, options))?
    }

    /// Resolve `patterns` into matching paths, running tasks concurrently.
    ///
    /// Results are ordered by task, then by first occurrence.
    #[tracing::instrument(level = "debug", skip_all, err)]
    pub async fn find(
        &self,
        patterns: impl IntoPatterns,
        options: &FindOptions,
    ) -> SieveResult<Vec<String>> {
        let tasks = self.plan(patterns, options).await?;
        let results = join_all(
            tasks
                .iter()
                .enumerate()
                .map(|(index, task)| self.run(index, task)),
        )
        .await;
        compose(results)
    }

    /// Blocking form of `find`. Tasks run one after another and the first
    /// failure stops the call.
    ///
    /// Runs on a private single-threaded runtime. Called from inside an async
    /// context it fails with `SieveError::Runtime`.
    #[tracing::instrument(level = "debug", skip_all, err)]
    pub fn find_sync(
        &self,
        patterns: impl IntoPatterns,
        options: &FindOptions,
    ) -> SieveResult<Vec<String>> {
        block_on(async {
            let tasks = self.plan(patterns, options).await?;
            let mut results = Vec::with_capacity(tasks.len());
            for (index, task) in tasks.iter().enumerate() {
                let result = self.run(index, task).await;
                let failed = result.is_err();
                results.push(result);
                if failed {
                    break;
                }
            }
            compose(results)
        })?
    }

    async fn run(&self, index: usize, task: &Task) -> SieveResult<Vec<String>> {
        let found = run_task(&self.fs, task)
            .await
            .map_err(|source| SieveError::Matcher {
                index,
                pattern: task.pattern().to_string(),
                source,
            })?;
        tracing::debug!(index, pattern = task.pattern(), matches = found.len(), "task done");
        Ok(found)
    }
}

/// Drive `future` to completion on a fresh current-thread runtime.
///
/// Tokio panics when a runtime is started from inside another one, so that
/// case is reported as an error instead.
fn block_on<T>(future: impl Future<Output = T>) -> SieveResult<T> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(SieveError::Runtime(io::Error::other(
            "blocking call made from inside an async runtime; use the async form",
        )));
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(SieveError::Runtime)?;
    Ok(runtime.block_on(future))
}
