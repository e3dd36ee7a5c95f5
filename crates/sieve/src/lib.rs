//! sieve: resolve ordered lists of glob patterns into paths.
//!
//! A pattern list mixes positive globs with negative ones (`!pattern`).
//! Every positive pattern becomes one matcher task; the task excludes the
//! caller's `ignore` globs and every negative pattern listed after it.
//! Results are concatenated in task order and de-duplicated, so the first
//! task to find a path decides its position.
//!
//! ```no_run
//! use sieve::FindOptions;
//!
//! let options = FindOptions::default().with_gitignore(true);
//! let sources = sieve::find_sync(["src/**/*.rs", "!**/generated/**"], &options)?;
//! # Ok::<(), sieve::SieveError>(())
//! ```
//!
//! Bare directory patterns expand to the files below them (`src` becomes
//! `src/**`, see `ExpandDirectories`), and with `gitignore` enabled the
//! rules from `.gitignore` files apply to every task.
//!
//! The matching engine lives in `sieve-glob`; `Sieve` runs over any of its
//! `WalkerFs` implementations.

mod compose;
mod discover;
mod error;
mod expand;
mod ignore;
mod matcher;
mod options;
mod pattern;
mod sieve;
mod task;

pub use discover::{VcsIgnore, discover};
pub use error::{SieveError, SieveResult};
pub use options::{ExpandDirectories, FindOptions};
pub use pattern::{ClassifiedPattern, IntoPatterns, Polarity, classify, has_glob_magic};
pub use sieve::Sieve;
pub use task::{MatchOptions, Task};

/// Resolve `patterns` against the local filesystem, running tasks
/// concurrently.
pub async fn find(
    patterns: impl IntoPatterns,
    options: &FindOptions,
) -> SieveResult<Vec<String>> {
    Sieve::local().find(patterns, options).await
}

/// Blocking form of [`find`]. Inside an async context it returns
/// `SieveError::Runtime` instead of blocking.
pub fn find_sync(patterns: impl IntoPatterns, options: &FindOptions) -> SieveResult<Vec<String>> {
    Sieve::local().find_sync(patterns, options)
}

/// Plan the tasks `find` would run, without running them. Blocking, with
/// the same async-context restriction as [`find_sync`].
pub fn plan_tasks(patterns: impl IntoPatterns, options: &FindOptions) -> SieveResult<Vec<Task>> {
    Sieve::local().plan_tasks(patterns, options)
}
