//! `.gitignore` discovery.
//!
//! Collects the ignore files that govern a working directory: those inside
//! it, found with the walker, and, when the directory sits inside a git
//! repository, those between the repository root and the directory itself.

use std::path::{Path, PathBuf};

use sieve_glob::{FileWalker, GlobPath, IgnoreFilter, MatchFlags, WalkOptions, WalkerFs, escape};

use crate::error::{SieveError, SieveResult};
use crate::options::FindOptions;

const IGNORE_FILE: &str = ".gitignore";

/// Directories never searched for ignore files.
const DEFAULT_IGNORE: &[&str] = &[
    "**/node_modules/**",
    "**/bower_components/**",
    "**/flow-typed/**",
    "**/coverage/**",
    "**/.git",
];

/// Parsed gitignore rules plus the ignore files they came from.
#[derive(Debug, Clone, Default)]
pub struct VcsIgnore {
    filter: IgnoreFilter,
    base: PathBuf,
    files: Vec<String>,
}

impl VcsIgnore {
    /// Rules, scoped per directory relative to `base()`.
    pub fn filter(&self) -> &IgnoreFilter {
        &self.filter
    }

    /// Directory the rule scopes are relative to: the repository root, or
    /// the working directory outside a repository.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Escaped working-directory-relative paths of the ignore files found
    /// inside the working directory.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.filter.is_empty() && self.files.is_empty()
    }
}

/// Find and parse every ignore file that applies under `cwd`.
///
/// Unreadable files are skipped with a warning; only a failing walk is an
/// error.
#[tracing::instrument(level = "debug", skip_all, fields(cwd = %cwd.display()))]
pub async fn discover<F: WalkerFs>(
    fs: &F,
    cwd: &Path,
    options: &FindOptions,
) -> SieveResult<VcsIgnore> {
    let root = repository_root(fs, cwd).await;
    let mut vcs = VcsIgnore {
        filter: IgnoreFilter::new(),
        base: root.clone(),
        files: Vec::new(),
    };
    let cwd_in_root = cwd.strip_prefix(&root).unwrap_or(Path::new("")).to_path_buf();

    // Ancestors first, so rules closer to the files win.
    let mut dir = root.clone();
    let mut scope = PathBuf::new();
    for component in cwd_in_root.components() {
        load(fs, &mut vcs.filter, &dir.join(IGNORE_FILE), &scope).await;
        dir.push(component);
        scope.push(component);
    }

    let mut exclusions: Vec<String> = options.ignore.clone();
    exclusions.extend(DEFAULT_IGNORE.iter().map(|p| p.to_string()));

    let flags = MatchFlags {
        dot: true,
        case_sensitive: options.case_sensitive_match,
    };
    let Ok(pattern) = GlobPath::with_flags(&format!("**/{IGNORE_FILE}"), flags) else {
        return Ok(vcs);
    };

    let found = FileWalker::new(fs, cwd)
        .with_pattern(pattern)
        .with_exclusions(&exclusions)
        .with_options(WalkOptions {
            flags,
            suppress_errors: options.suppress_errors,
            ..WalkOptions::default()
        })
        .collect()
        .await
        .map_err(|source| SieveError::IgnoreDiscovery {
            path: cwd.to_path_buf(),
            source,
        })?;

    for relative in found {
        let relative_path = Path::new(&relative);
        let dir_scope = cwd_in_root.join(relative_path.parent().unwrap_or(Path::new("")));
        if load(fs, &mut vcs.filter, &cwd.join(relative_path), &dir_scope).await {
            vcs.files.push(escape(&relative));
        }
    }

    tracing::debug!(
        files = vcs.files.len(),
        rules = vcs.filter.rule_count(),
        root = %root.display(),
        "discovered gitignore rules"
    );
    Ok(vcs)
}

/// Load one ignore file if it exists. Returns whether it was read.
async fn load<F: WalkerFs>(
    fs: &F,
    filter: &mut IgnoreFilter,
    file: &Path,
    scope: &Path,
) -> bool {
    if !fs.exists(file).await {
        return false;
    }
    match filter.load(fs, file, scope).await {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(path = %file.display(), error = %err, "skipping unreadable ignore file");
            false
        }
    }
}

/// Nearest ancestor of `cwd` (itself included) holding `.git`, or `cwd`.
async fn repository_root<F: WalkerFs>(fs: &F, cwd: &Path) -> PathBuf {
    for dir in cwd.ancestors() {
        if fs.exists(&dir.join(".git")).await {
            return dir.to_path_buf();
        }
    }
    cwd.to_path_buf()
}
