//! Core async file walker, generic over `WalkerFs`.
//!
//! Matches one `GlobPath` against a directory tree. The walk starts at the
//! pattern's literal prefix, prunes subtrees the pattern can never reach,
//! and drops anything an exclusion glob or an `IgnoreFilter` rejects.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::glob_path::{GlobPath, MatchFlags};
use crate::ignore::IgnoreFilter;
use crate::{WalkerDirEntry, WalkerError, WalkerFs};

/// Types of entries to include in walk results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTypes {
    /// Include regular files (and symlinks that are not followed).
    pub files: bool,
    /// Include directories.
    pub dirs: bool,
}

impl EntryTypes {
    pub fn files_only() -> Self {
        Self {
            files: true,
            dirs: false,
        }
    }

    pub fn dirs_only() -> Self {
        Self {
            files: false,
            dirs: true,
        }
    }

    pub fn all() -> Self {
        Self {
            files: true,
            dirs: true,
        }
    }
}

impl Default for EntryTypes {
    fn default() -> Self {
        Self::files_only()
    }
}

/// Options for file walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalkOptions {
    /// Deepest directory level that is listed, counted from the start
    /// directory (0 = only the start directory). `None` is unlimited.
    pub max_depth: Option<usize>,
    /// Types of entries to include.
    pub entry_types: EntryTypes,
    /// Case sensitivity for exclusions. The pattern carries its own flags.
    pub flags: MatchFlags,
    /// Descend into symlinked directories, with cycle detection.
    /// When false they are reported like files.
    pub follow_symlinks: bool,
    /// Skip directories that fail to list instead of failing the walk.
    pub suppress_errors: bool,
}

/// Async file walker, generic over any `WalkerFs` implementation.
///
/// Results are `/`-separated paths relative to the root, or absolute paths
/// when the pattern is absolute. A pattern with leading `..` components
/// walks from that ancestor and keeps the `../` prefix in its results.
///
/// # Examples
/// ```
/// use sieve_glob::{FileWalker, GlobPath, MemoryFs, WalkOptions};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let fs = MemoryFs::new();
/// fs.add_file("/work/src/lib.rs", b"");
/// fs.add_file("/work/README.md", b"");
///
/// let files = FileWalker::new(&fs, "/work")
///     .with_pattern(GlobPath::new("**/*.rs").unwrap())
///     .with_options(WalkOptions::default())
///     .collect()
///     .await
///     .unwrap();
/// assert_eq!(files, vec!["src/lib.rs"]);
/// # });
/// ```
pub struct FileWalker<'a, F: WalkerFs> {
    fs: &'a F,
    root: PathBuf,
    pattern: Option<GlobPath>,
    exclusions: Vec<String>,
    ignore: Option<(&'a IgnoreFilter, Vec<String>)>,
    options: WalkOptions,
}

impl<'a, F: WalkerFs> FileWalker<'a, F> {
    /// Create a new file walker rooted at `root`.
    pub fn new(fs: &'a F, root: impl AsRef<Path>) -> Self {
        Self {
            fs,
            root: root.as_ref().to_path_buf(),
            pattern: None,
            exclusions: Vec::new(),
            ignore: None,
            options: WalkOptions::default(),
        }
    }

    /// Only report entries matching `pattern`.
    pub fn with_pattern(mut self, pattern: GlobPath) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Globs whose matches are skipped. Matching directories are pruned.
    ///
    /// An entry starting with `!` re-includes what it matches instead; write
    /// `\!` for a literal leading `!`. Exclusions always let wildcards match
    /// leading dots.
    pub fn with_exclusions<S: AsRef<str>>(mut self, patterns: &[S]) -> Self {
        self.exclusions = patterns.iter().map(|p| p.as_ref().to_string()).collect();
        self
    }

    /// Apply gitignore rules whose paths are relative to `base`.
    pub fn with_ignore(mut self, filter: &'a IgnoreFilter, base: impl AsRef<Path>) -> Self {
        self.ignore = Some((filter, normal_components(base.as_ref())));
        self
    }

    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    /// Walk the tree and collect every matching path.
    pub async fn collect(self) -> Result<Vec<String>, WalkerError> {
        let absolute = self.pattern.as_ref().is_some_and(GlobPath::is_absolute);
        let hops = self.pattern.as_ref().map_or(0, GlobPath::parent_hops);
        let (walk_root, prefix) = if absolute {
            (PathBuf::from("/"), "/".to_string())
        } else {
            (climb(&self.root, hops), "../".repeat(hops))
        };
        let (exclusions, reinclusions) = self.compile_exclusions(hops);
        let view = Matching {
            pattern: self.pattern.as_ref(),
            exclusions,
            reinclusions,
            ignore: self.ignore.as_ref().map(|(filter, base)| {
                (*filter, base.as_slice(), normal_components(&walk_root))
            }),
            prefix,
        };

        let base = self
            .pattern
            .as_ref()
            .map(|p| normal_components(&p.walk_base()))
            .unwrap_or_default();
        let start: PathBuf = walk_root.join(base.iter().collect::<PathBuf>());

        if !self.fs.is_dir(&start).await {
            return Ok(Vec::new());
        }
        for end in 1..=base.len() {
            let prefix: Vec<&str> = base[..end].iter().map(String::as_str).collect();
            if view.rejects(&prefix, true) {
                return Ok(Vec::new());
            }
        }

        let mut results = Vec::new();
        if !base.is_empty() && self.options.entry_types.dirs {
            let comps: Vec<&str> = base.iter().map(String::as_str).collect();
            if view.matches(&comps) {
                results.push(view.render(&comps));
            }
        }

        let follow = self.options.follow_symlinks;
        let mut visited: HashSet<PathBuf> = HashSet::new();
        if follow {
            visited.insert(self.fs.canonicalize(&start).await);
        }

        let mut stack = vec![(start, base, 0usize)];
        while let Some((dir, rel, depth)) = stack.pop() {
            let entries = match self.fs.list_dir(&dir).await {
                Ok(entries) => entries,
                Err(WalkerError::NotFound(_)) => continue,
                Err(err) if self.options.suppress_errors => {
                    tracing::debug!(path = %dir.display(), error = %err, "skipping unreadable directory");
                    continue;
                }
                Err(err) => return Err(err),
            };

            let mut entries: Vec<(String, bool, bool)> = entries
                .into_iter()
                .map(|e| (e.name().to_string(), e.is_dir(), e.is_symlink()))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let mut children = Vec::new();
            for (name, is_dir, is_symlink) in entries {
                let mut child_rel = rel.clone();
                child_rel.push(name);
                let descend = is_dir && (!is_symlink || follow);

                let (keep, matched, reachable) = {
                    let comps: Vec<&str> = child_rel.iter().map(String::as_str).collect();
                    if view.rejects(&comps, descend) {
                        (false, false, false)
                    } else {
                        let reachable = descend
                            && self.pattern.as_ref().is_none_or(|p| p.could_match_below(&comps));
                        (true, view.matches(&comps), reachable)
                    }
                };
                if !keep {
                    continue;
                }

                let path = dir.join(&child_rel[child_rel.len() - 1]);
                if descend {
                    if follow && !visited.insert(self.fs.canonicalize(&path).await) {
                        tracing::debug!(path = %path.display(), "symlink cycle, not descending");
                        continue;
                    }
                    if matched && self.options.entry_types.dirs {
                        results.push(view.render_owned(&child_rel));
                    }
                    let within_depth = self.options.max_depth.is_none_or(|max| depth < max);
                    if reachable && within_depth {
                        children.push((path, child_rel, depth + 1));
                    }
                } else if matched && self.options.entry_types.files {
                    results.push(view.render_owned(&child_rel));
                }
            }

            // Reverse so the alphabetically first directory is popped first.
            children.reverse();
            stack.extend(children);
        }

        Ok(results)
    }

    /// Split exclusions into plain and `!` re-including globs. Only globs
    /// that climb as far as the pattern can match its paths.
    fn compile_exclusions(&self, hops: usize) -> (Vec<GlobPath>, Vec<GlobPath>) {
        let flags = MatchFlags {
            dot: true,
            case_sensitive: self.options.flags.case_sensitive,
        };
        let mut exclusions = Vec::new();
        let mut reinclusions = Vec::new();
        for pattern in &self.exclusions {
            let (target, text) = match pattern.strip_prefix('!') {
                Some(rest) => (&mut reinclusions, rest),
                None => (&mut exclusions, pattern.as_str()),
            };
            match GlobPath::with_flags(text, flags) {
                Ok(glob) if glob.parent_hops() == hops => target.push(glob),
                _ => {}
            }
        }
        (exclusions, reinclusions)
    }
}

/// Per-walk matching state shared by the start prefix and every entry.
struct Matching<'w> {
    pattern: Option<&'w GlobPath>,
    exclusions: Vec<GlobPath>,
    reinclusions: Vec<GlobPath>,
    /// Filter, the filter's base, and the walk root, as components.
    ignore: Option<(&'w IgnoreFilter, &'w [String], Vec<String>)>,
    /// Prepended to every rendered path: `/` or a run of `../`.
    prefix: String,
}

impl Matching<'_> {
    fn matches(&self, comps: &[&str]) -> bool {
        self.pattern.is_none_or(|p| p.matches_components(comps))
    }

    fn rejects(&self, comps: &[&str], is_dir: bool) -> bool {
        if self.exclusions.iter().any(|e| e.matches_components(comps))
            && !self.reinclusions.iter().any(|r| r.matches_components(comps))
        {
            return true;
        }
        let Some((filter, base, walk_root)) = &self.ignore else {
            return false;
        };
        let full: Vec<&str> = walk_root
            .iter()
            .map(String::as_str)
            .chain(comps.iter().copied())
            .collect();
        match full.strip_prefix(
            base.iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .as_slice(),
        ) {
            Some(relative) => filter.is_ignored_components(relative, is_dir),
            None => false,
        }
    }

    fn render(&self, comps: &[&str]) -> String {
        format!("{}{}", self.prefix, comps.join("/"))
    }

    fn render_owned(&self, comps: &[String]) -> String {
        format!("{}{}", self.prefix, comps.join("/"))
    }
}

/// Step `hops` directories up from `root` without touching the filesystem.
/// The root directory is its own parent.
fn climb(root: &Path, hops: usize) -> PathBuf {
    let mut dir = root.to_path_buf();
    for _ in 0..hops {
        match dir.components().next_back() {
            Some(Component::Normal(_)) => {
                dir.pop();
            }
            Some(Component::RootDir | Component::Prefix(_)) => {}
            _ => dir.push(".."),
        }
    }
    dir
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}
