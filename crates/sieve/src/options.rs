//! Caller-facing options.
//!
//! `FindOptions` deserializes from the same camelCase JSON shape callers of
//! the glob tooling are used to, so options can come straight out of a
//! config file:
//!
//! ```json
//! { "cwd": "fixtures", "ignore": ["**/b.tmp"], "gitignore": true,
//!   "expandDirectories": { "files": ["a", "b"], "extensions": ["tmp"] } }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SieveError, SieveResult};

/// How bare directory patterns are rewritten into globs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpandDirectories {
    /// `true` expands `dir` to `dir/**`; `false` leaves it alone.
    Enabled(bool),
    /// Same as `Rules` with only `files` set.
    Files(Vec<String>),
    /// Restrict the expansion to file names and/or extensions.
    Rules {
        #[serde(default)]
        files: Vec<String>,
        #[serde(default)]
        extensions: Vec<String>,
    },
}

impl Default for ExpandDirectories {
    fn default() -> Self {
        ExpandDirectories::Enabled(true)
    }
}

/// Options accepted by `find`, `find_sync` and `plan_tasks`.
///
/// Entry points only ever borrow this; it comes back exactly as passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FindOptions {
    /// Directory patterns resolve against. Defaults to the process's
    /// working directory, read once per call.
    pub cwd: Option<PathBuf>,
    /// Exclusion globs applied to every task.
    pub ignore: Vec<String>,
    /// Honour `.gitignore` files.
    pub gitignore: bool,
    pub expand_directories: ExpandDirectories,
    /// Report files only (`true`) or directories as well.
    pub only_files: bool,
    /// Let wildcards match names starting with `.`.
    pub dot: bool,
    /// Maximum directory depth read below each task's start directory.
    pub deep: Option<usize>,
    pub follow_symbolic_links: bool,
    pub case_sensitive_match: bool,
    /// Skip unreadable directories instead of failing.
    pub suppress_errors: bool,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            ignore: Vec::new(),
            gitignore: false,
            expand_directories: ExpandDirectories::default(),
            only_files: true,
            dot: false,
            deep: None,
            follow_symbolic_links: false,
            case_sensitive_match: true,
            suppress_errors: false,
        }
    }
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json(value: &Value) -> SieveResult<Self> {
        FindOptions::deserialize(value).map_err(SieveError::from)
    }

    pub fn with_cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    pub fn with_ignore<I, S>(mut self, ignore: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = ignore.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_gitignore(mut self, gitignore: bool) -> Self {
        self.gitignore = gitignore;
        self
    }

    pub fn with_expand_directories(mut self, expand: ExpandDirectories) -> Self {
        self.expand_directories = expand;
        self
    }

    pub fn with_only_files(mut self, only_files: bool) -> Self {
        self.only_files = only_files;
        self
    }

    pub fn with_dot(mut self, dot: bool) -> Self {
        self.dot = dot;
        self
    }

    pub fn with_deep(mut self, deep: usize) -> Self {
        self.deep = Some(deep);
        self
    }

    pub fn with_follow_symbolic_links(mut self, follow: bool) -> Self {
        self.follow_symbolic_links = follow;
        self
    }

    pub fn with_case_sensitive_match(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive_match = case_sensitive;
        self
    }

    pub fn with_suppress_errors(mut self, suppress: bool) -> Self {
        self.suppress_errors = suppress;
        self
    }

    /// The absolute directory this call resolves patterns against.
    pub(crate) fn resolved_cwd(&self) -> SieveResult<PathBuf> {
        match &self.cwd {
            Some(cwd) if cwd.is_absolute() => Ok(cwd.clone()),
            other => {
                let current = std::env::current_dir().map_err(SieveError::WorkingDirectory)?;
                Ok(match other {
                    Some(relative) => current.join(relative),
                    None => current,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let options = FindOptions::default();
        assert!(options.only_files);
        assert!(options.case_sensitive_match);
        assert!(!options.gitignore);
        assert_eq!(options.expand_directories, ExpandDirectories::Enabled(true));
        assert_eq!(FindOptions::from_json(&json!({})).unwrap(), options);
    }

    #[test]
    fn camel_case_json() {
        let options = FindOptions::from_json(&json!({
            "cwd": "/tmp/fixture",
            "ignore": ["**/b.tmp"],
            "gitignore": true,
            "onlyFiles": false,
            "followSymbolicLinks": true,
            "caseSensitiveMatch": false,
            "deep": 2,
        }))
        .unwrap();
        assert_eq!(options.cwd, Some(PathBuf::from("/tmp/fixture")));
        assert_eq!(options.ignore, vec!["**/b.tmp"]);
        assert!(options.gitignore);
        assert!(!options.only_files);
        assert!(options.follow_symbolic_links);
        assert!(!options.case_sensitive_match);
        assert_eq!(options.deep, Some(2));
    }

    #[test]
    fn expand_directories_shapes() {
        let parse = |v: Value| {
            FindOptions::from_json(&json!({ "expandDirectories": v }))
                .unwrap()
                .expand_directories
        };
        assert_eq!(parse(json!(false)), ExpandDirectories::Enabled(false));
        assert_eq!(
            parse(json!(["a", "b"])),
            ExpandDirectories::Files(vec!["a".into(), "b".into()])
        );
        assert_eq!(
            parse(json!({ "files": ["a"], "extensions": ["tmp"] })),
            ExpandDirectories::Rules {
                files: vec!["a".into()],
                extensions: vec!["tmp".into()],
            }
        );
        assert_eq!(
            parse(json!({ "extensions": ["tmp"] })),
            ExpandDirectories::Rules {
                files: Vec::new(),
                extensions: vec!["tmp".into()],
            }
        );
    }

    #[test]
    fn rejects_wrong_types() {
        let err = FindOptions::from_json(&json!({ "ignore": "not-a-list" })).unwrap_err();
        assert!(matches!(err, SieveError::Options(_)));
    }

    #[test]
    fn builders() {
        let options = FindOptions::new()
            .with_cwd("/w")
            .with_ignore(["c.tmp"])
            .with_gitignore(true)
            .with_only_files(false)
            .with_deep(3);
        assert_eq!(options.cwd.as_deref(), Some(Path::new("/w")));
        assert_eq!(options.ignore, vec!["c.tmp"]);
        assert!(options.gitignore);
        assert!(!options.only_files);
        assert_eq!(options.deep, Some(3));
    }

    #[test]
    fn relative_cwd_resolves_against_process_dir() {
        let options = FindOptions::new().with_cwd("fixtures");
        let resolved = options.resolved_cwd().unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("fixtures"));
    }
}
