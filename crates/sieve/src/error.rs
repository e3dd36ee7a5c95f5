//! Error types for pattern resolution.

use std::io;
use std::path::PathBuf;

use sieve_glob::WalkerError;
use thiserror::Error;

/// Result type for sieve operations.
pub type SieveResult<T> = Result<T, SieveError>;

/// Errors surfaced by `find`, `find_sync` and `plan_tasks`.
#[derive(Debug, Error)]
pub enum SieveError {
    /// The pattern input was not a string or a sequence of strings.
    #[error("patterns must be a string or a sequence of strings")]
    InvalidPattern,

    /// The matcher failed while running a task.
    #[error("matching `{pattern}` (task {index}) failed: {source}")]
    Matcher {
        index: usize,
        pattern: String,
        #[source]
        source: WalkerError,
    },

    /// Walking the tree for `.gitignore` files failed.
    #[error("gitignore discovery under {} failed: {source}", path.display())]
    IgnoreDiscovery {
        path: PathBuf,
        #[source]
        source: WalkerError,
    },

    /// The blocking entry points could not start their runtime.
    #[error("runtime error: {0}")]
    Runtime(#[source] io::Error),

    /// No `cwd` was given and the process working directory is unavailable.
    #[error("cannot resolve working directory: {0}")]
    WorkingDirectory(#[source] io::Error),

    /// Options JSON did not deserialize.
    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),
}

impl SieveError {
    /// Index of the failing task, when the error came from the matcher.
    pub fn task_index(&self) -> Option<usize> {
        match self {
            SieveError::Matcher { index, .. } => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pattern_message() {
        assert_eq!(
            SieveError::InvalidPattern.to_string(),
            "patterns must be a string or a sequence of strings"
        );
    }

    #[test]
    fn matcher_error_names_the_task() {
        let err = SieveError::Matcher {
            index: 2,
            pattern: "src/**".into(),
            source: WalkerError::PermissionDenied("/w/src".into()),
        };
        assert_eq!(err.task_index(), Some(2));
        assert!(err.to_string().contains("src/**"));
        assert!(err.to_string().contains("permission denied"));
    }
}
