//! sieve-glob: the matching engine behind `sieve`.
//!
//! Provides:
//! - **glob_match**: single-component shell glob matching with brace expansion
//! - **GlobPath**: path-aware globs with `**`, dot-file rules and walk pruning
//! - **IgnoreFilter**: gitignore rule sets scoped to the directory that owns them
//! - **FileWalker**: async walker that matches one pattern against a tree,
//!   generic over `WalkerFs`
//! - **LocalFs**: `WalkerFs` over the real filesystem via `tokio::fs`
//! - **MemoryFs**: in-memory `WalkerFs` for tests and embedding
//!
//! The walker only needs a minimal read-only filesystem. Implement `WalkerFs`
//! to point it at anything other than the local disk.

pub mod glob;
mod glob_path;
mod ignore;
mod local;
mod memory;
mod walker;

pub use glob::{contains_glob, escape, expand_braces, glob_match, glob_match_with};
pub use glob_path::{GlobPath, MatchFlags, PatternError};
pub use ignore::IgnoreFilter;
pub use local::{LocalDirEntry, LocalFs};
pub use memory::{MemoryDirEntry, MemoryFs};
pub use walker::{EntryTypes, FileWalker, WalkOptions};

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from filesystem operations within the walker.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalkerError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("symlink cycle detected: {0}")]
    SymlinkCycle(String),
}

impl WalkerError {
    /// Classify an `io::Error` raised while touching `path`.
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        let shown = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => WalkerError::NotFound(shown),
            io::ErrorKind::PermissionDenied => WalkerError::PermissionDenied(shown),
            _ => WalkerError::Io(format!("{shown}: {err}")),
        }
    }
}

/// Minimal read-only filesystem abstraction for the walker.
#[async_trait]
pub trait WalkerFs: Send + Sync {
    /// The directory entry type returned by `list_dir`.
    type DirEntry: WalkerDirEntry;

    /// List the entries in a directory.
    async fn list_dir(&self, path: &Path) -> Result<Vec<Self::DirEntry>, WalkerError>;

    /// Read the full contents of a file into memory.
    ///
    /// Used for loading `.gitignore` files.
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, WalkerError>;

    /// Check if a path is a directory.
    async fn is_dir(&self, path: &Path) -> bool;

    /// Check if a path exists.
    async fn exists(&self, path: &Path) -> bool;

    /// Return the canonical (resolved) path, following symlinks.
    ///
    /// Only consulted for symlink cycle detection. The default returns the
    /// path unchanged.
    async fn canonicalize(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

/// A single entry returned by `WalkerFs::list_dir`.
pub trait WalkerDirEntry: Send {
    /// The entry name (file or directory name, not full path).
    fn name(&self) -> &str;

    /// True if this entry is (or, for a symlink, points at) a directory.
    fn is_dir(&self) -> bool;

    /// True if this entry is a regular file.
    fn is_file(&self) -> bool;

    /// True if this entry is a symbolic link.
    fn is_symlink(&self) -> bool;
}
