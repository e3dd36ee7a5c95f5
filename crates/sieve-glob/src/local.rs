//! `WalkerFs` over the real filesystem.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::{WalkerDirEntry, WalkerError, WalkerFs};

/// Ignore files bigger than this are treated as unreadable.
const MAX_READ_BYTES: u64 = 8 * 1024 * 1024;

/// Directory entry produced by `LocalFs`.
#[derive(Debug, Clone)]
pub struct LocalDirEntry {
    name: String,
    is_dir: bool,
    is_file: bool,
    is_symlink: bool,
}

impl WalkerDirEntry for LocalDirEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_dir(&self) -> bool {
        self.is_dir
    }

    fn is_file(&self) -> bool {
        self.is_file
    }

    fn is_symlink(&self) -> bool {
        self.is_symlink
    }
}

/// Local filesystem access through `tokio::fs`.
///
/// Paths are used as given; callers join them onto their own working
/// directory first.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WalkerFs for LocalFs {
    type DirEntry = LocalDirEntry;

    async fn list_dir(&self, path: &Path) -> Result<Vec<LocalDirEntry>, WalkerError> {
        let mut dir = fs::read_dir(path)
            .await
            .map_err(|e| WalkerError::from_io(path, &e))?;
        let mut entries = Vec::new();

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| WalkerError::from_io(path, &e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| WalkerError::from_io(&entry.path(), &e))?;
            let is_symlink = file_type.is_symlink();

            // Symlinks report what they point at; dangling links count as files.
            let (is_dir, is_file) = if is_symlink {
                match fs::metadata(entry.path()).await {
                    Ok(meta) => (meta.is_dir(), meta.is_file()),
                    Err(_) => (false, true),
                }
            } else {
                (file_type.is_dir(), file_type.is_file())
            };

            entries.push(LocalDirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
                is_file,
                is_symlink,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, WalkerError> {
        let meta = fs::metadata(path)
            .await
            .map_err(|e| WalkerError::from_io(path, &e))?;
        if meta.len() > MAX_READ_BYTES {
            return Err(WalkerError::Io(format!(
                "{}: larger than {} bytes",
                path.display(),
                MAX_READ_BYTES
            )));
        }
        fs::read(path)
            .await
            .map_err(|e| WalkerError::from_io(path, &e))
    }

    async fn is_dir(&self, path: &Path) -> bool {
        fs::metadata(path).await.is_ok_and(|meta| meta.is_dir())
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn canonicalize(&self, path: &Path) -> PathBuf {
        fs::canonicalize(path)
            .await
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        env::temp_dir().join(format!("sieve-glob-local-{}-{}", std::process::id(), id))
    }

    #[tokio::test]
    async fn lists_sorted_entries_with_types() {
        let dir = temp_dir();
        fs::create_dir_all(dir.join("sub")).await.unwrap();
        fs::write(dir.join("b.txt"), b"b").await.unwrap();
        fs::write(dir.join("a.txt"), b"a").await.unwrap();

        let entries = LocalFs.list_dir(&dir).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name().to_string()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
        assert!(entries[2].is_dir());
        assert!(entries[0].is_file());

        let _ = fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn missing_directory_is_not_found() {
        let dir = temp_dir().join("nope");
        let err = LocalFs.list_dir(&dir).await.unwrap_err();
        assert!(matches!(err, WalkerError::NotFound(_)));
        assert!(!LocalFs.exists(&dir).await);
        assert!(!LocalFs.is_dir(&dir).await);
    }

    #[tokio::test]
    async fn reads_files() {
        let dir = temp_dir();
        fs::create_dir_all(&dir).await.unwrap();
        fs::write(dir.join(".gitignore"), b"foo.js\n").await.unwrap();

        let data = LocalFs.read_file(&dir.join(".gitignore")).await.unwrap();
        assert_eq!(data, b"foo.js\n");

        let _ = fs::remove_dir_all(&dir).await;
    }
}
