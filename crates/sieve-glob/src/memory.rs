//! In-memory `WalkerFs`.
//!
//! Holds files, directories and directory symlinks in ordinary maps so
//! walks can run without touching the disk. Directories can be marked as
//! unreadable to exercise error paths, and `list_dir` calls are counted.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{WalkerDirEntry, WalkerError, WalkerFs};

/// Entry returned by `MemoryFs::list_dir`.
#[derive(Debug, Clone)]
pub struct MemoryDirEntry {
    name: String,
    is_dir: bool,
    is_symlink: bool,
}

impl WalkerDirEntry for MemoryDirEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_dir(&self) -> bool {
        self.is_dir
    }

    fn is_file(&self) -> bool {
        !self.is_dir
    }

    fn is_symlink(&self) -> bool {
        self.is_symlink
    }
}

#[derive(Debug, Default)]
struct Tree {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    /// Link path → target directory.
    symlinks: HashMap<PathBuf, PathBuf>,
    denied: HashSet<PathBuf>,
}

impl Tree {
    fn ensure_dirs(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.dirs.insert(current.clone());
        }
    }

    /// Resolve symlinked prefixes the way a real filesystem would.
    fn resolve(&self, path: &Path) -> PathBuf {
        let mut resolved = PathBuf::new();
        for component in path.components() {
            resolved.push(component);
            if let Some(target) = self.symlinks.get(&resolved) {
                resolved = target.clone();
            }
        }
        resolved
    }
}

/// In-memory filesystem with absolute paths rooted at `/`.
///
/// ```
/// use sieve_glob::MemoryFs;
///
/// let fs = MemoryFs::new();
/// fs.add_file("/work/a.tmp", b"");
/// fs.add_dir("/work/empty");
/// fs.deny("/work/empty");
/// assert_eq!(fs.list_calls(), 0);
/// ```
#[derive(Debug)]
pub struct MemoryFs {
    tree: RwLock<Tree>,
    list_calls: AtomicUsize,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    pub fn new() -> Self {
        let mut tree = Tree::default();
        tree.dirs.insert(PathBuf::from("/"));
        Self {
            tree: RwLock::new(tree),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// Add a file, creating parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, content: &[u8]) {
        let path = path.as_ref();
        let mut tree = self.write();
        if let Some(parent) = path.parent() {
            tree.ensure_dirs(parent);
        }
        tree.files.insert(path.to_path_buf(), content.to_vec());
    }

    /// Add a directory and its parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.write().ensure_dirs(path.as_ref());
    }

    /// Add a directory symlink `link` pointing at `target`.
    pub fn add_dir_symlink(&self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        let link = link.as_ref();
        let mut tree = self.write();
        if let Some(parent) = link.parent() {
            tree.ensure_dirs(parent);
        }
        tree.dirs.insert(link.to_path_buf());
        tree.symlinks
            .insert(link.to_path_buf(), target.as_ref().to_path_buf());
    }

    /// Make listing this directory fail with `PermissionDenied`.
    pub fn deny(&self, path: impl AsRef<Path>) {
        self.write().denied.insert(path.as_ref().to_path_buf());
    }

    /// Number of `list_dir` calls served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tree> {
        self.tree.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tree> {
        self.tree.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl WalkerFs for MemoryFs {
    type DirEntry = MemoryDirEntry;

    async fn list_dir(&self, path: &Path) -> Result<Vec<MemoryDirEntry>, WalkerError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let tree = self.read();
        let resolved = tree.resolve(&normalize(path));

        if tree.denied.contains(&resolved) {
            return Err(WalkerError::PermissionDenied(path.display().to_string()));
        }
        if !tree.dirs.contains(&resolved) {
            return Err(WalkerError::NotFound(path.display().to_string()));
        }

        let mut entries = Vec::new();
        for file in tree.files.keys() {
            if file.parent() == Some(resolved.as_path()) {
                if let Some(name) = file.file_name() {
                    entries.push(MemoryDirEntry {
                        name: name.to_string_lossy().into_owned(),
                        is_dir: false,
                        is_symlink: false,
                    });
                }
            }
        }
        for dir in &tree.dirs {
            if dir.parent() == Some(resolved.as_path()) {
                if let Some(name) = dir.file_name() {
                    entries.push(MemoryDirEntry {
                        name: name.to_string_lossy().into_owned(),
                        is_dir: true,
                        is_symlink: tree.symlinks.contains_key(dir),
                    });
                }
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, WalkerError> {
        let tree = self.read();
        let resolved = tree.resolve(&normalize(path));
        if tree.denied.contains(&resolved) {
            return Err(WalkerError::PermissionDenied(path.display().to_string()));
        }
        tree.files
            .get(&resolved)
            .cloned()
            .ok_or_else(|| WalkerError::NotFound(path.display().to_string()))
    }

    async fn is_dir(&self, path: &Path) -> bool {
        let tree = self.read();
        tree.dirs.contains(&tree.resolve(&normalize(path)))
    }

    async fn exists(&self, path: &Path) -> bool {
        let tree = self.read();
        let resolved = tree.resolve(&normalize(path));
        tree.files.contains_key(&resolved) || tree.dirs.contains(&resolved)
    }

    async fn canonicalize(&self, path: &Path) -> PathBuf {
        self.read().resolve(&normalize(path))
    }
}

/// Drop `.` components and fold `..` so lookups hit the stored keys.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
