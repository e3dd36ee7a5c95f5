//! Walker tests against the real filesystem.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use rstest::rstest;
use sieve_glob::{EntryTypes, FileWalker, GlobPath, IgnoreFilter, LocalFs, WalkOptions};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn fixture() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("sieve-glob-walk-{}-{}", std::process::id(), id));
    for rel in ["a.tmp", "b.tmp", "tmp/c.tmp", "tmp/d.txt", "docs/guide.md"] {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }
    dir
}

async fn walk(root: &Path, pattern: &str, options: WalkOptions) -> Vec<String> {
    FileWalker::new(&LocalFs, root)
        .with_pattern(GlobPath::new(pattern).unwrap())
        .with_options(options)
        .collect()
        .await
        .unwrap()
}

#[rstest]
#[case("*.tmp", &["a.tmp", "b.tmp"])]
#[case("**/*.tmp", &["a.tmp", "b.tmp", "tmp/c.tmp"])]
#[case("tmp/*", &["tmp/c.tmp", "tmp/d.txt"])]
#[case("{docs,tmp}/*.{md,txt}", &["docs/guide.md", "tmp/d.txt"])]
#[case("[ab].tmp", &["a.tmp", "b.tmp"])]
#[case("nothing/**", &[])]
#[tokio::test]
async fn matches_patterns_on_disk(#[case] pattern: &str, #[case] expected: &[&str]) {
    let dir = fixture();
    let mut found = walk(&dir, pattern, WalkOptions::default()).await;
    found.sort();
    assert_eq!(found, expected);
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn reports_directories_when_asked() {
    let dir = fixture();
    let options = WalkOptions {
        entry_types: EntryTypes::dirs_only(),
        ..Default::default()
    };
    assert_eq!(walk(&dir, "*", options).await, vec!["docs", "tmp"]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn gitignore_rules_from_disk() {
    let dir = fixture();
    std::fs::write(dir.join(".gitignore"), "*.tmp\n!b.tmp\n").unwrap();

    let mut filter = IgnoreFilter::new();
    filter
        .load(&LocalFs, &dir.join(".gitignore"), Path::new(""))
        .await
        .unwrap();

    let found = FileWalker::new(&LocalFs, &dir)
        .with_pattern(GlobPath::new("**/*.tmp").unwrap())
        .with_ignore(&filter, &dir)
        .collect()
        .await
        .unwrap();
    assert_eq!(found, vec!["b.tmp"]);
    let _ = std::fs::remove_dir_all(&dir);
}
