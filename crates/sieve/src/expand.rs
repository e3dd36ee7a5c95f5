//! Directory expansion: `tmp` → `tmp/**` and friends.

use std::path::Path;

use sieve_glob::WalkerFs;

use crate::options::ExpandDirectories;
use crate::pattern::{ClassifiedPattern, has_glob_magic};

/// A classified pattern tagged with the list position it came from.
///
/// Globs produced by expansion share the position of the directory they
/// replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Positioned {
    pub position: usize,
    pub pattern: ClassifiedPattern,
}

/// The globs a bare directory pattern expands to, or `None` when expansion
/// is disabled.
pub(crate) fn directory_globs(dir: &str, rule: &ExpandDirectories) -> Option<Vec<String>> {
    let none: &[String] = &[];
    let (files, extensions) = match rule {
        ExpandDirectories::Enabled(false) => return None,
        ExpandDirectories::Enabled(true) => (none, none),
        ExpandDirectories::Files(files) => (files.as_slice(), none),
        ExpandDirectories::Rules { files, extensions } => {
            (files.as_slice(), extensions.as_slice())
        }
    };

    let base = join(dir, "**");
    let ext = match extensions {
        [] => None,
        [single] => Some(single.clone()),
        many => Some(format!("{{{}}}", many.join(","))),
    };

    let globs = match (files.is_empty(), ext) {
        (true, None) => vec![base],
        (true, Some(ext)) => vec![join(&base, &format!("*.{ext}"))],
        (false, ext) => files
            .iter()
            .map(|file| {
                let name = if has_extension(file) {
                    file.clone()
                } else {
                    format!("{file}.{}", ext.as_deref().unwrap_or("*"))
                };
                join(&base, &name)
            })
            .collect(),
    };
    Some(globs)
}

/// Replace positive bare-directory patterns with their expansion, in place.
pub(crate) async fn expand_patterns<F: WalkerFs>(
    fs: &F,
    cwd: &Path,
    patterns: Vec<Positioned>,
    rule: &ExpandDirectories,
) -> Vec<Positioned> {
    if *rule == ExpandDirectories::Enabled(false) {
        return patterns;
    }

    let mut expanded = Vec::with_capacity(patterns.len());
    for entry in patterns {
        let value = &entry.pattern.value;
        let candidate = !entry.pattern.is_negative()
            && !value.is_empty()
            && !has_glob_magic(value.as_str())
            && fs.is_dir(&cwd.join(value)).await;

        match candidate.then(|| directory_globs(value, rule)).flatten() {
            Some(globs) => {
                tracing::debug!(directory = %value, ?globs, "expanded directory pattern");
                expanded.extend(globs.into_iter().map(|glob| Positioned {
                    position: entry.position,
                    pattern: ClassifiedPattern {
                        polarity: entry.pattern.polarity,
                        value: glob,
                    },
                }));
            }
            None => expanded.push(entry),
        }
    }
    expanded
}

/// The final component has a `.` that is not its first character.
fn has_extension(file: &str) -> bool {
    let name = file.rsplit('/').next().unwrap_or(file);
    name.rfind('.').is_some_and(|i| i > 0)
}

fn join(dir: &str, rest: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        format!("/{rest}")
    } else {
        format!("{dir}/{rest}")
    }
}
