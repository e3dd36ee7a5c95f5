//! Gitignore-style rule sets.
//!
//! Each `.gitignore` contributes one rule set scoped to the directory that
//! holds it. Paths are checked relative to a common root; a rule set only
//! sees paths inside its own directory. Within and across sets the last
//! matching rule wins, and nothing inside an ignored directory can be
//! re-included.

use std::path::{Component, Path};

use crate::glob_path::{GlobPath, MatchFlags};
use crate::{WalkerError, WalkerFs};

/// One parsed line of an ignore file.
#[derive(Debug, Clone)]
struct IgnoreRule {
    glob: GlobPath,
    /// Line started with `!`: re-include instead of ignore.
    negated: bool,
    /// Line ended with `/`: only directories match.
    dir_only: bool,
}

impl IgnoreRule {
    fn parse(line: &str) -> Option<Self> {
        let line = trim_unescaped_spaces(line.trim_end_matches(['\n', '\r']));
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (mut pattern, negated) = match line.strip_prefix('!') {
            Some(rest) => (rest, true),
            None => (line, false),
        };
        // `\#` and `\!` escape the markers above; the glob layer drops the
        // backslash itself.

        let dir_only = pattern.ends_with('/') && !pattern.ends_with("\\/");
        if dir_only {
            pattern = &pattern[..pattern.len() - 1];
        }
        if pattern.is_empty() {
            return None;
        }

        // A slash anywhere but the end pins the pattern to the file's own
        // directory; otherwise it may match at any depth below it.
        let glob_text = if pattern.contains('/') {
            pattern.trim_start_matches('/').to_string()
        } else {
            format!("**/{pattern}")
        };

        let flags = MatchFlags {
            dot: true,
            case_sensitive: true,
        };
        let glob = GlobPath::with_flags(&glob_text, flags).ok()?;

        Some(IgnoreRule {
            glob,
            negated,
            dir_only,
        })
    }

    fn matches(&self, relative: &[&str], is_dir: bool) -> bool {
        (!self.dir_only || is_dir) && self.glob.matches_components(relative)
    }
}

/// Git keeps trailing spaces only when they are backslash-escaped.
fn trim_unescaped_spaces(line: &str) -> &str {
    let mut end = line.len();
    while line[..end].ends_with(' ') && !line[..end].ends_with("\\ ") {
        end -= 1;
    }
    &line[..end]
}

#[derive(Debug, Clone)]
struct RuleSet {
    base: Vec<String>,
    rules: Vec<IgnoreRule>,
}

/// Ordered collection of gitignore rule sets.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    sets: Vec<RuleSet>,
}

impl IgnoreFilter {
    /// Create an empty ignore filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single rule scoped to the root.
    pub fn add_rule(&mut self, pattern: &str) {
        if let Some(rule) = IgnoreRule::parse(pattern) {
            match self.sets.last_mut() {
                Some(set) if set.base.is_empty() => set.rules.push(rule),
                _ => self.sets.push(RuleSet {
                    base: Vec::new(),
                    rules: vec![rule],
                }),
            }
        }
    }

    /// Parse ignore-file text whose rules apply below `base`.
    ///
    /// Returns the number of rules added.
    pub fn add_rules_at(&mut self, base: &Path, text: &str) -> usize {
        let rules: Vec<IgnoreRule> = text.lines().filter_map(IgnoreRule::parse).collect();
        let added = rules.len();
        if added > 0 {
            self.sets.push(RuleSet {
                base: owned_components(base),
                rules,
            });
        }
        added
    }

    /// Read an ignore file through `fs` and scope its rules to `base`.
    pub async fn load<F: WalkerFs>(
        &mut self,
        fs: &F,
        file: &Path,
        base: &Path,
    ) -> Result<usize, WalkerError> {
        let content = fs.read_file(file).await?;
        let text = String::from_utf8_lossy(&content);
        Ok(self.add_rules_at(base, &text))
    }

    /// Append another filter's rule sets after this one's.
    pub fn merge(&mut self, other: &IgnoreFilter) {
        self.sets.extend(other.sets.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Total number of rules across all sets.
    pub fn rule_count(&self) -> usize {
        self.sets.iter().map(|set| set.rules.len()).sum()
    }

    /// Check whether a root-relative path is ignored.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        let components: Vec<&str> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();
        self.is_ignored_components(&components, is_dir)
    }

    /// Same as `is_ignored` for a path already split into components.
    pub fn is_ignored_components(&self, components: &[&str], is_dir: bool) -> bool {
        if components.is_empty() {
            return false;
        }
        for end in 1..components.len() {
            if self.verdict(&components[..end], true) == Some(true) {
                return true;
            }
        }
        self.verdict(components, is_dir) == Some(true)
    }

    /// Decision of the last matching rule, if any.
    fn verdict(&self, components: &[&str], is_dir: bool) -> Option<bool> {
        let mut verdict = None;
        for set in &self.sets {
            let Some(relative) = strip_base(components, &set.base) else {
                continue;
            };
            for rule in &set.rules {
                if rule.matches(relative, is_dir) {
                    verdict = Some(!rule.negated);
                }
            }
        }
        verdict
    }
}

fn strip_base<'a, 'b>(components: &'a [&'b str], base: &[String]) -> Option<&'a [&'b str]> {
    if components.len() <= base.len() {
        return None;
    }
    let (head, rest) = components.split_at(base.len());
    head.iter().zip(base).all(|(a, b)| *a == b).then_some(rest)
}

fn owned_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}
