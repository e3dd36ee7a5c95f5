//! Path-aware glob matching with globstar (`**`) support.
//!
//! A `GlobPath` splits a pattern on `/` into segments and matches them
//! against path components, so `*` never crosses a directory boundary while
//! `**` spans any number of them:
//!
//! - `**/*.tmp` matches `a.tmp`, `tmp/a.tmp`, `x/y/a.tmp`
//! - `tmp/**` matches `tmp` and everything under it
//! - `{a,b}/*.js` expands before splitting, so braces may contain `/`
//!
//! Leading `..` components climb out of the directory the pattern is matched
//! from: `../x/*.tmp` keeps the climb as `parent_hops()` and matches
//! `x/*.tmp` against paths relative to that ancestor.
//!
//! Unless `dot` is set, wildcard segments and `**` skip components that start
//! with `.`; a segment that spells the dot out (`.gitignore`, `.*`) still
//! matches.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::glob::{contains_glob, expand_braces, glob_match_with};

/// Errors when parsing glob patterns.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("empty pattern")]
    Empty,
}

/// Knobs that change what a pattern matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchFlags {
    /// Let wildcards and `**` match names starting with `.`.
    pub dot: bool,
    /// Compare characters exactly (default) or case-insensitively.
    pub case_sensitive: bool,
}

impl Default for MatchFlags {
    fn default() -> Self {
        Self {
            dot: false,
            case_sensitive: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// Exact component, escapes already removed.
    Literal(String),
    /// Single-component glob handed to `glob_match_with`.
    Pattern(String),
    /// Zero or more whole components.
    Globstar,
}

/// A compiled path glob.
///
/// # Examples
/// ```
/// use sieve_glob::GlobPath;
/// use std::path::Path;
///
/// let pattern = GlobPath::new("**/*.tmp").unwrap();
/// assert!(pattern.matches(Path::new("a.tmp")));
/// assert!(pattern.matches(Path::new("tmp/b.tmp")));
/// assert!(!pattern.matches(Path::new(".hidden/b.tmp")));
/// assert!(!pattern.matches(Path::new("a.txt")));
/// ```
#[derive(Debug, Clone)]
pub struct GlobPath {
    raw: String,
    alternatives: Vec<Vec<Segment>>,
    absolute: bool,
    parent_hops: usize,
    flags: MatchFlags,
}

impl GlobPath {
    /// Compile with default flags (no dot files, case-sensitive).
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Self::with_flags(pattern, MatchFlags::default())
    }

    /// Compile with explicit flags.
    pub fn with_flags(pattern: &str, flags: MatchFlags) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        let (mut body, absolute) = match pattern.strip_prefix('/') {
            Some(rest) => (rest, true),
            None => (pattern, false),
        };
        let mut parent_hops = 0;
        if !absolute {
            loop {
                if let Some(rest) = body.strip_prefix("./") {
                    body = rest;
                } else if let Some(rest) = body.strip_prefix("../") {
                    body = rest;
                    parent_hops += 1;
                } else if body == ".." {
                    body = "";
                    parent_hops += 1;
                } else {
                    break;
                }
            }
        }

        let alternatives = expand_braces(body)
            .iter()
            .map(|alt| compile_segments(alt))
            .collect();

        Ok(GlobPath {
            raw: pattern.to_string(),
            alternatives,
            absolute,
            parent_hops,
            flags,
        })
    }

    /// The pattern text this was compiled from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern starts at the filesystem root.
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// Number of leading `..` components. Matching happens relative to the
    /// directory that many levels up.
    ///
    /// ```
    /// use sieve_glob::GlobPath;
    /// use std::path::Path;
    ///
    /// let pattern = GlobPath::new("../x/*.tmp").unwrap();
    /// assert_eq!(pattern.parent_hops(), 1);
    /// assert!(pattern.matches(Path::new("x/a.tmp")));
    /// ```
    pub fn parent_hops(&self) -> usize {
        self.parent_hops
    }

    pub fn flags(&self) -> MatchFlags {
        self.flags
    }

    /// Check a relative path against the pattern.
    pub fn matches(&self, path: &Path) -> bool {
        let components = path_components(path);
        self.matches_components(&components)
    }

    /// Check a path given as `/`-separated components.
    pub fn matches_components(&self, components: &[&str]) -> bool {
        self.alternatives
            .iter()
            .any(|segments| self.match_from(segments, components, 0, 0))
    }

    /// Whether anything strictly below `dir` could still match.
    ///
    /// The walker uses this to skip subtrees that cannot contribute.
    pub fn could_match_below(&self, dir: &[&str]) -> bool {
        self.alternatives
            .iter()
            .any(|segments| self.descend(segments, dir, 0, 0))
    }

    /// Leading literal directories shared by every match, excluding the final
    /// segment: the walk can start there instead of at the root.
    ///
    /// ```
    /// use sieve_glob::GlobPath;
    /// use std::path::PathBuf;
    ///
    /// assert_eq!(GlobPath::new("tmp/**").unwrap().walk_base(), PathBuf::from("tmp"));
    /// assert_eq!(GlobPath::new("src/lib/*.rs").unwrap().walk_base(), PathBuf::from("src/lib"));
    /// assert_eq!(GlobPath::new("a.tmp").unwrap().walk_base(), PathBuf::new());
    /// assert_eq!(GlobPath::new("{a,b}/*.js").unwrap().walk_base(), PathBuf::new());
    /// ```
    pub fn walk_base(&self) -> PathBuf {
        let mut base = PathBuf::new();
        let [segments] = self.alternatives.as_slice() else {
            return base;
        };
        if !self.flags.case_sensitive {
            return base;
        }
        let Some((_, parents)) = segments.split_last() else {
            return base;
        };
        for segment in parents {
            match segment {
                Segment::Literal(name) => base.push(name),
                _ => break,
            }
        }
        base
    }

    fn match_from(
        &self,
        segments: &[Segment],
        components: &[&str],
        seg: usize,
        comp: usize,
    ) -> bool {
        let Some(segment) = segments.get(seg) else {
            return comp == components.len();
        };

        match segment {
            Segment::Globstar => {
                // Try every split point the globstar may legally absorb.
                let mut end = comp;
                loop {
                    if self.match_from(segments, components, seg + 1, end) {
                        return true;
                    }
                    match components.get(end) {
                        Some(name) if self.globstar_accepts(name) => end += 1,
                        _ => return false,
                    }
                }
            }
            _ => match components.get(comp) {
                Some(name) if self.segment_accepts(segment, name) => {
                    self.match_from(segments, components, seg + 1, comp + 1)
                }
                _ => false,
            },
        }
    }

    fn descend(&self, segments: &[Segment], dir: &[&str], seg: usize, comp: usize) -> bool {
        if comp == dir.len() {
            return seg < segments.len();
        }
        let Some(segment) = segments.get(seg) else {
            return false;
        };

        match segment {
            Segment::Globstar => {
                self.descend(segments, dir, seg + 1, comp)
                    || (self.globstar_accepts(dir[comp])
                        && self.descend(segments, dir, seg, comp + 1))
            }
            _ => {
                self.segment_accepts(segment, dir[comp])
                    && self.descend(segments, dir, seg + 1, comp + 1)
            }
        }
    }

    fn globstar_accepts(&self, name: &str) -> bool {
        self.flags.dot || !name.starts_with('.')
    }

    fn segment_accepts(&self, segment: &Segment, name: &str) -> bool {
        match segment {
            Segment::Literal(lit) => {
                if self.flags.case_sensitive {
                    lit == name
                } else {
                    lit.to_lowercase() == name.to_lowercase()
                }
            }
            Segment::Pattern(pat) => {
                if name.starts_with('.') && !self.flags.dot && !spells_leading_dot(pat) {
                    return false;
                }
                glob_match_with(pat, name, self.flags.case_sensitive)
            }
            Segment::Globstar => self.globstar_accepts(name),
        }
    }
}

fn compile_segments(pattern: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    for part in pattern.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == "**" {
            if segments.last() != Some(&Segment::Globstar) {
                segments.push(Segment::Globstar);
            }
        } else if contains_glob(part) {
            segments.push(Segment::Pattern(part.to_string()));
        } else {
            segments.push(Segment::Literal(unescape(part)));
        }
    }
    segments
}

fn spells_leading_dot(pattern: &str) -> bool {
    pattern.starts_with('.') || pattern.starts_with("\\.")
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn path_components(path: &Path) -> Vec<&str> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .collect()
}
