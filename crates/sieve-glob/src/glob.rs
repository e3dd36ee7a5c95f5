//! Single-component glob matching.
//!
//! Supported syntax:
//! - `*` matches zero or more characters
//! - `?` matches exactly one character
//! - `[abc]`, `[a-z]` character sets and ranges, `[!abc]` / `[^abc]` negated
//! - `{a,b,c}` alternatives and `{1..3}` / `{a..c}` sequences, nested freely
//! - `\x` matches `x` literally
//!
//! Path separators get no special treatment here; `GlobPath` splits a path
//! pattern into components and calls into this module once per component.

/// Sequences wider than this stay literal instead of exploding the pattern.
const MAX_SEQUENCE_LEN: u32 = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Char(char),
    AnyChar,
    Star,
    Class { negated: bool, items: Vec<ClassItem> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClassItem {
    Single(char),
    Range(char, char),
}

impl Token {
    fn accepts(&self, c: char, case_sensitive: bool) -> bool {
        match self {
            Token::Char(p) => chars_equal(*p, c, case_sensitive),
            Token::AnyChar => true,
            Token::Star => false,
            Token::Class { negated, items } => {
                let hit = items.iter().any(|item| item.accepts(c, case_sensitive));
                hit != *negated
            }
        }
    }
}

impl ClassItem {
    fn accepts(&self, c: char, case_sensitive: bool) -> bool {
        match *self {
            ClassItem::Single(p) => chars_equal(p, c, case_sensitive),
            ClassItem::Range(lo, hi) => {
                if (lo..=hi).contains(&c) {
                    return true;
                }
                !case_sensitive
                    && (c.to_lowercase().any(|l| (lo..=hi).contains(&l))
                        || c.to_uppercase().any(|u| (lo..=hi).contains(&u)))
            }
        }
    }
}

fn chars_equal(a: char, b: char, case_sensitive: bool) -> bool {
    a == b || (!case_sensitive && a.to_lowercase().eq(b.to_lowercase()))
}

/// Match a string against a glob pattern, case-sensitively.
///
/// The pattern must match the whole input.
///
/// ```
/// use sieve_glob::glob_match;
///
/// assert!(glob_match("*.tmp", "a.tmp"));
/// assert!(glob_match("{c,d,e}.tmp", "d.tmp"));
/// assert!(glob_match("file[0-9].txt", "file7.txt"));
/// assert!(!glob_match("*.tmp", "a.txt"));
/// ```
pub fn glob_match(pattern: &str, input: &str) -> bool {
    glob_match_with(pattern, input, true)
}

/// Match a string against a glob pattern, optionally ignoring case.
pub fn glob_match_with(pattern: &str, input: &str, case_sensitive: bool) -> bool {
    let input: Vec<char> = input.chars().collect();
    expand_braces(pattern)
        .iter()
        .any(|alt| match_tokens(&tokenize(alt), &input, case_sensitive))
}

/// Check if a string contains unescaped glob syntax.
///
/// Brace groups only count when they actually expand (`{a,b}` or `{1..3}`),
/// and `[` only counts when a `]` follows it.
///
/// ```
/// use sieve_glob::contains_glob;
/// assert!(contains_glob("**"));
/// assert!(contains_glob("src/[ab]*.txt"));
/// assert!(contains_glob("{a,b}.js"));
/// assert!(!contains_glob("{a}.js"));
/// assert!(!contains_glob("a\\*b"));
/// assert!(!contains_glob("path1"));
/// ```
pub fn contains_glob(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '*' | '?' => return true,
            '[' if chars[i + 1..].contains(&']') => return true,
            _ => {}
        }
        i += 1;
    }
    find_brace_group(&chars).is_some()
}

/// Backslash-escape every glob metacharacter, and `!`, so `s` matches only
/// itself wherever it is used.
///
/// ```
/// use sieve_glob::{escape, glob_match};
/// assert_eq!(escape("a[1].txt"), "a\\[1\\].txt");
/// assert!(glob_match(&escape("*weird?"), "*weird?"));
/// ```
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '*' | '?' | '[' | ']' | '{' | '}' | '!') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Expand brace groups into the full list of alternative patterns.
///
/// Groups without a `,` or a `..` sequence stay literal, as do unclosed
/// braces. Escaped braces never open a group.
///
/// ```
/// use sieve_glob::expand_braces;
///
/// assert_eq!(expand_braces("plain"), vec!["plain"]);
/// assert_eq!(expand_braces("{a,b}.tmp"), vec!["a.tmp", "b.tmp"]);
/// assert_eq!(expand_braces("v{1..3}"), vec!["v1", "v2", "v3"]);
/// assert_eq!(expand_braces("{only}"), vec!["{only}"]);
/// ```
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let Some(group) = find_brace_group(&chars) else {
        return vec![pattern.to_string()];
    };

    let prefix: String = chars[..group.open].iter().collect();
    let suffix: String = chars[group.close + 1..].iter().collect();

    group
        .alternatives
        .iter()
        .flat_map(|alt| expand_braces(&format!("{prefix}{alt}{suffix}")))
        .collect()
}

struct BraceGroup {
    open: usize,
    close: usize,
    alternatives: Vec<String>,
}

/// Locate the first brace group that expands to more than itself.
fn find_brace_group(chars: &[char]) -> Option<BraceGroup> {
    let mut from = 0;
    while let Some(open) = next_unescaped(chars, from, '{') {
        if let Some(close) = matching_close(chars, open) {
            let body = &chars[open + 1..close];
            let alternatives = split_alternatives(body);
            if alternatives.len() > 1 {
                return Some(BraceGroup {
                    open,
                    close,
                    alternatives,
                });
            }
            let body: String = body.iter().collect();
            if let Some(sequence) = expand_sequence(&body) {
                return Some(BraceGroup {
                    open,
                    close,
                    alternatives: sequence,
                });
            }
        }
        from = open + 1;
    }
    None
}

fn next_unescaped(chars: &[char], from: usize, wanted: char) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == wanted => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn matching_close(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split a brace body on top-level commas. Escapes are kept verbatim.
fn split_alternatives(body: &[char]) -> Vec<String> {
    let mut alternatives = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < body.len() {
        let c = body[i];
        match c {
            '\\' => {
                current.push(c);
                if let Some(&next) = body.get(i + 1) {
                    current.push(next);
                    i += 1;
                }
            }
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => alternatives.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
        i += 1;
    }
    alternatives.push(current);
    alternatives
}

/// `1..5`, `5..1`, `a..e`: numeric or single-character sequences.
fn expand_sequence(body: &str) -> Option<Vec<String>> {
    let (start, end) = body.split_once("..")?;

    if let (Ok(lo), Ok(hi)) = (start.parse::<i64>(), end.parse::<i64>()) {
        if lo.abs_diff(hi) >= u64::from(MAX_SEQUENCE_LEN) {
            return None;
        }
        let values: Vec<String> = if lo <= hi {
            (lo..=hi).map(|n| n.to_string()).collect()
        } else {
            (hi..=lo).rev().map(|n| n.to_string()).collect()
        };
        return Some(values);
    }

    let mut start_chars = start.chars();
    let mut end_chars = end.chars();
    match (
        start_chars.next(),
        start_chars.next(),
        end_chars.next(),
        end_chars.next(),
    ) {
        (Some(lo), None, Some(hi), None) if lo.is_ascii_alphabetic() && hi.is_ascii_alphabetic() => {
            let (a, b) = (lo as u32, hi as u32);
            let range: Vec<u32> = if a <= b {
                (a..=b).collect()
            } else {
                (b..=a).rev().collect()
            };
            Some(
                range
                    .into_iter()
                    .filter_map(char::from_u32)
                    .map(String::from)
                    .collect(),
            )
        }
        _ => None,
    }
}

/// Compile a brace-free pattern into tokens.
fn tokenize(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                tokens.push(Token::Char(chars[i + 1]));
                i += 2;
            }
            '*' => {
                if tokens.last() != Some(&Token::Star) {
                    tokens.push(Token::Star);
                }
                i += 1;
            }
            '?' => {
                tokens.push(Token::AnyChar);
                i += 1;
            }
            '[' => match parse_class(&chars[i..]) {
                Some((token, consumed)) => {
                    tokens.push(token);
                    i += consumed;
                }
                None => {
                    tokens.push(Token::Char('['));
                    i += 1;
                }
            },
            c => {
                tokens.push(Token::Char(c));
                i += 1;
            }
        }
    }
    tokens
}

/// Parse `[...]` at the start of `chars`. `None` when the class never closes.
fn parse_class(chars: &[char]) -> Option<(Token, usize)> {
    let mut i = 1;
    let negated = matches!(chars.get(i), Some('!' | '^'));
    if negated {
        i += 1;
    }

    let first = i;
    let mut items = Vec::new();
    loop {
        let c = *chars.get(i)?;
        if c == ']' && i > first {
            return Some((Token::Class { negated, items }, i + 1));
        }
        let c = if c == '\\' {
            i += 1;
            *chars.get(i)?
        } else {
            c
        };
        match (chars.get(i + 1), chars.get(i + 2)) {
            (Some('-'), Some(&hi)) if hi != ']' => {
                items.push(ClassItem::Range(c, hi));
                i += 3;
            }
            _ => {
                items.push(ClassItem::Single(c));
                i += 1;
            }
        }
    }
}

/// Linear-time wildcard matching: on mismatch, resume from the most recent
/// `*` with one more input character consumed.
fn match_tokens(tokens: &[Token], input: &[char], case_sensitive: bool) -> bool {
    let (mut t, mut i) = (0, 0);
    let mut resume: Option<(usize, usize)> = None;

    while i < input.len() {
        match tokens.get(t) {
            Some(Token::Star) => {
                resume = Some((t, i));
                t += 1;
                continue;
            }
            Some(token) if token.accepts(input[i], case_sensitive) => {
                t += 1;
                i += 1;
                continue;
            }
            _ => {}
        }

        match resume {
            Some((star, from)) => {
                t = star + 1;
                i = from + 1;
                resume = Some((star, from + 1));
            }
            None => return false,
        }
    }

    tokens[t..].iter().all(|token| *token == Token::Star)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_and_wildcards() {
        assert!(glob_match("a.tmp", "a.tmp"));
        assert!(!glob_match("a.tmp", "b.tmp"));
        assert!(glob_match("*", ""));
        assert!(glob_match("*.tmp", ".tmp"));
        assert!(glob_match("a*b*c", "aXXbYYc"));
        assert!(!glob_match("a*b*c", "aXXcYYb"));
        assert!(glob_match("?.tmp", "e.tmp"));
        assert!(!glob_match("?.tmp", "ee.tmp"));
    }

    #[test]
    fn star_backtracking_is_linear() {
        let pattern = format!("{}b", "*a".repeat(50));
        let input = "a".repeat(5000);
        assert!(!glob_match(&pattern, &input));
        assert!(glob_match("*a*a*a", &input));
    }

    #[test]
    fn classes() {
        assert!(glob_match("[abc].tmp", "b.tmp"));
        assert!(!glob_match("[abc].tmp", "d.tmp"));
        assert!(glob_match("[!abc].tmp", "d.tmp"));
        assert!(glob_match("[^abc].tmp", "d.tmp"));
        assert!(glob_match("[a-c][0-9]", "b7"));
        assert!(glob_match("[]x]", "]"));
        assert!(glob_match("[-a]", "-"));
        assert!(glob_match("[a-]", "-"));
        assert!(glob_match("[\\]]", "]"));
        // Unclosed class is a literal bracket.
        assert!(glob_match("[abc", "[abc"));
    }

    #[test]
    fn escapes() {
        assert!(glob_match("\\*.tmp", "*.tmp"));
        assert!(!glob_match("\\*.tmp", "a.tmp"));
        assert!(glob_match("\\{a,b\\}", "{a,b}"));
        assert!(glob_match("!unicorn.js", "!unicorn.js"));
    }

    #[test]
    fn braces() {
        assert!(glob_match("{c,d,e}.tmp", "c.tmp"));
        assert!(glob_match("{c,d,e}.tmp", "e.tmp"));
        assert!(!glob_match("{c,d,e}.tmp", "a.tmp"));
        assert!(glob_match("*.{js,ts}", "foo.ts"));
        assert!(glob_match("{a,{b,c}}x", "cx"));
        assert!(glob_match("x{,s}", "x"));
        assert!(glob_match("{only}", "{only}"));
        assert!(glob_match("{open", "{open"));
    }

    #[test]
    fn brace_sequences() {
        assert_eq!(expand_braces("{3..1}"), vec!["3", "2", "1"]);
        assert_eq!(expand_braces("{a..c}.tmp"), vec!["a.tmp", "b.tmp", "c.tmp"]);
        assert_eq!(expand_braces("{1..x}"), vec!["{1..x}"]);
        assert!(glob_match("log{1..9}", "log4"));
    }

    #[test]
    fn nested_and_multiple_groups() {
        let mut got = expand_braces("{a,b}{1,2}");
        got.sort();
        assert_eq!(got, vec!["a1", "a2", "b1", "b2"]);
        assert_eq!(expand_braces("{x{a,b}"), vec!["{xa", "{xb"]);
    }

    #[test]
    fn case_folding() {
        assert!(!glob_match("*.TMP", "a.tmp"));
        assert!(glob_match_with("*.TMP", "a.tmp", false));
        assert!(glob_match_with("[A-C].tmp", "b.tmp", false));
        assert!(!glob_match_with("[A-C].tmp", "d.tmp", false));
    }

    #[test]
    fn magic_detection() {
        assert!(contains_glob("*.tmp"));
        assert!(contains_glob("a?"));
        assert!(contains_glob("[ab]"));
        assert!(contains_glob("{a,b}"));
        assert!(contains_glob("{1..3}"));
        assert!(!contains_glob("[ab"));
        assert!(!contains_glob("{a}"));
        assert!(!contains_glob("tmp"));
        assert!(!contains_glob("\\*"));
    }

    #[test]
    fn escape_round_trips_through_match() {
        for name in [".gitignore", "a[1]{2}.js", "what?*", "back\\slash", "!bang"] {
            assert!(glob_match(&escape(name), name), "{name}");
        }
        assert!(!glob_match(&escape("*.js"), "a.js"));
    }
}
