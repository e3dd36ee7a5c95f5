//! Pattern input validation and positive/negative classification.

use serde_json::Value;
use sieve_glob::contains_glob;

use crate::error::{SieveError, SieveResult};

/// Anything accepted as the pattern argument of the public operations.
///
/// Typed inputs always convert. `serde_json::Value` is the dynamic boundary:
/// only a string or an array of strings is accepted.
pub trait IntoPatterns {
    fn into_patterns(self) -> SieveResult<Vec<String>>;
}

impl IntoPatterns for &str {
    fn into_patterns(self) -> SieveResult<Vec<String>> {
        Ok(vec![self.to_string()])
    }
}

impl IntoPatterns for String {
    fn into_patterns(self) -> SieveResult<Vec<String>> {
        Ok(vec![self])
    }
}

impl IntoPatterns for &String {
    fn into_patterns(self) -> SieveResult<Vec<String>> {
        Ok(vec![self.clone()])
    }
}

impl IntoPatterns for Vec<String> {
    fn into_patterns(self) -> SieveResult<Vec<String>> {
        Ok(self)
    }
}

impl IntoPatterns for Vec<&str> {
    fn into_patterns(self) -> SieveResult<Vec<String>> {
        Ok(self.into_iter().map(str::to_string).collect())
    }
}

impl IntoPatterns for &[&str] {
    fn into_patterns(self) -> SieveResult<Vec<String>> {
        Ok(self.iter().map(|p| p.to_string()).collect())
    }
}

impl IntoPatterns for &[String] {
    fn into_patterns(self) -> SieveResult<Vec<String>> {
        Ok(self.to_vec())
    }
}

impl<const N: usize> IntoPatterns for [&str; N] {
    fn into_patterns(self) -> SieveResult<Vec<String>> {
        Ok(self.iter().map(|p| p.to_string()).collect())
    }
}

impl IntoPatterns for &Value {
    fn into_patterns(self) -> SieveResult<Vec<String>> {
        match self {
            Value::String(s) => Ok(vec![s.clone()]),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(SieveError::InvalidPattern),
                })
                .collect(),
            _ => Err(SieveError::InvalidPattern),
        }
    }
}

impl IntoPatterns for Value {
    fn into_patterns(self) -> SieveResult<Vec<String>> {
        (&self).into_patterns()
    }
}

/// Whether a pattern includes or excludes its matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

/// A pattern with its negation markers resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedPattern {
    pub polarity: Polarity,
    /// The glob with the resolved markers stripped.
    pub value: String,
}

impl ClassifiedPattern {
    pub fn is_negative(&self) -> bool {
        self.polarity == Polarity::Negative
    }
}

/// Resolve leading `!` markers.
///
/// An odd count makes the pattern negative. Each pair of markers collapses
/// into one literal `!`, so `!!x` is the positive glob `!x`.
///
/// ```
/// use sieve::{classify, Polarity};
///
/// assert_eq!(classify("!*.tmp").polarity, Polarity::Negative);
/// assert_eq!(classify("!*.tmp").value, "*.tmp");
/// assert_eq!(classify("!!x").value, "!x");
/// assert_eq!(classify("!!x").polarity, Polarity::Positive);
/// ```
pub fn classify(pattern: &str) -> ClassifiedPattern {
    let markers = pattern.len() - pattern.trim_start_matches('!').len();
    let polarity = if markers % 2 == 1 {
        Polarity::Negative
    } else {
        Polarity::Positive
    };
    let mut value = "!".repeat(markers / 2);
    value.push_str(&pattern[markers..]);
    ClassifiedPattern { polarity, value }
}

/// True if any of the patterns contains glob syntax the matcher expands.
///
/// Leading negation markers are not glob syntax. Invalid input is never
/// magic.
///
/// ```
/// assert!(sieve::has_glob_magic("**"));
/// assert!(sieve::has_glob_magic(["**", "path1", "path2"]));
/// assert!(!sieve::has_glob_magic(["path1", "path2"]));
/// ```
pub fn has_glob_magic(patterns: impl IntoPatterns) -> bool {
    match patterns.into_patterns() {
        Ok(patterns) => patterns
            .iter()
            .any(|p| contains_glob(p.trim_start_matches('!'))),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("x", Polarity::Positive, "x")]
    #[case("!x", Polarity::Negative, "x")]
    #[case("!!x", Polarity::Positive, "!x")]
    #[case("!!!x", Polarity::Negative, "!x")]
    #[case("!!!!x", Polarity::Positive, "!!x")]
    #[case("a!b", Polarity::Positive, "a!b")]
    fn negation_parity(#[case] input: &str, #[case] polarity: Polarity, #[case] value: &str) {
        let classified = classify(input);
        assert_eq!(classified.polarity, polarity);
        assert_eq!(classified.value, value);
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!([{}]))]
    #[case(json!(true))]
    #[case(json!([true]))]
    #[case(json!(false))]
    #[case(json!([false]))]
    #[case(json!(null))]
    #[case(json!([null]))]
    #[case(json!(5))]
    #[case(json!([5]))]
    #[case(json!(["ok", 1]))]
    fn rejects_non_string_json(#[case] input: Value) {
        assert!(matches!(
            input.into_patterns(),
            Err(SieveError::InvalidPattern)
        ));
    }

    #[test]
    fn accepts_strings_and_sequences() {
        assert_eq!(json!("*.tmp").into_patterns().unwrap(), vec!["*.tmp"]);
        assert_eq!(
            json!(["a", "!b"]).into_patterns().unwrap(),
            vec!["a", "!b"]
        );
        assert!(json!([]).into_patterns().unwrap().is_empty());
        assert_eq!(["a", "b"].into_patterns().unwrap(), vec!["a", "b"]);
        assert_eq!("a".into_patterns().unwrap(), vec!["a"]);
    }

    #[rstest]
    #[case(&["**"], true)]
    #[case(&["**", "path1", "path2"], true)]
    #[case(&["path1", "path2"], false)]
    #[case(&["!*.tmp"], true)]
    #[case(&["!plain"], false)]
    #[case(&["file?.txt"], true)]
    #[case(&["[ab].js"], true)]
    #[case(&["{a,b}.js"], true)]
    #[case(&["{1..3}.js"], true)]
    #[case(&["{a}.js"], false)]
    #[case(&["\\*.js"], false)]
    fn glob_magic(#[case] patterns: &[&str], #[case] expected: bool) {
        assert_eq!(has_glob_magic(patterns), expected);
    }

    #[test]
    fn invalid_input_is_not_magic() {
        assert!(!has_glob_magic(json!([5, "**"])));
    }
}
