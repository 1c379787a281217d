//! String utility functions.

use once_cell::sync::Lazy;
use regex::Regex;

static CAMEL_LOWER_UPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());
static DISALLOWED_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

const MAX_SLUG_LENGTH: usize = 48;

/// Turn a human-readable name into a lowercase, dash-separated identifier.
///
/// Non-ASCII characters are dropped, camelCase is split, and runs of any
/// other character collapse into a single dash. Returns `"prompt"` when
/// nothing usable is left.
pub fn slugify(name: &str, max_length: Option<usize>) -> String {
    let max_len = max_length.unwrap_or(MAX_SLUG_LENGTH);

    let ascii: String = name.chars().filter(|c| c.is_ascii()).collect();
    let split = CAMEL_LOWER_UPPER.replace_all(&ascii, "${1}-${2}");
    let lowered = split.to_lowercase();
    let dashed = DISALLOWED_CHARS.replace_all(&lowered, "-");
    let trimmed = dashed.trim_matches('-');

    let truncated = if trimmed.len() > max_len {
        trimmed[..max_len].trim_end_matches('-')
    } else {
        trimmed
    };

    if truncated.is_empty() {
        "prompt".to_string()
    } else {
        truncated.to_string()
    }
}

/// Trimmed string, or `None` when blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Candidate Fit Review", None), "candidate-fit-review");
    }

    #[test]
    fn test_slugify_camel_case_and_symbols() {
        assert_eq!(slugify("fifthQuestion v2!!", None), "fifth-question-v2");
    }

    #[test]
    fn test_slugify_empty_falls_back() {
        assert_eq!(slugify("  ***  ", None), "prompt");
        assert_eq!(slugify("日本語", None), "prompt");
    }

    #[test]
    fn test_slugify_truncates() {
        assert_eq!(slugify("abc def ghi", Some(5)), "abc-d");
        assert_eq!(slugify("abcd efgh", Some(5)), "abcd");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  hi ")), Some("hi"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
