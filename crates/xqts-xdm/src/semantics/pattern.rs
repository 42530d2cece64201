use crate::error::{ValueError, ValueResult};
use regex::{Regex, RegexBuilder};

/// Compile an XPath regular expression with its flag string
///
/// Supported flags are `s`, `m`, `i`, `x` and `q` (pattern is a literal string).
/// The pattern is unanchored, as for `fn:matches`.
pub fn xpath_regex(pattern: &str, flags: &str) -> ValueResult<Regex> {
    let (mut dot_all, mut multi_line, mut case_insensitive, mut extended, mut literal) =
        (false, false, false, false, false);
    for flag in flags.chars() {
        match flag {
            's' => dot_all = true,
            'm' => multi_line = true,
            'i' => case_insensitive = true,
            'x' => extended = true,
            'q' => literal = true,
            _ => {
                return Err(ValueError::InvalidRegexFlags {
                    flags: flags.to_string(),
                });
            }
        }
    }

    let source = if literal {
        regex::escape(pattern)
    } else {
        pattern.to_string()
    };
    RegexBuilder::new(&source)
        .dot_matches_new_line(dot_all)
        .multi_line(multi_line)
        .case_insensitive(case_insensitive)
        .ignore_whitespace(extended && !literal)
        .build()
        .map_err(|e| ValueError::InvalidRegex {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        assert!(xpath_regex("^A", "i").unwrap().is_match("abc"));
        assert!(!xpath_regex("^A", "").unwrap().is_match("abc"));
        assert!(xpath_regex("a.b", "s").unwrap().is_match("a\nb"));
        assert!(xpath_regex("^b$", "m").unwrap().is_match("a\nb\nc"));
        assert!(xpath_regex("a b c", "x").unwrap().is_match("abc"));
        assert!(xpath_regex("a.c", "q").unwrap().is_match("xa.cx"));
        assert!(!xpath_regex("a.c", "q").unwrap().is_match("abc"));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            xpath_regex("a", "z").unwrap_err().code().local_name(),
            "FORX0001"
        );
        assert_eq!(
            xpath_regex("(", "").unwrap_err().code().local_name(),
            "FORX0002"
        );
    }
}
