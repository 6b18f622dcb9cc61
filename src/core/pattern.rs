//! Turns free-form search text into a bounded matcher.
//!
//! Patterns are compiled with the `regex` crate, whose automata run in time
//! linear in the haystack, so no user input can trigger catastrophic
//! backtracking. The substring denylist below is only a fast-path pre-filter
//! kept for parity with the stored search strings users already have; it is
//! a heuristic and rejects some harmless patterns (any `(?` group).

use std::ops::Range;

use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Longest search input considered, in characters.
pub const MAX_PATTERN_LEN: usize = 100;

const DENYLIST: [&str; 3] = ["(?", "*+", "+*"];
const ALLOWED_FLAGS: [char; 3] = ['g', 'i', 'm'];
const COMPILED_SIZE_LIMIT: usize = 1 << 20;

/// Compiled search predicate.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
    global: bool,
}

impl Matcher {
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Byte ranges to highlight in `text`: every match when the `g` flag was
    /// given, otherwise only the first. Empty matches are skipped.
    pub fn spans(&self, text: &str) -> Vec<Range<usize>> {
        let matches = self
            .regex
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| m.range());
        if self.global {
            matches.collect()
        } else {
            matches.take(1).collect()
        }
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_global(&self) -> bool {
        self.global
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Flags {
    global: bool,
    ignore_case: bool,
    multi_line: bool,
}

impl Flags {
    fn parse(raw: &str) -> Option<Self> {
        let mut flags = Flags::default();
        let mut any = false;
        for ch in raw.chars().filter(|c| ALLOWED_FLAGS.contains(c)) {
            any = true;
            match ch {
                'g' => flags.global = true,
                'i' => flags.ignore_case = true,
                'm' => flags.multi_line = true,
                _ => {}
            }
        }
        any.then_some(flags)
    }
}

/// Compiles `input` into a matcher, or `None` meaning "no filter".
///
/// `/pattern/flags` input keeps only the `g`, `i` and `m` flags; if none of
/// those survive, the default applies (case-insensitive unless
/// `case_sensitive`). Anything else is the literal pattern text.
pub fn compile(input: Option<&str>, case_sensitive: bool) -> Option<Matcher> {
    let input = input?;
    if input.is_empty() {
        return None;
    }
    let bounded: String = input.chars().take(MAX_PATTERN_LEN).collect();

    let default_flags = Flags {
        ignore_case: !case_sensitive,
        ..Flags::default()
    };
    let (pattern, flags) = split_delimited(&bounded)
        .map(|(body, raw_flags)| (body, Flags::parse(raw_flags).unwrap_or(default_flags)))
        .unwrap_or((bounded.as_str(), default_flags));

    if let Some(hit) = DENYLIST.iter().find(|needle| pattern.contains(*needle)) {
        debug!(pattern, denied = *hit, "search pattern rejected");
        return None;
    }

    match RegexBuilder::new(pattern)
        .case_insensitive(flags.ignore_case)
        .multi_line(flags.multi_line)
        .size_limit(COMPILED_SIZE_LIMIT)
        .dfa_size_limit(COMPILED_SIZE_LIMIT)
        .build()
    {
        Ok(regex) => Some(Matcher {
            regex,
            global: flags.global,
        }),
        Err(err) => {
            debug!(pattern, error = %err, "search pattern failed to compile");
            None
        }
    }
}

/// Splits `/body/flags`; the closing slash is the last one in the input.
fn split_delimited(input: &str) -> Option<(&str, &str)> {
    let rest = input.strip_prefix('/')?;
    let last = rest.rfind('/')?;
    Some((&rest[..last], &rest[last + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_or_missing_input_means_no_filter() {
        assert!(compile(None, false).is_none());
        assert!(compile(Some(""), false).is_none());
    }

    #[test]
    fn plain_text_is_case_insensitive_by_default() {
        let matcher = compile(Some("coffee"), false).unwrap();
        assert!(matcher.is_match("Morning COFFEE"));
        let strict = compile(Some("coffee"), true).unwrap();
        assert!(!strict.is_match("Morning COFFEE"));
    }

    #[test]
    fn slash_form_strips_delimiters_and_unknown_flags() {
        let matcher = compile(Some("/^caf/xyzg"), false).unwrap();
        assert_eq!(matcher.pattern(), "^caf");
        assert!(matcher.is_global());
        // explicit flags replace the default, so matching is case-sensitive here
        assert!(!matcher.is_match("Cafe"));
        assert!(matcher.is_match("cafe"));
    }

    #[test]
    fn slash_form_without_flags_keeps_default() {
        let matcher = compile(Some("/bus/"), false).unwrap();
        assert!(matcher.is_match("BUS fare"));
    }

    #[test]
    fn single_leading_slash_is_literal() {
        let matcher = compile(Some("/"), false).unwrap();
        assert!(matcher.is_match("a/b"));
    }

    #[test]
    fn denylisted_constructs_are_rejected() {
        assert!(compile(Some("(?=a)"), false).is_none());
        assert!(compile(Some("(?:ab)+"), false).is_none());
        assert!(compile(Some("a*+"), false).is_none());
        assert!(compile(Some("/a+*/g"), false).is_none());
    }

    #[test]
    fn malformed_pattern_degrades_to_none() {
        assert!(compile(Some("(unclosed"), false).is_none());
        assert!(compile(Some("[z-a]"), false).is_none());
    }

    #[test]
    fn overlong_input_is_truncated_before_compiling() {
        let input = format!("{}{}", "a".repeat(MAX_PATTERN_LEN), "(");
        let matcher = compile(Some(&input), false).expect("truncated pattern compiles");
        assert_eq!(matcher.pattern().len(), MAX_PATTERN_LEN);
    }

    #[test]
    fn spans_cover_first_match_unless_global() {
        let once = compile(Some("a"), false).unwrap();
        assert_eq!(once.spans("banana"), vec![1..2]);
        let all = compile(Some("/a/g"), false).unwrap();
        assert_eq!(all.spans("banana"), vec![1..2, 3..4, 5..6]);
    }

    #[test]
    fn classic_backtracking_bomb_stays_fast() {
        let matcher = compile(Some("(a+)+$"), false).unwrap();
        let haystack = format!("{}!", "a".repeat(10_000));
        assert!(!matcher.is_match(&haystack));
    }
}
