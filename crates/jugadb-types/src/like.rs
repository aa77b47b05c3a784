//! The LIKE matcher (spec.md §4.7). A hand-rolled recursive backtracking
//! matcher, not a regex translation — it needs to support `%`/`*` wildcards,
//! `_` single-char wildcards, `[...]` character classes, `\x` escapes, and an
//! optional `(?i)` case-insensitive prefix exactly as spec'd, which doesn't
//! map cleanly onto a single `Regex::new` call.

pub fn like_matches(text: &str, pattern: &str) -> bool {
    let (pattern, case_insensitive) = match pattern.strip_prefix("(?i)") {
        Some(rest) => (rest, true),
        None => (pattern, false),
    };

    let (text_owned, pattern_owned);
    let (text, pattern) = if case_insensitive {
        text_owned = text.to_lowercase();
        pattern_owned = pattern.to_lowercase();
        (text_owned.as_str(), pattern_owned.as_str())
    } else {
        (text, pattern)
    };

    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    do_match(&text, 0, &pattern, 0)
}

fn do_match(text: &[char], ti: usize, pattern: &[char], pi: usize) -> bool {
    if pi == pattern.len() {
        return ti == text.len();
    }

    match pattern[pi] {
        '\\' if pi + 1 < pattern.len() => {
            if ti < text.len() && text[ti] == pattern[pi + 1] {
                do_match(text, ti + 1, pattern, pi + 2)
            } else {
                false
            }
        }
        '%' | '*' => {
            // Greedy: try consuming the longest possible match first, then
            // backtrack.
            for consume in (0..=text.len().saturating_sub(ti)).rev() {
                if do_match(text, ti + consume, pattern, pi + 1) {
                    return true;
                }
            }
            false
        }
        '_' => ti < text.len() && do_match(text, ti + 1, pattern, pi + 1),
        '[' => {
            let Some((matches_here, next_pi)) = match_char_class(text.get(ti).copied(), pattern, pi)
            else {
                return false;
            };
            matches_here && ti < text.len() && do_match(text, ti + 1, pattern, next_pi)
        }
        c => ti < text.len() && text[ti] == c && do_match(text, ti + 1, pattern, pi + 1),
    }
}

/// Parses a `[...]` class starting at `pattern[pi] == '['`. Returns whether
/// `ch` is a member, and the index just past the closing `]`.
fn match_char_class(ch: Option<char>, pattern: &[char], pi: usize) -> Option<(bool, usize)> {
    let mut i = pi + 1;
    let negate = pattern.get(i) == Some(&'^');
    if negate {
        i += 1;
    }

    let class_start = i;
    while i < pattern.len() && pattern[i] != ']' {
        i += 1;
    }
    if i >= pattern.len() {
        return None; // unterminated class
    }
    let class_end = i;
    let next_pi = i + 1;

    let Some(ch) = ch else {
        return Some((false, next_pi));
    };

    let mut member = false;
    let mut j = class_start;
    while j < class_end {
        if j + 2 < class_end && pattern[j + 1] == '-' {
            let (lo, hi) = (pattern[j], pattern[j + 2]);
            if lo <= ch && ch <= hi {
                member = true;
            }
            j += 3;
        } else {
            if pattern[j] == ch {
                member = true;
            }
            j += 1;
        }
    }

    Some((member != negate, next_pi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_matches_anything_including_empty() {
        assert!(like_matches("", "%"));
        assert!(like_matches("anything at all", "%"));
    }

    #[test]
    fn prefix_and_suffix_wildcards() {
        assert!(like_matches("person@example.com", "%@example.com"));
        assert!(like_matches("Alice", "A%"));
        assert!(!like_matches("Bob", "A%"));
    }

    #[test]
    fn underscore_matches_one_char() {
        assert!(like_matches("cat", "c_t"));
        assert!(!like_matches("ct", "c_t"));
    }

    #[test]
    fn character_class_with_range_and_negation() {
        assert!(like_matches("b", "[a-c]"));
        assert!(!like_matches("d", "[a-c]"));
        assert!(like_matches("d", "[^a-c]"));
    }

    #[test]
    fn case_insensitive_prefix() {
        assert!(like_matches("HELLO", "(?i)hello"));
    }

    #[test]
    fn escaped_literal_percent() {
        assert!(like_matches("100%", r"100\%"));
        assert!(!like_matches("100x", r"100\%"));
    }

    #[test]
    fn date_prefix_like() {
        assert!(like_matches("2025-04-12", "2025-04-%"));
        assert!(!like_matches("2025-05-12", "2025-04-%"));
    }
}
