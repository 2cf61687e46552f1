//! Free-text escaping for substring pattern filters.
//!
//! Search text is embedded inside a `%...%` pattern that the store evaluates
//! with `LIKE ... ESCAPE '\'`. Backslash, percent, underscore and comma are
//! prefixed with a backslash. Backslash is escaped first so the
//! backslashes inserted for the other characters are not escaped again.

pub const ESCAPE_CHAR: char = '\\';

/// Escape `text` for literal use inside a substring pattern
pub fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
        .replace(',', "\\,")
}

/// Wrap escaped text as a contains-pattern
pub fn contains_pattern(text: &str) -> String {
    format!("%{}%", escape(text))
}

/// Match `text` against a `%`/`_` pattern produced by [`contains_pattern`],
/// ASCII case-insensitively. Mirrors the store's `LIKE ... ESCAPE '\'`.
pub fn like_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<PatternToken> = tokenize(pattern);
    let text: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();
    like_match_from(&pattern, &text)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PatternToken {
    AnySeq,
    AnyOne,
    Literal(char),
}

fn tokenize(pattern: &str) -> Vec<PatternToken> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        let token = match c {
            ESCAPE_CHAR => match chars.next() {
                Some(next) => PatternToken::Literal(next.to_ascii_lowercase()),
                None => PatternToken::Literal(ESCAPE_CHAR),
            },
            '%' => PatternToken::AnySeq,
            '_' => PatternToken::AnyOne,
            other => PatternToken::Literal(other.to_ascii_lowercase()),
        };
        tokens.push(token);
    }
    tokens
}

fn like_match_from(pattern: &[PatternToken], text: &[char]) -> bool {
    // Iterative wildcard match with single backtrack point for `%`.
    let (mut p, mut t) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        match pattern.get(p) {
            Some(PatternToken::AnySeq) => {
                star = Some((p, t));
                p += 1;
            }
            Some(PatternToken::AnyOne) => {
                p += 1;
                t += 1;
            }
            Some(PatternToken::Literal(c)) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                Some((sp, st)) => {
                    p = sp + 1;
                    t = st + 1;
                    star = Some((sp, st + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|tok| *tok == PatternToken::AnySeq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_percent() {
        assert_eq!(escape("100%"), "100\\%");
    }

    #[test]
    fn test_escape_all_specials_in_order() {
        assert_eq!(escape("a,b%c_d\\e"), "a\\,b\\%c\\_d\\\\e");
    }

    #[test]
    fn test_escape_plain_text_unchanged() {
        assert_eq!(escape("rust engineer"), "rust engineer");
        assert_eq!(escape(""), "");
    }

    #[test]
    fn test_backslash_escaped_once() {
        // A lone backslash becomes exactly two, not four.
        assert_eq!(escape("\\"), "\\\\");
        assert_eq!(escape("\\%"), "\\\\\\%");
    }

    #[test]
    fn test_escaped_wildcards_match_only_literally() {
        let pattern = contains_pattern("100%");
        assert!(like_match(&pattern, "Save 100% today"));
        assert!(!like_match(&pattern, "Save 1000 today"));

        let pattern = contains_pattern("a_b");
        assert!(like_match(&pattern, "xa_bx"));
        assert!(!like_match(&pattern, "xacbx"));
    }

    #[test]
    fn test_like_match_is_case_insensitive() {
        assert!(like_match(&contains_pattern("ACME"), "acme corp"));
        assert!(!like_match(&contains_pattern("acme"), "ac me"));
    }

    #[test]
    fn test_unescaped_wildcards_behave_as_wildcards() {
        assert!(like_match("a%c", "abbbc"));
        assert!(like_match("a_c", "abc"));
        assert!(!like_match("a_c", "abbc"));
    }
}
