//! Glob patterns with positional captures.
//!
//! Patterns are translated once into anchored regular expressions. Every
//! wildcard becomes a capture group so that callers can bind captured path
//! fragments to names:
//!
//! - `*` matches within one path segment
//! - `?` matches one character within a segment
//! - `**` as a whole segment matches zero or more segments
//! - `{a,b}` matches one of the alternatives
//! - `[abc]` / `[!abc]` match character classes
//! - a leading `!` negates the pattern (negated patterns capture nothing)
//!
//! Wildcards never match a segment that starts with `.`; a literal dot in
//! the pattern (`.*`, `**/.cache/*`) is needed to reach dotfiles. A `*` that
//! fills a whole segment never matches an empty one.

use regex::Regex;

/// One or more path segments, none starting with `.`.
const DOTLESS_SEGMENTS: &str = "[^/.][^/]*?(?:/[^/.][^/]*?)*?";

/// Errors from glob compilation.
#[derive(Debug, Clone, thiserror::Error, miette::Diagnostic)]
pub enum GlobError {
    /// Glob pattern is empty.
    #[error("glob pattern must not be empty")]
    #[diagnostic(code(bounds_lint::glob::empty))]
    Empty,

    /// The translated expression was rejected.
    #[error("invalid glob pattern `{pattern}`: {reason}")]
    #[diagnostic(code(bounds_lint::glob::invalid))]
    Invalid {
        /// The offending pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct Glob {
    raw: String,
    negated: bool,
    regex: Regex,
}

impl Glob {
    /// Compiles a glob pattern.
    ///
    /// # Errors
    ///
    /// Returns error if the pattern is empty or cannot be translated.
    pub fn new(pattern: &str) -> Result<Self, GlobError> {
        if pattern.is_empty() {
            return Err(GlobError::Empty);
        }
        let (negated, body) = match pattern.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, pattern),
        };
        let regex = Regex::new(&translate(body)).map_err(|e| GlobError::Invalid {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            negated,
            regex,
        })
    }

    /// Tests whether `path` matches this pattern.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path) != self.negated
    }

    /// Matches `path` and returns the captured wildcard fragments in order.
    ///
    /// Groups that did not participate in the match yield empty strings.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<Vec<String>> {
        if self.negated {
            return self.is_match(path).then(Vec::new);
        }
        let caps = self.regex.captures(path)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }

    /// Returns the pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// An ordered list of globs; matches when any member matches.
#[derive(Debug, Clone, Default)]
pub struct GlobList {
    globs: Vec<Glob>,
}

impl GlobList {
    /// Compiles every pattern in `patterns`.
    ///
    /// # Errors
    ///
    /// Returns the first compilation error.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, GlobError> {
        let globs = patterns
            .iter()
            .map(|p| Glob::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { globs })
    }

    /// Tests whether `path` matches any pattern.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.globs.iter().any(|g| g.is_match(path))
    }

    /// Returns true if the list holds no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.globs.is_empty()
    }

    /// Returns the compiled globs.
    #[must_use]
    pub fn globs(&self) -> &[Glob] {
        &self.globs
    }
}

impl FromIterator<Glob> for GlobList {
    fn from_iter<I: IntoIterator<Item = Glob>>(iter: I) -> Self {
        Self {
            globs: iter.into_iter().collect(),
        }
    }
}

/// One-shot match of `path` against a raw pattern.
///
/// Invalid patterns never match.
#[must_use]
pub fn is_match(path: &str, pattern: &str) -> bool {
    Glob::new(pattern).is_ok_and(|g| g.is_match(path))
}

fn translate(pattern: &str) -> String {
    let segments = split_segments(pattern);
    let last = segments.len().saturating_sub(1);
    let mut out = String::from("^");
    let mut need_sep = false;

    for (i, segment) in segments.iter().enumerate() {
        if segment == "**" {
            if i == last {
                if need_sep {
                    out.push_str(&format!("(?:/({DOTLESS_SEGMENTS}))?"));
                } else {
                    out.push_str(&format!("((?:{DOTLESS_SEGMENTS})?)"));
                }
            } else {
                if need_sep {
                    out.push('/');
                }
                out.push_str(&format!("(?:({DOTLESS_SEGMENTS})/)?"));
                need_sep = false;
            }
        } else {
            if need_sep {
                out.push('/');
            }
            translate_segment(&segment.chars().collect::<Vec<_>>(), true, &mut out);
            need_sep = true;
        }
    }

    out.push('$');
    out
}

/// Splits on `/` outside of brace groups.
fn split_segments(pattern: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut escaped = false;

    for c in pattern.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                current.push(c);
                escaped = true;
            }
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            '/' if depth == 0 => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);
    segments
}

/// Translates one segment; `at_start` is true when `chars` begins the segment.
fn translate_segment(chars: &[char], at_start: bool, out: &mut String) {
    let mut i = 0;
    while i < chars.len() {
        let leading = at_start && i == 0;
        match chars[i] {
            '*' => {
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
                if !leading {
                    out.push_str("([^/]*?)");
                } else if matches!(chars.get(i + 1), None | Some('.')) {
                    out.push_str("([^/.][^/]*?)");
                } else {
                    out.push_str("((?:[^/.][^/]*?)?)");
                }
            }
            '?' => out.push_str(if leading { "([^/.])" } else { "([^/])" }),
            '[' => match class_end(chars, i) {
                Some(end) => {
                    push_class(&chars[i + 1..end], out);
                    i = end;
                }
                None => out.push_str(r"\["),
            },
            '{' => match brace_end(chars, i) {
                Some(end) => {
                    let alternatives = split_alternatives(&chars[i + 1..end]);
                    if alternatives.len() < 2 {
                        push_literal(&chars[i..=end], out);
                    } else {
                        out.push('(');
                        for (k, alternative) in alternatives.iter().enumerate() {
                            if k > 0 {
                                out.push('|');
                            }
                            translate_segment(alternative, leading, out);
                        }
                        out.push(')');
                    }
                    i = end;
                }
                None => out.push_str(r"\{"),
            },
            '\\' if i + 1 < chars.len() => {
                i += 1;
                push_literal(&chars[i..=i], out);
            }
            _ => push_literal(&chars[i..=i], out),
        }
        i += 1;
    }
}

fn push_literal(chars: &[char], out: &mut String) {
    let text: String = chars.iter().collect();
    out.push_str(&regex::escape(&text));
}

fn push_class(body: &[char], out: &mut String) {
    out.push('[');
    let body = match body.first() {
        Some('!' | '^') => {
            out.push('^');
            &body[1..]
        }
        _ => body,
    };
    for &c in body {
        if matches!(c, '[' | ']' | '\\' | '&' | '~') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(']');
}

fn class_end(chars: &[char], start: usize) -> Option<usize> {
    // `[]` and `[!]` are not classes
    let first = start + 1 + usize::from(matches!(chars.get(start + 1), Some('!' | '^')));
    (first + 1..chars.len())
        .find(|&j| chars[j] == ']')
        .filter(|_| first < chars.len() && chars[first] != ']')
}

fn brace_end(chars: &[char], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (j, &c) in chars.iter().enumerate().skip(start) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_alternatives(chars: &[char]) -> Vec<Vec<char>> {
    let mut alternatives = vec![Vec::new()];
    let mut depth = 0usize;
    for &c in chars {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                alternatives.push(Vec::new());
                continue;
            }
            _ => {}
        }
        if let Some(current) = alternatives.last_mut() {
            current.push(c);
        }
    }
    alternatives
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(pattern: &str, path: &str) -> Option<Vec<String>> {
        Glob::new(pattern).unwrap().captures(path)
    }

    #[test]
    fn star_stays_within_segment() {
        let g = Glob::new("helpers/*").unwrap();
        assert!(g.is_match("helpers/helper-a"));
        assert!(!g.is_match("helpers/helper-a/Helper.js"));
        assert!(!g.is_match("src/helpers/helper-a"));
    }

    #[test]
    fn folder_suffix_requires_inner_file() {
        let g = Glob::new("helpers/*/**/*").unwrap();
        assert!(g.is_match("helpers/helper-a/Helper.js"));
        assert!(g.is_match("helpers/helper-a/sub/deep/Helper.js"));
        assert!(!g.is_match("helpers/helper-a"));
    }

    #[test]
    fn captures_are_positional() {
        assert_eq!(
            caps("helpers/*/**/*", "helpers/helper-a/Helper.js"),
            Some(vec![
                "helper-a".to_string(),
                String::new(),
                "Helper.js".to_string()
            ])
        );
        assert_eq!(
            caps("components/*/*", "components/atoms/atom-a"),
            Some(vec!["atoms".to_string(), "atom-a".to_string()])
        );
    }

    #[test]
    fn globstar_matches_zero_or_more_segments() {
        let g = Glob::new("**/*.test.js").unwrap();
        assert!(g.is_match("a.test.js"));
        assert!(g.is_match("src/deep/a.test.js"));
        assert!(!g.is_match("src/a.js"));

        let g = Glob::new("src/**").unwrap();
        assert!(g.is_match("src"));
        assert!(g.is_match("src/a/b.js"));
        assert!(!g.is_match("lib/a.js"));

        assert!(Glob::new("**").unwrap().is_match("any/thing/at/all"));
    }

    #[test]
    fn braces_and_classes() {
        let g = Glob::new("*.{js,ts}").unwrap();
        assert!(g.is_match("index.ts"));
        assert!(!g.is_match("index.rs"));

        let g = Glob::new("module-[ab]").unwrap();
        assert!(g.is_match("module-a"));
        assert!(!g.is_match("module-c"));

        let g = Glob::new("module-[!ab]").unwrap();
        assert!(g.is_match("module-c"));
        assert!(!g.is_match("module-a"));
    }

    #[test]
    fn question_mark_matches_one_char() {
        let g = Glob::new("**/*.spec?.js").unwrap();
        assert!(g.is_match("a/b.specs.js"));
        assert!(!g.is_match("a/b.spec.js"));
    }

    #[test]
    fn literal_dots_and_escapes() {
        let g = Glob::new("index.js").unwrap();
        assert!(g.is_match("index.js"));
        assert!(!g.is_match("indexxjs"));
        assert!(Glob::new(r"a\*b").unwrap().is_match("a*b"));
    }

    #[test]
    fn negation_inverts() {
        let g = Glob::new("!helpers/*").unwrap();
        assert!(g.is_match("modules/module-a"));
        assert!(!g.is_match("helpers/helper-a"));
        assert_eq!(g.captures("modules/x"), Some(vec![]));
    }

    #[test]
    fn wildcards_skip_dot_segments() {
        let g = Glob::new("helpers/*").unwrap();
        assert!(!g.is_match("helpers/.hidden"));
        assert!(!g.is_match("helpers/"));
        assert!(Glob::new("helpers/.*").unwrap().is_match("helpers/.hidden"));

        let g = Glob::new("**/*.test.js").unwrap();
        assert!(!g.is_match("src/.cache/a.test.js"));
        assert!(!g.is_match(".a.test.js"));
        assert!(Glob::new("**/.cache/*.test.js")
            .unwrap()
            .is_match("src/.cache/a.test.js"));

        assert!(!Glob::new("src/**").unwrap().is_match("src/.git/config"));
        assert!(!Glob::new("?x").unwrap().is_match(".x"));
        assert!(Glob::new("*foo").unwrap().is_match("foo"));
        assert!(!Glob::new("*.{js,ts}").unwrap().is_match(".ts"));
    }

    #[test]
    fn glob_list_matches_any() {
        let list = GlobList::new(&["helpers/*", "modules/*"]).unwrap();
        assert!(list.is_match("modules/module-a"));
        assert!(!list.is_match("components/x"));
        assert!(!GlobList::default().is_match("anything"));
    }

    #[test]
    fn empty_pattern_rejected() {
        assert!(matches!(Glob::new(""), Err(GlobError::Empty)));
    }

    #[test]
    fn scoped_package_names_match() {
        assert!(is_match("@material-ui/core", "@material-ui/*"));
        assert!(is_match("react", "react"));
        assert!(!is_match("react-dom", "react"));
    }
}
