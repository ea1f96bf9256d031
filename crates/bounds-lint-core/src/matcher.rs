//! Element matchers used by rule selectors and allow/disallow lists.
//!
//! A matcher is a glob over one element field, optionally constrained by
//! globs over captured values. Patterns may reference captures of the
//! elements being compared through `${from.*}` / `${target.*}` placeholders,
//! so templated patterns are compiled lazily per evaluation.

use crate::element::ElementInfo;
use crate::glob::{self, Glob, GlobError};
use crate::template::{self, TemplateVars};

/// Constraint key that matches import specifiers instead of captures.
pub const SPECIFIERS_KEY: &str = "specifiers";

/// A glob pattern that may contain `${...}` placeholders.
#[derive(Debug, Clone)]
pub struct PatternTemplate {
    raw: String,
    compiled: Option<Glob>,
}

impl PatternTemplate {
    /// Parses a pattern, compiling it eagerly unless it is templated.
    ///
    /// # Errors
    ///
    /// Returns error if a non-templated pattern is not a valid glob.
    pub fn new(raw: &str) -> Result<Self, GlobError> {
        let compiled = if template::has_placeholder(raw) {
            None
        } else {
            Some(Glob::new(raw)?)
        };
        Ok(Self {
            raw: raw.to_string(),
            compiled,
        })
    }

    /// Pattern as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true if the pattern references captured values.
    #[must_use]
    pub fn is_templated(&self) -> bool {
        self.compiled.is_none()
    }

    /// Matches `value`, resolving placeholders against `context` first.
    #[must_use]
    pub fn is_match(&self, value: &str, context: &TemplateVars) -> bool {
        match &self.compiled {
            Some(glob) => glob.is_match(value),
            None => glob::is_match(value, &template::substitute(&self.raw, context)),
        }
    }
}

/// Capture constraints of a matcher, in declaration order.
///
/// Each key may carry several alternative patterns.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    entries: Vec<(String, Vec<PatternTemplate>)>,
}

impl Constraints {
    /// Creates constraints from `(key, patterns)` pairs.
    #[must_use]
    pub fn new(entries: Vec<(String, Vec<PatternTemplate>)>) -> Self {
        Self { entries }
    }

    /// Looks up the patterns for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[PatternTemplate]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// Iterates over `(key, patterns)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PatternTemplate])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Returns true if there are no constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One matcher alternative.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Bare glob over the element field.
    Simple(PatternTemplate),
    /// Glob over the element field plus capture constraints.
    Constrained(PatternTemplate, Constraints),
}

impl Matcher {
    /// Builds a simple matcher.
    ///
    /// # Errors
    ///
    /// Returns error if the pattern is not a valid glob.
    pub fn simple(pattern: &str) -> Result<Self, GlobError> {
        Ok(Self::Simple(PatternTemplate::new(pattern)?))
    }

    /// Builds a constrained matcher from `(key, pattern)` pairs.
    ///
    /// # Errors
    ///
    /// Returns error if any pattern is not a valid glob.
    pub fn constrained(pattern: &str, constraints: &[(&str, &str)]) -> Result<Self, GlobError> {
        let entries = constraints
            .iter()
            .map(|(k, v)| Ok(((*k).to_string(), vec![PatternTemplate::new(v)?])))
            .collect::<Result<Vec<_>, GlobError>>()?;
        Ok(Self::Constrained(
            PatternTemplate::new(pattern)?,
            Constraints::new(entries),
        ))
    }

    /// Glob over the element field.
    #[must_use]
    pub fn pattern(&self) -> &PatternTemplate {
        match self {
            Self::Simple(p) | Self::Constrained(p, _) => p,
        }
    }

    /// Capture constraints, if any.
    #[must_use]
    pub fn constraints(&self) -> Option<&Constraints> {
        match self {
            Self::Simple(_) => None,
            Self::Constrained(_, c) => Some(c),
        }
    }
}

/// Which field of the subject a matcher's glob is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKey {
    /// Element type.
    Type,
    /// Path inside the element.
    InternalPath,
    /// Package name of an external import; `specifiers` constraints apply.
    BaseModule,
}

/// Something matchers can be evaluated against.
pub trait Subject {
    /// Classification of the subject.
    fn element(&self) -> &ElementInfo;

    /// Package name, for external imports.
    fn base_module(&self) -> Option<&str> {
        None
    }

    /// Names imported by the dependency statement.
    fn specifiers(&self) -> &[String] {
        &[]
    }
}

impl Subject for ElementInfo {
    fn element(&self) -> &ElementInfo {
        self
    }
}

/// Result of matching a subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Whether the subject matched.
    pub matched: bool,
    /// Specifier patterns that matched, for base-module matchers.
    pub report: Option<Vec<String>>,
}

impl MatchOutcome {
    fn no_match() -> Self {
        Self::default()
    }

    fn plain(matched: bool) -> Self {
        Self {
            matched,
            report: None,
        }
    }
}

/// Template context used when comparing `from` against `target`.
#[must_use]
pub fn match_context(from: &ElementInfo, target: &ElementInfo) -> TemplateVars {
    TemplateVars::new()
        .with_nested("from", from.capture_vars())
        .with_nested("target", target.capture_vars())
}

/// Tests a single matcher against `subject`.
#[must_use]
pub fn is_match<S: Subject + ?Sized>(
    subject: &S,
    matcher: &Matcher,
    key: ElementKey,
    context: &TemplateVars,
) -> MatchOutcome {
    let element = subject.element();
    let value = match key {
        ElementKey::Type => element.element_type.as_deref(),
        ElementKey::InternalPath => element.internal_path.as_deref(),
        ElementKey::BaseModule => subject.base_module(),
    };
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return MatchOutcome::no_match();
    };
    if !matcher.pattern().is_match(value, context) {
        return MatchOutcome::no_match();
    }
    let Some(constraints) = matcher.constraints() else {
        return MatchOutcome::plain(true);
    };

    if key == ElementKey::BaseModule {
        return match constraints.get(SPECIFIERS_KEY) {
            Some(patterns) => specifiers_match(subject.specifiers(), patterns, context),
            None => MatchOutcome::plain(true),
        };
    }

    MatchOutcome::plain(captures_match(element, constraints, context))
}

/// Tests alternatives left to right, stopping at the first match.
#[must_use]
pub fn match_any<S: Subject + ?Sized>(
    subject: &S,
    matchers: &[Matcher],
    key: ElementKey,
    context: &TemplateVars,
) -> MatchOutcome {
    matchers
        .iter()
        .map(|m| is_match(subject, m, key, context))
        .find(|outcome| outcome.matched)
        .unwrap_or_default()
}

/// Convenience for matching by element type.
#[must_use]
pub fn is_match_element_type(
    element: &ElementInfo,
    matchers: &[Matcher],
    context: &TemplateVars,
) -> bool {
    match_any(element, matchers, ElementKey::Type, context).matched
}

fn captures_match(element: &ElementInfo, constraints: &Constraints, context: &TemplateVars) -> bool {
    constraints.iter().all(|(key, patterns)| {
        element
            .captured(key)
            .is_some_and(|value| patterns.iter().any(|p| p.is_match(value, context)))
    })
}

fn specifiers_match(
    specifiers: &[String],
    patterns: &[PatternTemplate],
    context: &TemplateVars,
) -> MatchOutcome {
    let found: Vec<String> = patterns
        .iter()
        .filter(|p| specifiers.iter().any(|s| p.is_match(s, context)))
        .map(|p| p.as_str().to_string())
        .collect();
    MatchOutcome {
        matched: !found.is_empty(),
        report: Some(found),
    }
}
