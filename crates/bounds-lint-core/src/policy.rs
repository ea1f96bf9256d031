//! Ordered allow/disallow rule evaluation.
//!
//! Rules are selected by matching their main-key matcher against the main
//! element, then folded in declaration order against the target. The last
//! rule whose allow or disallow list matches decides the verdict; when none
//! matches, the rule set default applies.

use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::element::ElementInfo;
use crate::glob;
use crate::matcher::{self, ElementKey, Matcher, Subject};
use crate::settings::Settings;

/// Verdict used when no rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultPolicy {
    /// Allow by default.
    Allow,
    /// Disallow by default.
    #[default]
    Disallow,
}

impl DefaultPolicy {
    /// Parses `"allow"` / `"disallow"`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "allow" => Some(Self::Allow),
            "disallow" => Some(Self::Disallow),
            _ => None,
        }
    }
}

/// Side of a rule used to select which rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MainKey {
    /// Rules are selected by the referring file.
    #[default]
    From,
    /// Rules are selected by the dependency.
    Target,
}

impl MainKey {
    /// Configuration key name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::From => "from",
            Self::Target => "target",
        }
    }
}

/// One configured rule.
#[derive(Debug, Clone, Default)]
pub struct PolicyRule {
    index: usize,
    from: Vec<Matcher>,
    target: Vec<Matcher>,
    allow: Vec<Matcher>,
    disallow: Vec<Matcher>,
    message: Option<String>,
}

impl PolicyRule {
    /// Creates a rule at position `index` of its rule set.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Sets the `from` selector.
    #[must_use]
    pub fn from(mut self, matchers: Vec<Matcher>) -> Self {
        self.from = matchers;
        self
    }

    /// Sets the `target` selector.
    #[must_use]
    pub fn target(mut self, matchers: Vec<Matcher>) -> Self {
        self.target = matchers;
        self
    }

    /// Sets the allow list.
    #[must_use]
    pub fn allow(mut self, matchers: Vec<Matcher>) -> Self {
        self.allow = matchers;
        self
    }

    /// Sets the disallow list.
    #[must_use]
    pub fn disallow(mut self, matchers: Vec<Matcher>) -> Self {
        self.disallow = matchers;
        self
    }

    /// Sets the rule message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Zero-based position in the rule set.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Selector for `main_key`.
    #[must_use]
    pub fn selector(&self, main_key: MainKey) -> &[Matcher] {
        match main_key {
            MainKey::From => &self.from,
            MainKey::Target => &self.target,
        }
    }

    /// Allow list.
    #[must_use]
    pub fn allow_matchers(&self) -> &[Matcher] {
        &self.allow
    }

    /// Disallow list.
    #[must_use]
    pub fn disallow_matchers(&self) -> &[Matcher] {
        &self.disallow
    }

    /// Rule-specific message.
    #[must_use]
    pub fn rule_message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Options of one policy-checking rule kind.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    default: DefaultPolicy,
    message: Option<String>,
    rules: Vec<PolicyRule>,
}

/// Why a verdict was reached, when it was not an allow match.
#[derive(Debug, Clone)]
pub enum RuleReport<'a> {
    /// No disallow matched after the last allow; the default applies.
    Default {
        /// Rule set message.
        message: Option<&'a str>,
    },
    /// A rule's disallow list matched.
    Disallowed {
        /// Zero-based rule index.
        index: usize,
        /// The rule's main-key selector.
        selector: &'a [Matcher],
        /// The rule's disallow list.
        disallow: &'a [Matcher],
        /// Rule message, falling back to the rule set message.
        message: Option<&'a str>,
    },
}

impl RuleReport<'_> {
    /// Custom message to report, if configured.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Default { message } | Self::Disallowed { message, .. } => *message,
        }
    }
}

/// Outcome of evaluating a rule set.
#[derive(Debug, Clone)]
pub struct Verdict<'a> {
    /// Whether the dependency is allowed.
    pub allowed: bool,
    /// Match report of the deciding matcher (matched specifier patterns).
    pub report: Option<Vec<String>>,
    /// Default or disallow detail; cleared by an allow match.
    pub rule_report: Option<RuleReport<'a>>,
}

impl RuleSet {
    /// Creates a rule set.
    #[must_use]
    pub fn new(default: DefaultPolicy, message: Option<String>, rules: Vec<PolicyRule>) -> Self {
        Self {
            default,
            message,
            rules,
        }
    }

    /// Default verdict.
    #[must_use]
    pub fn default_policy(&self) -> DefaultPolicy {
        self.default
    }

    /// Rule set message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    /// Rules whose `main_key` selector matches `element` by type.
    #[must_use]
    pub fn rules_for(&self, element: &ElementInfo, main_key: MainKey) -> Vec<&PolicyRule> {
        let context = matcher::match_context(element, element);
        self.rules
            .iter()
            .filter(|rule| {
                matcher::is_match_element_type(element, rule.selector(main_key), &context)
            })
            .collect()
    }

    /// Evaluates the rule set for a dependency of `file` on `target`.
    ///
    /// Rules are selected by `file` when `main_key` is [`MainKey::From`] and
    /// by `target` otherwise; allow/disallow lists are matched against
    /// `target` on the `key` field.
    #[must_use]
    pub fn evaluate<S: Subject + ?Sized>(
        &self,
        file: &ElementInfo,
        target: &S,
        key: ElementKey,
        main_key: MainKey,
    ) -> Verdict<'_> {
        let context = matcher::match_context(file, target.element());
        let initial = Verdict {
            allowed: self.default == DefaultPolicy::Allow,
            report: None,
            rule_report: Some(RuleReport::Default {
                message: self.message(),
            }),
        };

        self.rules_for(main_element(file, target, main_key), main_key)
            .into_iter()
            .fold(initial, |verdict, rule| {
                let disallowed = matcher::match_any(target, &rule.disallow, key, &context);
                if disallowed.matched {
                    return Verdict {
                        allowed: false,
                        report: disallowed.report,
                        rule_report: Some(RuleReport::Disallowed {
                            index: rule.index,
                            selector: rule.selector(main_key),
                            disallow: &rule.disallow,
                            message: rule.rule_message().or(self.message()),
                        }),
                    };
                }
                let allowed = matcher::match_any(target, &rule.allow, key, &context);
                if allowed.matched {
                    return Verdict {
                        allowed: true,
                        report: allowed.report,
                        rule_report: None,
                    };
                }
                debug!("rule {} does not match the dependency", rule.index + 1);
                verdict
            })
    }

    /// Selected rules whose allow list (or, lacking one, disallow list)
    /// matches `target`, in declaration order.
    #[must_use]
    pub fn matching_rules<S: Subject + ?Sized>(
        &self,
        file: &ElementInfo,
        target: &S,
        key: ElementKey,
        main_key: MainKey,
    ) -> Vec<&PolicyRule> {
        let context = matcher::match_context(file, target.element());
        self.rules_for(main_element(file, target, main_key), main_key)
            .into_iter()
            .filter(|rule| {
                let list = if rule.allow.is_empty() {
                    &rule.disallow
                } else {
                    &rule.allow
                };
                matcher::match_any(target, list, key, &context).matched
            })
            .collect()
    }
}

fn main_element<'a, S: Subject + ?Sized>(
    file: &'a ElementInfo,
    target: &'a S,
    main_key: MainKey,
) -> &'a ElementInfo {
    match main_key {
        MainKey::From => file,
        MainKey::Target => target.element(),
    }
}

/// Warns about non-templated matchers that select no configured element type.
///
/// With `only_main_key`, allow/disallow lists are not checked (they match on
/// another field than the type).
pub fn validate_rule_set(
    rule_set: &RuleSet,
    settings: &Settings,
    main_key: MainKey,
    only_main_key: bool,
    diagnostics: &mut Diagnostics,
) {
    let type_names = settings.element_type_names();
    for rule in rule_set.rules() {
        let mut lists = vec![rule.selector(main_key)];
        if !only_main_key {
            lists.push(rule.allow_matchers());
            lists.push(rule.disallow_matchers());
        }
        for m in lists.into_iter().flatten() {
            let pattern = m.pattern();
            if pattern.is_templated() {
                continue;
            }
            if !type_names
                .iter()
                .any(|name| glob::is_match(name, pattern.as_str()))
            {
                diagnostics.warn_once(format!(
                    "Option '{}' does not match any element type from 'elements' setting",
                    pattern.as_str()
                ));
            }
        }
    }
}
