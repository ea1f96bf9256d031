//! Rule presets for common configurations.

use bounds_lint_core::settings::dto::ConfigDto;
use bounds_lint_core::settings::RuleLevel;
use bounds_lint_core::Severity;

use crate::{
    element_types, entry_point, external, no_ignored, no_private, no_unknown, no_unknown_files,
};

/// Every built-in rule name, in evaluation order.
pub const RULE_NAMES: [&str; 7] = [
    element_types::NAME,
    entry_point::NAME,
    external::NAME,
    no_private::NAME,
    no_unknown::NAME,
    no_ignored::NAME,
    no_unknown_files::NAME,
];

/// Ignore patterns applied by every preset when none are configured.
pub const DEFAULT_IGNORE: [&str; 2] = ["**/*.spec?.js", "**/*.test?.js"];

/// Preset configurations for bounds-lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Policy rules plus `no-private`; uncles are allowed unless
    /// `no-private` is configured explicitly.
    Recommended,
    /// Recommended plus `no-ignored`, `no-unknown` and `no-unknown-files`.
    Strict,
}

impl Preset {
    /// Parses a preset name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "recommended" => Some(Self::Recommended),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    /// Level this preset gives the rule called `rule`.
    #[must_use]
    pub fn level(self, rule: &str) -> RuleLevel {
        let enabled = match rule {
            element_types::NAME | entry_point::NAME | external::NAME | no_private::NAME => true,
            no_ignored::NAME | no_unknown::NAME | no_unknown_files::NAME => self == Self::Strict,
            _ => false,
        };
        if enabled {
            RuleLevel::On(Severity::Error)
        } else {
            RuleLevel::Off
        }
    }

    /// Fills settings this preset provides defaults for.
    pub fn apply(self, dto: &mut ConfigDto) {
        if dto.settings.ignore.is_empty() {
            dto.settings.ignore = DEFAULT_IGNORE.iter().map(ToString::to_string).collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_levels() {
        assert_eq!(
            Preset::Recommended.level("element-types"),
            RuleLevel::On(Severity::Error)
        );
        assert_eq!(Preset::Recommended.level("no-unknown"), RuleLevel::Off);
        assert_eq!(
            Preset::Strict.level("no-unknown-files"),
            RuleLevel::On(Severity::Error)
        );
        assert_eq!(Preset::Strict.level("exports"), RuleLevel::Off);
    }

    #[test]
    fn parse_names() {
        assert_eq!(Preset::parse("strict"), Some(Preset::Strict));
        assert_eq!(Preset::parse("minimal"), None);
    }

    #[test]
    fn apply_keeps_configured_ignore() {
        let mut dto = ConfigDto::default();
        Preset::Recommended.apply(&mut dto);
        assert_eq!(dto.settings.ignore, DEFAULT_IGNORE);

        dto.settings.ignore = vec!["dist/**".to_string()];
        Preset::Strict.apply(&mut dto);
        assert_eq!(dto.settings.ignore, vec!["dist/**"]);
    }
}
