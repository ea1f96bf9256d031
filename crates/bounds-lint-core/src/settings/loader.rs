//! DTO → model conversion with validation.
//!
//! Recoverable misconfiguration is reported to the run's [`Diagnostics`]
//! and replaced by a permissive default: invalid settings globs are dropped
//! with a warning. Only rule values that cannot be given a meaning (unknown
//! severities or defaults, invalid matcher globs) fail the load.

use std::path::PathBuf;

use crate::diagnostics::Diagnostics;
use crate::glob::{Glob, GlobError, GlobList};
use crate::matcher::{Constraints, Matcher, PatternTemplate};
use crate::policy::{DefaultPolicy, PolicyRule, RuleSet};
use crate::types::Severity;

use super::dto::{
    CaptureDto, ConstraintValueDto, ElementDto, ElementEntryDto, MatcherItemDto, MatcherSpecDto,
    OrderedMap, RuleDto, RuleEntryDto, RuleOptionsDto, SettingsDto,
};
use super::model::{ElementDescriptor, ElementPattern, Mode, Settings};

/// Errors during DTO → model conversion.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum LoadError {
    /// A rule matcher glob failed to compile.
    #[error("{context}: {source}")]
    #[diagnostic(code(bounds_lint::config::pattern))]
    Validation {
        /// Where the error occurred (e.g., "rules.element-types.rules[0].allow").
        context: String,
        /// The underlying glob error.
        source: GlobError,
    },

    /// Unknown severity string.
    #[error("{context}: unknown severity `{value}`, expected: error, warning, info, off")]
    #[diagnostic(code(bounds_lint::config::severity))]
    UnknownSeverity {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Unknown default policy string.
    #[error("{context}: unknown default `{value}`, expected: allow, disallow")]
    #[diagnostic(code(bounds_lint::config::default))]
    UnknownDefault {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },
}

/// Whether a rule kind runs, and at which severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleLevel {
    /// Disabled.
    Off,
    /// Enabled with the given severity.
    On(Severity),
}

/// Loaded configuration of one rule kind.
#[derive(Debug, Clone)]
pub struct RuleEntry {
    /// Severity or off; `None` keeps the preset's (or rule's) default.
    pub level: Option<RuleLevel>,
    /// Policy options, when `default` or `rules` were given.
    pub options: Option<RuleSet>,
    /// Whether uncle dependencies are allowed (`no-private`).
    pub allow_uncles: bool,
    /// Custom message template.
    pub message: Option<String>,
}

/// Converts the `[settings]` section into a snapshot rooted at `root`.
///
/// Element, ignore and include patterns that are not valid globs are
/// reported and left out; an element left without patterns is skipped.
pub fn load_settings(dto: SettingsDto, root: PathBuf, diagnostics: &mut Diagnostics) -> Settings {
    if dto.types.is_some() {
        diagnostics.warn_once("'types' setting is deprecated. Please use 'elements' instead");
    }
    let entries = dto.elements.or(dto.types).unwrap_or_default();
    if entries.is_empty() {
        diagnostics.warn_once("Please provide element types using the 'elements' setting");
    }

    let mut elements = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        let context = format!("settings.elements[{i}]");
        let descriptor = match entry {
            ElementEntryDto::Legacy(name) => {
                diagnostics.warn_once(
                    "Defining elements as strings in settings is deprecated. Will be automatically converted, but this feature will be removed in next major versions",
                );
                legacy_descriptor(&name, &context, diagnostics)
            }
            ElementEntryDto::Descriptor(dto) => convert_element(dto, &context, diagnostics),
        };
        elements.extend(descriptor);
    }

    let ignore = compile_list(&dto.ignore, "settings.ignore", diagnostics);
    let include = dto
        .include
        .map(|patterns| compile_list(&patterns, "settings.include", diagnostics));

    Settings::new(root, elements, ignore, include)
}

fn invalid_pattern(diagnostics: &mut Diagnostics, context: &str, source: &GlobError) {
    diagnostics.warn_once(format!("Invalid pattern in '{context}' setting will be ignored: {source}"));
}

fn compile_list(patterns: &[String], context: &str, diagnostics: &mut Diagnostics) -> GlobList {
    patterns
        .iter()
        .enumerate()
        .filter_map(|(i, pattern)| match Glob::new(pattern) {
            Ok(glob) => Some(glob),
            Err(source) => {
                invalid_pattern(diagnostics, &format!("{context}[{i}]"), &source);
                None
            }
        })
        .collect()
}

fn legacy_descriptor(
    name: &str,
    context: &str,
    diagnostics: &mut Diagnostics,
) -> Option<ElementDescriptor> {
    let pattern = format!("{name}/*");
    ElementDescriptor::from_patterns(name, &[pattern.as_str()], Mode::Folder, Some(&["elementName"]))
        .map_err(|source| invalid_pattern(diagnostics, context, &source))
        .ok()
}

fn convert_element(
    dto: ElementDto,
    context: &str,
    diagnostics: &mut Diagnostics,
) -> Option<ElementDescriptor> {
    let mode = match dto.mode.as_deref() {
        None => Mode::default(),
        Some(name) => Mode::parse(name).unwrap_or_else(|| {
            diagnostics.warn_once(format!(
                "Invalid mode property in 'elements' setting. Should be one of {}. Default value \"{}\" will be used instead",
                Mode::NAMES.join(","),
                Mode::default()
            ));
            Mode::default()
        }),
    };
    let capture = capture_names(dto.capture, diagnostics);
    let base_capture = capture_names(dto.base_capture, diagnostics);

    let patterns = dto.pattern.map(super::dto::OneOrMany::into_vec).unwrap_or_default();
    if patterns.is_empty() {
        diagnostics.warn_once("Please provide a valid pattern in 'elements' setting");
    }
    let Some(element_type) = dto.element_type.filter(|t| !t.is_empty()) else {
        diagnostics.warn_once("Please provide type in 'elements' setting");
        return None;
    };

    let compiled: Vec<ElementPattern> = patterns
        .iter()
        .enumerate()
        .filter_map(|(j, p)| {
            ElementPattern::new(p, dto.base_pattern.as_deref(), mode)
                .map_err(|source| {
                    invalid_pattern(diagnostics, &format!("{context}.pattern[{j}]"), &source);
                })
                .ok()
        })
        .collect();
    if compiled.is_empty() && !patterns.is_empty() {
        return None;
    }

    Some(ElementDescriptor::new(
        element_type,
        compiled,
        dto.base_pattern,
        mode,
        capture,
        base_capture,
    ))
}

fn capture_names(dto: Option<CaptureDto>, diagnostics: &mut Diagnostics) -> Option<Vec<String>> {
    match dto? {
        CaptureDto::List(names) => Some(names),
        CaptureDto::Invalid(_) => {
            diagnostics.warn_once("Invalid capture property in 'elements' setting");
            None
        }
    }
}

/// Converts one `[rules.<name>]` entry.
///
/// # Errors
///
/// Returns error on unknown severity or default names and invalid matcher globs.
pub fn load_rule_entry(name: &str, dto: RuleEntryDto) -> Result<RuleEntry, LoadError> {
    let context = format!("rules.{name}");
    match dto {
        RuleEntryDto::Severity(value) => Ok(RuleEntry {
            level: Some(parse_level(&value, &context)?),
            options: None,
            allow_uncles: false,
            message: None,
        }),
        RuleEntryDto::Options(options) => convert_options(options, &context),
    }
}

fn convert_options(dto: RuleOptionsDto, context: &str) -> Result<RuleEntry, LoadError> {
    let level = dto
        .severity
        .as_deref()
        .map(|s| parse_level(s, context))
        .transpose()?;

    let options = if dto.default.is_some() || dto.rules.is_some() {
        let default = match dto.default.as_deref() {
            None => DefaultPolicy::default(),
            Some(value) => {
                DefaultPolicy::parse(value).ok_or_else(|| LoadError::UnknownDefault {
                    context: format!("{context}.default"),
                    value: value.to_string(),
                })?
            }
        };
        let rules = dto
            .rules
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, rule)| convert_rule(rule, i, &format!("{context}.rules[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;
        Some(RuleSet::new(default, dto.message.clone(), rules))
    } else {
        None
    };

    Ok(RuleEntry {
        level,
        options,
        allow_uncles: dto.allow_uncles.unwrap_or(false),
        message: dto.message,
    })
}

fn parse_level(value: &str, context: &str) -> Result<RuleLevel, LoadError> {
    if value == "off" {
        return Ok(RuleLevel::Off);
    }
    Severity::parse(value)
        .map(RuleLevel::On)
        .ok_or_else(|| LoadError::UnknownSeverity {
            context: context.to_string(),
            value: value.to_string(),
        })
}

fn convert_rule(dto: RuleDto, index: usize, context: &str) -> Result<PolicyRule, LoadError> {
    let convert = |spec: Option<MatcherSpecDto>, key: &str| {
        spec.map(|s| convert_matchers(s, &format!("{context}.{key}")))
            .transpose()
            .map(Option::unwrap_or_default)
    };
    let mut rule = PolicyRule::new(index)
        .from(convert(dto.from, "from")?)
        .target(convert(dto.target, "target")?)
        .allow(convert(dto.allow, "allow")?)
        .disallow(convert(dto.disallow, "disallow")?);
    if let Some(message) = dto.message {
        rule = rule.message(message);
    }
    Ok(rule)
}

/// Converts a matcher specification into its alternatives.
///
/// # Errors
///
/// Returns error if a non-templated pattern is not a valid glob.
pub fn convert_matchers(spec: MatcherSpecDto, context: &str) -> Result<Vec<Matcher>, LoadError> {
    let items = match spec {
        MatcherSpecDto::Single(pattern) => vec![MatcherItemDto::Pattern(pattern)],
        MatcherSpecDto::Pair(pattern, constraints) => {
            vec![MatcherItemDto::Pair(pattern, constraints)]
        }
        MatcherSpecDto::List(items) => items,
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let validation = |source| LoadError::Validation {
                context: format!("{context}[{i}]"),
                source,
            };
            match item {
                MatcherItemDto::Pattern(pattern) => {
                    Ok(Matcher::Simple(PatternTemplate::new(&pattern).map_err(validation)?))
                }
                MatcherItemDto::Pair(pattern, constraints) => Ok(Matcher::Constrained(
                    PatternTemplate::new(&pattern).map_err(validation)?,
                    convert_constraints(constraints).map_err(validation)?,
                )),
            }
        })
        .collect()
}

fn convert_constraints(dto: OrderedMap<ConstraintValueDto>) -> Result<Constraints, GlobError> {
    let entries = dto
        .0
        .into_iter()
        .map(|(key, value)| {
            let patterns = match value {
                ConstraintValueDto::One(p) => vec![p],
                ConstraintValueDto::Many(ps) => ps,
            };
            let compiled = patterns
                .iter()
                .map(|p| PatternTemplate::new(p))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((key, compiled))
        })
        .collect::<Result<Vec<_>, GlobError>>()?;
    Ok(Constraints::new(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_from_json(json: &str, diagnostics: &mut Diagnostics) -> Settings {
        let dto: SettingsDto = serde_json::from_str(json).unwrap();
        load_settings(dto, PathBuf::from("."), diagnostics)
    }

    #[test]
    fn loads_descriptors_in_order() {
        let mut diagnostics = Diagnostics::new();
        let settings = settings_from_json(
            r#"{"elements": [
                {"type": "helpers", "pattern": "helpers/*", "capture": ["elementName"]},
                {"type": "models", "pattern": ["*.model.js"], "mode": "file"}
            ]}"#,
            &mut diagnostics,
        );
        assert!(diagnostics.is_empty());
        assert_eq!(settings.element_type_names(), vec!["helpers", "models"]);
        assert_eq!(settings.elements()[1].mode(), Mode::File);
    }

    #[test]
    fn missing_elements_warn() {
        let mut diagnostics = Diagnostics::new();
        let settings = settings_from_json("{}", &mut diagnostics);
        assert!(settings.elements().is_empty());
        assert_eq!(
            diagnostics.messages(),
            ["Please provide element types using the 'elements' setting"]
        );
    }

    #[test]
    fn invalid_fields_degrade_with_warnings() {
        let mut diagnostics = Diagnostics::new();
        let settings = settings_from_json(
            r#"{"elements": [
                {"type": "helpers", "pattern": "helpers/*", "mode": "folders", "capture": "x"},
                {"pattern": "untyped/*"}
            ]}"#,
            &mut diagnostics,
        );
        assert_eq!(settings.elements().len(), 1);
        let helpers = &settings.elements()[0];
        assert_eq!(helpers.mode(), Mode::Folder);
        assert!(helpers.capture().is_none());
        assert_eq!(diagnostics.messages().len(), 3);
        assert!(diagnostics.messages()[0].starts_with("Invalid mode property"));
        assert!(diagnostics.messages()[0].contains("folder,file,full"));
        assert_eq!(
            diagnostics.messages()[2],
            "Please provide type in 'elements' setting"
        );
    }

    #[test]
    fn legacy_and_deprecated_types() {
        let mut diagnostics = Diagnostics::new();
        let settings = settings_from_json(r#"{"types": ["helpers"]}"#, &mut diagnostics);
        let helpers = &settings.elements()[0];
        assert_eq!(helpers.patterns()[0].as_str(), "helpers/*");
        assert_eq!(helpers.capture(), Some(&["elementName".to_string()][..]));
        assert_eq!(diagnostics.messages().len(), 2);
    }

    #[test]
    fn invalid_settings_globs_are_dropped_with_warnings() {
        let mut diagnostics = Diagnostics::new();
        let settings = settings_from_json(
            r#"{"elements": [
                    {"type": "helpers", "pattern": ["helpers/[z-a]", "helpers/*"]},
                    {"type": "broken", "pattern": "broken/[z-a]"}
                ],
                "ignore": ["", "**/*.test.js"],
                "include": ["src/[z-a]"]}"#,
            &mut diagnostics,
        );

        assert_eq!(settings.element_type_names(), vec!["helpers"]);
        assert_eq!(settings.elements()[0].patterns().len(), 1);
        assert_eq!(settings.ignore().globs().len(), 1);
        assert!(settings.is_ignored("helpers/a/a.test.js"));
        assert!(settings.include().is_some_and(GlobList::is_empty));

        let messages = diagnostics.messages();
        assert_eq!(messages.len(), 4);
        assert!(messages[0].starts_with(
            "Invalid pattern in 'settings.elements[0].pattern[0]' setting will be ignored"
        ));
        assert!(messages[1].contains("'settings.elements[1].pattern[0]'"));
        assert!(messages[2].contains("'settings.ignore[0]'"));
        assert!(messages[3].contains("'settings.include[0]'"));
    }

    #[test]
    fn rule_entries() {
        let entry = load_rule_entry("no-unknown", RuleEntryDto::Severity("off".into())).unwrap();
        assert_eq!(entry.level, Some(RuleLevel::Off));

        let err = load_rule_entry("no-unknown", RuleEntryDto::Severity("fatal".into()));
        assert!(matches!(err, Err(LoadError::UnknownSeverity { .. })));

        let options: RuleOptionsDto = serde_json::from_str(
            r#"{"default": "allow", "message": "m", "rules": [
                {"from": "modules", "disallow": ["helpers", ["components", {"category": ["atoms", "molecules"]}]], "message": "r"}
            ]}"#,
        )
        .unwrap();
        let entry = load_rule_entry("element-types", RuleEntryDto::Options(options)).unwrap();
        let rule_set = entry.options.unwrap();
        assert_eq!(rule_set.default_policy(), DefaultPolicy::Allow);
        assert_eq!(rule_set.message(), Some("m"));
        let rule = &rule_set.rules()[0];
        assert_eq!(rule.disallow_matchers().len(), 2);
        assert_eq!(rule.rule_message(), Some("r"));
        let constraints = rule.disallow_matchers()[1].constraints().unwrap();
        assert_eq!(constraints.get("category").map(<[_]>::len), Some(2));
    }

    #[test]
    fn unknown_default_fails() {
        let options: RuleOptionsDto = serde_json::from_str(r#"{"default": "deny"}"#).unwrap();
        let err = load_rule_entry("element-types", RuleEntryDto::Options(options));
        assert!(matches!(err, Err(LoadError::UnknownDefault { .. })));
    }

    #[test]
    fn no_private_options_without_policy() {
        let options: RuleOptionsDto =
            serde_json::from_str(r#"{"allowUncles": true, "message": "private"}"#).unwrap();
        let entry = load_rule_entry("no-private", RuleEntryDto::Options(options)).unwrap();
        assert!(entry.allow_uncles);
        assert!(entry.options.is_none());
        assert_eq!(entry.message.as_deref(), Some("private"));
    }
}
