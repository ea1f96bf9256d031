//! Runs enabled boundary rules over host-supplied files.

use std::path::Path;
use std::sync::Arc;

use bounds_lint_core::settings::dto::ConfigDto;
use bounds_lint_core::settings::{RuleEntry, RuleLevel};
use bounds_lint_core::{
    validate_rule_set, Config, ConfigError, DependencyRule, Diagnostics, Engine, LintResult,
    Location, MainKey, RuleBox, Severity, SourceFile,
};
use tracing::{debug, info};

use crate::presets::{Preset, RULE_NAMES};
use crate::{
    element_types, entry_point, external, no_ignored, no_private, no_unknown, no_unknown_files,
    ElementTypes, EntryPoint, External, NoIgnored, NoPrivate, NoUnknown, NoUnknownFiles,
};

/// Errors from building a linter.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum LinterError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    /// Preset name is not known.
    #[error("unknown preset `{name}`, expected: recommended, strict")]
    #[diagnostic(code(bounds_lint::config::preset))]
    UnknownPreset {
        /// The invalid name.
        name: String,
    },
}

/// Boundary linter bound to one configuration snapshot.
///
/// `Linter` is `Send + Sync`; one instance may check files from several
/// threads, sharing its classification cache.
pub struct Linter {
    engine: Engine,
    rules: Vec<RuleBox>,
}

impl std::fmt::Debug for Linter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linter")
            .field("engine", &self.engine)
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Linter {
    /// Creates a linter without rules.
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            rules: Vec::new(),
        }
    }

    /// Adds a rule.
    #[must_use]
    pub fn rule<R: DependencyRule + 'static>(self, rule: R) -> Self {
        self.rule_box(Box::new(rule))
    }

    /// Adds a boxed rule.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Parses a TOML configuration and builds the configured rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or names an unknown preset.
    pub fn from_toml(content: &str, diagnostics: &mut Diagnostics) -> Result<Self, LinterError> {
        Self::from_dto(ConfigDto::from_toml(content)?, None, diagnostics)
    }

    /// Parses a JSON configuration and builds the configured rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or names an unknown preset.
    pub fn from_json(content: &str, diagnostics: &mut Diagnostics) -> Result<Self, LinterError> {
        Self::from_dto(ConfigDto::from_json(content)?, None, diagnostics)
    }

    /// Loads a configuration file and builds the configured rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is invalid, or names an
    /// unknown preset.
    pub fn from_file(path: &Path, diagnostics: &mut Diagnostics) -> Result<Self, LinterError> {
        info!("Using config: {}", path.display());
        Self::from_dto(ConfigDto::read(path)?, path.parent(), diagnostics)
    }

    fn from_dto(
        mut dto: ConfigDto,
        base_dir: Option<&Path>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, LinterError> {
        if let Some(preset) = parse_preset(dto.preset.as_deref())? {
            preset.apply(&mut dto);
        }
        let config = Config::load(dto, base_dir, diagnostics)?;
        Self::from_config(&config, diagnostics)
    }

    /// Builds the rules enabled by `config` and its preset.
    ///
    /// Rule sets are validated against the configured element types; the
    /// preset's default ignore patterns are only applied by the parsing
    /// constructors.
    ///
    /// # Errors
    ///
    /// Returns an error if the preset name is unknown.
    pub fn from_config(config: &Config, diagnostics: &mut Diagnostics) -> Result<Self, LinterError> {
        let preset = parse_preset(config.preset())?;
        for (name, _) in config.rules() {
            if !RULE_NAMES.contains(&name.as_str()) {
                diagnostics.warn_once(format!("Unknown rule '{name}'"));
            }
        }

        let engine = Engine::with_resolver(Arc::clone(config.settings()), Arc::new(config.resolver()));
        let mut linter = Self::new(engine);
        for name in RULE_NAMES {
            let entry = config.rule(name);
            let RuleLevel::On(severity) = effective_level(preset, name, entry) else {
                debug!("Skipping disabled rule: {name}");
                continue;
            };
            if let Some(rule) = build_rule(name, severity, preset, entry, config, diagnostics) {
                linter = linter.rule_box(rule);
            }
        }

        info!("Linter ready with {} rules", linter.rules.len());
        Ok(linter)
    }

    /// Classification engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Enabled rules, in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[RuleBox] {
        &self.rules
    }

    /// Checks one file and its dependency statements.
    ///
    /// Dependency checks only run for files that are classified and not
    /// ignored; file-level checks run for every file.
    #[must_use]
    pub fn check_file(&self, source: &SourceFile) -> LintResult {
        debug!("Analyzing: {}", source.path.display());

        let mut result = LintResult::new();
        result.files_checked = 1;

        let file = self.engine.file_info(&source.path);
        let start = Location::file_start(source.path.clone());
        result
            .violations
            .extend(self.rules.iter().filter_map(|rule| rule.check_file(&file, &start)));

        if file.is_ignored || !file.element.is_known() {
            debug!("Skipping dependencies of unclassified file: {}", file.path);
            return result;
        }

        for occurrence in &source.dependencies {
            let dependency = self
                .engine
                .dependency_info(&file, &source.path, occurrence);
            let location = Location::new(source.path.clone(), occurrence.line, occurrence.column);
            for rule in &self.rules {
                if let Some(violation) = rule.check(&file, &dependency, &location) {
                    result
                        .violations
                        .push(violation.with_source(occurrence.source.as_str()));
                }
            }
        }
        result
    }

    /// Checks several files; violations are sorted by file, then line.
    #[must_use]
    pub fn check_files(&self, sources: &[SourceFile]) -> LintResult {
        let mut result = sources
            .iter()
            .map(|source| self.check_file(source))
            .fold(LintResult::new(), |mut acc, file_result| {
                acc.extend(file_result);
                acc
            });
        result.violations.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
        });
        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );
        result
    }
}

fn parse_preset(name: Option<&str>) -> Result<Option<Preset>, LinterError> {
    name.map(|name| {
        Preset::parse(name).ok_or_else(|| LinterError::UnknownPreset {
            name: name.to_string(),
        })
    })
    .transpose()
}

/// Explicit level, else the preset's; a configured rule without a level is
/// enabled at error severity.
fn effective_level(preset: Option<Preset>, name: &str, entry: Option<&RuleEntry>) -> RuleLevel {
    if let Some(level) = entry.and_then(|e| e.level) {
        return level;
    }
    match (entry, preset.map_or(RuleLevel::Off, |p| p.level(name))) {
        (Some(_), RuleLevel::Off) => RuleLevel::On(Severity::Error),
        (_, level) => level,
    }
}

fn build_rule(
    name: &str,
    severity: Severity,
    preset: Option<Preset>,
    entry: Option<&RuleEntry>,
    config: &Config,
    diagnostics: &mut Diagnostics,
) -> Option<RuleBox> {
    let options = entry.and_then(|e| e.options.as_ref());
    let policy = |main_key: MainKey, only_main_key: bool, diagnostics: &mut Diagnostics| {
        let rule_set = options.or_else(|| {
            debug!("Skipping rule without options: {name}");
            None
        })?;
        validate_rule_set(rule_set, config.settings(), main_key, only_main_key, diagnostics);
        Some(rule_set.clone())
    };

    match name {
        element_types::NAME => policy(MainKey::From, false, diagnostics)
            .map(|rs| Box::new(ElementTypes::new(rs).severity(severity)) as RuleBox),
        entry_point::NAME => policy(MainKey::Target, true, diagnostics)
            .map(|rs| Box::new(EntryPoint::new(rs).severity(severity)) as RuleBox),
        external::NAME => policy(MainKey::From, true, diagnostics)
            .map(|rs| Box::new(External::new(rs).severity(severity)) as RuleBox),
        no_private::NAME => {
            let mut rule = NoPrivate::new()
                .severity(severity)
                .allow_uncles(entry.map_or(preset.is_some(), |e| e.allow_uncles));
            if let Some(message) = entry.and_then(|e| e.message.clone()) {
                rule = rule.message(message);
            }
            Some(Box::new(rule))
        }
        no_unknown::NAME => Some(Box::new(NoUnknown::new().severity(severity))),
        no_ignored::NAME => Some(Box::new(NoIgnored::new().severity(severity))),
        no_unknown_files::NAME => Some(Box::new(NoUnknownFiles::new().severity(severity))),
        _ => None,
    }
}
