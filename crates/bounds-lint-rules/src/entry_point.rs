//! Rule to check the entry points through which elements may be imported.
//!
//! Rules are selected by the dependency type (`target`) and their
//! `allow`/`disallow` lists are matched against the dependency's internal
//! path, e.g. only `index.js` of a module may be imported.

use bounds_lint_core::template::TemplateVars;
use bounds_lint_core::{
    DependencyInfo, DependencyRule, ElementKey, FileInfo, Location, MainKey, RuleReport, RuleSet,
    Severity, Violation,
};

use crate::messages::{custom_message, element_message, rule_element_message};

/// Rule code for entry-point.
pub const CODE: &str = "BL002";

/// Rule name for entry-point.
pub const NAME: &str = "entry-point";

/// Checks the internal path of imported elements.
#[derive(Debug, Clone)]
pub struct EntryPoint {
    /// Severity level.
    pub severity: Severity,
    rule_set: RuleSet,
}

impl EntryPoint {
    /// Creates the rule for `rule_set`.
    #[must_use]
    pub fn new(rule_set: RuleSet) -> Self {
        Self {
            severity: Severity::Error,
            rule_set,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl DependencyRule for EntryPoint {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Check entry point used for each element type"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(
        &self,
        file: &FileInfo,
        dependency: &DependencyInfo,
        location: &Location,
    ) -> Option<Violation> {
        let import = &dependency.import;
        if import.is_ignored || !import.element.is_known() || dependency.is_internal {
            return None;
        }

        let verdict = self.rule_set.evaluate(
            &file.element,
            dependency,
            ElementKey::InternalPath,
            MainKey::Target,
        );
        if verdict.allowed {
            return None;
        }

        Some(Violation::new(
            CODE,
            NAME,
            self.severity,
            location.clone(),
            error_message(file, dependency, verdict.rule_report.as_ref()),
        ))
    }
}

fn error_message(
    file: &FileInfo,
    dependency: &DependencyInfo,
    report: Option<&RuleReport<'_>>,
) -> String {
    if let Some(message) = report.and_then(|r| r.message()) {
        return custom_message(message, &file.element, dependency, TemplateVars::new());
    }
    let target = dependency.element_info();
    let internal_path = target.internal_path.as_deref().unwrap_or_default();
    match report {
        Some(RuleReport::Disallowed {
            index, selector, ..
        }) => format!(
            "The entry point '{internal_path}' is not allowed in {}. Disallowed in rule {}",
            rule_element_message(selector, target),
            index + 1
        ),
        _ => format!(
            "No rule allows the entry point '{internal_path}' in dependencies {}",
            element_message(target)
        ),
    }
}
