//! Rule to check which external modules each element type may use.
//!
//! Matchers are globs over the package name (`react`, `@scope/pkg`); a
//! `specifiers` constraint narrows a matcher to named imports:
//!
//! ```toml
//! [[rules.external.rules]]
//! from = ["components"]
//! disallow = [["react-router-dom", { specifiers = ["Link", "use*"] }]]
//! ```

use bounds_lint_core::template::TemplateVars;
use bounds_lint_core::{
    DependencyInfo, DependencyRule, ElementKey, FileInfo, Location, MainKey, RuleReport, RuleSet,
    Severity, Verdict, Violation,
};

use crate::messages::{custom_message, element_message, rule_element_message};

/// Rule code for external.
pub const CODE: &str = "BL003";

/// Rule name for external.
pub const NAME: &str = "external";

/// Checks external dependencies against the per-element policy.
#[derive(Debug, Clone)]
pub struct External {
    /// Severity level.
    pub severity: Severity,
    rule_set: RuleSet,
}

impl External {
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

impl DependencyRule for External {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Check allowed external dependencies by element type"
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
        if !dependency.import.is_external {
            return None;
        }

        let verdict = self.rule_set.evaluate(
            &file.element,
            dependency,
            ElementKey::BaseModule,
            MainKey::From,
        );
        if verdict.allowed {
            return None;
        }

        Some(Violation::new(
            CODE,
            NAME,
            self.severity,
            location.clone(),
            error_message(file, dependency, &verdict),
        ))
    }
}

fn error_message(file: &FileInfo, dependency: &DependencyInfo, verdict: &Verdict<'_>) -> String {
    let report = verdict.report.as_ref().map(|patterns| patterns.join(", "));
    let rule_report = verdict.rule_report.as_ref();

    if let Some(message) = rule_report.and_then(|r| r.message()) {
        let mut vars = TemplateVars::new();
        if let Some(specifiers) = &report {
            vars.insert_text("specifiers", specifiers.as_str());
        }
        return custom_message(message, &file.element, dependency, vars);
    }

    let base_module = dependency.import.base_module.as_deref().unwrap_or_default();
    let Some(RuleReport::Disallowed {
        index, selector, ..
    }) = rule_report
    else {
        return format!(
            "No rule allows the usage of external module '{base_module}' in elements {}",
            element_message(&file.element)
        );
    };

    let file_report = format!(
        "is not allowed in {}. Disallowed in rule {}",
        rule_element_message(selector, &file.element),
        index + 1
    );
    match report {
        Some(specifiers) => format!(
            "Usage of '{specifiers}' from external module '{base_module}' {file_report}"
        ),
        None => format!("Usage of external module '{base_module}' {file_report}"),
    }
}
