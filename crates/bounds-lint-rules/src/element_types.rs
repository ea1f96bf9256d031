//! Rule to check allowed dependencies between element types.
//!
//! Rules are selected by the type of the importing file (`from`) and their
//! `allow`/`disallow` lists are matched against the dependency type.
//!
//! # Example
//!
//! ```toml
//! [rules.element-types]
//! default = "disallow"
//!
//! [[rules.element-types.rules]]
//! from = ["modules"]
//! allow = ["helpers", ["components", { category = "atoms" }]]
//! ```

use bounds_lint_core::template::TemplateVars;
use bounds_lint_core::{
    DependencyInfo, DependencyRule, ElementKey, FileInfo, Location, MainKey, RuleReport, RuleSet,
    Severity, Violation,
};

use crate::messages::{custom_message, element_message, rule_element_message};

/// Rule code for element-types.
pub const CODE: &str = "BL001";

/// Rule name for element-types.
pub const NAME: &str = "element-types";

/// Checks local dependencies against the element type policy.
#[derive(Debug, Clone)]
pub struct ElementTypes {
    /// Severity level.
    pub severity: Severity,
    rule_set: RuleSet,
}

impl ElementTypes {
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

impl DependencyRule for ElementTypes {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Check allowed dependencies between element types"
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
        if !import.is_local
            || import.is_ignored
            || !import.element.is_known()
            || dependency.is_internal
        {
            return None;
        }

        let verdict = self.rule_set.evaluate(
            &file.element,
            dependency,
            ElementKey::Type,
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
    match report {
        Some(RuleReport::Disallowed {
            index,
            selector,
            disallow,
            ..
        }) => format!(
            "Importing {} is not allowed in {}. Disallowed in rule {}",
            rule_element_message(disallow, &file.element),
            rule_element_message(selector, &file.element),
            index + 1
        ),
        _ => format!(
            "No rule allowing this dependency was found. File is {}. Dependency is {}",
            element_message(&file.element),
            element_message(dependency.element_info())
        ),
    }
}
