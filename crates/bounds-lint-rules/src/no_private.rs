//! Rule to prevent importing private elements of another element.
//!
//! An element nested inside another one is private to it: only its parent
//! (`child`), siblings (`brother`) and, with `allowUncles`, the siblings of
//! its ancestors may import it.

use bounds_lint_core::template::TemplateVars;
use bounds_lint_core::{
    DependencyInfo, DependencyRule, FileInfo, Location, Relationship, Severity, Violation,
};

use crate::messages::{custom_message, parent_message};

/// Rule code for no-private.
pub const CODE: &str = "BL004";

/// Rule name for no-private.
pub const NAME: &str = "no-private";

/// Forbids importing elements nested in another element.
#[derive(Debug, Clone)]
pub struct NoPrivate {
    /// Severity level.
    pub severity: Severity,
    /// Whether `uncle` dependencies are allowed.
    pub allow_uncles: bool,
    /// Custom message template.
    pub message: Option<String>,
}

impl Default for NoPrivate {
    fn default() -> Self {
        Self::new()
    }
}

impl NoPrivate {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
            allow_uncles: false,
            message: None,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Allows dependencies on siblings of ancestors.
    #[must_use]
    pub fn allow_uncles(mut self, allow: bool) -> Self {
        self.allow_uncles = allow;
        self
    }

    /// Sets a custom message template.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn is_allowed(&self, relationship: Option<Relationship>) -> bool {
        match relationship {
            Some(Relationship::Internal | Relationship::Child | Relationship::Brother) => true,
            Some(Relationship::Uncle) => self.allow_uncles,
            _ => false,
        }
    }
}

impl DependencyRule for NoPrivate {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Prevent importing private elements of another element"
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
        if import.is_ignored || !import.is_local || !import.element.is_known() {
            return None;
        }
        let parent = import.element.parents.first()?;
        if self.is_allowed(dependency.relationship) {
            return None;
        }

        let message = match &self.message {
            Some(template) => {
                custom_message(template, &file.element, dependency, TemplateVars::new())
            }
            None => format!(
                "Dependency is private of element {}",
                parent_message(parent)
            ),
        };
        Some(Violation::new(
            CODE,
            NAME,
            self.severity,
            location.clone(),
            message,
        ))
    }
}
