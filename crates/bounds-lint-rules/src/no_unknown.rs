//! Rule to prevent importing unknown elements from known ones.

use bounds_lint_core::{DependencyInfo, DependencyRule, FileInfo, Location, Severity, Violation};

/// Rule code for no-unknown.
pub const CODE: &str = "BL005";

/// Rule name for no-unknown.
pub const NAME: &str = "no-unknown";

/// Forbids local dependencies that match no element type.
#[derive(Debug, Clone)]
pub struct NoUnknown {
    /// Severity level.
    pub severity: Severity,
}

impl Default for NoUnknown {
    fn default() -> Self {
        Self::new()
    }
}

impl NoUnknown {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl DependencyRule for NoUnknown {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Prevent importing unknown elements from the known ones"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(
        &self,
        _file: &FileInfo,
        dependency: &DependencyInfo,
        location: &Location,
    ) -> Option<Violation> {
        let import = &dependency.import;
        (!import.is_ignored && import.is_local && !import.element.is_known()).then(|| {
            Violation::new(
                CODE,
                NAME,
                self.severity,
                location.clone(),
                "Importing unknown elements is not allowed",
            )
        })
    }
}
