//! Rule to prevent importing ignored files from recognized elements.

use bounds_lint_core::{DependencyInfo, DependencyRule, FileInfo, Location, Severity, Violation};

/// Rule code for no-ignored.
pub const CODE: &str = "BL006";

/// Rule name for no-ignored.
pub const NAME: &str = "no-ignored";

/// Forbids dependencies on ignored (or unresolvable local) files.
#[derive(Debug, Clone)]
pub struct NoIgnored {
    /// Severity level.
    pub severity: Severity,
}

impl Default for NoIgnored {
    fn default() -> Self {
        Self::new()
    }
}

impl NoIgnored {
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

impl DependencyRule for NoIgnored {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Prevent importing ignored files from recognized elements"
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
        dependency.import.is_ignored.then(|| {
            Violation::new(
                CODE,
                NAME,
                self.severity,
                location.clone(),
                "Importing ignored files is not allowed",
            )
        })
    }
}
