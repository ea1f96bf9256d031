//! Rule to prevent files that are not recognized as any element type.

use bounds_lint_core::{DependencyInfo, DependencyRule, FileInfo, Location, Severity, Violation};

/// Rule code for no-unknown-files.
pub const CODE: &str = "BL007";

/// Rule name for no-unknown-files.
pub const NAME: &str = "no-unknown-files";

/// Reports files that are neither classified nor ignored.
#[derive(Debug, Clone)]
pub struct NoUnknownFiles {
    /// Severity level.
    pub severity: Severity,
}

impl Default for NoUnknownFiles {
    fn default() -> Self {
        Self::new()
    }
}

impl NoUnknownFiles {
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

impl DependencyRule for NoUnknownFiles {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Prevent creating files not recognized as any of the element types"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(
        &self,
        _file: &FileInfo,
        _dependency: &DependencyInfo,
        _location: &Location,
    ) -> Option<Violation> {
        None
    }

    fn check_file(&self, file: &FileInfo, location: &Location) -> Option<Violation> {
        if file.is_ignored || file.element.is_known() {
            return None;
        }
        Some(Violation::new(
            CODE,
            NAME,
            self.severity,
            location.clone(),
            "File is not of any known element type",
        ))
    }
}
