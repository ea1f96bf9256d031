//! Rule trait for boundary checks.

use crate::dependency::{DependencyInfo, FileInfo};
use crate::types::{Location, Severity, Violation};

/// A boundary rule evaluated per file and per dependency statement.
///
/// The linter only calls [`DependencyRule::check`] for files that are
/// classified and not ignored; [`DependencyRule::check_file`] is called for
/// every file.
///
/// # Example
///
/// ```ignore
/// use bounds_lint_core::{DependencyRule, DependencyInfo, FileInfo, Location, Violation};
///
/// pub struct NoBuiltIns;
///
/// impl DependencyRule for NoBuiltIns {
///     fn name(&self) -> &'static str { "no-built-ins" }
///     fn code(&self) -> &'static str { "BL100" }
///
///     fn check(&self, _file: &FileInfo, dep: &DependencyInfo, at: &Location) -> Option<Violation> {
///         dep.import.is_built_in.then(|| {
///             Violation::new(self.code(), self.name(), self.default_severity(), at.clone(),
///                 format!("Built-in module '{}' is not allowed", dep.source))
///         })
///     }
/// }
/// ```
pub trait DependencyRule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "element-types").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "BL001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Checks one dependency statement of `file`.
    fn check(
        &self,
        file: &FileInfo,
        dependency: &DependencyInfo,
        location: &Location,
    ) -> Option<Violation>;

    /// Checks the file itself, independent of its dependencies.
    fn check_file(&self, _file: &FileInfo, _location: &Location) -> Option<Violation> {
        None
    }
}

/// Type alias for boxed `DependencyRule` trait objects.
pub type RuleBox = Box<dyn DependencyRule>;
