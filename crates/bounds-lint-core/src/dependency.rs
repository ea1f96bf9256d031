//! Classified files, imports and dependency occurrences.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::element::ElementInfo;
use crate::matcher::Subject;
use crate::relationship::{DependencyFacts, Relationship};

/// Node.js core modules, without the `node:` prefix.
pub const BUILT_IN_MODULES: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Classification of a referring file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// Project-relative path.
    pub path: String,
    /// Whether the file matched the ignore policy.
    pub is_ignored: bool,
    /// Element classification.
    #[serde(flatten)]
    pub element: Arc<ElementInfo>,
}

/// Classification of an import specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportInfo {
    /// Project-relative resolved path; `None` for external or unresolved specifiers.
    pub path: Option<String>,
    /// Whether the resolved path matched the ignore policy.
    pub is_ignored: bool,
    /// Neither external nor built-in.
    pub is_local: bool,
    /// Node.js core module.
    pub is_built_in: bool,
    /// Package dependency.
    pub is_external: bool,
    /// Package name for unresolved specifiers.
    pub base_module: Option<String>,
    /// Element classification of the resolved path.
    #[serde(flatten)]
    pub element: Arc<ElementInfo>,
}

impl ImportInfo {
    /// Relationship inputs for this import.
    #[must_use]
    pub fn facts(&self) -> DependencyFacts<'_> {
        DependencyFacts {
            element: &self.element,
            is_local: self.is_local,
            is_ignored: self.is_ignored,
        }
    }
}

/// Kind of dependency statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// `import ... from "x"`, `require("x")`, dynamic import.
    #[default]
    Import,
    /// `export ... from "x"`.
    Export,
}

/// An import specifier in context of the file that uses it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyInfo {
    /// Specifier as written.
    pub source: String,
    /// Shared import classification.
    #[serde(flatten)]
    pub import: Arc<ImportInfo>,
    /// Named specifiers imported by the statement.
    pub specifiers: Vec<String>,
    /// Statement kind.
    pub kind: DependencyKind,
    /// Relationship to the referring file.
    pub relationship: Option<Relationship>,
    /// Whether dependency and file are the same element.
    pub is_internal: bool,
}

impl DependencyInfo {
    /// Element classification of the dependency.
    #[must_use]
    pub fn element_info(&self) -> &ElementInfo {
        &self.import.element
    }
}

impl Subject for DependencyInfo {
    fn element(&self) -> &ElementInfo {
        &self.import.element
    }

    fn base_module(&self) -> Option<&str> {
        self.import.base_module.as_deref()
    }

    fn specifiers(&self) -> &[String] {
        &self.specifiers
    }
}

/// One dependency statement reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyOccurrence {
    /// Specifier as written.
    pub source: String,
    /// Named specifiers imported by the statement.
    pub specifiers: Vec<String>,
    /// Statement kind.
    pub kind: DependencyKind,
    /// 1-based line of the specifier.
    pub line: usize,
    /// 1-based column of the specifier.
    pub column: usize,
}

impl DependencyOccurrence {
    /// An import of `source` at `line`.
    #[must_use]
    pub fn import(source: impl Into<String>, line: usize) -> Self {
        Self {
            source: source.into(),
            specifiers: Vec::new(),
            kind: DependencyKind::Import,
            line,
            column: 1,
        }
    }

    /// An export of `source` at `line`.
    #[must_use]
    pub fn export(source: impl Into<String>, line: usize) -> Self {
        Self {
            kind: DependencyKind::Export,
            ..Self::import(source, line)
        }
    }

    /// Sets the named specifiers.
    #[must_use]
    pub fn with_specifiers<S: Into<String>>(mut self, specifiers: impl IntoIterator<Item = S>) -> Self {
        self.specifiers = specifiers.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the column.
    #[must_use]
    pub fn at_column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }
}

/// A file and its dependency statements, as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path of the file (absolute or project-relative).
    pub path: PathBuf,
    /// Dependency statements in source order.
    pub dependencies: Vec<DependencyOccurrence>,
}

impl SourceFile {
    /// Creates a file with the given dependencies.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, dependencies: Vec<DependencyOccurrence>) -> Self {
        Self {
            path: path.into(),
            dependencies,
        }
    }
}

/// Returns true for `@scope/...` specifiers.
#[must_use]
pub fn is_scoped(specifier: &str) -> bool {
    let Some(rest) = specifier.strip_prefix('@') else {
        return false;
    };
    let (scope, name) = rest.split_once('/').unwrap_or((rest, ""));
    !scope.is_empty() || name.chars().next().is_some_and(|c| c != '/')
}

/// Package name of an unresolved specifier; `None` when it resolved to a path.
#[must_use]
pub fn base_module(specifier: &str, resolved: Option<&str>) -> Option<String> {
    if resolved.is_some() {
        return None;
    }
    let mut parts = specifier.split('/');
    let first = parts.next().unwrap_or_default();
    if is_scoped(specifier) {
        return Some(match parts.next() {
            Some(name) => format!("{first}/{name}"),
            None => first.to_string(),
        });
    }
    Some(first.to_string())
}

/// Returns true for unresolved specifiers naming a Node.js core module.
#[must_use]
pub fn is_built_in(specifier: &str, resolved: Option<&str>) -> bool {
    if resolved.is_some() || specifier.is_empty() {
        return false;
    }
    let name = specifier.strip_prefix("node:").unwrap_or(specifier);
    let base = name.split('/').next().unwrap_or_default();
    BUILT_IN_MODULES.contains(&base)
}

/// Returns true for package specifiers that did not resolve inside the project.
///
/// Built-in modules are never external.
#[must_use]
pub fn is_external(specifier: &str, resolved: Option<&str>) -> bool {
    let outside_project = resolved.map_or(true, |path| path.contains("node_modules"));
    let package_like = specifier
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        || is_scoped(specifier);
    outside_project && package_like && !is_built_in(specifier, resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_module_of_plain_and_scoped_packages() {
        assert_eq!(base_module("react", None).as_deref(), Some("react"));
        assert_eq!(base_module("lodash/get", None).as_deref(), Some("lodash"));
        assert_eq!(
            base_module("@material-ui/core/Button", None).as_deref(),
            Some("@material-ui/core")
        );
        assert_eq!(base_module("react", Some("src/react.js")), None);
    }

    #[test]
    fn scoped_detection() {
        assert!(is_scoped("@scope/pkg"));
        assert!(is_scoped("@scope"));
        assert!(!is_scoped("@"));
        assert!(!is_scoped("scope/pkg"));
    }

    #[test]
    fn built_ins() {
        assert!(is_built_in("fs", None));
        assert!(is_built_in("node:fs", None));
        assert!(is_built_in("fs/promises", None));
        assert!(!is_built_in("fs", Some("src/fs.js")));
        assert!(!is_built_in("react", None));
    }

    #[test]
    fn external_and_built_in_are_exclusive() {
        assert!(is_external("react", None));
        assert!(is_external("@scope/pkg", None));
        assert!(is_external("react", Some("node_modules/react/index.js")));
        assert!(!is_external("react", Some("src/react.js")));
        assert!(!is_external("./helpers", None));
        assert!(!is_external("fs", None));
        assert!(!is_external("node:fs", None));
    }

    #[test]
    fn occurrence_builders() {
        let occurrence = DependencyOccurrence::export("./a", 3)
            .with_specifiers(["A"])
            .at_column(8);
        assert_eq!(occurrence.kind, DependencyKind::Export);
        assert_eq!(occurrence.specifiers, vec!["A".to_string()]);
        assert_eq!((occurrence.line, occurrence.column), (3, 8));
    }
}
