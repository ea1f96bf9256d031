//! Module resolution seam.
//!
//! The engine never touches the file system itself; it asks a
//! [`ModuleResolver`] to turn an import specifier into a path.

use std::path::{Component, Path, PathBuf};

use tracing::trace;

use crate::dependency;

/// Turns an import specifier into a path.
pub trait ModuleResolver: Send + Sync {
    /// Resolves `specifier` as written in `referencing_file`.
    ///
    /// Returns `None` for built-in modules and unresolvable specifiers.
    fn resolve(&self, specifier: &str, referencing_file: &Path) -> Option<PathBuf>;
}

/// Resolver for relative specifiers and configured alias prefixes.
///
/// Without extensions, resolution is purely lexical. With extensions, a
/// candidate is accepted only if it exists as a file, is completed with one
/// of the extensions, or is a directory holding an `index` file.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    root: PathBuf,
    aliases: Vec<(String, String)>,
    extensions: Vec<String>,
}

impl AliasResolver {
    /// Creates a resolver rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Adds an alias; the first configured alias that prefixes a specifier wins.
    #[must_use]
    pub fn with_alias(mut self, prefix: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.push((prefix.into(), target.into()));
        self
    }

    /// Enables existence checks with the given extensions (without dots).
    #[must_use]
    pub fn with_extensions<S: Into<String>>(mut self, extensions: impl IntoIterator<Item = S>) -> Self {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    fn replace_alias(&self, specifier: &str) -> Option<String> {
        self.aliases
            .iter()
            .find(|(prefix, _)| specifier.starts_with(prefix.as_str()))
            .map(|(prefix, target)| format!("{target}{}", &specifier[prefix.len()..]))
    }

    fn probe(&self, candidate: PathBuf) -> Option<PathBuf> {
        if self.extensions.is_empty() {
            return Some(candidate);
        }
        if candidate.is_file() {
            return Some(candidate);
        }
        let with_extension = self.extensions.iter().find_map(|ext| {
            let mut file = candidate.clone().into_os_string();
            file.push(".");
            file.push(ext);
            let file = PathBuf::from(file);
            file.is_file().then_some(file)
        });
        with_extension.or_else(|| {
            self.extensions
                .iter()
                .map(|ext| candidate.join(format!("index.{ext}")))
                .find(|index| index.is_file())
        })
    }
}

impl ModuleResolver for AliasResolver {
    fn resolve(&self, specifier: &str, referencing_file: &Path) -> Option<PathBuf> {
        if dependency::is_built_in(specifier, None) {
            return None;
        }
        let candidate = if let Some(aliased) = self.replace_alias(specifier) {
            normalize(&self.root.join(aliased))
        } else if is_relative(specifier) {
            let base = referencing_file.parent().unwrap_or_else(|| Path::new(""));
            normalize(&base.join(specifier))
        } else if Path::new(specifier).is_absolute() {
            normalize(Path::new(specifier))
        } else {
            return None;
        };
        let resolved = self.probe(candidate);
        trace!("resolved '{specifier}' to {resolved:?}");
        resolved
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Resolves `.` and `..` components without touching the file system.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn relative_specifiers_join_lexically() {
        let resolver = AliasResolver::new("/project");
        assert_eq!(
            resolver.resolve("../helpers/a", Path::new("/project/src/modules/m.js")),
            Some(PathBuf::from("/project/src/helpers/a"))
        );
        assert_eq!(
            resolver.resolve("./b", Path::new("src/a.js")),
            Some(PathBuf::from("src/b"))
        );
    }

    #[test]
    fn aliases_rewrite_first_matching_prefix() {
        let resolver = AliasResolver::new("/project")
            .with_alias("helpers", "src/helpers")
            .with_alias("help", "src/other");
        assert_eq!(
            resolver.resolve("helpers/a", Path::new("/project/src/x.js")),
            Some(PathBuf::from("/project/src/helpers/a"))
        );
    }

    #[test]
    fn built_ins_and_packages_do_not_resolve() {
        let resolver = AliasResolver::new("/project");
        assert_eq!(resolver.resolve("fs", Path::new("/project/a.js")), None);
        assert_eq!(resolver.resolve("node:path", Path::new("/project/a.js")), None);
        assert_eq!(resolver.resolve("react", Path::new("/project/a.js")), None);
    }

    #[test]
    fn probing_completes_extensions_and_index_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/helpers/a")).unwrap();
        fs::write(root.join("src/helpers/a/index.js"), "").unwrap();
        fs::write(root.join("src/b.js"), "").unwrap();

        let resolver = AliasResolver::new(root).with_extensions(["js"]);
        let from = root.join("src/main.js");
        assert_eq!(
            resolver.resolve("./helpers/a", &from),
            Some(root.join("src/helpers/a/index.js"))
        );
        assert_eq!(resolver.resolve("./b", &from), Some(root.join("src/b.js")));
        assert_eq!(resolver.resolve("./missing", &from), None);
    }
}
