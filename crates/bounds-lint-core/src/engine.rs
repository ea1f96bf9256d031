//! Cached classification of files and imports against one settings snapshot.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::cache::ClassificationCache;
use crate::dependency::{self, DependencyInfo, DependencyOccurrence, FileInfo, ImportInfo};
use crate::element::{self, ElementInfo};
use crate::matcher::ElementKey;
use crate::policy::{MainKey, RuleSet, Verdict};
use crate::relationship;
use crate::resolver::{AliasResolver, ModuleResolver};
use crate::settings::Settings;

/// Classification engine bound to one settings snapshot.
///
/// Cheap to clone; clones share the snapshot, cache and resolver. Several
/// engines with different snapshots may share one [`ClassificationCache`].
#[derive(Clone)]
pub struct Engine {
    settings: Arc<Settings>,
    cache: Arc<ClassificationCache>,
    resolver: Arc<dyn ModuleResolver>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("snapshot", &self.settings.id())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine resolving relative specifiers from the settings root.
    #[must_use]
    pub fn new(settings: Arc<Settings>) -> Self {
        let resolver = Arc::new(AliasResolver::new(settings.root()));
        Self::with_resolver(settings, resolver)
    }

    /// Creates an engine with a custom resolver.
    #[must_use]
    pub fn with_resolver(settings: Arc<Settings>, resolver: Arc<dyn ModuleResolver>) -> Self {
        Self {
            settings,
            cache: Arc::new(ClassificationCache::new()),
            resolver,
        }
    }

    /// Replaces the cache with a shared one.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<ClassificationCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Settings snapshot.
    #[must_use]
    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Classification cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<ClassificationCache> {
        &self.cache
    }

    /// Classifies a project-relative path; `None` yields an unknown element.
    #[must_use]
    pub fn classify(&self, path: Option<&str>) -> Arc<ElementInfo> {
        self.cache
            .elements
            .get_or_compute(self.settings.id(), path, || {
                element::classify(path.unwrap_or_default(), &self.settings)
            })
    }

    /// Classifies a referring file.
    #[must_use]
    pub fn file_info(&self, file: &Path) -> Arc<FileInfo> {
        let path = self.settings.project_path(file);
        self.cache
            .files
            .get_or_compute(self.settings.id(), Some(&path), || FileInfo {
                is_ignored: self.settings.is_ignored(&path),
                element: self.classify(Some(&path)),
                path: path.clone(),
            })
    }

    /// Classifies an import specifier written in `referencing_file`.
    #[must_use]
    pub fn import_info(&self, source: &str, referencing_file: &Path) -> Arc<ImportInfo> {
        let resolved = self
            .resolver
            .resolve(source, referencing_file)
            .map(|p| self.settings.project_path(&p));
        let is_external = dependency::is_external(source, resolved.as_deref());
        let path = if is_external { None } else { resolved };

        let key = match &path {
            Some(path) => path.clone(),
            None => format!("module:{source}"),
        };
        self.cache
            .imports
            .get_or_compute(self.settings.id(), Some(&key), || {
                let is_built_in = dependency::is_built_in(source, path.as_deref());
                let info = ImportInfo {
                    is_ignored: !is_external
                        && path
                            .as_deref()
                            .map_or(true, |p| self.settings.is_ignored(p)),
                    is_local: !is_external && !is_built_in,
                    is_built_in,
                    is_external,
                    base_module: dependency::base_module(source, path.as_deref()),
                    element: self.classify(path.as_deref()),
                    path: path.clone(),
                };
                if info.is_local {
                    debug!("import '{source}' resolved to {:?}", info.path);
                }
                info
            })
    }

    /// Builds the dependency of `file` described by `occurrence`.
    #[must_use]
    pub fn dependency_info(
        &self,
        file: &FileInfo,
        file_path: &Path,
        occurrence: &DependencyOccurrence,
    ) -> DependencyInfo {
        let import = self.import_info(&occurrence.source, file_path);
        let relationship = relationship::relationship(import.facts(), &file.element);
        let is_internal = import.element.element_path.is_some()
            && import.element.element_path == file.element.element_path;
        DependencyInfo {
            source: occurrence.source.clone(),
            import,
            specifiers: occurrence.specifiers.clone(),
            kind: occurrence.kind,
            relationship,
            is_internal,
        }
    }

    /// Evaluates `rule_set` for `dependency` of `file`.
    #[must_use]
    pub fn evaluate_dependency<'a>(
        &self,
        file: &FileInfo,
        dependency: &DependencyInfo,
        rule_set: &'a RuleSet,
        key: ElementKey,
        main_key: MainKey,
    ) -> Verdict<'a> {
        rule_set.evaluate(&file.element, dependency, key, main_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{DefaultPolicy, PolicyRule};
    use crate::matcher::Matcher;
    use crate::relationship::Relationship;
    use crate::settings::{ElementDescriptor, Mode};
    use std::path::PathBuf;

    fn engine() -> Engine {
        let elements = vec![
            ElementDescriptor::from_patterns(
                "helpers",
                &["helpers/*"],
                Mode::Folder,
                Some(&["elementName"]),
            )
            .unwrap(),
            ElementDescriptor::from_patterns(
                "modules",
                &["modules/*"],
                Mode::Folder,
                Some(&["elementName"]),
            )
            .unwrap(),
        ];
        Engine::new(Arc::new(Settings::with_elements(elements)))
    }

    #[test]
    fn classify_is_cached_per_path() {
        let engine = engine();
        let first = engine.classify(Some("helpers/a/index.js"));
        let second = engine.classify(Some("helpers/a/index.js"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.cache().elements.computations(), 1);
        assert!(!engine.classify(None).is_known());
    }

    #[test]
    fn file_info_relativizes_and_classifies() {
        let engine = engine();
        let file = engine.file_info(Path::new("./modules/a/index.js"));
        assert_eq!(file.path, "modules/a/index.js");
        assert!(!file.is_ignored);
        assert_eq!(file.element.element_type.as_deref(), Some("modules"));
    }

    #[test]
    fn import_info_for_local_external_and_built_in() {
        let engine = engine();
        let from = Path::new("modules/a/index.js");

        let local = engine.import_info("../../helpers/b/index.js", from);
        assert!(local.is_local);
        assert_eq!(local.path.as_deref(), Some("helpers/b/index.js"));
        assert_eq!(local.element.element_type.as_deref(), Some("helpers"));

        let external = engine.import_info("@scope/pkg/sub", from);
        assert!(external.is_external && !external.is_local);
        assert_eq!(external.base_module.as_deref(), Some("@scope/pkg"));
        assert!(!external.element.is_known());

        let built_in = engine.import_info("node:fs", from);
        assert!(built_in.is_built_in && !built_in.is_external && !built_in.is_local);
    }

    #[test]
    fn dependency_info_relationship() {
        let engine = engine();
        let file_path = PathBuf::from("modules/a/index.js");
        let file = engine.file_info(&file_path);

        let internal = engine.dependency_info(
            &file,
            &file_path,
            &DependencyOccurrence::import("./other.js", 1),
        );
        assert!(internal.is_internal);
        assert_eq!(internal.relationship, Some(Relationship::Internal));

        let other = engine.dependency_info(
            &file,
            &file_path,
            &DependencyOccurrence::import("../../helpers/b/index.js", 2),
        );
        assert!(!other.is_internal);
        assert_eq!(other.relationship, None);
    }

    #[test]
    fn evaluate_dependency_uses_file_as_main_element() {
        let engine = engine();
        let file_path = PathBuf::from("modules/a/index.js");
        let file = engine.file_info(&file_path);
        let dependency = engine.dependency_info(
            &file,
            &file_path,
            &DependencyOccurrence::import("../../helpers/b/index.js", 1),
        );
        let rule_set = RuleSet::new(
            DefaultPolicy::Disallow,
            None,
            vec![PolicyRule::new(0)
                .from(vec![Matcher::simple("modules").unwrap()])
                .allow(vec![Matcher::simple("helpers").unwrap()])],
        );
        let verdict = engine.evaluate_dependency(
            &file,
            &dependency,
            &rule_set,
            ElementKey::Type,
            MainKey::From,
        );
        assert!(verdict.allowed);
    }
}
