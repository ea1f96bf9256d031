//! Path classification into typed elements.
//!
//! A path is scanned from its innermost segment outward. The first element
//! pattern that matches the accumulated suffix gives the path its own type;
//! every later match while walking toward the root is an enclosing parent.

use serde::Serialize;
use tracing::debug;

use crate::settings::{ElementDescriptor, ElementPattern, Mode, Settings};
use crate::template::TemplateVars;

/// Named values captured from element patterns, in capture order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Captures {
    #[serde(serialize_with = "serialize_pairs")]
    entries: Vec<(String, String)>,
}

fn serialize_pairs<S: serde::Serializer>(
    entries: &[(String, String)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(entries.iter().map(|(k, v)| (k, v)))
}

impl Captures {
    /// Creates an empty capture set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds positional `values` to `names`; unnamed positions are dropped.
    #[must_use]
    pub fn from_positional(values: &[String], names: &[String]) -> Self {
        let mut captures = Self::new();
        for (name, value) in names.iter().zip(values) {
            if !name.is_empty() {
                captures.insert(name.clone(), value.clone());
            }
        }
        captures
    }

    /// Sets `key`, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`Self::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Looks up a captured value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over `(name, value)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns true if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Template namespace holding these captures.
    #[must_use]
    pub fn to_template_vars(&self) -> TemplateVars {
        let mut vars = TemplateVars::new();
        for (k, v) in &self.entries {
            vars.insert_text(k.clone(), v.clone());
        }
        vars
    }
}

/// An enclosing element found while scanning outward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentElement {
    /// Element type.
    #[serde(rename = "type")]
    pub element_type: String,
    /// Path of the parent element root.
    pub element_path: String,
    /// Raw positional captures.
    pub capture: Vec<String>,
    /// Named captures, when the descriptor names any.
    pub captured_values: Option<Captures>,
}

/// Classification of a single path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    /// Element type, `None` for unknown or ignored paths.
    #[serde(rename = "type")]
    pub element_type: Option<String>,
    /// Path of the element root.
    pub element_path: Option<String>,
    /// Raw positional captures.
    pub capture: Vec<String>,
    /// Named captures, when the descriptor names any.
    pub captured_values: Option<Captures>,
    /// Path inside the element (folder mode) or the last segment otherwise.
    pub internal_path: Option<String>,
    /// Enclosing elements, nearest first.
    pub parents: Vec<ParentElement>,
}

impl ElementInfo {
    /// Returns true if the path was classified.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.element_type.is_some()
    }

    /// Element path of the nearest parent.
    #[must_use]
    pub fn parent_path(&self) -> Option<&str> {
        self.parents.first().map(|p| p.element_path.as_str())
    }

    /// Captured value by name.
    #[must_use]
    pub fn captured(&self, key: &str) -> Option<&str> {
        self.captured_values.as_ref().and_then(|c| c.get(key))
    }

    /// Captures as a template namespace (empty when nothing was captured).
    #[must_use]
    pub fn capture_vars(&self) -> TemplateVars {
        self.captured_values
            .as_ref()
            .map(Captures::to_template_vars)
            .unwrap_or_default()
    }
}

/// A successful pattern hit at one scan step.
struct Hit {
    element_type: String,
    element_path: String,
    capture: Vec<String>,
    captured_values: Option<Captures>,
    mode: Mode,
}

/// Fold state over the reversed path segments.
#[derive(Default)]
struct Scan {
    own: Option<Hit>,
    parents: Vec<ParentElement>,
    /// Number of trailing segments consumed by earlier hits.
    consumed: usize,
}

/// Classifies `path` (project-relative, `/`-separated) against `settings`.
///
/// Ignored or empty paths yield an unknown element.
#[must_use]
pub fn classify(path: &str, settings: &Settings) -> ElementInfo {
    if settings.is_ignored(path) {
        return ElementInfo::default();
    }

    let segments: Vec<&str> = path.split('/').collect();
    let scan = (0..segments.len()).fold(Scan::default(), |scan, step| {
        scan_step(scan, step, path, &segments, settings.elements())
    });

    let Scan { own, parents, .. } = scan;
    let info = match own {
        Some(hit) => {
            let internal_path = match hit.mode {
                Mode::Folder => strip_element_path(path, &hit.element_path),
                Mode::File | Mode::Full => hit
                    .element_path
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string(),
            };
            ElementInfo {
                element_type: Some(hit.element_type),
                element_path: Some(hit.element_path),
                capture: hit.capture,
                captured_values: hit.captured_values,
                internal_path: Some(internal_path),
                parents,
            }
        }
        None => ElementInfo {
            parents,
            ..ElementInfo::default()
        },
    };

    log_classification(path, &info);
    info
}

fn scan_step(
    mut scan: Scan,
    step: usize,
    path: &str,
    segments: &[&str],
    elements: &[ElementDescriptor],
) -> Scan {
    let total = segments.len();
    let start = total - 1 - step;
    let end = total - scan.consumed;
    let accumulated = segments[start..end].join("/");
    let typed = scan.own.is_some();

    let hit = elements.iter().find_map(|descriptor| {
        descriptor.patterns().iter().find_map(|pattern| {
            match_pattern(descriptor, pattern, typed, path, segments, start, end, &accumulated)
        })
    });

    if let Some(hit) = hit {
        scan.consumed = step + 1;
        if typed {
            scan.parents.push(ParentElement {
                element_type: hit.element_type,
                element_path: hit.element_path,
                capture: hit.capture,
                captured_values: hit.captured_values,
            });
        } else {
            scan.own = Some(hit);
        }
    }
    scan
}

#[allow(clippy::too_many_arguments)]
fn match_pattern(
    descriptor: &ElementDescriptor,
    pattern: &ElementPattern,
    typed: bool,
    path: &str,
    segments: &[&str],
    start: usize,
    end: usize,
    accumulated: &str,
) -> Option<Hit> {
    let mode = descriptor.mode();
    let full_path_match = mode == Mode::Full && !typed;
    let leading = mode == Mode::Folder && !typed;

    let base_captures = match pattern.base_glob(leading) {
        Some(base) => Some(base.captures(&segments[..end].join("/"))?),
        None => None,
    };

    let subject = if full_path_match { path } else { accumulated };
    let capture = pattern.glob(leading).captures(subject)?;

    let mut captured_values = descriptor
        .capture()
        .map(|names| Captures::from_positional(&capture, names));
    if let Some(base_values) = base_captures {
        let mut merged = descriptor
            .base_capture()
            .map(|names| Captures::from_positional(&base_values, names))
            .unwrap_or_default();
        if let Some(own) = captured_values {
            for (k, v) in own.iter() {
                merged.insert(k, v);
            }
        }
        captured_values = Some(merged);
    }

    let element_path = if full_path_match {
        path.to_string()
    } else {
        element_path(pattern, segments, start, end)
    };

    Some(Hit {
        element_type: descriptor.element_type().to_string(),
        element_path,
        capture,
        captured_values,
        mode,
    })
}

/// Prefix of the path through the shortest run of accumulated segments
/// matching the bare pattern.
fn element_path(pattern: &ElementPattern, segments: &[&str], start: usize, end: usize) -> String {
    let through = (start + 1..=end)
        .find(|&k| pattern.bare().is_match(&segments[start..k].join("/")))
        .unwrap_or(end);
    segments[..through].join("/")
}

fn strip_element_path(path: &str, element_path: &str) -> String {
    let prefix = format!("{element_path}/");
    match path.strip_prefix(&prefix) {
        Some(rest) => rest.to_string(),
        None => path.replacen(&prefix, "", 1),
    }
}

fn log_classification(path: &str, info: &ElementInfo) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    match &info.element_type {
        Some(element_type) => debug!("'{path}' is of type '{element_type}'"),
        None => debug!("'{path}' is of unknown type"),
    }
    if let Ok(json) = serde_json::to_string_pretty(info) {
        debug!("{json}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glob::GlobList;
    use crate::settings::ElementDescriptor;
    use std::path::PathBuf;

    fn folder(element_type: &str, pattern: &str, capture: &[&str]) -> ElementDescriptor {
        ElementDescriptor::from_patterns(element_type, &[pattern], Mode::Folder, Some(capture))
            .unwrap()
    }

    fn settings(elements: Vec<ElementDescriptor>) -> Settings {
        Settings::with_elements(elements)
    }

    #[test]
    fn classifies_folder_element() {
        let s = settings(vec![folder("helpers", "helpers/*", &["elementName"])]);
        let info = classify("helpers/helper-a/Helper.js", &s);
        assert_eq!(info.element_type.as_deref(), Some("helpers"));
        assert_eq!(info.element_path.as_deref(), Some("helpers/helper-a"));
        assert_eq!(info.captured("elementName"), Some("helper-a"));
        assert_eq!(info.internal_path.as_deref(), Some("Helper.js"));
        assert!(info.parents.is_empty());
    }

    #[test]
    fn element_path_keeps_leading_segments() {
        let s = settings(vec![folder("helpers", "helpers/*", &["elementName"])]);
        let info = classify("src/helpers/helper-a/sub/Helper.js", &s);
        assert_eq!(info.element_path.as_deref(), Some("src/helpers/helper-a"));
        assert_eq!(info.internal_path.as_deref(), Some("sub/Helper.js"));
    }

    #[test]
    fn nested_elements_are_parents_nearest_first() {
        let s = settings(vec![
            folder("helpers", "helpers/*", &["elementName"]),
            folder("modules", "modules/*", &["elementName"]),
            folder("domains", "domains/*", &["domainName"]),
        ]);
        let info = classify(
            "domains/domain-a/modules/module-a/helpers/helper-a/index.js",
            &s,
        );
        assert_eq!(info.element_type.as_deref(), Some("helpers"));
        let parents: Vec<(&str, &str)> = info
            .parents
            .iter()
            .map(|p| (p.element_type.as_str(), p.element_path.as_str()))
            .collect();
        assert_eq!(
            parents,
            vec![
                ("modules", "domains/domain-a/modules/module-a"),
                ("domains", "domains/domain-a"),
            ]
        );
        assert_eq!(
            info.parents[0]
                .captured_values
                .as_ref()
                .and_then(|c| c.get("elementName")),
            Some("module-a")
        );
    }

    #[test]
    fn first_descriptor_wins_at_a_step() {
        let s = settings(vec![
            folder("first", "lib/*", &["name"]),
            folder("second", "lib/*", &["name"]),
        ]);
        let info = classify("lib/a/index.js", &s);
        assert_eq!(info.element_type.as_deref(), Some("first"));
        assert!(info.parents.is_empty());
    }

    #[test]
    fn multiple_patterns_in_declaration_order() {
        let d = ElementDescriptor::from_patterns(
            "components",
            &["components/*/*", "ui/*"],
            Mode::Folder,
            Some(&["category", "elementName"]),
        )
        .unwrap();
        let s = settings(vec![d]);
        let info = classify("components/atoms/atom-a/index.js", &s);
        assert_eq!(info.captured("category"), Some("atoms"));
        assert_eq!(info.captured("elementName"), Some("atom-a"));

        let info = classify("ui/button/index.js", &s);
        assert_eq!(info.element_path.as_deref(), Some("ui/button"));
        assert_eq!(info.captured("category"), Some("button"));
    }

    #[test]
    fn file_mode_matches_file_name() {
        let d = ElementDescriptor::from_patterns(
            "models",
            &["*.model.js"],
            Mode::File,
            Some(&["name"]),
        )
        .unwrap();
        let s = settings(vec![d]);
        let info = classify("src/models/user.model.js", &s);
        assert_eq!(info.element_type.as_deref(), Some("models"));
        assert_eq!(info.element_path.as_deref(), Some("src/models/user.model.js"));
        assert_eq!(info.internal_path.as_deref(), Some("user.model.js"));
        assert_eq!(info.captured("name"), Some("user"));
    }

    #[test]
    fn full_mode_matches_whole_path() {
        let d = ElementDescriptor::from_patterns(
            "app",
            &["src/app/**/*.js"],
            Mode::Full,
            None,
        )
        .unwrap();
        let s = settings(vec![d]);
        let info = classify("src/app/main/index.js", &s);
        assert_eq!(info.element_type.as_deref(), Some("app"));
        assert_eq!(info.element_path.as_deref(), Some("src/app/main/index.js"));
        assert_eq!(info.internal_path.as_deref(), Some("index.js"));
        assert!(info.captured_values.is_none());
    }

    #[test]
    fn base_pattern_captures_merge_before_own() {
        let d = ElementDescriptor::from_patterns(
            "modules",
            &["modules/*"],
            Mode::Folder,
            Some(&["elementName"]),
        )
        .unwrap()
        .with_base("packages/*", Some(&["package", "elementName"]))
        .unwrap();
        let s = settings(vec![d]);
        let info = classify("packages/pkg-a/src/modules/module-a/index.js", &s);
        assert_eq!(info.element_type.as_deref(), Some("modules"));
        assert_eq!(info.captured("package"), Some("pkg-a"));
        assert_eq!(info.captured("elementName"), Some("module-a"));
        let keys: Vec<&str> = info
            .captured_values
            .as_ref()
            .unwrap()
            .iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["package", "elementName"]);

        let outside = classify("other/modules/module-a/index.js", &s);
        assert!(outside.element_type.is_none());
    }

    #[test]
    fn unnamed_captures_are_dropped() {
        let s = settings(vec![folder("components", "components/*/*", &["", "elementName"])]);
        let info = classify("components/atoms/atom-a/index.js", &s);
        let captured = info.captured_values.unwrap();
        assert_eq!(captured.get("elementName"), Some("atom-a"));
        assert_eq!(captured.iter().count(), 1);
    }

    #[test]
    fn ignored_and_empty_paths_are_unknown() {
        let s = Settings::new(
            PathBuf::from("."),
            vec![folder("helpers", "helpers/*", &["elementName"])],
            GlobList::new(&["**/*.test.js"]).unwrap(),
            None,
        );
        assert_eq!(classify("helpers/a/a.test.js", &s), ElementInfo::default());
        assert_eq!(classify("", &s), ElementInfo::default());
    }

    #[test]
    fn unmatched_path_has_no_type() {
        let s = settings(vec![folder("helpers", "helpers/*", &["elementName"])]);
        let info = classify("src/index.js", &s);
        assert!(!info.is_known());
        assert!(info.internal_path.is_none());
    }

    #[test]
    fn classification_is_deterministic() {
        let s = settings(vec![
            folder("helpers", "helpers/*", &["elementName"]),
            folder("modules", "modules/*", &["elementName"]),
        ]);
        let path = "modules/module-a/helpers/helper-a/index.js";
        assert_eq!(classify(path, &s), classify(path, &s));
    }

    #[test]
    fn at_most_one_own_type() {
        let s = settings(vec![
            folder("helpers", "helpers/*", &["elementName"]),
            folder("modules", "modules/*", &["elementName"]),
        ]);
        let info = classify("modules/module-a/helpers/helper-a/index.js", &s);
        assert_eq!(info.element_type.as_deref(), Some("helpers"));
        assert_eq!(info.parents.len(), 1);
        assert_eq!(info.parents[0].element_type, "modules");
    }
}
