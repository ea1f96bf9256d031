//! Violation message formatting.
//!
//! Default messages describe elements and matchers in prose
//! (`of type 'helpers' with elementName 'a'`); custom messages are templates
//! resolved against the file, the dependency and the rule report.

use bounds_lint_core::template::{self, TemplateVars};
use bounds_lint_core::{Captures, DependencyInfo, ElementInfo, Matcher, ParentElement};

/// Wraps `text` in single quotes.
#[must_use]
pub fn quote(text: &str) -> String {
    format!("'{text}'")
}

fn type_message(pattern: &str) -> String {
    format!("elements of type {}", quote(pattern))
}

/// Separator before the property at `index` of `len`.
fn properties_concater(len: usize, index: usize) -> &'static str {
    if len > 1 && index == len - 1 {
        " and"
    } else if index == 0 {
        " with"
    } else {
        ","
    }
}

fn patterns_message(patterns: &[String]) -> String {
    let last = patterns.len().saturating_sub(1);
    patterns
        .iter()
        .enumerate()
        .fold(String::new(), |message, (index, pattern)| match index {
            0 => quote(pattern),
            i if i == last => format!("{message} or {}", quote(pattern)),
            _ => format!("{message}, {}", quote(pattern)),
        })
}

fn matcher_message(matcher: &Matcher, vars: &TemplateVars) -> String {
    let mut message = type_message(matcher.pattern().as_str());
    if let Some(constraints) = matcher.constraints() {
        let keys: Vec<_> = constraints.iter().collect();
        for (index, (key, patterns)) in keys.iter().enumerate() {
            let resolved: Vec<String> = patterns
                .iter()
                .map(|p| template::substitute(p.as_str(), vars))
                .collect();
            message.push_str(&format!(
                "{} {key} {}",
                properties_concater(keys.len(), index),
                patterns_message(&resolved)
            ));
        }
    }
    message
}

/// Describes a matcher list, resolving templates against `captured`.
///
/// `[helpers, [components, {category: atoms}]]` reads
/// `elements of type 'helpers', or elements of type 'components' with category 'atoms'`.
#[must_use]
pub fn rule_element_message(matchers: &[Matcher], captured: &ElementInfo) -> String {
    let vars = TemplateVars::new().with_nested("from", captured.capture_vars());
    matchers
        .iter()
        .map(|m| matcher_message(m, &vars))
        .collect::<Vec<_>>()
        .join(", or ")
}

fn captured_values_message(captures: Option<&Captures>) -> String {
    let Some(captures) = captures else {
        return String::new();
    };
    let len = captures.iter().count();
    captures
        .iter()
        .enumerate()
        .map(|(index, (key, value))| {
            format!("{} {key} {}", properties_concater(len, index), quote(value))
        })
        .collect()
}

fn describe(element_type: Option<&str>, captures: Option<&Captures>) -> String {
    format!(
        "of type {}{}",
        quote(element_type.unwrap_or("unknown")),
        captured_values_message(captures)
    )
}

/// Describes a classified element: `of type 'x' with a '1' and b '2'`.
#[must_use]
pub fn element_message(element: &ElementInfo) -> String {
    describe(
        element.element_type.as_deref(),
        element.captured_values.as_ref(),
    )
}

/// Describes an enclosing element.
#[must_use]
pub fn parent_message(parent: &ParentElement) -> String {
    describe(Some(&parent.element_type), parent.captured_values.as_ref())
}

fn element_vars(element: &ElementInfo, source: Option<&str>) -> TemplateVars {
    let mut vars = element.capture_vars();
    if let Some(element_type) = &element.element_type {
        vars.insert_text("type", element_type.as_str());
    }
    if let Some(internal_path) = &element.internal_path {
        vars.insert_text("internalPath", internal_path.as_str());
    }
    if let Some(source) = source {
        vars.insert_text("source", source);
    }
    if let Some(parent) = element.parents.first() {
        let mut parent_vars = parent
            .captured_values
            .as_ref()
            .map(Captures::to_template_vars)
            .unwrap_or_default();
        parent_vars.insert_text("type", parent.element_type.as_str());
        vars.insert_nested("parent", parent_vars);
    }
    vars
}

/// Resolves a custom message template.
///
/// `${file.*}`/`${from.*}` address the referring file, `${dependency.*}`/
/// `${target.*}` the dependency and `${report.*}` rule-specific details.
/// Placeholders without a value are kept verbatim.
#[must_use]
pub fn custom_message(
    message: &str,
    file: &ElementInfo,
    dependency: &DependencyInfo,
    report: TemplateVars,
) -> String {
    let file_vars = element_vars(file, None);
    let dependency_vars = element_vars(dependency.element_info(), Some(&dependency.source));
    let vars = TemplateVars::new()
        .with_nested("file", file_vars.clone())
        .with_nested("from", file_vars)
        .with_nested("dependency", dependency_vars.clone())
        .with_nested("target", dependency_vars)
        .with_nested("report", report);
    template::substitute(message, &vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bounds_lint_core::{DependencyKind, ImportInfo, ParentElement};
    use std::sync::Arc;

    fn element(element_type: &str, captures: &[(&str, &str)]) -> ElementInfo {
        let mut captured = Captures::new();
        for (k, v) in captures {
            captured.insert(*k, *v);
        }
        ElementInfo {
            element_type: Some(element_type.to_string()),
            element_path: Some(format!("{element_type}/x")),
            captured_values: Some(captured),
            internal_path: Some("index.js".to_string()),
            ..ElementInfo::default()
        }
    }

    fn dependency(element: ElementInfo) -> DependencyInfo {
        DependencyInfo {
            source: "../helpers/x".to_string(),
            import: Arc::new(ImportInfo {
                path: Some("helpers/x/index.js".to_string()),
                is_ignored: false,
                is_local: true,
                is_built_in: false,
                is_external: false,
                base_module: None,
                element: Arc::new(element),
            }),
            specifiers: vec![],
            kind: DependencyKind::Import,
            relationship: None,
            is_internal: false,
        }
    }

    #[test]
    fn element_message_lists_captures() {
        assert_eq!(
            element_message(&element("helpers", &[])),
            "of type 'helpers'"
        );
        assert_eq!(
            element_message(&element("helpers", &[("elementName", "a")])),
            "of type 'helpers' with elementName 'a'"
        );
        assert_eq!(
            element_message(&element("c", &[("a", "1"), ("b", "2"), ("c", "3")])),
            "of type 'c' with a '1', b '2' and c '3'"
        );
    }

    #[test]
    fn rule_element_message_joins_alternatives() {
        let matchers = vec![
            Matcher::simple("helpers").unwrap(),
            Matcher::constrained("components", &[("category", "${from.category}")]).unwrap(),
        ];
        let file = element("modules", &[("category", "atoms")]);
        assert_eq!(
            rule_element_message(&matchers, &file),
            "elements of type 'helpers', or elements of type 'components' with category 'atoms'"
        );
    }

    #[test]
    fn constraint_alternatives_read_as_or() {
        assert_eq!(
            patterns_message(&["a".into(), "b".into(), "c".into()]),
            "'a', 'b' or 'c'"
        );
    }

    #[test]
    fn custom_message_namespaces() {
        let mut file = element("modules", &[("elementName", "mod-a")]);
        file.parents.push(ParentElement {
            element_type: "app".to_string(),
            element_path: "app".to_string(),
            capture: vec![],
            captured_values: None,
        });
        let dep = dependency(element("helpers", &[("elementName", "help-b")]));
        let message = custom_message(
            "${file.type} ${from.elementName} (${file.parent.type}) -> ${target.type} ${dependency.elementName} via ${dependency.source} [${report.specifiers}] ${missing}",
            &file,
            &dep,
            TemplateVars::new().with_text("specifiers", "a, b"),
        );
        assert_eq!(
            message,
            "modules mod-a (app) -> helpers help-b via ../helpers/x [a, b] ${missing}"
        );
    }

    #[test]
    fn parent_message_without_captures() {
        let parent = ParentElement {
            element_type: "modules".to_string(),
            element_path: "modules/a".to_string(),
            capture: vec!["a".to_string()],
            captured_values: None,
        };
        assert_eq!(parent_message(&parent), "of type 'modules'");
    }
}
