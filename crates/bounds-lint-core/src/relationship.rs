//! Structural relationship between a dependency and the file importing it.

use std::fmt;

use serde::Serialize;

use crate::element::ElementInfo;

/// How a dependency relates to the importing element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    /// Same element.
    Internal,
    /// Dependency is a direct child of the element.
    Child,
    /// Dependency is nested anywhere below the element.
    Descendant,
    /// Both share the same direct parent.
    Brother,
    /// Dependency is the direct parent of the element.
    Parent,
    /// Dependency is a child of one of the element's ancestors.
    Uncle,
    /// Dependency encloses the element at any depth.
    Ancestor,
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Internal => "internal",
            Self::Child => "child",
            Self::Descendant => "descendant",
            Self::Brother => "brother",
            Self::Parent => "parent",
            Self::Uncle => "uncle",
            Self::Ancestor => "ancestor",
        };
        f.write_str(name)
    }
}

/// Facts about a dependency needed to relate it to its importer.
#[derive(Debug, Clone, Copy)]
pub struct DependencyFacts<'a> {
    /// Classification of the dependency.
    pub element: &'a ElementInfo,
    /// Whether the specifier resolved to a project file.
    pub is_local: bool,
    /// Whether the dependency matched the ignore policy.
    pub is_ignored: bool,
}

/// Relates `dependency` to `element`; `None` when no relationship holds.
///
/// Checks run in a fixed order and the first that holds wins.
#[must_use]
pub fn relationship(dependency: DependencyFacts<'_>, element: &ElementInfo) -> Option<Relationship> {
    if !dependency.is_local || dependency.is_ignored {
        return None;
    }
    let dep = dependency.element;
    if !dep.is_known() || !element.is_known() {
        return None;
    }
    let dep_path = dep.element_path.as_deref();
    let el_path = element.element_path.as_deref();
    let dep_parent = dep.parent_path();
    let el_parent = element.parent_path();

    if dep_path == el_path {
        return Some(Relationship::Internal);
    }
    if dep_parent.is_some() && dep_parent == el_path {
        return Some(Relationship::Child);
    }
    if is_in_chain(dep, el_path) {
        return Some(Relationship::Descendant);
    }
    if dep_parent.is_some() && dep_parent == el_parent {
        return Some(Relationship::Brother);
    }
    if el_parent.is_some() && el_parent == dep_path {
        return Some(Relationship::Parent);
    }
    if dep_parent.is_some() && common_ancestor(dep, element) == dep_parent {
        return Some(Relationship::Uncle);
    }
    if is_in_chain(element, dep_path) {
        return Some(Relationship::Ancestor);
    }
    None
}

fn is_in_chain(element: &ElementInfo, path: Option<&str>) -> bool {
    path.is_some_and(|path| element.parents.iter().any(|p| p.element_path == path))
}

/// First entry of `dep`'s parent chain that also appears in `element`'s.
fn common_ancestor<'a>(dep: &'a ElementInfo, element: &ElementInfo) -> Option<&'a str> {
    dep.parents
        .iter()
        .find(|p| is_in_chain(element, Some(&p.element_path)))
        .map(|p| p.element_path.as_str())
}
