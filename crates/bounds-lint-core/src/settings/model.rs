//! Validated settings snapshot.
//!
//! A [`Settings`] value is immutable once built. Every snapshot receives a
//! process-unique [`SnapshotId`] at construction; classification caches are
//! partitioned by that id, so two snapshots with identical contents never
//! share cached results.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::glob::{Glob, GlobError, GlobList};

static NEXT_SNAPSHOT: AtomicU64 = AtomicU64::new(1);

/// Identity of a settings snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotId(u64);

impl SnapshotId {
    fn next() -> Self {
        Self(NEXT_SNAPSHOT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "snapshot-{}", self.0)
    }
}

/// How an element pattern is matched against a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Pattern names the element folder; any file below it belongs to it.
    #[default]
    Folder,
    /// Pattern matches the trailing segments of the path, usually the file name.
    File,
    /// Pattern matches the whole project-relative path.
    Full,
}

impl Mode {
    /// Parses a mode name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "folder" => Some(Self::Folder),
            "file" => Some(Self::File),
            "full" => Some(Self::Full),
            _ => None,
        }
    }

    /// Every valid mode name, default first.
    pub const NAMES: [&'static str; 3] = ["folder", "file", "full"];
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Folder => "folder",
            Self::File => "file",
            Self::Full => "full",
        };
        write!(f, "{name}")
    }
}

/// One pattern of an element descriptor, compiled for both scan phases.
///
/// While the element's own type is still unassigned, folder patterns are
/// matched with a trailing `/**/*`; afterwards (parent detection) the bare
/// pattern is used.
#[derive(Debug, Clone)]
pub struct ElementPattern {
    bare: Glob,
    leading: Glob,
    base_bare: Option<Glob>,
    base_leading: Option<Glob>,
}

impl ElementPattern {
    /// Compiles `pattern` (and the optional base pattern) for `mode`.
    ///
    /// # Errors
    ///
    /// Returns error if any derived glob fails to compile.
    pub fn new(pattern: &str, base_pattern: Option<&str>, mode: Mode) -> Result<Self, GlobError> {
        let leading_raw = match mode {
            Mode::Folder => format!("{pattern}/**/*"),
            Mode::File | Mode::Full => pattern.to_string(),
        };
        let bare = Glob::new(pattern)?;
        let leading = Glob::new(&leading_raw)?;
        let (base_bare, base_leading) = match base_pattern {
            Some(base) => (
                Some(Glob::new(&format!("{base}/**/{pattern}"))?),
                Some(Glob::new(&format!("{base}/**/{leading_raw}"))?),
            ),
            None => (None, None),
        };
        Ok(Self {
            bare,
            leading,
            base_bare,
            base_leading,
        })
    }

    /// Pattern as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.bare.as_str()
    }

    /// Glob used for the given scan phase.
    #[must_use]
    pub fn glob(&self, leading: bool) -> &Glob {
        if leading {
            &self.leading
        } else {
            &self.bare
        }
    }

    /// Base glob used for the given scan phase, if a base pattern is set.
    #[must_use]
    pub fn base_glob(&self, leading: bool) -> Option<&Glob> {
        if leading {
            self.base_leading.as_ref()
        } else {
            self.base_bare.as_ref()
        }
    }

    /// The bare pattern glob.
    #[must_use]
    pub fn bare(&self) -> &Glob {
        &self.bare
    }
}

/// A configured element type.
#[derive(Debug, Clone)]
pub struct ElementDescriptor {
    element_type: String,
    patterns: Vec<ElementPattern>,
    base_pattern: Option<String>,
    mode: Mode,
    capture: Option<Vec<String>>,
    base_capture: Option<Vec<String>>,
}

impl ElementDescriptor {
    /// Creates a descriptor from already compiled patterns.
    #[must_use]
    pub fn new(
        element_type: String,
        patterns: Vec<ElementPattern>,
        base_pattern: Option<String>,
        mode: Mode,
        capture: Option<Vec<String>>,
        base_capture: Option<Vec<String>>,
    ) -> Self {
        Self {
            element_type,
            patterns,
            base_pattern,
            mode,
            capture,
            base_capture,
        }
    }

    /// Convenience constructor compiling `patterns` for `mode`.
    ///
    /// # Errors
    ///
    /// Returns error if any pattern fails to compile.
    pub fn from_patterns(
        element_type: &str,
        patterns: &[&str],
        mode: Mode,
        capture: Option<&[&str]>,
    ) -> Result<Self, GlobError> {
        let compiled = patterns
            .iter()
            .map(|p| ElementPattern::new(p, None, mode))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(
            element_type.to_string(),
            compiled,
            None,
            mode,
            capture.map(|c| c.iter().map(ToString::to_string).collect()),
            None,
        ))
    }

    /// Adds a base pattern, recompiling the element patterns.
    ///
    /// # Errors
    ///
    /// Returns error if a derived glob fails to compile.
    pub fn with_base(
        mut self,
        base_pattern: &str,
        base_capture: Option<&[&str]>,
    ) -> Result<Self, GlobError> {
        self.patterns = self
            .patterns
            .iter()
            .map(|p| ElementPattern::new(p.as_str(), Some(base_pattern), self.mode))
            .collect::<Result<Vec<_>, _>>()?;
        self.base_pattern = Some(base_pattern.to_string());
        self.base_capture = base_capture.map(|c| c.iter().map(ToString::to_string).collect());
        Ok(self)
    }

    /// Element type name.
    #[must_use]
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    /// Compiled patterns in declaration order.
    #[must_use]
    pub fn patterns(&self) -> &[ElementPattern] {
        &self.patterns
    }

    /// Base pattern as configured.
    #[must_use]
    pub fn base_pattern(&self) -> Option<&str> {
        self.base_pattern.as_deref()
    }

    /// Match mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Names bound to pattern captures.
    #[must_use]
    pub fn capture(&self) -> Option<&[String]> {
        self.capture.as_deref()
    }

    /// Names bound to base pattern captures.
    #[must_use]
    pub fn base_capture(&self) -> Option<&[String]> {
        self.base_capture.as_deref()
    }
}

/// Immutable classification settings.
#[derive(Debug)]
pub struct Settings {
    id: SnapshotId,
    root: PathBuf,
    elements: Vec<ElementDescriptor>,
    ignore: GlobList,
    include: Option<GlobList>,
}

impl Settings {
    /// Creates a new snapshot with a fresh identity.
    #[must_use]
    pub fn new(
        root: PathBuf,
        elements: Vec<ElementDescriptor>,
        ignore: GlobList,
        include: Option<GlobList>,
    ) -> Self {
        Self {
            id: SnapshotId::next(),
            root,
            elements,
            ignore,
            include,
        }
    }

    /// Snapshot with the given elements and no ignore/include filters.
    #[must_use]
    pub fn with_elements(elements: Vec<ElementDescriptor>) -> Self {
        Self::new(PathBuf::from("."), elements, GlobList::default(), None)
    }

    /// Snapshot identity.
    #[must_use]
    pub fn id(&self) -> SnapshotId {
        self.id
    }

    /// Project root used to relativize absolute paths.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Element descriptors in declaration order.
    #[must_use]
    pub fn elements(&self) -> &[ElementDescriptor] {
        &self.elements
    }

    /// Names of every configured element type.
    #[must_use]
    pub fn element_type_names(&self) -> Vec<&str> {
        self.elements.iter().map(ElementDescriptor::element_type).collect()
    }

    /// Ignore filter.
    #[must_use]
    pub fn ignore(&self) -> &GlobList {
        &self.ignore
    }

    /// Include filter, when configured.
    #[must_use]
    pub fn include(&self) -> Option<&GlobList> {
        self.include.as_ref()
    }

    /// Applies the ignore policy to a project-relative path.
    ///
    /// Empty paths are always ignored. With an include list, paths outside
    /// it are ignored; otherwise the ignore list decides.
    #[must_use]
    pub fn is_ignored(&self, path: &str) -> bool {
        if path.is_empty() {
            return true;
        }
        if let Some(include) = &self.include {
            if !include.is_match(path) {
                return true;
            }
        }
        self.ignore.is_match(path)
    }

    /// Converts a path into the project-relative, `/`-separated form.
    #[must_use]
    pub fn project_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let text = relative.to_string_lossy().replace('\\', "/");
        match text.strip_prefix("./") {
            Some(stripped) => stripped.to_string(),
            None => text,
        }
    }
}
