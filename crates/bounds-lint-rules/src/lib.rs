//! # bounds-lint-rules
//!
//! Built-in boundary rules for bounds-lint.
//!
//! Every rule consumes the classification facts produced by
//! `bounds-lint-core` and reports a [`Violation`] for dependency statements
//! (or files) that break the configured boundaries.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | BL001 | `element-types` | Checks allowed dependencies between element types |
//! | BL002 | `entry-point` | Checks which files of an element may be imported |
//! | BL003 | `external` | Checks allowed external modules and specifiers |
//! | BL004 | `no-private` | Forbids importing private children of other elements |
//! | BL005 | `no-unknown` | Forbids importing local files of no element type |
//! | BL006 | `no-ignored` | Forbids importing ignored files |
//! | BL007 | `no-unknown-files` | Forbids files of no element type |
//!
//! ## Usage
//!
//! ```ignore
//! use bounds_lint_core::{DependencyOccurrence, Diagnostics, SourceFile};
//! use bounds_lint_rules::Linter;
//!
//! let mut diagnostics = Diagnostics::new();
//! let linter = Linter::from_file("bounds-lint.toml".as_ref(), &mut diagnostics)?;
//!
//! let source = SourceFile::new(
//!     "src/components/atoms/Button/Button.js",
//!     vec![DependencyOccurrence::import("../../helpers/format", 3)],
//! );
//! for violation in linter.check_file(&source).violations {
//!     println!("{violation}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod element_types;
mod entry_point;
mod external;
mod linter;
mod messages;
mod no_ignored;
mod no_private;
mod no_unknown;
mod no_unknown_files;
mod presets;

pub use element_types::ElementTypes;
pub use entry_point::EntryPoint;
pub use external::External;
pub use linter::{Linter, LinterError};
pub use no_ignored::NoIgnored;
pub use no_private::NoPrivate;
pub use no_unknown::NoUnknown;
pub use no_unknown_files::NoUnknownFiles;
pub use presets::{Preset, DEFAULT_IGNORE, RULE_NAMES};

/// Re-export core types for convenience.
pub use bounds_lint_core::{DependencyRule, Severity, Violation};
