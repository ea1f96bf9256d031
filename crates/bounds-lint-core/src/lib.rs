//! # bounds-lint-core
//!
//! Element classification and boundary policy engine.
//!
//! Files and import specifiers are classified into typed *elements* by glob
//! patterns; dependencies between elements are then checked against ordered
//! allow/disallow rule sets. This crate provides:
//!
//! - [`Settings`] snapshots loaded from TOML or JSON via [`Config`]
//! - [`classify`] and the cached [`Engine`]
//! - [`relationship`] between a dependency and the importing element
//! - [`RuleSet::evaluate`] producing a [`Verdict`]
//! - [`DependencyRule`] for rule kinds built on top of the engine
//!
//! ## Example
//!
//! ```ignore
//! use bounds_lint_core::{Config, Diagnostics, Engine};
//!
//! let mut diagnostics = Diagnostics::new();
//! let config = Config::from_file("bounds-lint.toml".as_ref(), &mut diagnostics)?;
//! let engine = Engine::new(config.settings().clone());
//!
//! let element = engine.classify(Some("helpers/helper-a/Helper.js"));
//! assert_eq!(element.element_type.as_deref(), Some("helpers"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod dependency;
mod diagnostics;
mod element;
mod engine;
mod matcher;
mod policy;
mod relationship;
mod resolver;
mod rule;
mod types;

/// Glob patterns with positional captures.
pub mod glob;
/// Configuration loading.
pub mod settings;
/// `${...}` placeholder substitution.
pub mod template;

pub use cache::{ClassificationCache, Namespace, SnapshotCache};
pub use dependency::{
    base_module, is_built_in, is_external, is_scoped, DependencyInfo, DependencyKind,
    DependencyOccurrence, FileInfo, ImportInfo, SourceFile, BUILT_IN_MODULES,
};
pub use diagnostics::Diagnostics;
pub use element::{classify, Captures, ElementInfo, ParentElement};
pub use engine::Engine;
pub use matcher::{
    is_match, is_match_element_type, match_any, match_context, Constraints, ElementKey,
    MatchOutcome, Matcher, PatternTemplate, Subject, SPECIFIERS_KEY,
};
pub use policy::{
    validate_rule_set, DefaultPolicy, MainKey, PolicyRule, RuleReport, RuleSet, Verdict,
};
pub use relationship::{relationship, DependencyFacts, Relationship};
pub use resolver::{AliasResolver, ModuleResolver};
pub use rule::{DependencyRule, RuleBox};
pub use settings::{Config, ConfigError, ElementDescriptor, Mode, Settings, SnapshotId};
pub use template::TemplateVars;
pub use types::{Location, LintResult, Severity, Violation, ViolationDiagnostic};
