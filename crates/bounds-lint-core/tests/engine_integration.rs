//! Integration test: configuration → classification → policy evaluation.
//!
//! Drives the public API the way a host does: load a TOML document, build an
//! [`Engine`] over its snapshot, classify files and dependencies, and
//! evaluate the configured rule sets.

use std::path::Path;
use std::sync::Arc;

use bounds_lint_core::{
    Config, DependencyOccurrence, Diagnostics, ElementKey, Engine, MainKey, Relationship,
};

const ELEMENTS: &str = r#"
    [settings]
    ignore = ["**/*.test.js"]

    [[settings.elements]]
    type = "submodules"
    pattern = "submodules/*"
    capture = ["elementName"]

    [[settings.elements]]
    type = "helpers"
    pattern = "helpers/*"
    mode = "folder"
    capture = ["elementName"]

    [[settings.elements]]
    type = "components"
    pattern = "components/*/*"
    capture = ["category", "elementName"]

    [[settings.elements]]
    type = "modules"
    pattern = "modules/*"
    capture = ["elementName"]
"#;

const ALLOW_HELPERS: &str = r#"
    [rules.element-types]
    default = "disallow"

    [[rules.element-types.rules]]
    from = ["modules"]
    allow = ["helpers"]
"#;

const LAYERED: &str = r#"
    [rules.element-types]
    default = "allow"

    [[rules.element-types.rules]]
    from = ["modules"]
    disallow = ["components"]

    [[rules.element-types.rules]]
    from = ["modules"]
    allow = [["components", { category = "atoms" }]]
"#;

fn load() -> (Config, Engine) {
    load_with(ALLOW_HELPERS)
}

fn load_with(rules: &str) -> (Config, Engine) {
    let mut diagnostics = Diagnostics::new();
    let content = format!("{ELEMENTS}{rules}");
    let config = Config::parse(&content, &mut diagnostics).expect("fixture config should load");
    assert!(
        diagnostics.is_empty(),
        "unexpected warnings: {:?}",
        diagnostics.messages()
    );
    let engine = Engine::new(Arc::clone(config.settings()));
    (config, engine)
}

// ── Classification ──

#[test]
fn classifies_folder_element_with_captures() {
    let (_, engine) = load();
    let element = engine.classify(Some("helpers/helper-a/Helper.js"));

    assert_eq!(element.element_type.as_deref(), Some("helpers"));
    assert_eq!(element.element_path.as_deref(), Some("helpers/helper-a"));
    assert_eq!(element.captured("elementName"), Some("helper-a"));
    assert_eq!(element.internal_path.as_deref(), Some("Helper.js"));
    assert!(element.parents.is_empty());
}

#[test]
fn nested_element_records_parents_nearest_first() {
    let (_, engine) = load();
    let element = engine.classify(Some("modules/module-a/submodules/sub-a/index.js"));

    assert_eq!(element.element_type.as_deref(), Some("submodules"));
    assert_eq!(
        element.element_path.as_deref(),
        Some("modules/module-a/submodules/sub-a")
    );
    assert_eq!(element.parents.len(), 1);
    assert_eq!(element.parents[0].element_type, "modules");
    assert_eq!(element.parents[0].element_path, "modules/module-a");
}

#[test]
fn ignored_and_unmatched_paths_are_unknown() {
    let (_, engine) = load();
    assert!(!engine.classify(Some("helpers/helper-a/Helper.test.js")).is_known());
    assert!(!engine.classify(Some("src/other/file.js")).is_known());
}

// ── Relationships ──

#[test]
fn internal_and_child_relationships() {
    let (_, engine) = load();
    let file_path = Path::new("modules/module-a/index.js");
    let file = engine.file_info(file_path);

    let internal = engine.dependency_info(
        &file,
        file_path,
        &DependencyOccurrence::import("./sub/Sub.js", 1),
    );
    assert!(internal.is_internal);
    assert_eq!(internal.relationship, Some(Relationship::Internal));

    let child = engine.dependency_info(
        &file,
        file_path,
        &DependencyOccurrence::import("./submodules/sub-a/index.js", 2),
    );
    assert!(!child.is_internal);
    assert_eq!(child.relationship, Some(Relationship::Child));
}

#[test]
fn parent_relationship_from_nested_element() {
    let (_, engine) = load();
    let file_path = Path::new("modules/module-a/submodules/sub-a/index.js");
    let file = engine.file_info(file_path);

    let parent = engine.dependency_info(
        &file,
        file_path,
        &DependencyOccurrence::import("../../index.js", 1),
    );
    assert_eq!(parent.relationship, Some(Relationship::Parent));
}

// ── Policy ──

#[test]
fn allow_rule_with_disallow_default() {
    let (config, engine) = load();
    let rule_set = config
        .rule("element-types")
        .and_then(|entry| entry.options.as_ref())
        .expect("element-types options");
    let file_path = Path::new("modules/module-a/index.js");
    let file = engine.file_info(file_path);

    let helper = engine.dependency_info(
        &file,
        file_path,
        &DependencyOccurrence::import("../../helpers/helper-a/Helper.js", 1),
    );
    let verdict =
        engine.evaluate_dependency(&file, &helper, rule_set, ElementKey::Type, MainKey::From);
    assert!(verdict.allowed);
    assert!(verdict.rule_report.is_none());

    let component = engine.dependency_info(
        &file,
        file_path,
        &DependencyOccurrence::import("../../components/atoms/button/index.js", 2),
    );
    let verdict =
        engine.evaluate_dependency(&file, &component, rule_set, ElementKey::Type, MainKey::From);
    assert!(!verdict.allowed);
}

#[test]
fn later_allow_overrides_earlier_disallow() {
    let (config, engine) = load_with(LAYERED);
    let rule_set = config
        .rule("element-types")
        .and_then(|entry| entry.options.as_ref())
        .expect("element-types options");
    let file_path = Path::new("modules/module-a/index.js");
    let file = engine.file_info(file_path);

    let evaluate = |source: &str| {
        let dependency =
            engine.dependency_info(&file, file_path, &DependencyOccurrence::import(source, 1));
        rule_set
            .evaluate(&file.element, &dependency, ElementKey::Type, MainKey::From)
            .allowed
    };

    assert!(evaluate("../../components/atoms/button/index.js"));
    assert!(!evaluate("../../components/molecules/card/index.js"));
}

// ── Cache ──

#[test]
fn classification_runs_once_per_snapshot_and_path() {
    let (_, engine) = load();
    let path = "components/atoms/button/index.js";

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let engine = engine.clone();
            scope.spawn(move || {
                for _ in 0..10 {
                    let element = engine.classify(Some(path));
                    assert_eq!(element.element_type.as_deref(), Some("components"));
                }
            });
        }
    });

    assert_eq!(engine.cache().elements.computations(), 1);
}

#[test]
fn snapshots_with_equal_content_do_not_share_entries() {
    let (_, first) = load();
    let (_, second) = load();
    let second = second.with_cache(Arc::clone(first.cache()));

    let a = first.classify(Some("helpers/helper-a/Helper.js"));
    let b = second.classify(Some("helpers/helper-a/Helper.js"));

    assert_eq!(a, b);
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(first.cache().elements.computations(), 2);
}

// ── Configuration files ──

#[test]
fn loads_json_file_with_root_relative_to_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bounds-lint.json");
    std::fs::write(
        &path,
        r#"{
            "root": "app",
            "settings": {
                "elements": ["helpers"],
                "ignore": ["**/*.test.js"]
            }
        }"#,
    )
    .expect("write config");

    let mut diagnostics = Diagnostics::new();
    let config = Config::from_file(&path, &mut diagnostics).expect("config should load");
    assert_eq!(config.settings().root(), dir.path().join("app"));
    assert_eq!(diagnostics.messages().len(), 1);

    let engine = Engine::new(Arc::clone(config.settings()));
    let file = engine.file_info(&dir.path().join("app/helpers/helper-a/index.js"));
    assert_eq!(file.path, "helpers/helper-a/index.js");
    assert_eq!(file.element.element_type.as_deref(), Some("helpers"));
}
