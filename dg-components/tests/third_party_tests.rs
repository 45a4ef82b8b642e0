//! Discovery of components contributed by a third-party package.
//!
//! This test binary links a `dagster_foo` package: an entry point rooted at
//! `dagster_foo.lib`, which re-exports `dagster_foo.lib.sub`.

use assert_fs::prelude::*;
use dg_components::{
    component_module, entry_point, registered_component_type, Component, ComponentKey,
    ComponentTypeRegistry, DiscoveryFailure, DiscoveryOptions, FailureMode, ImportError,
    LinkedEntryPoints, ManifestDirSource, ModuleIndex, StaticEntryPoints,
};

entry_point!(namespace = "dagster_foo", module = "dagster_foo.lib");

component_module!("dagster_foo.lib", reexports = ["dagster_foo.lib.sub"]);

#[derive(Default)]
struct TestComponent1;
impl Component for TestComponent1 {}

#[derive(Default)]
struct TestComponent2;
impl Component for TestComponent2 {}

#[derive(Default)]
struct Unnamed;
impl Component for Unnamed {}

registered_component_type!(
    TestComponent1 in "dagster_foo.lib",
    name = "test_component_1",
    metadata = { "summary" => "First test component." }
);

registered_component_type!(
    TestComponent2 in "dagster_foo.lib.sub",
    name = "test_component_2",
    metadata = { "summary" => "Second test component." }
);

// Not reachable from any entry point on its own.
component_module!("dagster_broken.lib", init = broken_init);

registered_component_type!(Unnamed in "dagster_broken.lib");

fn broken_init() -> Result<(), String> {
    Err("ModuleNotFoundError: No module named 'missing_dependency'".to_string())
}

fn typenames(registry: &ComponentTypeRegistry) -> Vec<String> {
    registry.keys().map(ComponentKey::to_typename).collect()
}

fn manifest_dir(entries: &str) -> assert_fs::TempDir {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    dir.child("dagster_fake-0.1.0.dist-info/entry_points.txt")
        .write_str(&format!("[dagster.components]\n{entries}\n"))
        .expect("write manifest");
    dir
}

#[test]
fn components_from_third_party_lib() {
    let registry = ComponentTypeRegistry::from_entry_point_discovery().expect("discovery");
    let types = typenames(&registry);

    let expected_1 = ComponentKey::new("dagster_foo", "test_component_1").unwrap();
    let expected_2 = ComponentKey::new("dagster_foo", "test_component_2").unwrap();
    assert!(types.contains(&expected_1.to_typename()), "got: {types:?}");
    assert!(types.contains(&"dagster_foo.test_component_1".to_string()));
    assert!(types.contains(&"dagster_foo.test_component_2".to_string()));
    assert!(registry.contains(&expected_2));

    // The core package is still there alongside it.
    assert!(types.contains(&"pipes_subprocess_script_collection@dagster_components".to_string()));
}

#[test]
fn third_party_definitions_carry_metadata_and_origin() {
    let registry = ComponentTypeRegistry::from_entry_point_discovery().expect("discovery");
    let def = registry
        .get_by_typename("dagster_foo.test_component_2")
        .expect("lookup");
    assert_eq!(def.defined_in, "dagster_foo.lib.sub");
    assert_eq!(def.summary(), Some("Second test component."));
    assert_eq!(def.class.type_name, "TestComponent2");
}

#[test]
fn entry_point_null_reference_is_skipped_by_default() {
    let dir = manifest_dir("dagster_fake = fake.module");
    let manifests = ManifestDirSource::new(dir.path());
    let registry = ComponentTypeRegistry::build(
        &DiscoveryOptions::default(),
        &[&LinkedEntryPoints, &manifests],
        &ModuleIndex::linked(),
    )
    .expect("lenient discovery does not fail");

    assert!(!registry.namespaces().contains("dagster_fake"));
    let types = typenames(&registry);
    assert!(types.contains(&"dagster_foo.test_component_1".to_string()));
    assert!(types.contains(&"dagster_foo.test_component_2".to_string()));

    assert_eq!(registry.failures().len(), 1);
    assert!(matches!(
        &registry.failures()[0],
        DiscoveryFailure::Import {
            namespace,
            source: ImportError::ModuleNotFound { module },
            ..
        } if namespace == "dagster_fake" && module == "fake.module"
    ));
}

#[test]
fn entry_point_null_reference_fails_in_strict_mode() {
    let dir = manifest_dir("dagster_fake = fake.module");
    let manifests = ManifestDirSource::new(dir.path());
    let err = ComponentTypeRegistry::build(
        &DiscoveryOptions::with_mode(FailureMode::Strict),
        &[&LinkedEntryPoints, &manifests],
        &ModuleIndex::linked(),
    )
    .expect_err("strict discovery must fail");
    let msg = err.to_string();
    assert!(msg.contains("dagster_fake"), "{msg}");
    assert!(msg.contains("fake.module"), "{msg}");
}

#[test]
fn import_time_error_fails_only_that_namespace() {
    let source = StaticEntryPoints::new()
        .with("dagster_broken", "dagster_broken.lib")
        .with("dagster_foo", "dagster_foo.lib");
    let registry = ComponentTypeRegistry::build(
        &DiscoveryOptions::default(),
        &[&source],
        &ModuleIndex::linked(),
    )
    .expect("lenient");
    assert_eq!(
        typenames(&registry),
        vec!["dagster_foo.test_component_1", "dagster_foo.test_component_2"]
    );
    assert!(matches!(
        &registry.failures()[0],
        DiscoveryFailure::Import { source: ImportError::InitFailed { .. }, .. }
    ));
}

#[test]
fn malformed_manifest_entry_is_skipped() {
    let dir = manifest_dir("dagster_bad = dagster_bad.lib:attr");
    let manifests = ManifestDirSource::new(dir.path());
    let registry = ComponentTypeRegistry::build(
        &DiscoveryOptions::default(),
        &[&LinkedEntryPoints, &manifests],
        &ModuleIndex::linked(),
    )
    .expect("lenient");
    assert!(registry
        .failures()
        .iter()
        .any(|f| matches!(f, DiscoveryFailure::Malformed { .. })));
    assert!(registry.namespaces().contains("dagster_foo"));
}

#[test]
fn duplicate_declaration_of_same_package_collides() {
    // The same package declared twice (e.g. two installs on the path) is a
    // packaging bug and must not be silently merged.
    let source = StaticEntryPoints::new().with("dagster_foo", "dagster_foo.lib");
    let err = ComponentTypeRegistry::build(
        &DiscoveryOptions::default(),
        &[&LinkedEntryPoints, &source],
        &ModuleIndex::linked(),
    )
    .expect_err("collision");
    assert_eq!(err.failures.len(), 2);
    assert!(err.failures.iter().all(DiscoveryFailure::is_fatal));
    let msg = err.to_string();
    assert!(msg.contains("dagster_foo.test_component_1"), "{msg}");
    assert!(msg.contains("dagster_foo.test_component_2"), "{msg}");
}
