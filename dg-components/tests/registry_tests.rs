//! Built-in component discovery through linked entry points.

use dg_components::{ComponentKey, ComponentTypeRegistry, CORE_NAMESPACE};

fn typenames(registry: &ComponentTypeRegistry) -> Vec<String> {
    registry.keys().map(ComponentKey::to_typename).collect()
}

#[test]
fn base_components_are_discovered() {
    let registry = ComponentTypeRegistry::from_entry_point_discovery().expect("discovery");
    let types = typenames(&registry);
    assert!(
        types.contains(&"pipes_subprocess_script_collection@dagster_components".to_string()),
        "got: {types:?}"
    );
    assert!(registry.failures().is_empty(), "{:?}", registry.failures());
}

#[cfg(not(feature = "dbt"))]
#[test]
fn dbt_project_absent_without_extra() {
    let registry = ComponentTypeRegistry::from_entry_point_discovery().expect("discovery");
    assert!(!typenames(&registry).contains(&"dbt_project@dagster_components".to_string()));
}

#[cfg(feature = "dbt")]
#[test]
fn dbt_extra_adds_dbt_project() {
    let registry = ComponentTypeRegistry::from_entry_point_discovery().expect("discovery");
    let types = typenames(&registry);
    assert!(types.contains(&"dbt_project@dagster_components".to_string()));
    assert!(types.contains(&"pipes_subprocess_script_collection@dagster_components".to_string()));
}

#[cfg(not(feature = "sling"))]
#[test]
fn sling_replication_absent_without_extra() {
    let registry = ComponentTypeRegistry::from_entry_point_discovery().expect("discovery");
    assert!(!typenames(&registry)
        .contains(&"sling_replication_collection@dagster_components".to_string()));
}

#[cfg(feature = "sling")]
#[test]
fn sling_extra_adds_sling_replication_collection() {
    let registry = ComponentTypeRegistry::from_entry_point_discovery().expect("discovery");
    assert!(typenames(&registry)
        .contains(&"sling_replication_collection@dagster_components".to_string()));
}

#[test]
fn all_core_components_have_defined_summary() {
    let registry = ComponentTypeRegistry::from_entry_point_discovery().expect("discovery");
    for (key, definition) in registry.items() {
        assert!(
            definition.summary().is_some(),
            "Component {key} has no summary defined"
        );
    }
}

#[test]
fn core_keys_roundtrip_through_typename() {
    let registry = ComponentTypeRegistry::from_entry_point_discovery().expect("discovery");
    for key in registry.keys() {
        assert_eq!(key.namespace(), CORE_NAMESPACE);
        let parsed = ComponentKey::from_typename(&key.to_typename()).expect("parse");
        assert_eq!(&parsed, key);
        assert!(registry.get(&parsed).is_ok());
    }
}

#[test]
fn repeated_builds_are_identical() {
    let a = ComponentTypeRegistry::from_entry_point_discovery().expect("first");
    let b = ComponentTypeRegistry::from_entry_point_discovery().expect("second");
    assert_eq!(typenames(&a), typenames(&b));
}
