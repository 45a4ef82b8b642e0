//! Component types shipped in the core namespace.
//!
//! The base set is always linked. `dbt_project` and
//! `sling_replication_collection` are optional extras gated behind the `dbt`
//! and `sling` cargo features; enabling one adds exactly its module to the
//! `dagster_components.lib` re-export list.

use crate::types::Component;

crate::entry_point!(namespace = "dagster_components", module = "dagster_components.lib");

crate::component_module!(
    "dagster_components.lib",
    reexports = ["dagster_components.lib.pipes_subprocess_script_collection"]
);

#[cfg(feature = "dbt")]
crate::component_module!(
    "dagster_components.lib",
    reexports = ["dagster_components.lib.dbt_project"]
);

#[cfg(feature = "sling")]
crate::component_module!(
    "dagster_components.lib",
    reexports = ["dagster_components.lib.sling_replication_collection"]
);

/// Assets backed by Python scripts run as subprocesses.
#[derive(Debug, Default)]
pub struct PipesSubprocessScriptCollection;

impl Component for PipesSubprocessScriptCollection {}

crate::registered_component_type!(
    PipesSubprocessScriptCollection in "dagster_components.lib.pipes_subprocess_script_collection",
    name = "pipes_subprocess_script_collection",
    metadata = {
        "summary" => "Assets that wrap Python scripts executed with Dagster's PipesSubprocessClient.",
        "description" => "Each script in the collection is executed in a subprocess and reports materializations back through Pipes.",
    }
);

#[cfg(feature = "dbt")]
pub use dbt::DbtProjectComponent;

#[cfg(feature = "dbt")]
mod dbt {
    use crate::types::Component;

    /// A dbt project exposed as a set of assets.
    #[derive(Debug, Default)]
    pub struct DbtProjectComponent;

    impl Component for DbtProjectComponent {}

    crate::registered_component_type!(
        DbtProjectComponent in "dagster_components.lib.dbt_project",
        name = "dbt_project",
        metadata = {
            "summary" => "Expose a DBT project to Dagster as a set of assets.",
        }
    );
}

#[cfg(feature = "sling")]
pub use sling::SlingReplicationCollection;

#[cfg(feature = "sling")]
mod sling {
    use crate::types::Component;

    /// One or more Sling replications exposed as assets.
    #[derive(Debug, Default)]
    pub struct SlingReplicationCollection;

    impl Component for SlingReplicationCollection {}

    crate::registered_component_type!(
        SlingReplicationCollection in "dagster_components.lib.sling_replication_collection",
        name = "sling_replication_collection",
        metadata = {
            "summary" => "Expose one or more Sling replications to Dagster as assets.",
        }
    );
}
