//! Registration macros.
//!
//! Each macro wraps a static record in a `const _` block and submits it via
//! `inventory::submit!`. [`ModuleIndex::linked`](crate::module::ModuleIndex::linked)
//! and [`LinkedEntryPoints`](crate::discovery::LinkedEntryPoints) collect them
//! at discovery time.
//!
//! ```rust,ignore
//! use dg_components::{component_module, entry_point, registered_component_type, Component};
//!
//! entry_point!(namespace = "dagster_foo", module = "dagster_foo.lib");
//! component_module!("dagster_foo.lib", reexports = ["dagster_foo.lib.sub"]);
//!
//! #[derive(Default)]
//! struct TestComponent1;
//! impl Component for TestComponent1 {}
//!
//! registered_component_type!(TestComponent1 in "dagster_foo.lib",
//!     name = "test_component_1",
//!     metadata = { "summary" => "First test component." });
//! ```

/// Declare that this crate contributes a component namespace rooted at a
/// module path.
#[macro_export]
macro_rules! entry_point {
    (namespace = $namespace:literal, module = $module:literal $(,)?) => {
        const _: () = {
            static ENTRY_POINT: $crate::discovery::EntryPointStatic =
                $crate::discovery::EntryPointStatic {
                    group: $crate::discovery::ENTRY_POINT_GROUP,
                    namespace: $namespace,
                    module: $module,
                    package: env!("CARGO_PKG_NAME"),
                };
            $crate::inventory::submit! { $crate::discovery::EntryPointReg(&ENTRY_POINT) }
        };
    };
}

/// Declare a module, the child modules it re-exports, and an optional
/// import-time initializer. Declaring the same path twice merges the
/// re-export lists.
#[macro_export]
macro_rules! component_module {
    (
        $path:literal
        $(, reexports = [$($child:literal),* $(,)?])?
        $(, init = $init:path)?
        $(,)?
    ) => {
        const _: () = {
            static MODULE: $crate::module::ModuleStatic = $crate::module::ModuleStatic {
                path: $path,
                reexports: &[$($($child),*)?],
                init: $crate::__module_init!($($init)?),
            };
            $crate::inventory::submit! { $crate::module::ModuleReg(&MODULE) }
        };
    };
}

/// Attach the registration marker to a component type.
#[macro_export]
macro_rules! registered_component_type {
    (
        $ty:ident in $module:literal
        $(, name = $name:literal)?
        $(, metadata = { $($key:literal => $value:literal),* $(,)? })?
        $(,)?
    ) => {
        const _: () = {
            static COMPONENT: $crate::module::ComponentTypeStatic =
                $crate::module::ComponentTypeStatic {
                    module: $module,
                    type_name: stringify!($ty),
                    name: $crate::__component_name!($($name)?),
                    metadata: &[$($(($key, $value)),*)?],
                    construct: $crate::types::construct::<$ty>,
                };
            $crate::inventory::submit! { $crate::module::ComponentTypeReg(&COMPONENT) }
        };
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __module_init {
    () => {
        None
    };
    ($init:path) => {
        Some($init as $crate::module::ModuleInit)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __component_name {
    () => {
        None
    };
    ($name:literal) => {
        Some($name)
    };
}
