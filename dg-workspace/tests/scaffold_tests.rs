//! Code location scaffolding against a temp deployment, with a provisioner
//! that fakes `uv sync`.

use std::path::Path;

use assert_fs::prelude::*;
use predicates::prelude::*;
use rstest::rstest;

use dg_workspace::{
    list_code_locations, list_component_types, scaffold_code_location, scaffold_deployment,
    workspace_file, CacheStatus, CodeLocationOptions, DgConfig, DgContext, EditableDagster,
    EnvironmentProvisioner, Registration, WorkspaceError,
};

struct FakeProvisioner;

impl EnvironmentProvisioner for FakeProvisioner {
    fn provision(&self, location_root: &Path) -> Result<(), WorkspaceError> {
        let bin = location_root.join(".venv").join("bin");
        std::fs::create_dir_all(&bin).expect("venv dir");
        std::fs::write(bin.join("python"), "").expect("python");
        std::fs::write(location_root.join("uv.lock"), "version = 1\n").expect("lock");
        Ok(())
    }
}

struct FailingProvisioner;

impl EnvironmentProvisioner for FailingProvisioner {
    fn provision(&self, location_root: &Path) -> Result<(), WorkspaceError> {
        Err(WorkspaceError::Provision {
            dir: location_root.to_path_buf(),
            message: "no network".to_string(),
        })
    }
}

fn deployment(tmp: &assert_fs::TempDir, with_workspace_yaml: bool) -> DgContext {
    scaffold_deployment(tmp.path(), "my-deployment", &DgConfig::default()).expect("deployment");
    let root = tmp.child("my-deployment");
    if !with_workspace_yaml {
        std::fs::remove_file(root.path().join("workspace.yaml")).expect("remove workspace.yaml");
    }
    DgContext::discover_at(root.path())
}

fn config(cache: &assert_fs::TempDir) -> DgConfig {
    DgConfig {
        cache_dir: Some(cache.path().to_path_buf()),
        ..DgConfig::default()
    }
}

fn skip_venv() -> CodeLocationOptions {
    CodeLocationOptions {
        skip_venv: true,
        ..CodeLocationOptions::default()
    }
}

#[rstest]
#[case(true)]
#[case(false)]
fn scaffold_inside_deployment(#[case] with_workspace_yaml: bool) {
    let tmp = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    let ctx = deployment(&tmp, with_workspace_yaml);

    let report = scaffold_code_location(
        &ctx,
        "foo-bar",
        &CodeLocationOptions::default(),
        &config(&cache),
        &FakeProvisioner,
    )
    .expect("scaffold");

    let loc = tmp.child("my-deployment/code_locations/foo-bar");
    loc.assert(predicate::path::is_dir());
    loc.child("foo_bar").assert(predicate::path::is_dir());
    loc.child("foo_bar/lib").assert(predicate::path::is_dir());
    loc.child("foo_bar/components").assert(predicate::path::is_dir());
    loc.child("foo_bar_tests").assert(predicate::path::is_dir());
    loc.child("pyproject.toml")
        .assert(predicate::str::contains("is_code_location = true"));
    loc.child(".venv").assert(predicate::path::is_dir());
    loc.child("uv.lock").assert(predicate::path::is_file());

    assert!(report.provisioned);
    assert_eq!(report.cache, Some(CacheStatus::Miss));

    let ws_path = tmp.path().join("my-deployment/workspace.yaml");
    if with_workspace_yaml {
        assert!(matches!(report.registration, Registration::Registered { .. }));
        let ws = workspace_file::load(&ws_path).unwrap();
        let target = ws.load_from[0].python_file.as_ref().unwrap();
        assert_eq!(target.location_name, "foo-bar");
        assert_eq!(
            target.relative_path,
            "code_locations/foo-bar/foo_bar/definitions.py"
        );
        assert_eq!(
            target.executable_path.as_deref(),
            Some("code_locations/foo-bar/.venv/bin/python")
        );
    } else {
        assert!(matches!(
            report.registration,
            Registration::MissingWorkspaceFile { .. }
        ));
        assert!(!ws_path.exists());
    }

    // Scaffolding populated the cache, so listing from the location is a hit.
    let listing = list_component_types(&config(&cache), Some(loc.path())).unwrap();
    assert_eq!(listing.status, CacheStatus::Hit);
}

#[test]
fn skip_venv_registers_without_executable() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    let ctx = deployment(&tmp, true);

    let report =
        scaffold_code_location(&ctx, "bar", &skip_venv(), &config(&cache), &FailingProvisioner)
            .expect("provisioner is never called");
    assert!(!report.provisioned);
    assert_eq!(report.cache, None);
    tmp.child("my-deployment/code_locations/bar/.venv")
        .assert(predicate::path::missing());

    let ws = workspace_file::load(&tmp.path().join("my-deployment/workspace.yaml")).unwrap();
    assert_eq!(
        ws.load_from[0].python_file.as_ref().unwrap().executable_path,
        None
    );
}

#[test]
fn outside_deployment_scaffolds_into_cwd() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    let ctx = DgContext::discover_at(tmp.path());

    let report =
        scaffold_code_location(&ctx, "foo-bar", &skip_venv(), &config(&cache), &FakeProvisioner)
            .unwrap();
    assert_eq!(report.registration, Registration::Standalone);
    tmp.child("foo-bar/pyproject.toml").assert(predicate::path::is_file());
    tmp.child("foo-bar/foo_bar/definitions.py")
        .assert(predicate::str::contains("build_component_defs"));
}

#[test]
fn existing_location_is_rejected_untouched() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    let ctx = deployment(&tmp, true);
    tmp.child("my-deployment/code_locations/foo-bar").create_dir_all().unwrap();

    let err = scaffold_code_location(&ctx, "foo-bar", &skip_venv(), &config(&cache), &FakeProvisioner)
        .unwrap_err();
    assert!(err.to_string().contains("already exists"), "{err}");
    tmp.child("my-deployment/code_locations/foo-bar/pyproject.toml")
        .assert(predicate::path::missing());
}

#[test]
fn editable_without_repo_writes_nothing() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    let ctx = deployment(&tmp, true);
    let opts = CodeLocationOptions {
        editable: EditableDagster::FromEnv,
        ..skip_venv()
    };

    let err = scaffold_code_location(&ctx, "foo-bar", &opts, &config(&cache), &FakeProvisioner)
        .unwrap_err();
    assert!(err.to_string().contains("requires the `DAGSTER_GIT_REPO_DIR`"));
    tmp.child("my-deployment/code_locations/foo-bar")
        .assert(predicate::path::missing());
}

#[rstest]
#[case::env_var(true)]
#[case::arg(false)]
fn editable_dagster_sources(#[case] from_env: bool) {
    let tmp = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    let repo = assert_fs::TempDir::new().unwrap();
    for pkg in ["dagster", "dagster-pipes", "dagster-webserver"] {
        repo.child("python_modules").child(pkg).create_dir_all().unwrap();
    }
    repo.child("python_modules/libraries/dagstermill").create_dir_all().unwrap();

    let ctx = deployment(&tmp, true);
    let (editable, cfg) = if from_env {
        (
            EditableDagster::FromEnv,
            DgConfig {
                dagster_git_repo_dir: Some(repo.path().to_path_buf()),
                ..config(&cache)
            },
        )
    } else {
        (EditableDagster::Path(repo.path().to_path_buf()), config(&cache))
    };
    let opts = CodeLocationOptions {
        editable,
        ..skip_venv()
    };
    scaffold_code_location(&ctx, "foo-bar", &opts, &cfg, &FakeProvisioner).unwrap();

    let manifest = tmp.path().join("my-deployment/code_locations/foo-bar/pyproject.toml");
    let doc: toml::Table = std::fs::read_to_string(manifest).unwrap().parse().unwrap();
    let sources = doc["tool"]["uv"]["sources"].as_table().expect("uv sources");
    for (pkg, rel) in [
        ("dagster", "python_modules/dagster"),
        ("dagster-pipes", "python_modules/dagster-pipes"),
        ("dagster-webserver", "python_modules/dagster-webserver"),
        ("dagstermill", "python_modules/libraries/dagstermill"),
    ] {
        let entry = &sources[pkg];
        assert_eq!(entry["editable"].as_bool(), Some(true), "{pkg}");
        assert_eq!(
            entry["path"].as_str().map(std::path::PathBuf::from),
            Some(repo.path().canonicalize().unwrap().join(rel)),
            "{pkg}"
        );
    }
}

#[test]
fn provisioning_failure_surfaces() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    let ctx = deployment(&tmp, true);
    let err = scaffold_code_location(
        &ctx,
        "foo",
        &CodeLocationOptions::default(),
        &config(&cache),
        &FailingProvisioner,
    )
    .unwrap_err();
    assert!(matches!(err, WorkspaceError::Provision { .. }));
}

#[test]
fn list_after_scaffolding_two_locations() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let cache = assert_fs::TempDir::new().unwrap();
    let ctx = deployment(&tmp, true);
    for name in ["foo", "bar"] {
        scaffold_code_location(&ctx, name, &skip_venv(), &config(&cache), &FakeProvisioner)
            .unwrap();
    }
    assert_eq!(list_code_locations(&ctx).unwrap(), vec!["bar", "foo"]);
}
