use std::path::{Path, PathBuf};

use dg_renderer::{Renderer, ScaffoldContext, TemplateEngine, TemplateKind};
use tempfile::TempDir;

fn render_code_location(name: &str) -> Vec<(PathBuf, String)> {
    let renderer = Renderer::new().expect("renderer");
    let root = PathBuf::from("/deploy/code_locations").join(name);
    renderer
        .render(name, &root, TemplateKind::CodeLocation)
        .expect("render")
}

#[test]
fn code_location_pyproject_is_valid_toml() {
    let outputs = render_code_location("foo-bar");
    let (path, content) = &outputs[0];
    assert!(path.ends_with("foo-bar/pyproject.toml"));

    let doc: toml::Table = content
        .parse()
        .unwrap_or_else(|e| panic!("invalid TOML: {e}\n{content}"));

    let project = doc["project"].as_table().expect("[project]");
    assert_eq!(project["name"].as_str(), Some("foo-bar"));
    let deps: Vec<&str> = project["dependencies"]
        .as_array()
        .expect("dependencies")
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(deps, vec!["dagster", "dagster-components"]);

    let entry_points = doc["project"]["entry-points"]["dagster.components"]
        .as_table()
        .expect("entry point group");
    assert_eq!(entry_points["foo_bar"].as_str(), Some("foo_bar.lib"));

    assert_eq!(doc["tool"]["dg"]["is_code_location"].as_bool(), Some(true));
    assert_eq!(
        doc["tool"]["dagster"]["module_name"].as_str(),
        Some("foo_bar.definitions")
    );
}

#[test]
fn deployment_pyproject_is_valid_toml() {
    let renderer = Renderer::new().expect("renderer");
    let outputs = renderer
        .render("my-deployment", Path::new("/my-deployment"), TemplateKind::Deployment)
        .expect("render");
    let doc: toml::Table = outputs[0].1.parse().expect("toml");
    assert_eq!(doc["tool"]["dg"]["is_deployment"].as_bool(), Some(true));
    assert!(doc["tool"]["dg"].get("is_code_location").is_none());
}

#[test]
fn code_location_outputs_cover_package_layout() {
    let outputs = render_code_location("bar");
    let paths: Vec<String> = outputs
        .iter()
        .map(|(p, _)| p.to_string_lossy().replace('\\', "/"))
        .collect();
    for suffix in [
        "bar/pyproject.toml",
        "bar/bar/__init__.py",
        "bar/bar/definitions.py",
        "bar/bar/lib/__init__.py",
        "bar/bar_tests/__init__.py",
    ] {
        assert!(paths.iter().any(|p| p.ends_with(suffix)), "missing {suffix} in {paths:?}");
    }
}

#[test]
fn user_template_override_wins() {
    let root = PathBuf::from("/deploy/code_locations/foo");
    let ctx = ScaffoldContext::new("foo", &root);
    let dir = TempDir::new().expect("tempdir");
    let custom_path = dir.path().join("code_location").join("definitions.py.tera");
    std::fs::create_dir_all(custom_path.parent().expect("parent")).expect("mkdir");
    std::fs::write(&custom_path, "# custom definitions for {{ module_name }}\n")
        .expect("write custom template");

    let engine = TemplateEngine::new(Some(dir.path())).expect("engine");
    let outputs = engine.render(&ctx, TemplateKind::CodeLocation).expect("render");
    let content = &outputs[2].1;

    assert!(content.contains("custom definitions for foo"), "custom template not used");
    assert!(!content.contains("build_component_defs"), "embedded template leaked through");
    // Other templates are still the embedded ones.
    assert!(outputs[0].1.contains("is_code_location = true"));
}

#[test]
fn missing_override_dir_falls_back_to_embedded() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("nope");
    let engine = TemplateEngine::new(Some(&missing)).expect("engine");
    let ctx = ScaffoldContext::new("x", Path::new("/x"));
    let outputs = engine.render(&ctx, TemplateKind::Deployment).expect("render");
    assert_eq!(outputs.len(), 3);
}
