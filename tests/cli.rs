//! End-to-end tests of the quarry binary.

mod common;

use common::image::{ImageBuilder, Method, PUBLIC};
use common::{age, write_build_output, write_file, write_solution, ProjectFixture, TestEnv};

fn control_module(name: &str) -> Vec<u8> {
    let mut image = ImageBuilder::new(Some(name));
    let control = image.type_ref("Avalonia.Controls", "Control");
    image.type_def(name, "Gauge", PUBLIC, Some(control), vec![Method::public_ctor()]);
    image.type_def(name, "Dial", PUBLIC, Some(control), vec![Method::public_ctor()]);
    image.build()
}

/// `App` referencing `Core` and the `Kit.Controls` package, both built.
fn avalonia_app(env: &TestEnv) {
    ProjectFixture::new().write(env.root(), "Core");
    write_build_output(&env.path("Core"), "Debug", "net8.0", "Core", &ImageBuilder::new(Some("Core")).build());

    ProjectFixture::new()
        .sibling("../Core/Core.csproj")
        .package("Kit.Controls", Some("1.0.0"))
        .write(env.root(), "App");
    env.write("App/App.axaml", "<Application xmlns=\"https://github.com/avaloniaui\" />");
    env.write("App/App.axaml.cs", "partial class App {}");
    env.write("App/Views/MainWindow.axaml", "<Window xmlns=\"https://github.com/avaloniaui\" />");
    env.write("App/Views/MainWindow.axaml.cs", "partial class MainWindow {}");
    write_build_output(&env.path("App"), "Debug", "net8.0", "App", &ImageBuilder::new(Some("App")).build());

    write_file(
        &env.path("packages/Kit.Controls.1.0.0/lib/net8.0/Kit.Controls.dll"),
        &control_module("Kit.Controls"),
    );
}

#[test]
fn help_lists_subcommands() {
    let env = TestEnv::new();
    let result = env.run(&["--help"]);
    assert!(result.success);
    for command in ["tree", "refs", "palette", "flavor"] {
        assert!(result.stdout.contains(command), "missing {command}:\n{}", result.stdout);
    }
}

#[test]
fn tree_nests_code_behind_under_markup() {
    let env = TestEnv::new();
    avalonia_app(&env);

    let result = env.run(&["tree", "App"]);
    assert!(result.success, "stderr: {}", result.stderr);

    let lines: Vec<&str> = result.stdout.lines().collect();
    assert!(lines[0].starts_with("App [avalonia] "), "{}", result.stdout);
    let markup = lines
        .iter()
        .position(|l| l.ends_with("-- MainWindow.axaml"))
        .expect("markup listed");
    assert!(lines[markup + 1].ends_with("`-- MainWindow.axaml.cs"), "{}", result.stdout);
    assert!(lines.iter().any(|l| l.ends_with("Views/")));
    assert!(!result.stdout.contains("bin/"));
}

#[test]
fn refs_json_lists_artifacts_in_resolution_order() {
    let env = TestEnv::new();
    avalonia_app(&env);

    let result = env.run(&["--json", "refs", "App"]);
    assert!(result.success, "stderr: {}", result.stderr);

    let json = result.json();
    let artifacts = json["artifacts"].as_array().expect("artifacts array");
    let listed: Vec<(&str, &str)> = artifacts
        .iter()
        .map(|a| {
            (
                a["logical_name"].as_str().unwrap(),
                a["origin"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        listed,
        vec![
            ("Core", "sibling_project"),
            ("Kit.Controls", "package"),
            ("App", "own_output"),
        ]
    );
    assert!(artifacts.iter().all(|a| !a["modified"].is_null()));
    assert_eq!(json["diagnostics"].as_array().map(Vec::len), Some(0));
}

#[test]
fn refs_text_numbers_each_binary() {
    let env = TestEnv::new();
    avalonia_app(&env);

    let result = env.run(&["refs", "App"]);
    assert!(result.success, "stderr: {}", result.stderr);
    assert!(result.stdout.contains("3 resolved binaries"), "{}", result.stdout);
    assert!(result.stdout.contains("  1. Core"));
    assert!(result.stdout.contains("  3. App"));
}

#[test]
fn palette_lists_controls_from_package_module() {
    let env = TestEnv::new();
    avalonia_app(&env);

    let result = env.run(&["palette", "App"]);
    assert!(result.success, "stderr: {}", result.stderr);
    assert!(result.stdout.contains("Kit.Controls ("), "{}", result.stdout);
    assert!(result.stdout.contains("[+] Kit.Controls.Dial"));
    assert!(result.stdout.contains("[+] Kit.Controls.Gauge"));
    assert!(
        result.stdout.contains("2 controls in 1 modules (2 without controls, 0 skipped)"),
        "{}",
        result.stdout
    );
}

#[test]
fn palette_json_reports_the_catalog() {
    let env = TestEnv::new();
    avalonia_app(&env);

    let result = env.run(&["--json", "palette", "App"]);
    assert!(result.success, "stderr: {}", result.stderr);
    let json = result.json();
    assert_eq!(json["mode"], "project");
    let catalog = json["catalog"].as_array().expect("catalog array");
    assert_eq!(catalog.len(), 1);
    let names: Vec<&str> = catalog[0]["controls"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Dial", "Gauge"]);
}

#[test]
fn flavor_names_the_deciding_rule() {
    let env = TestEnv::new();
    ProjectFixture::new()
        .sdk("Microsoft.NET.Sdk.Maui")
        .target_framework("net8.0-android")
        .write(env.root(), "Phone");

    let text = env.run(&["flavor", "Phone"]);
    assert!(text.success, "stderr: {}", text.stderr);
    assert_eq!(text.stdout.trim(), "Phone: maui (target_moniker)");

    let json = env.run(&["--json", "flavor", "Phone"]).json();
    assert_eq!(json[0]["flavor"], "maui");
    assert_eq!(json[0]["rule"], "target_moniker");
}

#[test]
fn solution_opens_every_member() {
    let env = TestEnv::new();
    avalonia_app(&env);
    write_solution(&env.path("Suite.sln"), &["App/App.csproj", "Core/Core.csproj"]);

    let result = env.run(&["--json", "flavor", "Suite.sln"]);
    assert!(result.success, "stderr: {}", result.stderr);
    let json = result.json();
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    // Roots are listed in resolution order; Core is reached through App first.
    assert_eq!(names, vec!["Core", "App"]);
}

#[test]
fn missing_descriptor_fails_with_message() {
    let env = TestEnv::new();
    env.write("empty/readme.txt", "nothing here");

    let result = env.run(&["refs", "empty"]);
    assert!(!result.success);
    assert_ne!(result.exit_code, 0);
    assert!(
        result.stderr.contains("no project descriptor found"),
        "stderr: {}",
        result.stderr
    );
}

#[test]
fn configuration_flag_restricts_build_output_search() {
    let env = TestEnv::new();
    ProjectFixture::new().write(env.root(), "App");
    let module = ImageBuilder::new(Some("App")).build();
    let release = write_build_output(&env.path("App"), "Release", "net8.0", "App", &module);
    write_build_output(&env.path("App"), "Debug", "net8.0", "App", &module);
    age(&release, 3600);

    let newest = env.run(&["--json", "refs", "App"]).json();
    assert!(newest["artifacts"][0]["path"].as_str().unwrap().contains("Debug"));

    let pinned = env.run(&["--json", "--configuration", "Release", "refs", "App"]).json();
    assert!(pinned["artifacts"][0]["path"].as_str().unwrap().contains("Release"));
}

#[test]
fn project_config_file_is_applied_and_unknown_keys_warned() {
    let env = TestEnv::new();
    ProjectFixture::new().write(env.root(), "App");
    write_build_output(&env.path("App"), "Staging", "net8.0", "App", &ImageBuilder::new(Some("App")).build());
    env.write(
        "App/quarry.toml",
        "[build]\nconfigurations = [\"Staging\"]\nconfigurationz = []\n",
    );

    let result = env.run(&["--json", "refs", "App"]);
    assert!(result.success, "stderr: {}", result.stderr);
    let path = result.json()["artifacts"][0]["path"].as_str().unwrap().to_string();
    assert!(path.contains("Staging"), "{path}");
    assert!(
        result.stderr.contains("did you mean 'configurations'"),
        "stderr: {}",
        result.stderr
    );
}

#[test]
fn global_packages_env_points_at_another_cache() {
    let env = TestEnv::new();
    ProjectFixture::new()
        .package("Kit.Controls", None)
        .write(env.root(), "App");
    let cache = env.path("cache");
    write_file(
        &cache.join("kit.controls/2.1.0/lib/net8.0/Kit.Controls.dll"),
        &control_module("Kit.Controls"),
    );

    let missing = env.run(&["--json", "refs", "App"]).json();
    assert!(missing["artifacts"].as_array().unwrap().is_empty());

    let cache_arg = cache.display().to_string();
    let found = env
        .run_with_env(&["--json", "refs", "App"], &[("QUARRY_GLOBAL_PACKAGES", &cache_arg)])
        .json();
    assert_eq!(found["artifacts"][0]["logical_name"], "Kit.Controls");
}
