//! CLI integration tests running the built `depsolve` binary

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test context holding a directory of repository indexes
struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        Self { temp_dir }
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("failed to write file");
        path
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_depsolve"))
            .current_dir(self.temp_dir.path())
            .env_remove("DEPSOLVE_CONFIG")
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .expect("failed to run depsolve")
    }
}

const MAIN: &str = r#"{
  "info": {"subdir": "noarch"},
  "packages": {
    "foo-1.0.json": {"version": "1.0", "depends": ["bar >=2"]},
    "bar-2.0.json": {"version": "2.0", "note": "{not a brace}"}
  }
}"#;

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
}

#[test]
fn test_solve_prints_resolution() {
    let ctx = TestContext::new();
    ctx.write("main.json", MAIN);

    let output = ctx.run(&["solve", "--repo", "main=main.json", "install foo"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let installs = json["install"].as_array().unwrap();
    assert_eq!(installs.len(), 2);
    assert_eq!(installs[0]["file_name"], "bar-2.0.json");
    assert_eq!(installs[0]["metadata"]["note"], "{not a brace}");
    assert_eq!(installs[1]["file_name"], "foo-1.0.json");
    assert!(json["remove"].as_array().unwrap().is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2 packages in main"));
}

#[test]
fn test_unsatisfiable_exits_with_problems() {
    let ctx = TestContext::new();
    ctx.write("main.json", MAIN);

    let output = ctx.run(&["--quiet", "solve", "--repo", "main=main.json", "qux", "baz"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Problem: nothing provides requested qux"));
    assert!(stderr.contains("Problem: nothing provides requested baz"));
}

#[test]
fn test_solve_from_request_file() {
    let ctx = TestContext::new();
    ctx.write("main.json", MAIN);
    ctx.write(
        "installed.json",
        r#"{"packages": {"bar-1.0.json": {"version": "1.0"}}}"#,
    );
    let config = ctx.write(
        "depsolve.toml",
        r#"
            installed = "installed.json"
            jobs = ["foo"]

            [[repository]]
            name = "main"
            path = "main.json"
        "#,
    );

    let output = ctx.run(&["solve", "--config", config.to_str().unwrap()]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["remove"][0]["repo"], "installed");
    assert_eq!(json["remove"][0]["file_name"], "bar-1.0.json");
    let files: Vec<&str> = json["install"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["file_name"].as_str().unwrap())
        .collect();
    assert_eq!(files, vec!["bar-2.0.json", "foo-1.0.json"]);
}

#[test]
fn test_missing_index_fails() {
    let ctx = TestContext::new();
    let output = ctx.run(&["solve", "--repo", "main=nope.json", "foo"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nope.json"));
}

#[test]
fn test_locate_prints_raw_object() {
    let ctx = TestContext::new();
    let index = ctx.write("main.json", MAIN);

    let output = ctx.run(&["locate", index.to_str().unwrap(), "bar-2.0.json"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim_end(),
        r#"{"version": "2.0", "note": "{not a brace}"}"#
    );
}
