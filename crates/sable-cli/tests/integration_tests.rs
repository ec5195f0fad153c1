//! Integration tests for the Sable CLI
//!
//! These tests verify the CLI behavior end-to-end

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const METHOD1: &str = "public class Foo
{
    public void Method1() {
    }
}
";

const METHOD1_FIXED: &str = "public class Foo
{
    public void Method1()
    {
    }
}
";

/// Helper function to create a test CLI command
#[allow(deprecated)]
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("sable").unwrap();
    cmd.arg("--no-color");
    cmd
}

/// Temporary project holding a single source file
fn project_with(name: &str, content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(name);
    fs::write(&path, content).unwrap();
    (temp_dir, path)
}

#[test]
fn test_help_command() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("fix"));
}

#[test]
fn test_version_command() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(VERSION));
}

#[test]
fn test_check_reports_brace_violation() {
    let (_dir, path) = project_with("Foo.cs", METHOD1);
    cli()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("SA1500"))
        .stdout(predicate::str::contains("Checked 1 file"));
}

#[test]
fn test_check_clean_file() {
    let (_dir, path) = project_with("Foo.cs", METHOD1_FIXED);
    cli()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("no issues found"));
}

#[test]
fn test_lint_alias() {
    let (_dir, path) = project_with("Foo.cs", METHOD1_FIXED);
    cli().arg("lint").arg(&path).assert().success();
}

#[test]
fn test_check_error_on_warnings() {
    let (_dir, path) = project_with("Foo.cs", METHOD1);
    cli()
        .args(["check", "--error-on-warnings"])
        .arg(&path)
        .assert()
        .code(1);
}

#[test]
fn test_check_severity_from_discovered_config() {
    let (dir, _path) = project_with("Foo.cs", METHOD1);
    fs::write(
        dir.path().join(".sablerc.json"),
        r#"{
  // escalate brace placement
  "settings": { "rules": { "SA1500": "error" } }
}"#,
    )
    .unwrap();

    cli()
        .arg("check")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("SA1500"));
}

#[test]
fn test_check_rule_turned_off_by_config() {
    let (dir, path) = project_with("Foo.cs", METHOD1);
    let config = dir.path().join("custom.json");
    fs::write(&config, r#"{ "settings": { "rules": { "SA1500": "off" } } }"#).unwrap();

    cli()
        .arg("check")
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("SA1500").not());
}

#[test]
fn test_check_json_format() {
    let (_dir, path) = project_with("Foo.cs", METHOD1);
    let output = cli()
        .args(["check", "--format", "json"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let diagnostics = value.as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["rule_id"], "SA1500");
}

#[test]
fn test_check_directory_skips_other_files() {
    let (dir, _path) = project_with("Foo.cs", METHOD1_FIXED);
    fs::write(dir.path().join("notes.txt"), "void M() {\n}\n").unwrap();
    cli()
        .arg("check")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Checked 1 file"));
}

#[test]
fn test_check_exclude_pattern() {
    let (dir, _path) = project_with("Foo.cs", METHOD1);
    cli()
        .arg("check")
        .arg(dir.path())
        .args(["--exclude", "**/Foo.cs", "--error-on-warnings"])
        .assert()
        .success();
}

#[test]
fn test_check_unknown_rule() {
    let (_dir, path) = project_with("Foo.cs", METHOD1);
    cli()
        .args(["check", "--rule", "SA9999"])
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("SA9999"));
}

#[test]
fn test_check_nonexistent_path() {
    cli()
        .args(["check", "/nonexistent/path"])
        .assert()
        .code(2);
}

#[test]
fn test_fix_rewrites_file() {
    let (_dir, path) = project_with("Foo.cs", METHOD1);
    cli()
        .arg("fix")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixed 1 of 1 files"));
    assert_eq!(fs::read_to_string(&path).unwrap(), METHOD1_FIXED);
}

#[test]
fn test_fix_dry_run_leaves_file() {
    let (_dir, path) = project_with("Foo.cs", METHOD1);
    cli()
        .args(["fix", "--dry-run"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("---"))
        .stdout(predicate::str::contains("+++"))
        .stdout(predicate::str::contains("+    {"))
        .stdout(predicate::str::contains("Would fix 1 of 1 files"));
    assert_eq!(fs::read_to_string(&path).unwrap(), METHOD1);
}

#[test]
fn test_fix_renames_only_when_unsafe() {
    let source = "class foo\n{\n}\n";
    let (_dir, path) = project_with("foo.cs", source);

    cli()
        .args(["fix", "--rule", "SA1300"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("SA1300"));
    assert_eq!(fs::read_to_string(&path).unwrap(), source);

    cli()
        .args(["fix", "--unsafe", "--rule", "SA1300"])
        .arg(&path)
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&path).unwrap(), "class Foo\n{\n}\n");
}

#[test]
fn test_rules_list() {
    cli()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available rules:"))
        .stdout(predicate::str::contains("SA1500"))
        .stdout(predicate::str::contains("SA1313"));
}

#[test]
fn test_rules_json() {
    let output = cli().args(["rules", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rules = value.as_array().unwrap();
    let brace = rules.iter().find(|rule| rule["id"] == "SA1500").unwrap();
    assert_eq!(brace["fix"], "safe");
    assert_eq!(brace["category"], "layout");
}

#[test]
fn test_config_init() {
    let temp_dir = TempDir::new().unwrap();
    cli()
        .current_dir(temp_dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    let written = fs::read_to_string(temp_dir.path().join(".sablerc.json")).unwrap();
    assert!(written.contains("\"settings\""));

    cli()
        .current_dir(temp_dir.path())
        .args(["config", "init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--force"));

    cli()
        .current_dir(temp_dir.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_schema() {
    cli()
        .args(["config", "schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("indentation"));
}

#[test]
fn test_generate_completion() {
    cli()
        .args(["--generate-completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sable"));
}
