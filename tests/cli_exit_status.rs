#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `provision` binary itself.
//!
//! Each test writes a plan into a temporary home, runs the built binary with
//! `--plan`, and checks the process exit status and what lands on stdout.

use std::path::Path;
use std::process::{Command, Output};

/// Run the binary with `$HOME` and `$XDG_CACHE_HOME` inside `home`.
fn run_provision(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_provision"))
        .args(args)
        .env("HOME", home)
        .env("XDG_CACHE_HOME", home.join(".cache"))
        .output()
        .expect("provision should execute")
}

/// Write `toml` to `plan.toml` under `home` and return its path as a string.
fn write_plan(home: &Path, toml: &str) -> String {
    let path = home.join("plan.toml");
    std::fs::write(&path, toml).unwrap();
    path.display().to_string()
}

const BLOCKING_FAILURE: &str = r#"
[[phase]]
name = "repos"

[[phase.step]]
name = "Add repository"
blocking = true
always_run = true

[[phase.step.action]]
type = "shell"
command = "exit 2"

[[phase]]
name = "packages"

[[phase.step]]
name = "Never reached"
skip_if = { file = "~/reached" }

[[phase.step.action]]
type = "shell"
command = "touch ~/reached"
"#;

const NON_BLOCKING_FAILURE: &str = r#"
[[phase]]
name = "tools"

[[phase.step]]
name = "Broken tool"
always_run = true

[[phase.step.action]]
type = "shell"
command = "exit 2"

[[phase.step]]
name = "Working tool"
skip_if = { file = "~/worked" }

[[phase.step.action]]
type = "shell"
command = "touch ~/worked"
"#;

#[test]
fn blocking_failure_exits_non_zero() {
    let home = tempfile::tempdir().unwrap();
    let plan = write_plan(home.path(), BLOCKING_FAILURE);

    let output = run_provision(home.path(), &["--plan", &plan, "install"]);

    assert_eq!(output.status.code(), Some(1), "{output:?}");
    assert!(!home.path().join("reached").exists());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Add repository"));
}

#[test]
fn non_blocking_failure_exits_zero() {
    let home = tempfile::tempdir().unwrap();
    let plan = write_plan(home.path(), NON_BLOCKING_FAILURE);

    let output = run_provision(home.path(), &["--plan", &plan, "install"]);

    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert!(home.path().join("worked").exists());
}

#[test]
fn default_command_is_install() {
    let home = tempfile::tempdir().unwrap();
    let plan = write_plan(home.path(), NON_BLOCKING_FAILURE);

    let output = run_provision(home.path(), &["--plan", &plan]);

    assert!(output.status.success(), "{output:?}");
    assert!(home.path().join("worked").exists());
}

#[test]
fn missing_plan_exits_non_zero() {
    let home = tempfile::tempdir().unwrap();
    let missing = home.path().join("absent.toml").display().to_string();

    let output = run_provision(home.path(), &["--plan", &missing, "install"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.toml"));
}

/// With `--json`, stdout carries nothing but the report.
#[test]
fn json_report_is_the_only_stdout() {
    let home = tempfile::tempdir().unwrap();
    let plan = write_plan(home.path(), NON_BLOCKING_FAILURE);

    let output = run_provision(home.path(), &["--plan", &plan, "install", "--json"]);
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with('{'), "stdout is not a JSON report:\n{stdout}");
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["steps"][0]["step"], "Broken tool");
    assert_eq!(report["steps"][0]["outcome"]["status"], "failed");
    assert_eq!(report["steps"][1]["step"], "Working tool");
    assert_eq!(report["steps"][1]["outcome"]["status"], "completed");
    assert!(report["halted_by"].is_null());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Loading plan"));
    assert!(!stderr.contains('\x1b'), "piped output must not be coloured");
}

#[test]
fn json_report_records_blocking_halt() {
    let home = tempfile::tempdir().unwrap();
    let plan = write_plan(home.path(), BLOCKING_FAILURE);

    let output = run_provision(home.path(), &["--plan", &plan, "install", "--json"]);
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["halted_by"], "Add repository");
    assert_eq!(report["steps"].as_array().map(Vec::len), Some(1));
}
