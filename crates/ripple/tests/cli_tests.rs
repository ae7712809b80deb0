//! Integration tests for the ripple CLI.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use rstest::{fixture, rstest};
use tempfile::TempDir;

const GRAPH: &str = r#"{
  "nodes": [
    {"id": "src/db.ts", "path": "src/db.ts"},
    {"id": "src/auth.ts", "path": "src/auth.ts"},
    {"id": "src/main.ts", "path": "src/main.ts"},
    {"id": "src/a.ts", "path": "src/a.ts"},
    {"id": "src/b.ts", "path": "src/b.ts"}
  ],
  "edges": [
    {"source": "src/auth.ts", "target": "src/db.ts"},
    {"source": "src/main.ts", "target": "src/auth.ts"},
    {"source": "src/a.ts", "target": "src/b.ts"},
    {"source": "src/b.ts", "target": "src/a.ts"}
  ]
}"#;

/// Provides a temporary directory holding `dependency-graph.json`
#[fixture]
fn workspace() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    fs::write(temp.path().join("dependency-graph.json"), GRAPH).expect("Failed to write graph");
    temp
}

fn run_ripple(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ripple"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute ripple binary")
}

#[rstest]
fn analyze_json_reports_impacted_files(workspace: TempDir) {
    let output = run_ripple(workspace.path(), &["analyze", "src/db.ts", "--json"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let analysis: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(analysis["target"], "src/db.ts");
    assert_eq!(analysis["changeType"], "modify");
    assert_eq!(analysis["impactedFiles"][0]["nodeId"], "src/auth.ts");
    assert_eq!(analysis["impactedFiles"][0]["impactLevel"], "CRITICAL");
    assert_eq!(analysis["impactedFiles"][1]["impactLevel"], "HIGH");
    assert_eq!(analysis["metadata"]["depth"], 3);
}

#[rstest]
fn analyze_text_output(workspace: TempDir) {
    let output = run_ripple(
        workspace.path(),
        &["analyze", "src/db.ts", "--change-type", "delete"],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("src/auth.ts"));
    assert!(stdout.contains("Risk score:"));
    assert!(stdout.contains("Recommendations:"));
}

#[rstest]
fn analyze_clamps_depth(workspace: TempDir) {
    let output = run_ripple(
        workspace.path(),
        &["analyze", "src/db.ts", "--depth", "10", "--json"],
    );
    assert!(output.status.success());

    let analysis: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(analysis["metadata"]["depth"], 5);
}

#[rstest]
fn analyze_unknown_target_fails_with_suggestion(workspace: TempDir) {
    let output = run_ripple(workspace.path(), &["analyze", "lib/auth.ts"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("target not found"));
    assert!(stderr.contains("src/auth.ts"));
}

#[rstest]
fn analyze_rejects_unknown_change_type(workspace: TempDir) {
    let output = run_ripple(
        workspace.path(),
        &["analyze", "src/db.ts", "--change-type", "rewrite"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid change type"));
}

#[rstest]
fn dependents_lists_both_directions(workspace: TempDir) {
    let output = run_ripple(workspace.path(), &["dependents", "src/auth.ts"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("src/main.ts"));
    assert!(stdout.contains("src/db.ts"));
}

#[rstest]
fn cycles_lists_groups(workspace: TempDir) {
    let output = run_ripple(workspace.path(), &["cycles"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("src/a.ts → src/b.ts → src/a.ts"));
}

#[rstest]
fn missing_graph_file_fails(workspace: TempDir) {
    let output = run_ripple(
        workspace.path(),
        &["--graph", "nowhere.json", "analyze", "src/db.ts"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error"));
}

#[rstest]
fn config_file_is_honored(workspace: TempDir) {
    fs::write(
        workspace.path().join("ripple.yaml"),
        "default-depth: 1\ncache:\n  enabled: false\n",
    )
    .unwrap();

    let output = run_ripple(
        workspace.path(),
        &["--config", "ripple.yaml", "analyze", "src/db.ts", "--json"],
    );
    assert!(output.status.success());

    let analysis: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(analysis["metadata"]["depth"], 1);
    assert_eq!(analysis["impactedFiles"].as_array().map(Vec::len), Some(1));
}
