//! Integration tests for the crewboard-cli commands.
//!
//! These tests exercise the same code paths as the binary against a
//! temporary workspace root, inspecting the JSON each command returns.

use std::path::PathBuf;

use crewboard_cli::commands::{self, run::ListArgs};
use crewboard_core::runs::{RunRecord, RunStatus};
use crewboard_core::state::AppState;
use crewboard_core::workflow::TemplateOptions;
use tempfile::TempDir;

fn test_state(root: &TempDir) -> AppState {
    commands::init_state(Some(root.path().to_path_buf()))
}

fn write_file(root: &TempDir, name: &str, content: &str) -> String {
    let path: PathBuf = root.path().join(name);
    std::fs::write(&path, content).expect("Failed to write fixture");
    path.to_string_lossy().to_string()
}

const DEMO_JSON: &str = r#"{
  "id": "demo",
  "name": "Demo",
  "nodes": [{ "id": "s", "type": "start" }, { "id": "e", "type": "end" }],
  "edges": [{ "id": "e1", "from": "s", "to": "e" }]
}"#;

#[tokio::test]
async fn test_workflow_save_list_show_delete() {
    let root = TempDir::new().unwrap();
    let state = test_state(&root);
    let file = write_file(&root, "demo.json", DEMO_JSON);

    let saved = commands::workflow::save(&state, "acme", &file).await.unwrap();
    assert_eq!(saved["ok"], true);
    assert_eq!(saved["warnings"].as_array().unwrap().len(), 0);

    let listed = commands::workflow::list(&state, "acme").await.unwrap();
    assert_eq!(listed["files"][0], "demo.workflow.json");

    let shown = commands::workflow::show(&state, "acme", "demo").await.unwrap();
    assert_eq!(shown["schema"], "crewboard.workflow.v1");
    assert_eq!(shown["edges"][0]["to"], "e");

    let deleted = commands::workflow::delete(&state, "acme", "demo").await.unwrap();
    assert_eq!(deleted["existed"], true);
    let deleted = commands::workflow::delete(&state, "acme", "demo").await.unwrap();
    assert_eq!(deleted["existed"], false);
}

#[tokio::test]
async fn test_workflow_validate_yaml_reports_findings() {
    let root = TempDir::new().unwrap();
    let state = test_state(&root);
    let file = write_file(
        &root,
        "broken.yaml",
        r#"
id: broken
name: Broken
triggers:
  - kind: cron
    id: every-five
    expr: "*/5 * * * * *"
nodes:
  - id: s
    type: start
edges:
  - id: e1
    from: s
    to: nowhere
"#,
    );

    let report = commands::workflow::validate(&state, &file).await.unwrap();
    assert_eq!(report["ok"], false);
    let errors = report["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().contains("nowhere"));
    assert_eq!(report["warnings"].as_array().unwrap().len(), 2);

    let err = commands::workflow::save(&state, "acme", &file).await.unwrap_err();
    assert!(err.contains("1 error(s)"));
    let listed = commands::workflow::list(&state, "acme").await.unwrap();
    assert!(listed["files"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_workflow_show_distinguishes_bad_id_from_missing() {
    let root = TempDir::new().unwrap();
    let state = test_state(&root);

    let bad = commands::workflow::show(&state, "acme", "Not_Valid").await.unwrap_err();
    assert!(bad.starts_with("Invalid id"));
    let missing = commands::workflow::show(&state, "acme", "absent").await.unwrap_err();
    assert!(missing.starts_with("Not found"));
}

#[tokio::test]
async fn test_workflow_init_from_template() {
    let root = TempDir::new().unwrap();
    let state = test_state(&root);

    let templates = commands::workflow::templates();
    assert_eq!(templates["templates"].as_array().unwrap().len(), 2);

    let opts = TemplateOptions {
        approval_provider: "telegram".into(),
        approval_target: "-100123".into(),
        timezone: "America/Chicago".into(),
    };
    let created = commands::workflow::init(&state, "acme", "weekly", "marketing-cadence", opts)
        .await
        .unwrap();
    assert_eq!(created["workflow"]["id"], "weekly");
    assert_eq!(created["workflow"]["triggers"][0]["tz"], "America/Chicago");

    let unknown = commands::workflow::init(
        &state,
        "acme",
        "other",
        "does-not-exist",
        TemplateOptions::default(),
    )
    .await;
    assert!(unknown.is_err());
}

#[tokio::test]
async fn test_run_list_show_delete() {
    let root = TempDir::new().unwrap();
    let state = test_state(&root);

    let first = RunRecord::start("acme", "demo", "20240504-090000-aaaa1111");
    let mut second = RunRecord::start("acme", "demo", "20240504-100000-bbbb2222");
    second.finish(RunStatus::Success, Some("done".into())).unwrap();
    state.service.save_run("acme", "demo", &first).await.unwrap();
    state.service.save_run("acme", "demo", &second).await.unwrap();

    let files = commands::run::list(
        &state,
        "acme",
        ListArgs {
            workflow_id: Some("demo".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(files["files"][0], "20240504-100000-bbbb2222.run.json");

    let succeeded = commands::run::list(
        &state,
        "acme",
        ListArgs {
            status: Some("success".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let runs = succeeded["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0]["summary"], "done");

    let bad_status = commands::run::list(
        &state,
        "acme",
        ListArgs {
            status: Some("paused".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(bad_status.is_err());

    let shown = commands::run::show(&state, "acme", "demo", "20240504-090000-aaaa1111")
        .await
        .unwrap();
    assert_eq!(shown["status"], "running");
    assert_eq!(shown["teamId"], "acme");

    let deleted = commands::run::delete(&state, "acme", "demo", "20240504-090000-aaaa1111")
        .await
        .unwrap();
    assert_eq!(deleted["existed"], true);
    assert!(commands::run::show(&state, "acme", "demo", "20240504-090000-aaaa1111")
        .await
        .unwrap_err()
        .starts_with("Not found"));
}
