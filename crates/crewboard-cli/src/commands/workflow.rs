//! `crewboard workflow` — Manage team workflow definitions.

use serde_json::{json, Value};

use crewboard_core::state::AppState;
use crewboard_core::workflow::{TemplateKind, TemplateOptions, WorkflowDefinition};
use crewboard_core::ServerError;

use super::to_json;

pub async fn list(state: &AppState, team_id: &str) -> Result<Value, String> {
    let files = state
        .service
        .list_workflows(team_id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(json!({ "teamId": team_id, "files": files }))
}

pub async fn show(state: &AppState, team_id: &str, workflow_id: &str) -> Result<Value, String> {
    let workflow = state
        .service
        .get_workflow(team_id, workflow_id)
        .await
        .map_err(|e| e.to_string())?;
    to_json(&workflow)
}

/// Validate a local workflow file (JSON or YAML) without saving it.
pub async fn validate(state: &AppState, file: &str) -> Result<Value, String> {
    let workflow = WorkflowDefinition::from_file(file).map_err(|e| e.to_string())?;
    let report = state.service.validate(&workflow);
    Ok(json!({
        "ok": report.is_ok(),
        "id": workflow.id,
        "errors": report.errors,
        "warnings": report.warnings,
    }))
}

/// Validate a local workflow file and store it for the team.
pub async fn save(state: &AppState, team_id: &str, file: &str) -> Result<Value, String> {
    let workflow = WorkflowDefinition::from_file(file).map_err(|e| e.to_string())?;
    match state.service.save_workflow(team_id, &workflow).await {
        Ok(saved) => Ok(json!({
            "ok": true,
            "path": saved.path,
            "warnings": saved.warnings,
        })),
        Err(ServerError::Validation(report)) => Err(format!(
            "Workflow '{}' has {} error(s):\n  - {}",
            workflow.id,
            report.errors.len(),
            report.errors.join("\n  - ")
        )),
        Err(e) => Err(e.to_string()),
    }
}

pub async fn delete(state: &AppState, team_id: &str, workflow_id: &str) -> Result<Value, String> {
    let outcome = state
        .service
        .delete_workflow(team_id, workflow_id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(json!({ "ok": true, "existed": outcome.existed, "path": outcome.path }))
}

pub fn templates() -> Value {
    let items: Vec<Value> = TemplateKind::all()
        .iter()
        .map(|k| json!({ "id": k.as_str(), "description": k.description() }))
        .collect();
    json!({ "templates": items })
}

pub async fn init(
    state: &AppState,
    team_id: &str,
    workflow_id: &str,
    template: &str,
    opts: TemplateOptions,
) -> Result<Value, String> {
    let kind: TemplateKind = template.parse().map_err(|e: ServerError| e.to_string())?;
    let (workflow, saved) = state
        .service
        .create_from_template(team_id, workflow_id, kind, &opts)
        .await
        .map_err(|e| e.to_string())?;
    tracing::info!("Created workflow '{}' from template '{}'", workflow.id, kind.as_str());
    Ok(json!({
        "ok": true,
        "path": saved.path,
        "warnings": saved.warnings,
        "workflow": to_json(&workflow)?,
    }))
}
