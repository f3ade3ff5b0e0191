//! WorkflowService — the operations an operator console exposes.
//!
//! Wraps the two stores with the rules that belong at the request
//! boundary: structural validation before saving, template seeding, and
//! cross-workflow run listing.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::error::ServerError;
use crate::runs::{RunQuery, RunRecord, RunStore};
use crate::workflow::{
    generate, validate_workflow, DeleteOutcome, TemplateKind, TemplateOptions, ValidationReport,
    WorkflowDefinition, WorkflowStore,
};
use crate::workspace::TeamWorkspaceResolver;

/// Result of a successful save; warnings are passed back to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub path: PathBuf,
    pub warnings: Vec<String>,
}

#[derive(Clone)]
pub struct WorkflowService {
    pub workflows: WorkflowStore,
    pub runs: RunStore,
}

impl WorkflowService {
    pub fn new(workspaces: Arc<dyn TeamWorkspaceResolver>) -> Self {
        Self {
            workflows: WorkflowStore::new(workspaces.clone()),
            runs: RunStore::new(workspaces),
        }
    }

    pub async fn list_workflows(&self, team_id: &str) -> Result<Vec<String>, ServerError> {
        self.workflows.list(team_id).await
    }

    pub async fn get_workflow(
        &self,
        team_id: &str,
        workflow_id: &str,
    ) -> Result<WorkflowDefinition, ServerError> {
        self.workflows.read(team_id, workflow_id).await
    }

    /// Validate, then create or replace. Any validation error refuses the
    /// write and returns the full report.
    pub async fn save_workflow(
        &self,
        team_id: &str,
        workflow: &WorkflowDefinition,
    ) -> Result<SaveOutcome, ServerError> {
        let report = validate_workflow(workflow);
        if !report.is_ok() {
            tracing::info!(team_id, workflow_id = %workflow.id, errors = report.errors.len(), "rejected workflow");
            return Err(ServerError::Validation(report));
        }
        let path = self.workflows.write(team_id, workflow).await?;
        Ok(SaveOutcome {
            path,
            warnings: report.warnings,
        })
    }

    pub fn validate(&self, workflow: &WorkflowDefinition) -> ValidationReport {
        validate_workflow(workflow)
    }

    pub async fn delete_workflow(
        &self,
        team_id: &str,
        workflow_id: &str,
    ) -> Result<DeleteOutcome, ServerError> {
        self.workflows.delete(team_id, workflow_id).await
    }

    /// Seed a workflow from a built-in template. Refuses to replace an
    /// existing workflow with the same id.
    pub async fn create_from_template(
        &self,
        team_id: &str,
        workflow_id: &str,
        kind: TemplateKind,
        opts: &TemplateOptions,
    ) -> Result<(WorkflowDefinition, SaveOutcome), ServerError> {
        let path = self.workflows.workflow_path(team_id, workflow_id)?;
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| ServerError::from_io(e, &path))?;
        if exists {
            return Err(ServerError::BadRequest(format!(
                "workflow '{}' already exists",
                workflow_id.trim()
            )));
        }
        let workflow = generate(kind, workflow_id.trim(), opts);
        let saved = self.save_workflow(team_id, &workflow).await?;
        Ok((workflow, saved))
    }

    pub async fn list_runs(
        &self,
        team_id: &str,
        workflow_id: &str,
    ) -> Result<Vec<String>, ServerError> {
        self.runs.list(team_id, workflow_id).await
    }

    pub async fn query_runs(
        &self,
        team_id: &str,
        query: &RunQuery,
    ) -> Result<Vec<RunRecord>, ServerError> {
        self.runs.query(team_id, query).await
    }

    pub async fn get_run(
        &self,
        team_id: &str,
        workflow_id: &str,
        run_id: &str,
    ) -> Result<RunRecord, ServerError> {
        self.runs.read(team_id, workflow_id, run_id).await
    }

    pub async fn save_run(
        &self,
        team_id: &str,
        workflow_id: &str,
        run: &RunRecord,
    ) -> Result<PathBuf, ServerError> {
        self.runs.write(team_id, workflow_id, run).await
    }

    pub async fn delete_run(
        &self,
        team_id: &str,
        workflow_id: &str,
        run_id: &str,
    ) -> Result<DeleteOutcome, ServerError> {
        self.runs.delete(team_id, workflow_id, run_id).await
    }
}
