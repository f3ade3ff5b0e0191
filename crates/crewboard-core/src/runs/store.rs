//! RunStore — one JSON file per run, grouped by workflow.
//!
//! Storage path: `<team workspace>/shared-context/workflow-runs/<workflowId>/<runId>.run.json`
//!
//! Features:
//! - Newest-first listing from lexical filename order (run ids sort by time)
//! - Location-derived back-references (`teamId`, `workflowId`, `id`)
//! - Cross-workflow aggregation via [`RunQuery`]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::fs;

use super::model::{RunRecord, RunStatus, RUN_SCHEMA};
use crate::error::ServerError;
use crate::ids::{validate_run_id, validate_team_id, validate_workflow_id};
use crate::workflow::store::{list_files_with_suffix, remove_if_present, DeleteOutcome};
use crate::workspace::{TeamWorkspaceResolver, WORKFLOW_RUNS_DIR};

pub const RUN_FILE_SUFFIX: &str = ".run.json";

/// Filters for aggregating runs across a team's workflows.
#[derive(Debug, Clone, Default)]
pub struct RunQuery {
    /// Only runs of this workflow
    pub workflow_id: Option<String>,
    /// Only runs in this status
    pub status: Option<RunStatus>,
    /// Inclusive lower bound on `startedAt`
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `startedAt`
    pub until: Option<DateTime<Utc>>,
    /// Maximum number of runs to return
    pub limit: Option<usize>,
}

impl RunQuery {
    fn matches(&self, run: &RunRecord) -> bool {
        if let Some(status) = self.status {
            if run.status != status {
                return false;
            }
        }
        if let Some(since) = self.since {
            if run.started_at < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if run.started_at > until {
                return false;
            }
        }
        true
    }
}

#[derive(Clone)]
pub struct RunStore {
    workspaces: Arc<dyn TeamWorkspaceResolver>,
}

impl RunStore {
    pub fn new(workspaces: Arc<dyn TeamWorkspaceResolver>) -> Self {
        Self { workspaces }
    }

    fn runs_root(&self, team_id: &str) -> Result<PathBuf, ServerError> {
        Ok(self.workspaces.resolve(team_id)?.join(WORKFLOW_RUNS_DIR))
    }

    /// Directory holding the runs of one workflow.
    pub fn runs_dir(&self, team_id: &str, workflow_id: &str) -> Result<PathBuf, ServerError> {
        let workflow_id = validate_workflow_id(workflow_id)?;
        Ok(self.runs_root(team_id)?.join(workflow_id))
    }

    pub fn run_path(
        &self,
        team_id: &str,
        workflow_id: &str,
        run_id: &str,
    ) -> Result<PathBuf, ServerError> {
        let run_id = validate_run_id(run_id)?;
        Ok(self
            .runs_dir(team_id, workflow_id)?
            .join(format!("{}{}", run_id, RUN_FILE_SUFFIX)))
    }

    /// Run filenames, newest first (reverse lexical order).
    pub async fn list(&self, team_id: &str, workflow_id: &str) -> Result<Vec<String>, ServerError> {
        let dir = self.runs_dir(team_id, workflow_id)?;
        let mut files = list_files_with_suffix(&dir, RUN_FILE_SUFFIX).await?;
        files.sort_by(|a, b| b.cmp(a));
        tracing::debug!(team_id, workflow_id, count = files.len(), "listed runs");
        Ok(files)
    }

    pub async fn read(
        &self,
        team_id: &str,
        workflow_id: &str,
        run_id: &str,
    ) -> Result<RunRecord, ServerError> {
        let path = self.run_path(team_id, workflow_id, run_id)?;
        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| ServerError::from_io(e, &path))?;
        serde_json::from_str(&content).map_err(|e| {
            ServerError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Create or replace a run record.
    ///
    /// The back-references are rewritten to match the target location, and
    /// records whose status bookkeeping is inconsistent are refused.
    pub async fn write(
        &self,
        team_id: &str,
        workflow_id: &str,
        run: &RunRecord,
    ) -> Result<PathBuf, ServerError> {
        let team_id = validate_team_id(team_id)?;
        let workflow_id = validate_workflow_id(workflow_id)?;
        let run_id = validate_run_id(&run.id)?;

        let violations = run.lifecycle_violations();
        if !violations.is_empty() {
            return Err(ServerError::BadRequest(format!(
                "run '{}' is inconsistent: {}",
                run_id,
                violations.join("; ")
            )));
        }

        let mut normalized = run.clone();
        normalized.schema = RUN_SCHEMA.to_string();
        normalized.id = run_id.clone();
        normalized.team_id = team_id.clone();
        normalized.workflow_id = workflow_id.clone();

        let dir = self.runs_dir(&team_id, &workflow_id)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServerError::from_io(e, &dir))?;

        let mut body = serde_json::to_string_pretty(&normalized)
            .map_err(|e| ServerError::Serialization(e.to_string()))?;
        body.push('\n');

        let path = dir.join(format!("{}{}", run_id, RUN_FILE_SUFFIX));
        fs::write(&path, body)
            .await
            .map_err(|e| ServerError::from_io(e, &path))?;
        tracing::info!(
            team_id = %team_id,
            workflow_id = %workflow_id,
            run_id = %run_id,
            status = %normalized.status,
            "wrote run"
        );
        Ok(path)
    }

    pub async fn delete(
        &self,
        team_id: &str,
        workflow_id: &str,
        run_id: &str,
    ) -> Result<DeleteOutcome, ServerError> {
        let path = self.run_path(team_id, workflow_id, run_id)?;
        remove_if_present(path).await
    }

    /// Aggregate runs across the team's workflows.
    ///
    /// Returns runs sorted by `startedAt` (newest first). Files that fail to
    /// parse are logged and skipped so one corrupt record doesn't hide the
    /// rest.
    pub async fn query(&self, team_id: &str, query: &RunQuery) -> Result<Vec<RunRecord>, ServerError> {
        let workflow_ids = match &query.workflow_id {
            Some(id) => vec![validate_workflow_id(id)?],
            None => self.workflow_dirs(team_id).await?,
        };

        let mut runs = Vec::new();
        for workflow_id in workflow_ids {
            for file in self.list(team_id, &workflow_id).await? {
                let run_id = file.trim_end_matches(RUN_FILE_SUFFIX);
                match self.read(team_id, &workflow_id, run_id).await {
                    Ok(run) if query.matches(&run) => runs.push(run),
                    Ok(_) => {}
                    Err(e @ ServerError::Io(_)) => return Err(e),
                    Err(e) => {
                        tracing::warn!(team_id, workflow_id = %workflow_id, file = %file, "skipping run: {}", e);
                    }
                }
            }
        }

        runs.sort_by(|a, b| {
            b.started_at
                .cmp(&a.started_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        if let Some(limit) = query.limit {
            runs.truncate(limit);
        }
        Ok(runs)
    }

    /// Workflow ids that have a run directory; names outside the id
    /// grammar are ignored.
    async fn workflow_dirs(&self, team_id: &str) -> Result<Vec<String>, ServerError> {
        let root = self.runs_root(team_id)?;
        let mut readdir = match fs::read_dir(&root).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ServerError::from_io(e, &root)),
        };

        let mut ids = Vec::new();
        while let Some(entry) = readdir
            .next_entry()
            .await
            .map_err(|e| ServerError::from_io(e, &root))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if let Ok(id) = validate_workflow_id(name) {
                    ids.push(id);
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}
