//! WorkflowStore — one JSON file per workflow under a team workspace.
//!
//! Storage path: `<team workspace>/shared-context/workflows/<id>.workflow.json`
//!
//! Writes overwrite unconditionally (last writer wins). Only the id grammar
//! is checked here; structural validation is the caller's job so drafts
//! can round-trip.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;

use super::schema::{WorkflowDefinition, WORKFLOW_SCHEMA};
use crate::error::ServerError;
use crate::ids::validate_workflow_id;
use crate::workspace::{TeamWorkspaceResolver, WORKFLOWS_DIR};

pub const WORKFLOW_FILE_SUFFIX: &str = ".workflow.json";

/// Result of a delete: removing an absent file is not an error.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub existed: bool,
    pub path: PathBuf,
}

#[derive(Clone)]
pub struct WorkflowStore {
    workspaces: Arc<dyn TeamWorkspaceResolver>,
}

impl WorkflowStore {
    pub fn new(workspaces: Arc<dyn TeamWorkspaceResolver>) -> Self {
        Self { workspaces }
    }

    /// Directory holding a team's workflow files.
    pub fn workflows_dir(&self, team_id: &str) -> Result<PathBuf, ServerError> {
        Ok(self.workspaces.resolve(team_id)?.join(WORKFLOWS_DIR))
    }

    /// Path of one workflow file, after checking the id grammar.
    pub fn workflow_path(&self, team_id: &str, workflow_id: &str) -> Result<PathBuf, ServerError> {
        let id = validate_workflow_id(workflow_id)?;
        Ok(self
            .workflows_dir(team_id)?
            .join(format!("{}{}", id, WORKFLOW_FILE_SUFFIX)))
    }

    /// Sorted workflow filenames; a missing directory yields an empty list.
    pub async fn list(&self, team_id: &str) -> Result<Vec<String>, ServerError> {
        let dir = self.workflows_dir(team_id)?;
        let mut files = list_files_with_suffix(&dir, WORKFLOW_FILE_SUFFIX).await?;
        files.sort();
        tracing::debug!(team_id, count = files.len(), "listed workflows");
        Ok(files)
    }

    pub async fn read(
        &self,
        team_id: &str,
        workflow_id: &str,
    ) -> Result<WorkflowDefinition, ServerError> {
        let path = self.workflow_path(team_id, workflow_id)?;
        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| ServerError::from_io(e, &path))?;
        tracing::debug!(team_id, workflow_id, "read workflow");
        serde_json::from_str(&content).map_err(|e| {
            ServerError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Create or replace a workflow. The stored id is the validated id and
    /// the schema tag is forced to the current version.
    pub async fn write(
        &self,
        team_id: &str,
        workflow: &WorkflowDefinition,
    ) -> Result<PathBuf, ServerError> {
        let id = validate_workflow_id(&workflow.id)?;
        let dir = self.workflows_dir(team_id)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServerError::from_io(e, &dir))?;

        let mut normalized = workflow.clone();
        normalized.id = id.clone();
        normalized.schema = WORKFLOW_SCHEMA.to_string();

        let path = dir.join(format!("{}{}", id, WORKFLOW_FILE_SUFFIX));
        fs::write(&path, normalized.to_pretty_json()?)
            .await
            .map_err(|e| ServerError::from_io(e, &path))?;
        tracing::info!(team_id, workflow_id = %id, "wrote workflow");
        Ok(path)
    }

    pub async fn delete(
        &self,
        team_id: &str,
        workflow_id: &str,
    ) -> Result<DeleteOutcome, ServerError> {
        let path = self.workflow_path(team_id, workflow_id)?;
        remove_if_present(path).await
    }
}

/// Filenames (not paths) in `dir` ending with `suffix`.
pub(crate) async fn list_files_with_suffix(
    dir: &std::path::Path,
    suffix: &str,
) -> Result<Vec<String>, ServerError> {
    let mut readdir = match fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ServerError::from_io(e, dir)),
    };

    let mut files = Vec::new();
    while let Some(entry) = readdir
        .next_entry()
        .await
        .map_err(|e| ServerError::from_io(e, dir))?
    {
        let is_file = entry
            .file_type()
            .await
            .map_err(|e| ServerError::from_io(e, dir))?
            .is_file();
        if !is_file {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if name.ends_with(suffix) {
                files.push(name.to_string());
            }
        }
    }
    Ok(files)
}

pub(crate) async fn remove_if_present(path: PathBuf) -> Result<DeleteOutcome, ServerError> {
    match fs::remove_file(&path).await {
        Ok(()) => {
            tracing::info!(path = %path.display(), "deleted");
            Ok(DeleteOutcome { existed: true, path })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Ok(DeleteOutcome { existed: false, path })
        }
        Err(e) => Err(ServerError::from_io(e, &path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::schema::{NodeType, WorkflowEdge, WorkflowNode};
    use crate::workspace::HomeWorkspaceResolver;
    use tempfile::TempDir;

    fn store(root: &TempDir) -> WorkflowStore {
        WorkflowStore::new(Arc::new(HomeWorkspaceResolver::new(root.path())))
    }

    fn demo() -> WorkflowDefinition {
        let mut wf = WorkflowDefinition::new("demo", "Demo");
        wf.nodes.push(WorkflowNode::new("s", NodeType::Start));
        wf.nodes.push(WorkflowNode::new("e", NodeType::End));
        wf.edges.push(WorkflowEdge::new("e1", "s", "e"));
        wf
    }

    #[tokio::test]
    async fn test_list_without_directory_is_empty() {
        let root = TempDir::new().unwrap();
        assert!(store(&root).list("acme").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_list_read_round_trip() {
        let root = TempDir::new().unwrap();
        let store = store(&root);
        let wf = demo();

        let path = store.write("acme", &wf).await.unwrap();
        assert!(path.ends_with("workspace-acme/shared-context/workflows/demo.workflow.json"));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.ends_with('\n'));

        assert_eq!(store.list("acme").await.unwrap(), vec!["demo.workflow.json"]);
        assert_eq!(store.read("acme", "demo").await.unwrap(), wf);
    }

    #[tokio::test]
    async fn test_write_normalizes_id_and_schema() {
        let root = TempDir::new().unwrap();
        let store = store(&root);
        let mut wf = demo();
        wf.id = "  demo ".into();
        wf.schema = "legacy".into();

        store.write("acme", &wf).await.unwrap();
        let back = store.read("acme", "demo").await.unwrap();
        assert_eq!(back.id, "demo");
        assert_eq!(back.schema, WORKFLOW_SCHEMA);
        assert_eq!(back.nodes, wf.nodes);
    }

    #[tokio::test]
    async fn test_invalid_id_never_touches_disk() {
        let root = TempDir::new().unwrap();
        let store = store(&root);
        let mut wf = demo();
        wf.id = "Bad_Id".into();

        assert!(matches!(store.write("acme", &wf).await, Err(ServerError::InvalidId(_))));
        assert!(matches!(store.read("acme", "../x").await, Err(ServerError::InvalidId(_))));
        assert!(!root.path().join("workspace-acme").exists());
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let root = TempDir::new().unwrap();
        assert!(matches!(
            store(&root).read("acme", "nope").await,
            Err(ServerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let root = TempDir::new().unwrap();
        let store = store(&root);
        let path = store.workflow_path("acme", "broken").unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            store.read("acme", "broken").await,
            Err(ServerError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        // No concurrency token: a second write silently replaces the first.
        let root = TempDir::new().unwrap();
        let store = store(&root);
        let mut first = demo();
        first.name = "First".into();
        let mut second = demo();
        second.name = "Second".into();

        store.write("acme", &first).await.unwrap();
        store.write("acme", &second).await.unwrap();
        assert_eq!(store.read("acme", "demo").await.unwrap().name, "Second");
    }

    #[tokio::test]
    async fn test_list_ignores_directories_with_matching_suffix() {
        let root = TempDir::new().unwrap();
        let store = store(&root);
        store.write("acme", &demo()).await.unwrap();
        let dir = store.workflows_dir("acme").unwrap();
        std::fs::create_dir_all(dir.join("stray.workflow.json")).unwrap();

        assert_eq!(store.list("acme").await.unwrap(), vec!["demo.workflow.json"]);
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let root = TempDir::new().unwrap();
        let store = store(&root);
        store.write("acme", &demo()).await.unwrap();

        assert!(store.delete("acme", "demo").await.unwrap().existed);
        assert!(!store.delete("acme", "demo").await.unwrap().existed);
        assert!(store.list("acme").await.unwrap().is_empty());
    }
}
