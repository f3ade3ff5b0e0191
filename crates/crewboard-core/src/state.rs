//! Shared application state for front ends (CLI, HTTP console).

use std::sync::Arc;

use crate::service::WorkflowService;
use crate::workspace::{HomeWorkspaceResolver, TeamWorkspaceResolver};

/// Shared state accessible by all command and request handlers.
pub struct AppStateInner {
    pub service: WorkflowService,
}

pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    pub fn new(workspaces: Arc<dyn TeamWorkspaceResolver>) -> Self {
        Self {
            service: WorkflowService::new(workspaces),
        }
    }

    /// State rooted at `root` using the `workspace-<team>` layout.
    pub fn with_root(root: impl AsRef<std::path::Path>) -> Self {
        Self::new(Arc::new(HomeWorkspaceResolver::new(root)))
    }
}
