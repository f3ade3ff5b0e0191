//! Team workspace resolution.
//!
//! Stores never build team paths themselves; they ask a
//! [`TeamWorkspaceResolver`] for the team's root directory and lay out
//! `shared-context/` underneath it.

use std::path::{Path, PathBuf};

use crate::error::ServerError;
use crate::ids::validate_team_id;

/// Directory (relative to a team workspace) holding workflow definitions.
pub const WORKFLOWS_DIR: &str = "shared-context/workflows";
/// Directory (relative to a team workspace) holding per-workflow run folders.
pub const WORKFLOW_RUNS_DIR: &str = "shared-context/workflow-runs";

/// Maps a team id to its workspace directory.
///
/// Implementations must be side-effect-free: resolving never creates the
/// directory. The stores create what they need on write.
pub trait TeamWorkspaceResolver: Send + Sync {
    fn resolve(&self, team_id: &str) -> Result<PathBuf, ServerError>;
}

/// Resolves team `t` to `<root>/workspace-<t>`.
#[derive(Debug, Clone)]
pub struct HomeWorkspaceResolver {
    root: PathBuf,
}

impl HomeWorkspaceResolver {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Default root: `~/.openclaw` (falls back to `./.openclaw` when the
    /// home directory cannot be determined).
    pub fn default_root() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".openclaw")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for HomeWorkspaceResolver {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

impl TeamWorkspaceResolver for HomeWorkspaceResolver {
    fn resolve(&self, team_id: &str) -> Result<PathBuf, ServerError> {
        let team = validate_team_id(team_id)?;
        Ok(self.root.join(format!("workspace-{}", team)))
    }
}
