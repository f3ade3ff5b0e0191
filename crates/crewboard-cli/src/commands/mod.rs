//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command and reuses the
//! crewboard-core domain logic through `AppState`. Commands return the JSON
//! value they would print so tests can inspect it.

pub mod run;
pub mod workflow;

use std::path::PathBuf;
use std::sync::Arc;

use crewboard_core::state::{AppState, AppStateInner};
use crewboard_core::HomeWorkspaceResolver;

/// Build the shared `AppState` for the given workspace root (or the default
/// `~/.openclaw` when none is given).
pub fn init_state(root: Option<PathBuf>) -> AppState {
    let resolver = match root {
        Some(root) => HomeWorkspaceResolver::new(root),
        None => HomeWorkspaceResolver::default(),
    };
    tracing::debug!("Using workspace root {}", resolver.root().display());
    Arc::new(AppStateInner::new(Arc::new(resolver)))
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, String> {
    serde_json::to_value(value).map_err(|e| format!("Failed to serialize output: {}", e))
}
