//! crewboard Core — workflow definitions and run tracking for team workspaces.
//!
//! This crate owns the data model, the structural validator, and the
//! file-backed stores that sit under a team's workspace directory. It has
//! **no HTTP framework dependency** by default, so the same logic backs:
//!
//! - the `crewboard` CLI
//! - an HTTP console (via the optional `axum` error mapping)
//! - external executors that write run records
//!
//! # Layout on disk
//!
//! ```text
//! <team workspace>/shared-context/workflows/<id>.workflow.json
//! <team workspace>/shared-context/workflow-runs/<workflowId>/<runId>.run.json
//! ```
//!
//! # Feature Flags
//!
//! - `axum` — Enables `IntoResponse` impl on `ServerError` for use in axum handlers.

pub mod error;
pub mod ids;
pub mod runs;
pub mod service;
pub mod state;
pub mod workflow;
pub mod workspace;

// Convenience re-exports
pub use error::ServerError;
pub use service::WorkflowService;
pub use state::{AppState, AppStateInner};
pub use workspace::{HomeWorkspaceResolver, TeamWorkspaceResolver};
