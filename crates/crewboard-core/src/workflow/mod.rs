//! Workflow definitions — typed graph model, validation, storage, templates.
//!
//! # Architecture
//!
//! ```text
//! editor / template ──► WorkflowDefinition ──► validate_workflow ──► WorkflowStore
//!                                                    │                    │
//!                                          errors / warnings    <id>.workflow.json
//! ```

pub mod schema;
pub mod store;
pub mod templates;
pub mod validator;

pub use schema::{
    CronTrigger, NodeType, WorkflowDefinition, WorkflowEdge, WorkflowNode, WorkflowTrigger,
    WORKFLOW_SCHEMA,
};
pub use store::{DeleteOutcome, WorkflowStore};
pub use templates::{generate, TemplateKind, TemplateOptions};
pub use validator::{validate_workflow, ValidationReport};
