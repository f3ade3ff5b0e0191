//! Run tracking — per-execution records written by an external executor.

pub mod model;
pub mod store;

pub use model::{
    new_run_id, ApprovalRecord, ApprovalState, NodeResult, NodeRunStatus, RunRecord, RunStatus,
    RUN_SCHEMA,
};
pub use store::{RunQuery, RunStore};
