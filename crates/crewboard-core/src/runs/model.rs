//! Run records — the persisted state of one workflow execution.
//!
//! Status machine:
//!
//! ```text
//! running ──► waiting_for_approval ──► running (approved / changes_requested)
//!    │                 │
//!    │                 └──► canceled | error
//!    └──► success | error | canceled
//! ```
//!
//! `endedAt` is present exactly when the status is terminal, and
//! `waiting_for_approval` always carries a pending approval. The helpers on
//! [`RunRecord`] keep both rules; [`RunRecord::lifecycle_violations`] checks
//! records built by hand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ServerError;

/// Format tag every run record carries.
pub const RUN_SCHEMA: &str = "crewboard.workflow-run.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    WaitingForApproval,
    Success,
    Error,
    Canceled,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::WaitingForApproval => "waiting_for_approval",
            Self::Success => "success",
            Self::Error => "error",
            Self::Canceled => "canceled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "running" => Some(Self::Running),
            "waiting_for_approval" => Some(Self::WaitingForApproval),
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error | Self::Canceled)
    }

    pub fn can_transition_to(&self, next: RunStatus) -> bool {
        use RunStatus::*;
        matches!(
            (self, next),
            (Running, WaitingForApproval)
                | (Running, Success)
                | (Running, Error)
                | (Running, Canceled)
                | (WaitingForApproval, Running)
                | (WaitingForApproval, Error)
                | (WaitingForApproval, Canceled)
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRunStatus {
    Pending,
    Running,
    Waiting,
    Success,
    Error,
    Skipped,
}

/// Result of one node within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResult {
    pub node_id: String,
    pub status: NodeRunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    Pending,
    Approved,
    ChangesRequested,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRecord {
    pub node_id: String,
    pub state: ApprovalState,
    pub requested_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One file per `(teamId, workflowId, runId)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    #[serde(default = "default_schema")]
    pub schema: String,
    pub id: String,
    /// Back-references; the store overwrites both with the file's location
    #[serde(default)]
    pub workflow_id: String,
    #[serde(default)]
    pub team_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalRecord>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

fn default_schema() -> String {
    RUN_SCHEMA.to_string()
}

/// Sortable run id: `YYYYMMDD-HHMMSS-<8 hex>`.
///
/// Lexical order follows start time, which is what newest-first listing
/// relies on.
pub fn new_run_id(now: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", now.format("%Y%m%d-%H%M%S"), &suffix[..8])
}

impl RunRecord {
    /// A fresh `running` record.
    pub fn start(
        team_id: impl Into<String>,
        workflow_id: impl Into<String>,
        run_id: impl Into<String>,
    ) -> Self {
        Self {
            schema: default_schema(),
            id: run_id.into(),
            workflow_id: workflow_id.into(),
            team_id: team_id.into(),
            started_at: Utc::now(),
            ended_at: None,
            status: RunStatus::Running,
            summary: None,
            nodes: Vec::new(),
            approval: None,
            meta: Map::new(),
        }
    }

    fn transition(&mut self, next: RunStatus) -> Result<(), ServerError> {
        if !self.status.can_transition_to(next) {
            return Err(ServerError::BadRequest(format!(
                "run '{}' cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        self.ended_at = if next.is_terminal() { Some(Utc::now()) } else { None };
        Ok(())
    }

    /// Pause at a `human_approval` node.
    pub fn request_approval(&mut self, node_id: impl Into<String>) -> Result<(), ServerError> {
        self.transition(RunStatus::WaitingForApproval)?;
        self.approval = Some(ApprovalRecord {
            node_id: node_id.into(),
            state: ApprovalState::Pending,
            requested_at: Utc::now(),
            decided_at: None,
            note: None,
        });
        Ok(())
    }

    /// Record the human decision. `approved` and `changes_requested` resume
    /// the run; `canceled` ends it.
    pub fn resolve_approval(
        &mut self,
        decision: ApprovalState,
        note: Option<String>,
    ) -> Result<(), ServerError> {
        if self.status != RunStatus::WaitingForApproval {
            return Err(ServerError::BadRequest(format!(
                "run '{}' is not waiting for approval",
                self.id
            )));
        }
        let next = match decision {
            ApprovalState::Pending => {
                return Err(ServerError::BadRequest(
                    "approval decision cannot be pending".to_string(),
                ))
            }
            ApprovalState::Approved | ApprovalState::ChangesRequested => RunStatus::Running,
            ApprovalState::Canceled => RunStatus::Canceled,
        };
        self.transition(next)?;
        if let Some(approval) = self.approval.as_mut() {
            approval.state = decision;
            approval.decided_at = Some(Utc::now());
            approval.note = note;
        }
        Ok(())
    }

    /// End the run with a terminal status.
    pub fn finish(&mut self, status: RunStatus, summary: Option<String>) -> Result<(), ServerError> {
        if !status.is_terminal() {
            return Err(ServerError::BadRequest(format!(
                "{} is not a terminal status",
                status
            )));
        }
        self.transition(status)?;
        if summary.is_some() {
            self.summary = summary;
        }
        Ok(())
    }

    /// Rule breaks in a record's status bookkeeping; empty means consistent.
    pub fn lifecycle_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        match (self.status.is_terminal(), self.ended_at.is_some()) {
            (true, false) => violations.push(format!("status {} requires endedAt", self.status)),
            (false, true) => violations.push(format!("status {} must not have endedAt", self.status)),
            _ => {}
        }
        if let Some(ended) = self.ended_at {
            if ended < self.started_at {
                violations.push("endedAt is before startedAt".to_string());
            }
        }
        if self.status == RunStatus::WaitingForApproval {
            match &self.approval {
                Some(a) if a.state == ApprovalState::Pending => {}
                Some(_) => violations
                    .push("waiting_for_approval requires a pending approval".to_string()),
                None => violations.push("waiting_for_approval requires an approval".to_string()),
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_run_id_is_sortable_and_valid() {
        let early = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 5).unwrap();
        let a = new_run_id(early);
        let b = new_run_id(late);
        assert!(a.starts_with("20240301-080000-"));
        assert!(a < b);
        assert!(crate::ids::validate_run_id(&a).is_ok());
    }

    #[test]
    fn test_approval_round_trip_resumes_running() {
        let mut run = RunRecord::start("acme", "demo", "r1");
        run.request_approval("approval").unwrap();
        assert_eq!(run.status, RunStatus::WaitingForApproval);
        assert!(run.lifecycle_violations().is_empty());

        run.resolve_approval(ApprovalState::ChangesRequested, Some("tone it down".into()))
            .unwrap();
        assert_eq!(run.status, RunStatus::Running);
        let approval = run.approval.as_ref().unwrap();
        assert_eq!(approval.state, ApprovalState::ChangesRequested);
        assert!(approval.decided_at.is_some());

        run.finish(RunStatus::Success, Some("published".into())).unwrap();
        assert!(run.ended_at.is_some());
        assert!(run.lifecycle_violations().is_empty());
    }

    #[test]
    fn test_cancel_from_approval_is_terminal() {
        let mut run = RunRecord::start("acme", "demo", "r1");
        run.request_approval("approval").unwrap();
        run.resolve_approval(ApprovalState::Canceled, None).unwrap();
        assert_eq!(run.status, RunStatus::Canceled);
        assert!(run.ended_at.is_some());
        assert!(run.finish(RunStatus::Error, None).is_err());
    }

    #[test]
    fn test_illegal_transitions_are_rejected() {
        let mut run = RunRecord::start("acme", "demo", "r1");
        assert!(run.resolve_approval(ApprovalState::Approved, None).is_err());
        assert!(run.finish(RunStatus::Running, None).is_err());
        run.finish(RunStatus::Success, None).unwrap();
        assert!(run.request_approval("approval").is_err());
        assert_eq!(run.status, RunStatus::Success);
    }

    #[test]
    fn test_lifecycle_violations() {
        let mut run = RunRecord::start("acme", "demo", "r1");
        run.status = RunStatus::Success;
        assert_eq!(run.lifecycle_violations(), vec!["status success requires endedAt"]);

        run.status = RunStatus::WaitingForApproval;
        run.ended_at = Some(run.started_at);
        assert_eq!(run.lifecycle_violations().len(), 2);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let mut run = RunRecord::start("acme", "demo", "r1");
        run.request_approval("gate").unwrap();
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["schema"], RUN_SCHEMA);
        assert_eq!(json["workflowId"], "demo");
        assert_eq!(json["status"], "waiting_for_approval");
        assert_eq!(json["approval"]["nodeId"], "gate");
        assert_eq!(json["approval"]["state"], "pending");
        assert!(json.get("endedAt").is_none());
    }
}
