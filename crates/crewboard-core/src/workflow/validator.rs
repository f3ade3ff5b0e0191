//! Structural validation of workflow definitions.
//!
//! Errors mark a graph that must not be persisted (dangling edges,
//! duplicate ids, wrong schema tag). Warnings are advisory: a draft without
//! start/end nodes still saves. Every rule runs on every call, so one pass
//! reports every problem.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::schema::{NodeType, WorkflowDefinition, WORKFLOW_SCHEMA};

/// Outcome of [`validate_workflow`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// True when nothing blocks persistence (warnings are allowed).
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
}

pub fn validate_workflow(wf: &WorkflowDefinition) -> ValidationReport {
    let mut report = ValidationReport::default();

    if wf.schema != WORKFLOW_SCHEMA {
        report.error(format!(
            "schema must be '{}' (got '{}')",
            WORKFLOW_SCHEMA, wf.schema
        ));
    }
    if wf.id.trim().is_empty() {
        report.error("id is required");
    }
    if wf.name.trim().is_empty() {
        report.error("name is required");
    }

    let node_ids: Vec<&str> = wf.nodes.iter().map(|n| n.id.trim()).collect();
    check_ids("node", &node_ids, &mut report);

    let edge_ids: Vec<&str> = wf.edges.iter().map(|e| e.id.trim()).collect();
    check_ids("edge", &edge_ids, &mut report);

    let known: HashSet<&str> = node_ids.iter().copied().filter(|id| !id.is_empty()).collect();
    for edge in &wf.edges {
        let from = edge.from.trim();
        let to = edge.to.trim();
        if from.is_empty() || to.is_empty() {
            report.error(format!("edge '{}' must have both from and to", edge.id));
            continue;
        }
        if !known.contains(from) {
            report.error(format!(
                "edge '{}' references missing from node '{}'",
                edge.id, from
            ));
        }
        if !known.contains(to) {
            report.error(format!(
                "edge '{}' references missing to node '{}'",
                edge.id, to
            ));
        }
    }

    let starts = wf.nodes.iter().filter(|n| n.node_type == NodeType::Start).count();
    let ends = wf.nodes.iter().filter(|n| n.node_type == NodeType::End).count();
    if starts == 0 {
        report.warn("workflow has no start node");
    } else if starts > 1 {
        report.warn(format!("workflow has {} start nodes; entry point is ambiguous", starts));
    }
    if ends == 0 {
        report.warn("workflow has no end node");
    }

    for cron in wf.cron_triggers() {
        if cron.id.trim().is_empty() {
            report.error("cron trigger is missing an id");
        }
        let expr = cron.expr.trim();
        if expr.is_empty() {
            report.error(format!("cron trigger '{}' is missing expr", cron.id));
        } else if expr.split_whitespace().count() != 5 {
            report.warn(format!(
                "cron trigger '{}' expr '{}' does not have 5 fields",
                cron.id, expr
            ));
        }
        if let Some(tz) = cron.tz.as_deref().map(str::trim).filter(|tz| !tz.is_empty()) {
            if !tz.contains('/') {
                report.warn(format!(
                    "cron trigger '{}' tz '{}' does not look like an IANA zone",
                    cron.id, tz
                ));
            }
        }
    }

    report
}

/// Blank and duplicate checks are independent: both may fire for the same set.
fn check_ids(kind: &str, ids: &[&str], report: &mut ValidationReport) {
    if ids.iter().any(|id| id.is_empty()) {
        report.error(format!("every {} must have an id", kind));
    }
    let mut seen = HashSet::new();
    let dupes: Vec<&str> = ids
        .iter()
        .copied()
        .filter(|id| !id.is_empty() && !seen.insert(*id))
        .collect();
    if !dupes.is_empty() {
        report.error(format!("{} ids must be unique (duplicates: {})", kind, dupes.join(", ")));
    }
}
