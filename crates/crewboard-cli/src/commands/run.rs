//! `crewboard run` — Inspect and prune workflow run records.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};

use crewboard_core::runs::{RunQuery, RunStatus};
use crewboard_core::state::AppState;

use super::to_json;

/// Filters accepted by `run list`, as raw CLI strings.
#[derive(Debug, Default, Clone)]
pub struct ListArgs {
    pub workflow_id: Option<String>,
    pub status: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub limit: Option<usize>,
}

/// With `--workflow` and no other filter, list run filenames newest first;
/// otherwise aggregate full records across the team's workflows.
pub async fn list(state: &AppState, team_id: &str, args: ListArgs) -> Result<Value, String> {
    let plain = args.status.is_none() && args.since.is_none() && args.until.is_none();
    if let (Some(workflow_id), true) = (args.workflow_id.as_deref(), plain) {
        let mut files = state
            .service
            .list_runs(team_id, workflow_id)
            .await
            .map_err(|e| e.to_string())?;
        if let Some(limit) = args.limit {
            files.truncate(limit);
        }
        return Ok(json!({ "teamId": team_id, "workflowId": workflow_id, "files": files }));
    }

    let status = match args.status.as_deref() {
        Some(s) => Some(RunStatus::from_str(s).ok_or_else(|| format!("Unknown run status '{}'", s))?),
        None => None,
    };
    let query = RunQuery {
        workflow_id: args.workflow_id,
        status,
        since: args.since.as_deref().map(|s| parse_bound(s, false)).transpose()?,
        until: args.until.as_deref().map(|s| parse_bound(s, true)).transpose()?,
        limit: args.limit,
    };
    let runs = state
        .service
        .query_runs(team_id, &query)
        .await
        .map_err(|e| e.to_string())?;
    Ok(json!({ "teamId": team_id, "runs": to_json(&runs)? }))
}

pub async fn show(
    state: &AppState,
    team_id: &str,
    workflow_id: &str,
    run_id: &str,
) -> Result<Value, String> {
    let run = state
        .service
        .get_run(team_id, workflow_id, run_id)
        .await
        .map_err(|e| e.to_string())?;
    to_json(&run)
}

pub async fn delete(
    state: &AppState,
    team_id: &str,
    workflow_id: &str,
    run_id: &str,
) -> Result<Value, String> {
    let outcome = state
        .service
        .delete_run(team_id, workflow_id, run_id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(json!({ "ok": true, "existed": outcome.existed, "path": outcome.path }))
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date. A bare date
/// covers the whole day when used as an upper bound.
fn parse_bound(raw: &str, end_of_day: bool) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {}", raw, e))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| format!("Invalid date '{}'", raw))
}
