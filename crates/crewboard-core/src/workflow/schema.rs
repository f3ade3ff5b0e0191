//! JSON schema types for workflow definitions.
//!
//! A workflow file describes a directed graph of typed nodes:
//!
//! ```json
//! {
//!   "schema": "crewboard.workflow.v1",
//!   "id": "demo",
//!   "name": "Demo",
//!   "timezone": "Europe/Berlin",
//!   "triggers": [
//!     { "kind": "cron", "id": "weekday-morning", "enabled": true, "expr": "0 9 * * 1-5" }
//!   ],
//!   "nodes": [
//!     { "id": "s", "type": "start" },
//!     { "id": "e", "type": "end" }
//!   ],
//!   "edges": [
//!     { "id": "e1", "from": "s", "to": "e" }
//!   ]
//! }
//! ```
//!
//! `config` on nodes and `meta` on the definition are opaque bags; only the
//! executor interprets them.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ServerError;

/// Format tag every workflow definition must carry.
pub const WORKFLOW_SCHEMA: &str = "crewboard.workflow.v1";

/// Open key/value bag.
pub type Bag = Map<String, Value>;

/// Top-level workflow definition, one file per `(teamId, workflowId)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    /// Format tag, expected to equal [`WORKFLOW_SCHEMA`]
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Filename-safe id (authoritative; the store normalizes it on write)
    pub id: String,

    /// Display name
    pub name: String,

    /// Informational revision counter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,

    /// IANA zone applied to cron triggers that don't set their own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default)]
    pub triggers: Vec<WorkflowTrigger>,

    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,

    #[serde(default)]
    pub edges: Vec<WorkflowEdge>,

    /// Template provenance and executor hints
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Bag,
}

fn default_schema() -> String {
    WORKFLOW_SCHEMA.to_string()
}

/// Closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Start,
    End,
    Llm,
    Tool,
    Condition,
    Delay,
    HumanApproval,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Llm => "llm",
            Self::Tool => "tool",
            Self::Condition => "condition",
            Self::Delay => "delay",
            Self::HumanApproval => "human_approval",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed step in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type")]
    pub node_type: NodeType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Layout hints for editors; no semantic meaning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,

    /// Executor-specific settings, interpreted per node type
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: Bag,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
            name: None,
            x: None,
            y: None,
            config: Bag::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_config(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.config.insert(key.to_string(), value.into());
        self
    }
}

/// Directed connection between two node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEdge {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,

    /// Condition hint for the executor; never evaluated here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl WorkflowEdge {
    pub fn new(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            label: None,
        }
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Declarative start condition, read by an external scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowTrigger {
    Cron(CronTrigger),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CronTrigger {
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Cron expression, normally five fields
    #[serde(default)]
    pub expr: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tz: Option<String>,
}

fn default_true() -> bool {
    true
}

impl WorkflowDefinition {
    /// Empty definition with the current schema tag.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: default_schema(),
            id: id.into(),
            name: name.into(),
            version: None,
            timezone: None,
            triggers: Vec::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            meta: Bag::new(),
        }
    }

    /// Parse a workflow definition from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ServerError> {
        serde_json::from_str(json)
            .map_err(|e| ServerError::Serialization(format!("Failed to parse workflow JSON: {}", e)))
    }

    /// Parse a workflow definition from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ServerError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| ServerError::Serialization(format!("Failed to parse workflow YAML: {}", e)))
    }

    /// Load a workflow definition from a file path, choosing the format by
    /// extension (`.yaml`/`.yml` → YAML, anything else → JSON).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ServerError::from_io(e, path))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }

    /// On-disk form: 2-space indented JSON with a trailing newline.
    pub fn to_pretty_json(&self) -> Result<String, ServerError> {
        let mut out = serde_json::to_string_pretty(self)
            .map_err(|e| ServerError::Serialization(e.to_string()))?;
        out.push('\n');
        Ok(out)
    }

    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn cron_triggers(&self) -> impl Iterator<Item = &CronTrigger> {
        self.triggers.iter().map(|t| match t {
            WorkflowTrigger::Cron(cron) => cron,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_workflow() {
        let json = r#"{
  "id": "demo",
  "name": "Demo",
  "nodes": [{ "id": "s", "type": "start" }, { "id": "e", "type": "end" }],
  "edges": [{ "id": "e1", "from": "s", "to": "e" }]
}"#;
        let wf = WorkflowDefinition::from_json(json).unwrap();
        assert_eq!(wf.schema, WORKFLOW_SCHEMA);
        assert_eq!(wf.nodes.len(), 2);
        assert_eq!(wf.nodes[0].node_type, NodeType::Start);
        assert_eq!(wf.edges[0].to, "e");
        assert!(wf.triggers.is_empty());
    }

    #[test]
    fn test_parse_yaml_with_cron_trigger() {
        let yaml = r#"
schema: crewboard.workflow.v1
id: weekly
name: Weekly report
timezone: America/New_York
triggers:
  - kind: cron
    id: monday
    expr: "0 8 * * 1"
nodes:
  - id: ask
    type: human_approval
    config:
      provider: telegram
"#;
        let wf = WorkflowDefinition::from_yaml(yaml).unwrap();
        let crons: Vec<_> = wf.cron_triggers().collect();
        assert_eq!(crons.len(), 1);
        assert!(crons[0].enabled);
        assert_eq!(crons[0].expr, "0 8 * * 1");
        assert_eq!(wf.nodes[0].node_type, NodeType::HumanApproval);
        assert_eq!(wf.nodes[0].config["provider"], "telegram");
    }

    #[test]
    fn test_unknown_node_type_is_rejected() {
        let json = r#"{ "id": "x", "name": "X", "nodes": [{ "id": "a", "type": "webhook" }] }"#;
        assert!(matches!(
            WorkflowDefinition::from_json(json),
            Err(ServerError::Serialization(_))
        ));
    }

    #[test]
    fn test_missing_ids_and_endpoints_reach_the_validator() {
        let json = r#"{
  "id": "partial",
  "name": "Partial",
  "triggers": [{ "kind": "cron", "expr": "0 9 * * 1-5" }],
  "nodes": [{ "type": "start" }, { "id": "s", "type": "start" }],
  "edges": [{ "id": "e1", "from": "s" }]
}"#;
        let wf = WorkflowDefinition::from_json(json).unwrap();
        assert_eq!(wf.nodes[0].id, "");
        assert_eq!(wf.edges[0].to, "");

        let report = crate::workflow::validator::validate_workflow(&wf);
        assert!(report.errors.contains(&"every node must have an id".to_string()));
        assert!(report
            .errors
            .contains(&"edge 'e1' must have both from and to".to_string()));
        assert!(report
            .errors
            .contains(&"cron trigger is missing an id".to_string()));
    }

    #[test]
    fn test_pretty_json_has_trailing_newline_and_omits_empty_bags() {
        let mut wf = WorkflowDefinition::new("demo", "Demo");
        wf.nodes.push(WorkflowNode::new("s", NodeType::Start));
        let out = wf.to_pretty_json().unwrap();
        assert!(out.ends_with("}\n"));
        assert!(out.contains("\n  \"id\": \"demo\""));
        assert!(!out.contains("\"meta\""));
        assert!(!out.contains("\"config\""));
        assert_eq!(WorkflowDefinition::from_json(&out).unwrap(), wf);
    }
}
