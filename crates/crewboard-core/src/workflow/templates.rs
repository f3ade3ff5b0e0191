//! Built-in workflow templates.
//!
//! Each template is a pure function of its options and always yields a
//! definition that passes [`validate_workflow`](super::validator::validate_workflow)
//! with zero errors.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::{
    CronTrigger, NodeType, WorkflowDefinition, WorkflowEdge, WorkflowNode, WorkflowTrigger,
};
use crate::error::ServerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateKind {
    /// research → draft → QC → approval → publish → two write-backs → end
    MarketingCadence,
    /// start → end
    Blank,
}

impl TemplateKind {
    pub fn all() -> &'static [TemplateKind] {
        &[TemplateKind::MarketingCadence, TemplateKind::Blank]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MarketingCadence => "marketing-cadence",
            Self::Blank => "blank",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::MarketingCadence => {
                "Weekday content pipeline with QC and a human approval gate before publishing"
            }
            Self::Blank => "Empty workflow with a single start and end node",
        }
    }
}

impl FromStr for TemplateKind {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| ServerError::BadRequest(format!("unknown template '{}'", s)))
    }
}

/// Inputs for [`generate`].
#[derive(Debug, Clone)]
pub struct TemplateOptions {
    /// Messaging provider used to ask for approval (e.g. "telegram")
    pub approval_provider: String,
    /// Chat/channel the approval request goes to
    pub approval_target: String,
    /// IANA zone for the definition and its cron trigger
    pub timezone: String,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            approval_provider: "telegram".to_string(),
            approval_target: String::new(),
            timezone: "Etc/UTC".to_string(),
        }
    }
}

pub fn generate(kind: TemplateKind, id: &str, opts: &TemplateOptions) -> WorkflowDefinition {
    let mut wf = match kind {
        TemplateKind::MarketingCadence => marketing_cadence(id, opts),
        TemplateKind::Blank => blank(id),
    };
    wf.version = Some(1);
    wf.meta
        .insert("template".to_string(), Value::from(kind.as_str()));
    wf
}

fn blank(id: &str) -> WorkflowDefinition {
    let mut wf = WorkflowDefinition::new(id, title_from_id(id));
    wf.nodes = vec![
        WorkflowNode::new("start", NodeType::Start).at(80.0, 120.0),
        WorkflowNode::new("end", NodeType::End).at(360.0, 120.0),
    ];
    wf.edges = vec![WorkflowEdge::new("e-start-end", "start", "end")];
    wf
}

fn marketing_cadence(id: &str, opts: &TemplateOptions) -> WorkflowDefinition {
    let mut wf = WorkflowDefinition::new(id, "Marketing Cadence");
    wf.timezone = Some(opts.timezone.clone());
    wf.triggers = vec![WorkflowTrigger::Cron(CronTrigger {
        id: "weekday-morning".to_string(),
        name: Some("Weekdays at 09:00".to_string()),
        enabled: true,
        expr: "0 9 * * 1-5".to_string(),
        tz: Some(opts.timezone.clone()),
    })];

    wf.nodes = vec![
        WorkflowNode::new("start", NodeType::Start).at(40.0, 200.0),
        WorkflowNode::new("research", NodeType::Llm)
            .named("Research")
            .at(200.0, 200.0)
            .with_config("agentRole", "researcher")
            .with_config("prompt", "Collect this week's topics, sources, and competitor moves."),
        WorkflowNode::new("draft", NodeType::Llm)
            .named("Draft posts")
            .at(360.0, 200.0)
            .with_config("agentRole", "writer")
            .with_config("prompt", "Draft platform-specific posts from the research notes."),
        WorkflowNode::new("qc", NodeType::Llm)
            .named("Quality check")
            .at(520.0, 200.0)
            .with_config("agentRole", "editor")
            .with_config("prompt", "Check drafts for tone, accuracy, and brand rules."),
        WorkflowNode::new("approval", NodeType::HumanApproval)
            .named("Human approval")
            .at(680.0, 200.0)
            .with_config("provider", opts.approval_provider.as_str())
            .with_config("target", opts.approval_target.as_str()),
        WorkflowNode::new("publish", NodeType::Tool)
            .named("Publish")
            .at(840.0, 200.0)
            .with_config("tool", "publish_posts"),
        WorkflowNode::new("log-posts", NodeType::Tool)
            .named("Write back: post log")
            .at(1000.0, 120.0)
            .with_config("tool", "append_file")
            .with_config("path", "shared-context/marketing/post-log.md"),
        WorkflowNode::new("update-ticket", NodeType::Tool)
            .named("Write back: ticket")
            .at(1000.0, 280.0)
            .with_config("tool", "update_ticket"),
        WorkflowNode::new("end", NodeType::End).at(1160.0, 200.0),
    ];

    wf.edges = vec![
        WorkflowEdge::new("e-start-research", "start", "research"),
        WorkflowEdge::new("e-research-draft", "research", "draft"),
        WorkflowEdge::new("e-draft-qc", "draft", "qc"),
        WorkflowEdge::new("e-qc-approval", "qc", "approval"),
        WorkflowEdge::new("e-approval-publish", "approval", "publish").labeled("approved"),
        WorkflowEdge::new("e-approval-draft", "approval", "draft").labeled("changes_requested"),
        WorkflowEdge::new("e-publish-log", "publish", "log-posts"),
        WorkflowEdge::new("e-publish-ticket", "publish", "update-ticket"),
        WorkflowEdge::new("e-log-end", "log-posts", "end"),
        WorkflowEdge::new("e-ticket-end", "update-ticket", "end"),
    ];
    wf
}

fn title_from_id(id: &str) -> String {
    let title = id
        .split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    if title.is_empty() {
        "Untitled workflow".to_string()
    } else {
        title
    }
}
