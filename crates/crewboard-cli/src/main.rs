//! crewboard CLI — manage team workflows and inspect their run records.
//!
//! Reuses the same core domain logic (crewboard-core) that backs the
//! operator console.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crewboard_cli::commands;
use crewboard_core::workflow::TemplateOptions;

/// crewboard — workflow definitions and runs for agent teams
#[derive(Parser)]
#[command(name = "crewboard", version, about = "crewboard — workflow definitions and runs for agent teams")]
pub struct Cli {
    /// Directory containing the `workspace-<team>` folders (default: ~/.openclaw)
    #[arg(long, env = "CREWBOARD_ROOT", global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage workflow definitions
    Workflow {
        #[command(subcommand)]
        action: WorkflowAction,
    },

    /// Inspect workflow runs
    Run {
        #[command(subcommand)]
        action: RunAction,
    },
}

#[derive(Subcommand)]
enum WorkflowAction {
    /// List workflow files for a team
    List {
        #[arg(long)]
        team: String,
    },
    /// Print one workflow definition
    Show {
        #[arg(long)]
        team: String,
        /// Workflow ID
        #[arg(long)]
        id: String,
    },
    /// Validate a workflow file (JSON or YAML) without saving it
    Validate {
        /// Path to the workflow file
        file: String,
    },
    /// Validate a workflow file and save it for a team (create or replace)
    Save {
        #[arg(long)]
        team: String,
        /// Path to the workflow file
        file: String,
    },
    /// Delete a workflow definition
    Delete {
        #[arg(long)]
        team: String,
        /// Workflow ID
        #[arg(long)]
        id: String,
    },
    /// List built-in templates
    Templates,
    /// Create a workflow from a built-in template
    Init {
        #[arg(long)]
        team: String,
        /// Workflow ID for the new definition
        #[arg(long)]
        id: String,
        /// Template: marketing-cadence | blank
        #[arg(long, default_value = "marketing-cadence")]
        template: String,
        /// Messaging provider for the approval step
        #[arg(long, default_value = "telegram")]
        provider: String,
        /// Chat or channel that receives approval requests
        #[arg(long, default_value = "")]
        target: String,
        /// IANA timezone for the cron trigger
        #[arg(long, default_value = "Etc/UTC")]
        timezone: String,
    },
}

#[derive(Subcommand)]
enum RunAction {
    /// List runs (newest first), optionally filtered
    List {
        #[arg(long)]
        team: String,
        /// Restrict to one workflow
        #[arg(long)]
        workflow: Option<String>,
        /// running | waiting_for_approval | success | error | canceled
        #[arg(long)]
        status: Option<String>,
        /// Earliest start (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,
        /// Latest start (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print one run record
    Show {
        #[arg(long)]
        team: String,
        #[arg(long)]
        workflow: String,
        /// Run ID
        #[arg(long)]
        id: String,
    },
    /// Delete one run record
    Delete {
        #[arg(long)]
        team: String,
        #[arg(long)]
        workflow: String,
        /// Run ID
        #[arg(long)]
        id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crewboard_core=warn,crewboard_cli=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        // No subcommand — show help
        use clap::CommandFactory;
        Cli::command().print_help().ok();
        println!();
        return;
    };

    let state = commands::init_state(cli.root);

    let result = match command {
        Commands::Workflow { action } => match action {
            WorkflowAction::List { team } => commands::workflow::list(&state, &team).await,
            WorkflowAction::Show { team, id } => {
                commands::workflow::show(&state, &team, &id).await
            }
            WorkflowAction::Validate { file } => {
                commands::workflow::validate(&state, &file).await
            }
            WorkflowAction::Save { team, file } => {
                commands::workflow::save(&state, &team, &file).await
            }
            WorkflowAction::Delete { team, id } => {
                commands::workflow::delete(&state, &team, &id).await
            }
            WorkflowAction::Templates => Ok(commands::workflow::templates()),
            WorkflowAction::Init {
                team,
                id,
                template,
                provider,
                target,
                timezone,
            } => {
                let opts = TemplateOptions {
                    approval_provider: provider,
                    approval_target: target,
                    timezone,
                };
                commands::workflow::init(&state, &team, &id, &template, opts).await
            }
        },

        Commands::Run { action } => match action {
            RunAction::List {
                team,
                workflow,
                status,
                since,
                until,
                limit,
            } => {
                let args = commands::run::ListArgs {
                    workflow_id: workflow,
                    status,
                    since,
                    until,
                    limit,
                };
                commands::run::list(&state, &team, args).await
            }
            RunAction::Show { team, workflow, id } => {
                commands::run::show(&state, &team, &workflow, &id).await
            }
            RunAction::Delete { team, workflow, id } => {
                commands::run::delete(&state, &team, &workflow, &id).await
            }
        },
    };

    match result {
        Ok(value) => commands::print_json(&value),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
