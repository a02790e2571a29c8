mod commands;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use formsmith_storage::ArtifactStatus;

use crate::commands::Context;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Artifact status filter for the artifacts subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StatusFilter {
    Draft,
    Approved,
    Rejected,
}

impl From<StatusFilter> for ArtifactStatus {
    fn from(status: StatusFilter) -> Self {
        match status {
            StatusFilter::Draft => ArtifactStatus::Draft,
            StatusFilter::Approved => ArtifactStatus::Approved,
            StatusFilter::Rejected => ArtifactStatus::Rejected,
        }
    }
}

/// Formsmith form compiler.
#[derive(Parser)]
#[command(name = "formsmith", version, about = "Formsmith form compiler")]
struct Cli {
    /// Path to the JSON store file
    #[arg(long, global = true, default_value = "formsmith-store.json")]
    store: PathBuf,

    /// Path to the AI configuration file (TOML)
    #[arg(long, global = true, default_value = "formsmith.toml")]
    config: PathBuf,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Name of the acting user
    #[arg(long, global = true, default_value = "Administrator")]
    actor: String,

    /// Act as a guest without artifact write permission
    #[arg(long, global = true)]
    guest: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a form specification file
    Validate {
        /// Path to the specification JSON file
        spec: PathBuf,
    },

    /// Parse a saved assistant response and show the embedded specification
    Parse {
        /// Path to the response text file
        response: PathBuf,
    },

    /// Compile a specification into a schema
    Synthesize {
        /// Path to the specification JSON file
        spec: PathBuf,
        /// Artifact the schema is attributed to
        #[arg(long, default_value = "manual")]
        artifact_id: String,
        /// Also derive the public form
        #[arg(long)]
        form: bool,
    },

    /// Chat with the assistant interactively on stdin
    Chat {
        /// Resume an existing session
        #[arg(long)]
        session: Option<String>,
        /// Template recorded on a new session
        #[arg(long)]
        template: Option<String>,
    },

    /// Send one message to a session
    Send {
        /// Session id
        session: String,
        /// The user message
        message: String,
    },

    /// Start a session whose draft is the given specification
    Import {
        /// Path to the specification JSON file
        spec: PathBuf,
    },

    /// Freeze a session's draft into an artifact
    Generate {
        /// Session id
        session: String,
        /// Create the schema immediately instead of waiting for review
        #[arg(long)]
        publish: bool,
    },

    /// Approve a draft artifact
    Approve {
        /// Artifact id
        artifact: String,
    },

    /// Reject a draft artifact
    Reject {
        /// Artifact id
        artifact: String,
        /// Reason recorded in the audit trail
        #[arg(long)]
        reason: Option<String>,
    },

    /// List artifacts
    Artifacts {
        /// Only list artifacts with this status
        #[arg(long, value_enum)]
        status: Option<StatusFilter>,
    },

    /// List public forms with their submission counts
    Forms,

    /// Show the artifact audit trail
    Audit {
        /// Only show entries for this artifact
        #[arg(long)]
        artifact: Option<String>,
    },

    /// Record a public form submission
    Submit {
        /// Schema the submission targets
        schema: String,
        /// Path to a JSON object of submitted values
        values: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init();

    match cli.command {
        Commands::Validate { spec } => {
            commands::spec::cmd_validate(&spec, cli.output, cli.quiet);
        }
        Commands::Parse { response } => {
            commands::spec::cmd_parse(&response, cli.output, cli.quiet);
        }
        command => {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    let msg = format!("failed to create tokio runtime: {}", e);
                    report_error(&msg, cli.output, cli.quiet);
                    process::exit(1);
                }
            };
            let (store, config, actor) = (cli.store, cli.config, cli.actor);
            let (guest, output, quiet) = (cli.guest, cli.output, cli.quiet);
            rt.block_on(async move {
                let ctx = Context::open(&store, &config, &actor, guest, output, quiet).await;
                run(&ctx, command).await;
            });
        }
    }
}

async fn run(ctx: &Context, command: Commands) {
    match command {
        Commands::Validate { .. } | Commands::Parse { .. } => {}
        Commands::Synthesize {
            spec,
            artifact_id,
            form,
        } => {
            commands::spec::cmd_synthesize(ctx, &spec, &artifact_id, form).await;
        }
        Commands::Chat { session, template } => {
            commands::chat::cmd_chat(ctx, session.as_deref(), template.as_deref()).await;
        }
        Commands::Send { session, message } => {
            commands::chat::cmd_send(ctx, &session, &message).await;
        }
        Commands::Import { spec } => {
            commands::chat::cmd_import(ctx, &spec).await;
        }
        Commands::Generate { session, publish } => {
            commands::artifact::cmd_generate(ctx, &session, publish).await;
        }
        Commands::Approve { artifact } => {
            commands::artifact::cmd_approve(ctx, &artifact).await;
        }
        Commands::Reject { artifact, reason } => {
            commands::artifact::cmd_reject(ctx, &artifact, reason.as_deref()).await;
        }
        Commands::Artifacts { status } => {
            commands::artifact::cmd_artifacts(ctx, status.map(ArtifactStatus::from)).await;
        }
        Commands::Forms => {
            commands::form::cmd_forms(ctx).await;
        }
        Commands::Audit { artifact } => {
            commands::artifact::cmd_audit(ctx, artifact.as_deref()).await;
        }
        Commands::Submit { schema, values } => {
            commands::form::cmd_submit(ctx, &schema, &values).await;
        }
    }
}

/// Report an error message to stderr, respecting output format and quiet flag.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

/// Pretty-print a serializable value to stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) {
    let pretty = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("serialization error: {}", e));
    println!("{}", pretty);
}
