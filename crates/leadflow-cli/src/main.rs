mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    kpi::KpiSubcommand, lead::LeadSubcommand, playbook::PlaybookSubcommand,
    status::StatusSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "leadflow",
    about = "CRM lead pipeline tracker — manage leads, statuses, notes, and playbooks",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workspace root (default: auto-detect from .leadflow/ or .git/)
    #[arg(long, global = true, env = "LEADFLOW_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a leadflow workspace in the current project
    Init {
        /// Workspace name (default: directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Manage leads
    Lead {
        #[command(subcommand)]
        subcommand: LeadSubcommand,
    },

    /// Dashboard KPIs (stage counts, funnel, UTM performance, trends)
    Kpi {
        #[command(subcommand)]
        subcommand: Option<KpiSubcommand>,
    },

    /// Inspect the status taxonomy
    Status {
        #[command(subcommand)]
        subcommand: StatusSubcommand,
    },

    /// Manage sales playbooks
    Playbook {
        #[command(subcommand)]
        subcommand: PlaybookSubcommand,
    },

    /// Launch the HTTP API server
    Ui {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "0")]
        port: u16,

        /// Don't open a browser automatically
        #[arg(long)]
        no_open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Ui { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref(), cli.json),
        Commands::Lead { subcommand } => cmd::lead::run(&root, subcommand, cli.json),
        Commands::Kpi { subcommand } => cmd::kpi::run(&root, subcommand, cli.json),
        Commands::Status { subcommand } => cmd::status::run(&root, subcommand, cli.json),
        Commands::Playbook { subcommand } => cmd::playbook::run(&root, subcommand, cli.json),
        Commands::Ui { port, no_open } => cmd::ui::run(&root, port, no_open),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
