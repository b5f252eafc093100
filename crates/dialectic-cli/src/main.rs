mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use cmd::EventArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dialectic",
    about = "Classify code-change events, update focus documentation, and broadcast progress",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .dialectic/ or .git/)
    #[arg(long, global = true, env = "DIALECTIC_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .dialectic/config.yaml and the documentation directory
    Init {
        /// Project name (default: root directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Show focus flags, pattern and templates for an event without writing anything
    Classify {
        #[command(flatten)]
        event: EventArgs,
    },

    /// Run an event (or a canned scenario) through the full pipeline
    Run {
        /// Canned scenario to run instead of --message/--file
        #[arg(long, conflicts_with_all = ["message", "files", "errors"])]
        scenario: Option<String>,

        #[command(flatten)]
        event: EventArgs,
    },

    /// List the canned scenarios
    Scenarios,

    /// Show counters: totals, success rate, most frequent patterns
    Stats {
        /// Number of patterns to show
        #[arg(long, default_value = "5")]
        top: usize,
    },

    /// Show the most recently processed events, newest first
    History {
        /// Number of events to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Inspect and validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Serve the WebSocket / SSE / HTTP API
    Serve {
        /// Bind address (default: server.host from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on, 0 = OS-assigned (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref()),
        Commands::Classify { event } => cmd::classify::run(&root, event, cli.json),
        Commands::Run { scenario, event } => {
            cmd::run::run(&root, scenario.as_deref(), event, cli.json)
        }
        Commands::Scenarios => cmd::scenarios::run(cli.json),
        Commands::Stats { top } => cmd::stats::run(&root, top, cli.json),
        Commands::History { limit } => cmd::history::run(&root, limit, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Serve { host, port } => cmd::serve::run(&root, host, port),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
