use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use statusboard_application::AppContext;
use statusboard_core::identity::Role;
use statusboard_core::notification::Notifier;
use statusboard_infrastructure::{ConfigService, StatusboardPaths, TracingNotifier};

mod commands;
mod notifier;
mod output;

use notifier::ConsoleNotifier;
use output::OutputMode;

#[derive(Parser)]
#[command(name = "statusboard")]
#[command(about = "Statusboard - weekly status reports", long_about = None)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Use this directory instead of the platform config directory.
    #[arg(long, global = true, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List reports, most recent first
    List {
        /// Only reports authored by the signed-in user
        #[arg(long)]
        mine: bool,
    },
    /// Show one report
    Show { id: String },
    /// Create a report
    New(commands::reports::ReportArgs),
    /// Edit a report; omitted fields are left unchanged
    Edit {
        id: String,
        #[command(flatten)]
        fields: commands::reports::ReportArgs,
    },
    /// Delete a report (manager or admin)
    Delete { id: String },
    /// Generate the mock AI summary for a report
    Summary { id: String },
    /// Export a report (placeholder)
    Export { id: String },
    /// Share a report (placeholder)
    Share { id: String },
    /// Show dashboard stats and the per-team series
    Dashboard,
    /// List reports by last update
    History,
    /// Show the current identity and permissions
    Whoami,
    /// Set the mock role
    Role { role: Role },
    /// Update the mock user profile
    Profile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Sign in (mock: optional name/email; external: password or provider)
    SignIn {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        /// Start a redirect sign-in with this provider (e.g. google)
        #[arg(long, conflicts_with = "password")]
        provider: Option<String>,
    },
    /// Register an account with the external identity service
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out
    SignOut,
    /// Turn local report persistence on or off
    Persist { state: Toggle },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Toggle {
    On,
    Off,
}

fn init_tracing(verbose: bool, default_level: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = StatusboardPaths::new(cli.base_dir.as_deref())?;
    let config_service = ConfigService::new(paths.config_file());
    let config = config_service.load()?;
    init_tracing(cli.verbose, &config.log_level);

    // JSON runs keep notifications out of the human console format
    let (mode, notifier): (OutputMode, Arc<dyn Notifier>) = if cli.json {
        (OutputMode::Json, Arc::new(TracingNotifier))
    } else {
        (OutputMode::Human, Arc::new(ConsoleNotifier))
    };
    let context = AppContext::open(&paths, config, notifier).await?;

    let result = commands::run(&context, &config_service, cli.command, mode).await;
    context.shutdown();
    result
}
