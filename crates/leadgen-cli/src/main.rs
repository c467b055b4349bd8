mod campaign;
mod export;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::campaign::RunArgs;

#[derive(Debug, Parser)]
#[command(name = "leadgen")]
#[command(about = "Lead generation campaign runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a full campaign: analyze, discover keywords, plan channels,
    /// generate leads and export them as CSV
    Run(RunArgs),
    /// Regenerate leads from the committed channel strategy and export them
    Leads {
        /// CSV output path (defaults to `leads_<date>.csv` in the export dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show which campaign stages are committed in the session
    Status,
    /// Start over: clear every committed snapshot
    Reset,
    /// Export a saved `generate-leads` response as CSV
    Export {
        /// JSON file containing a lead batch
        #[arg(long)]
        input: PathBuf,
        /// CSV output path (defaults to `leads_<date>.csv` in the export dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = leadgen_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(env = %config.env, api = %config.api_base_url, "configuration loaded");

    match cli.command {
        Commands::Run(args) => campaign::run_campaign(&config, &args).await?,
        Commands::Leads { output } => campaign::run_leads(&config, output.as_deref()).await?,
        Commands::Status => campaign::show_status(&config),
        Commands::Reset => campaign::reset(&config)?,
        Commands::Export { input, output } => {
            export::run_export(&config, &input, output.as_deref())?;
        }
    }

    Ok(())
}
