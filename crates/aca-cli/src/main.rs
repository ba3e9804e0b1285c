mod commands;
mod host;
mod inputs;
mod telemetry;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::inputs::InputArgs;

#[derive(Parser)]
#[command(
    name = "aca-deploy",
    about = "Build and deploy Azure Container Apps from CI pipelines"
)]
#[command(version)]
struct Cli {
    /// Policy file (default: ./aca-deploy.toml when present)
    #[arg(long, global = true, env = "ACA_DEPLOY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the image if needed and deploy the container app
    Deploy {
        #[command(flatten)]
        inputs: InputArgs,
        /// Build id used in default names (default: from the CI host)
        #[arg(long)]
        build_id: Option<String>,
        /// Build number used in default names (default: from the CI host)
        #[arg(long)]
        build_number: Option<String>,
    },
    /// Validate inputs and print the resolved scenario without calling Azure
    Validate {
        #[command(flatten)]
        inputs: InputArgs,
        /// Print the scenario as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check az, the containerapp extension, the container CLI, and pack
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Deploy {
            inputs,
            build_id,
            build_number,
        } => commands::deploy(inputs, build_id, build_number, config).await?,
        Commands::Validate { inputs, json } => commands::validate(inputs, json).await?,
        Commands::Doctor => commands::doctor(config).await?,
    }

    Ok(())
}
