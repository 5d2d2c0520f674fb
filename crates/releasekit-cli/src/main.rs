//! releasekit CLI tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "releasekit")]
#[command(about = "Package and publish .NET application releases", long_about = None)]
struct Cli {
    /// Path to the release configuration
    #[arg(long, global = true, env = "RELEASEKIT_CONFIG", default_value = "release.kdl")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the release configuration
    Validate,
    /// Build artifacts for the configured targets
    Package {
        /// Only build these target kinds (windows, linux, android, library)
        #[arg(long = "target")]
        targets: Vec<String>,
    },
    /// Build every target and publish a GitHub release with the artifacts
    Release,
    /// Pack library targets and push them to the package feed
    PushPackages,
    /// Publish a web project's static site to the pages branch
    Pages {
        /// Project to publish
        #[arg(long)]
        project: String,
        /// Branch to publish to (defaults to the configured pages branch)
        #[arg(long)]
        branch: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate => {
            commands::validate(&cli.config)?;
        }
        Commands::Package { targets } => {
            commands::package::package(&cli.config, &targets).await?;
        }
        Commands::Release => {
            commands::package::release(&cli.config).await?;
        }
        Commands::PushPackages => {
            commands::package::push_packages(&cli.config).await?;
        }
        Commands::Pages { project, branch } => {
            commands::pages::publish(&cli.config, &project, branch).await?;
        }
    }

    Ok(())
}
