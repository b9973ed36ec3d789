//! Weft CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "weft")]
#[command(version)]
#[command(about = "Static-site CSS asset pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the final CSS artifact from an entry file
    Build {
        /// Entry CSS file (defaults to `entry` from the config file)
        entry: Option<String>,

        /// Write output to FILE (defaults to `output` from the config file)
        #[arg(short = 'o', long)]
        output: Option<String>,

        /// Path to the build config file
        #[arg(long, default_value = "weft.yml")]
        config: String,

        /// Suppress console output
        #[arg(long)]
        quiet: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weft=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            entry,
            output,
            config,
            quiet,
        } => commands::build::execute(commands::build::BuildArgs {
            entry,
            output,
            config,
            quiet,
        }),
    }
}
