//! AutoDiag Control - CLI client for the vehicle diagnosis daemon
//!
//! Sends symptom descriptions to autodiagd and renders the diagnosis.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// Version is embedded at build time
const VERSION: &str = env!("AUTODIAG_VERSION");

#[derive(Parser)]
#[command(name = "autodiagctl")]
#[command(about = "AutoDiag - vehicle symptom diagnosis", long_about = None)]
#[command(version = VERSION)]
struct Cli {
    /// Daemon URL (default: $AUTODIAG_URL or http://127.0.0.1:7866)
    #[arg(long, global = true)]
    daemon_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diagnose a symptom description
    Diagnose {
        /// Symptom, e.g. "barulho ao frear"
        #[arg(required = true)]
        symptom: Vec<String>,

        /// Continue an existing conversation thread
        #[arg(long)]
        thread: Option<String>,

        /// Use only the built-in offline table
        #[arg(long)]
        offline: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interpret a raw assistant reply (reads stdin when no file is given)
    Interpret {
        file: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// List highlight zones per car view
    Zones {
        /// lateral, motor, inferior, frontal or traseira
        #[arg(long)]
        view: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Resolve the illustration for a part name
    PartImage {
        #[arg(required = true)]
        name: Vec<String>,

        /// Print only the image URL
        #[arg(long)]
        url: bool,
    },

    /// Show daemon health
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Diagnose {
            symptom,
            thread,
            offline,
            json,
        } => commands::diagnose(cli.daemon_url, symptom, thread, offline, json).await,
        Commands::Interpret { file, json } => commands::interpret_file(file, json).await,
        Commands::Zones { view, json } => commands::zones(view, json).await,
        Commands::PartImage { name, url } => commands::part_image_cmd(name, url).await,
        Commands::Status => commands::status(cli.daemon_url).await,
    }
}
