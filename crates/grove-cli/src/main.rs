//! Grove CLI - command-line host for the note graph
//!
//! Loads a vault into a graph, prints orderings and context nodes, and
//! can stay running to stream graph deltas to another process.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "grove")]
#[command(author = "Grove Contributors")]
#[command(version)]
#[command(about = "A live graph over a folder of markdown notes", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Grove in a vault
    Init {
        /// Vault to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Load the vault and report what was found
    Load {
        /// Vault to load (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output file for the graph JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print notes in stable traversal order
    Order {
        /// Vault to load (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Capture the neighbourhood of a note as a context node
    Context {
        /// Id of the origin note
        id: String,

        /// Vault to load (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Maximum hop distance (defaults to the configured value)
        #[arg(short, long)]
        distance: Option<usize>,

        /// Write the context node into the vault
        #[arg(short, long)]
        write: bool,
    },

    /// Watch the vault and stream deltas as JSON-RPC lines on stdout
    Watch {
        /// Vault to watch (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries data
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Load { path, output } => commands::load(&path, output.as_deref()),
        Commands::Order { path } => commands::order(&path),
        Commands::Context {
            id,
            path,
            distance,
            write,
        } => commands::context(&id, &path, distance, write),
        Commands::Watch { path } => commands::watch(&path).await,
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
