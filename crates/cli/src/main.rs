//! Pitcrew CLI: the main entry point.
//!
//! Commands:
//! - `onboard`  - Write the default config
//! - `gateway`  - Start the HTTP chat server
//! - `agent`    - Chat through the full pipeline from the terminal
//! - `inspect`  - Show intents, order and context for a message
//! - `doctor`   - Check config, knowledge and model backends
//! - `status`   - Show the effective configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "pitcrew",
    about = "Pitcrew - customer support assistant for Track Racer rigs",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Onboard,

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Chat with the support assistant
    Agent {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Show how a message would be classified and grounded, without calling the model
    Inspect {
        /// The customer message to inspect
        #[arg(short, long)]
        message: String,
    },

    /// Diagnose configuration, knowledge base and model backends
    Doctor,

    /// Show the effective configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Agent { message } => commands::agent::run(message).await?,
        Commands::Inspect { message } => commands::inspect::run(message).await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
