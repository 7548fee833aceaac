use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spendcast::catalog::CatalogProfile;
use spendcast::commands;
use spendcast::config::Config;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "spendcast")]
#[command(version = "0.1.0")]
#[command(about = "Chat with your finances, answered as text, video or podcast", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Content catalog to answer from (content-aware, text-only)
    #[arg(long, global = true)]
    profile: Option<CatalogProfile>,

    /// Seed for reproducible replies and delays
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Read configuration from this file instead of ~/.spendcast/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat
    Chat,
    /// Send one message and print the reply
    Ask {
        text: String,
        /// Print the reply as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the canned replies of the active catalog
    Catalog,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(profile) = cli.profile {
        config = config.with_profile(profile);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    Ok(config)
}

/// The chat view owns the terminal, so it logs to a file instead of stderr
fn init_tracing(config: &Config, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "spendcast=info".into());

    let (file_layer, stderr_layer) = if interactive {
        std::fs::create_dir_all(&config.spendcast_home)
            .context("Failed to create .spendcast directory")?;
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(config.log_path())
            .with_context(|| format!("Failed to open log file {}", config.log_path().display()))?;
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(log_file));
        (Some(layer), None)
    } else {
        let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        (None, Some(layer))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let command = cli.command.unwrap_or(Commands::Chat);

    init_tracing(&config, matches!(command, Commands::Chat))?;
    debug!(profile = %config.profile, seed = ?config.seed, "configuration loaded");

    match command {
        Commands::Chat => commands::run_chat(&config).await,
        Commands::Ask { text, json } => commands::ask(&config, &text, json).await,
        Commands::Catalog => commands::show_catalog(&config).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let result = run(Cli::parse()).await;

    if let Some(message) = result.as_ref().err().and_then(commands::user_message) {
        eprintln!("❌ {}", message);
    }

    result
}
