//! moderation-rs: Text moderation service
//!
//! `serve` runs the HTTP API, `check` moderates one message and prints the
//! verdict as JSON.

use clap::{Parser, Subcommand};
use moderation_rs::api::ApiServer;
use moderation_rs::llm::engine_from_config;
use moderation_rs::{ModerationConfig, Moderator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "moderation-rs", about = "Heuristic + LLM text moderation")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short, env = "MODERATION_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Listen address, overrides server.listen_addr
        #[arg(long, short)]
        listen: Option<String>,
    },
    /// Moderate a single message
    Check {
        /// Message text
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moderation_rs=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = ModerationConfig::load(cli.config.as_deref())?;
    info!(
        "Configuration loaded: provider {:?}, model {}",
        config.classifier.provider, config.classifier.model
    );

    let llm = engine_from_config(&config.classifier)?;
    let moderator = Arc::new(Moderator::from_config(&config, llm));

    match cli.command {
        Commands::Serve { listen } => {
            let addr = listen.unwrap_or_else(|| config.server.listen_addr.clone());
            info!("Starting moderation-rs v{}", env!("CARGO_PKG_VERSION"));
            ApiServer::new(moderator, addr).run().await?;
        }
        Commands::Check { text } => {
            let verdict = moderator.moderate(&text).await;
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
    }

    Ok(())
}
