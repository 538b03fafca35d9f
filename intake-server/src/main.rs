use std::sync::Arc;

use clap::Parser;
use intake_core::IntakeConfig;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use intake_server::http::{self, HttpState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "intake.toml")]
    config: String,

    /// Print the configured questions and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (classifier token in dev)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = match IntakeConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging
    let default_level = config
        .service
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .init();

    if args.check {
        for (idx, q) in config.questions.iter().enumerate() {
            println!("{:>2}. [{}] {}", idx + 1, q.kind, q.prompt);
        }
        println!("✅ {} questions, output -> {}", config.questions.len(), config.storage.output_path);
        return Ok(());
    }

    let state = match HttpState::from_config(&config) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("Failed to initialise interview: {}", e);
            std::process::exit(1);
        }
    };

    let (tx, rx) = broadcast::channel(1);

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = tx.send(());
    });

    http::start_http_server(state, &config.http, rx).await?;

    Ok(())
}
