use anyhow::Result;
use clap::Parser;
use polybrain::cli::Cli;
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing with environment-based filtering
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli.execute().await {
        error!("Session failed: {:?}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
