use anyhow::Result;
use sentiment_signal::config::{Config, EnvConfig};
use sentiment_signal::execution::stream::run_stream;
use sentiment_signal::MessageProcessor;
use tokio::io::BufReader;
use tracing::Level;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let env_config = EnvConfig::load()?;
    let config = Config::load_or_default(&env_config.config_path)?;

    let log_level = env_config
        .log_level
        .as_deref()
        .unwrap_or(config.system.log_level.as_str())
        .parse::<Level>()
        .unwrap_or(Level::INFO);

    // Initialize tracing; stdout carries the enriched messages
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("🚀 Sentiment signal processor starting...");
    tracing::info!("Config: {}", env_config.config_path);
    tracing::info!(
        "Thresholds: buy >= {}, sell <= {}",
        config.signal.buy_threshold,
        config.signal.sell_threshold
    );
    tracing::info!("CSV logging: {}", config.monitoring.csv_logging);

    let processor = MessageProcessor::from_config(&config)?;

    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    // The stream logs its own summary
    run_stream(&processor, reader, writer, shutdown).await?;
    tracing::info!("Shutting down...");

    Ok(())
}
