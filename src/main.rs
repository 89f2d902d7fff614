use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use slavic_oracle::bot;
use slavic_oracle::cards_reader::CardsReader;
use slavic_oracle::config::{BotConfig, Cli, LogFormat};
use slavic_oracle::dialogue::SessionState;
use slavic_oracle::menu::{build_oracle, OracleOptions};

fn init_logging(format: LogFormat) {
    // Keep per-request HTTP logs out of the default output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = BotConfig::from_cli(cli)?;
    init_logging(config.log_format);

    info!("Slavic oracle bot starting...");

    let mut reader = CardsReader::new(&config.cards_csv);
    if let Some(dir) = &config.images_dir {
        reader = reader.with_images(dir);
    }
    let cards = reader
        .read_cards()
        .with_context(|| format!("Failed to load cards from {}", config.cards_csv.display()))?;

    info!("Conversation preparing...");
    let graph = Arc::new(build_oracle(
        cards,
        &OracleOptions {
            language: config.language.clone(),
            history_size: config.history_size,
        },
    ));

    let bot = Bot::new(&config.token);
    let config = Arc::new(config);

    info!("Run polling...");
    Dispatcher::builder(bot, bot::schema())
        .dependencies(dptree::deps![InMemStorage::<SessionState>::new(), graph, config])
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Slavic oracle bot finished");
    Ok(())
}
