//! # Bot Configuration Module
//!
//! Command line arguments and environment settings of the oracle bot.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TELEGRAM_BOT_TOKEN` | none, used when the token argument is absent |
//! | `ORACLE_CARDS_CSV` | `cards/card_descriptions.csv` |
//! | `ORACLE_CARDS_IMAGES` | unset, cards are shown without images |
//! | `ORACLE_LANGUAGE` | `ru` |
//! | `ORACLE_HISTORY_SIZE` | `5` |
//! | `LOG_FORMAT` | `text`, or `json` |

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::draw_history::DEFAULT_HISTORY_SIZE;
use crate::localization::DEFAULT_LANGUAGE;

// Constants for bot configuration
pub const DEFAULT_CARDS_CSV: &str = "cards/card_descriptions.csv";
pub const CARDS_CSV_VAR: &str = "ORACLE_CARDS_CSV";
pub const CARDS_IMAGES_VAR: &str = "ORACLE_CARDS_IMAGES";
pub const LANGUAGE_VAR: &str = "ORACLE_LANGUAGE";
pub const HISTORY_SIZE_VAR: &str = "ORACLE_HISTORY_SIZE";
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

/// SlavicOracle telegram bot, metaphorical cards
#[derive(Parser, Debug)]
#[command(name = "slavic_oracle", version)]
pub struct Cli {
    /// Telegram bot token
    #[arg(env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub token: String,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Runtime configuration of the bot
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    /// CSV file with the card deck
    pub cards_csv: PathBuf,
    /// Directory with one image per card
    pub images_dir: Option<PathBuf>,
    pub language: String,
    /// Size of the per-session anti-repeat window
    pub history_size: usize,
    pub log_format: LogFormat,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            cards_csv: PathBuf::from(DEFAULT_CARDS_CSV),
            images_dir: None,
            language: DEFAULT_LANGUAGE.to_string(),
            history_size: DEFAULT_HISTORY_SIZE,
            log_format: LogFormat::Text,
        }
    }
}

impl BotConfig {
    /// Build the configuration from parsed arguments and the process environment
    pub fn from_cli(cli: Cli) -> Result<Self> {
        Self::from_lookup(cli.token, |name| std::env::var(name).ok())
    }

    /// Build the configuration reading settings through `lookup`
    pub fn from_lookup(token: String, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = token.trim().to_string();
        if token.is_empty() {
            bail!("Telegram bot token must not be empty");
        }

        let mut config = Self {
            token,
            ..Self::default()
        };

        if let Some(path) = lookup(CARDS_CSV_VAR).filter(|v| !v.trim().is_empty()) {
            config.cards_csv = PathBuf::from(path);
        }
        config.images_dir = lookup(CARDS_IMAGES_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        if let Some(language) = lookup(LANGUAGE_VAR).filter(|v| !v.trim().is_empty()) {
            config.language = language.trim().to_lowercase();
        }
        if let Some(size) = lookup(HISTORY_SIZE_VAR) {
            config.history_size = size.trim().parse().with_context(|| {
                format!("{HISTORY_SIZE_VAR} must be a non-negative integer, got '{size}'")
            })?;
        }
        config.log_format = match lookup(LOG_FORMAT_VAR).as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("{LOG_FORMAT_VAR} must be 'text' or 'json', got '{other}'"),
        };

        Ok(config)
    }
}
