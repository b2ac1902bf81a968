use crate::command::CommandStrategy;
use chatbridge_config::Config;
use chatbridge_store::ConversationStore;
use chatbridge_telegram::TelegramBot;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use super::build_adapter;

/// Connect to the conversation store with exponential backoff retry.
///
/// # Retry Behavior
/// - First retry: 1s
/// - Second retry: 2s
/// - Third and beyond: 3s (capped)
/// - Retries indefinitely until connection succeeds
async fn connect_store_with_retry(database_url: &str) -> ConversationStore {
    const MAX_DELAY: Duration = Duration::from_secs(3);
    const INITIAL_DELAY: Duration = Duration::from_secs(1);

    let mut attempt = 0u32;
    let mut delay = INITIAL_DELAY;

    loop {
        attempt += 1;
        match ConversationStore::connect(database_url).await {
            Ok(store) => {
                info!("Conversation store connected on attempt {attempt}");
                return store;
            }
            Err(e) => {
                warn!(
                    "Failed to connect to database (attempt {attempt}): {e}. Retrying in {}s...",
                    delay.as_secs()
                );
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Input for Telegram bot command.
pub struct TelegramInput {
    /// Optional bot token (overrides config)
    pub token: Option<String>,
    /// Optional allowed chat IDs (overrides config)
    pub allow_from: Option<Vec<String>>,
}

/// Strategy for running the Telegram bot.
pub struct TelegramStrategy;

impl CommandStrategy for TelegramStrategy {
    type Input = TelegramInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        if !config.telegram.enabled && input.token.is_none() {
            anyhow::bail!("Telegram is not enabled in config. Set \"telegram.enabled\": true");
        }

        let token = if let Some(t) = input.token {
            t
        } else if !config.telegram.token.is_empty() {
            config.telegram.token.clone()
        } else {
            anyhow::bail!("Telegram bot token not configured. Set \"telegram.token\" in config");
        };

        let allow_from = input
            .allow_from
            .unwrap_or_else(|| config.telegram.allow_from.clone());

        info!("Starting Telegram bot...");

        let store = Arc::new(connect_store_with_retry(&config.database.url).await);
        let adapter = Arc::new(build_adapter(&config, store));

        let bot = TelegramBot::new(token, adapter, &allow_from);

        info!("Telegram bot is running. Press Ctrl+C to stop.");
        bot.run().await?;

        Ok(())
    }
}
