use chatbridge_core::{AssistantError, TurnError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Assistant error: {0}")]
    Assistant(#[from] AssistantError),

    #[error("Conversation turn error: {0}")]
    Turn(#[from] TurnError),

    #[error("Conversation store error: {0}")]
    Store(anyhow::Error),

    #[error("Unauthorized access from chat_id: {0}")]
    Unauthorized(i64),
}
