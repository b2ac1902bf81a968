//! Conversation with the assistant from the terminal.

use chatbridge_config::Config;
use chatbridge_core::{ConversationAdapter, Speaker, Turn, TurnRecorder, timestamp_now};
use chatbridge_store::ConversationStore;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

use super::build_adapter;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// User identifier the turns are recorded under
    pub user_id: String,
    /// Session to resume; a new one is minted when absent
    pub session_id: Option<String>,
    /// Treat input as coming from a voice message
    pub audio: bool,
}

/// Strategy for executing the Chat command.
///
/// Keeps the session id returned by each turn, so a session replaced after
/// expiry is reused for the rest of the conversation.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let store = Arc::new(ConversationStore::connect(&config.database.url).await?);
        let adapter = build_adapter(&config, store);

        let mut session_id = input.session_id;

        if let Some(msg) = input.message {
            let answers =
                run_turn(&adapter, &input.user_id, &mut session_id, &msg, input.audio).await?;
            for answer in answers {
                println!("{answer}");
            }
            if let Some(id) = session_id {
                info!("Session: {id}");
            }
            return Ok(());
        }

        println!("=== chatbridge conversation (user: {}) ===", input.user_id);
        println!("Type 'exit', 'quit', or Ctrl+C to end the session.\n");

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let mut line = String::new();
            if std::io::stdin().read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();

            if matches!(line, "exit" | "quit" | "q") {
                break;
            }

            if line.is_empty() {
                continue;
            }

            match run_turn(&adapter, &input.user_id, &mut session_id, line, input.audio).await {
                Ok(answers) => {
                    println!();
                    for answer in answers {
                        println!("{answer}");
                    }
                    println!();
                }
                Err(e) => eprintln!("Error: {e}"),
            }
        }

        if let Some(id) = session_id {
            println!("\nSession ended: {id}");
        }
        Ok(())
    }
}

/// Record the user's message and run one turn, updating `session_id`.
async fn run_turn(
    adapter: &ConversationAdapter,
    user_id: &str,
    session_id: &mut Option<String>,
    message: &str,
    audio: bool,
) -> anyhow::Result<Vec<String>> {
    let received_at = timestamp_now();
    let current = match session_id.take() {
        Some(id) => id,
        None => adapter.create_session().await?,
    };
    *session_id = Some(current.clone());

    let turn = Turn::new(user_id, &current, Speaker::User, message.to_string(), received_at);
    adapter.recorder().record_turn(&turn).await?;

    let conversation = adapter
        .converse(message, user_id, Some(current), audio)
        .await?;
    *session_id = Some(conversation.session_id);
    Ok(conversation.answers)
}
