use chatbridge_config::Config;
use chatbridge_core::{AssistantApi, AssistantError};
use tracing::{error, info};

use super::build_assistant;

/// Strategy for minting a new assistant session and printing its id.
///
/// Useful to resume a conversation later with `chat --session`.
#[derive(Debug, Clone, Copy)]
pub struct SessionStrategy;

impl super::CommandStrategy for SessionStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let assistant = build_assistant(&config);

        let session_id = mint_session(&assistant).await?;
        println!("{session_id}");
        Ok(())
    }
}

/// Create a session, logging failures with the service diagnostic.
async fn mint_session<A: AssistantApi + ?Sized>(assistant: &A) -> Result<String, AssistantError> {
    match assistant.create_session().await {
        Ok(session_id) => {
            info!("Created assistant session: {session_id}");
            Ok(session_id)
        }
        Err(e) => {
            error!("{e}");
            Err(e)
        }
    }
}
