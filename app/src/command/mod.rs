//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type, dispatched
//! statically from `main`.

use chatbridge_config::Config;
use chatbridge_core::{AssistantApi, ConversationAdapter, SpeechSynthesizer, TurnRecorder};
use chatbridge_providers::{DisabledSpeechSynthesizer, HttpSpeechSynthesizer, WatsonAssistant};
use std::sync::Arc;
use tracing::info;

mod chat;
mod info;
mod init;
mod session;
mod telegram;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use session::SessionStrategy;
pub use telegram::{TelegramInput, TelegramStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type via the associated type, so
/// parameters are passed without runtime casting or boxing.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Assistant client configured from `config.assistant`.
fn build_assistant(config: &Config) -> WatsonAssistant {
    let assistant = &config.assistant;
    WatsonAssistant::new(
        assistant.api_key.clone(),
        assistant.assistant_id.clone(),
        assistant.service_url.clone(),
    )
    .with_version(assistant.version.clone())
    .with_iam_url(assistant.iam_url.clone())
}

/// Speech collaborator, disabled when no `tts.url` is configured.
fn build_synthesizer(config: &Config) -> Arc<dyn SpeechSynthesizer> {
    match &config.tts.url {
        Some(url) => Arc::new(HttpSpeechSynthesizer::new(url.clone())),
        None => {
            info!("No speech service configured, audio turns will fail");
            Arc::new(DisabledSpeechSynthesizer)
        }
    }
}

/// Wire the adapter with explicitly constructed collaborators.
fn build_adapter(config: &Config, recorder: Arc<dyn TurnRecorder>) -> ConversationAdapter {
    let assistant: Arc<dyn AssistantApi> = Arc::new(build_assistant(config));
    ConversationAdapter::new(
        assistant,
        build_synthesizer(config),
        recorder,
        config.default_error_message(),
    )
}
