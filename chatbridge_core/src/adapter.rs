//! Conversation turn orchestration with lazy sessions and one retry on expiry.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{AssistantError, TurnError};
use crate::normalizer::ResponseNormalizer;
use crate::turn::timestamp_now;
use crate::{AssistantApi, SpeechSynthesizer, TurnRecorder};

/// Fresh sessions minted after a 404 before the turn gives up.
pub const MAX_SESSION_RETRIES: usize = 1;

/// Successful turn: the session actually used and the answers for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub session_id: String,
    pub answers: Vec<String>,
}

/// Thin adapter between the assistant service and the messaging layer.
///
/// Holds no per-user state; callers keep the session id returned in
/// [`Conversation`] and pass it back on the next turn.
pub struct ConversationAdapter<
    A = Arc<dyn AssistantApi>,
    S = Arc<dyn SpeechSynthesizer>,
    R = Arc<dyn TurnRecorder>,
> where
    A: Send + Sync,
    S: Send + Sync,
    R: Send + Sync,
{
    assistant: A,
    synthesizer: S,
    recorder: R,
    default_error_message: String,
}

impl<A, S, R> ConversationAdapter<A, S, R>
where
    A: AssistantApi,
    S: SpeechSynthesizer,
    R: TurnRecorder,
{
    pub fn new(
        assistant: A,
        synthesizer: S,
        recorder: R,
        default_error_message: impl Into<String>,
    ) -> Self {
        Self {
            assistant,
            synthesizer,
            recorder,
            default_error_message: default_error_message.into(),
        }
    }

    #[must_use]
    pub const fn assistant(&self) -> &A {
        &self.assistant
    }

    #[must_use]
    pub const fn recorder(&self) -> &R {
        &self.recorder
    }

    #[must_use]
    pub fn default_error_message(&self) -> &str {
        &self.default_error_message
    }

    /// Mint a new assistant session. Failures are logged and returned.
    pub async fn create_session(&self) -> Result<String, AssistantError> {
        match self.assistant.create_session().await {
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

    /// Run one user turn against the assistant.
    ///
    /// A missing `session_id` mints one first. When the service reports the
    /// session as expired (404) a new session is minted and the message
    /// resent, at most [`MAX_SESSION_RETRIES`] times.
    pub async fn converse(
        &self,
        message: &str,
        user_id: &str,
        session_id: Option<String>,
        is_audio_input: bool,
    ) -> Result<Conversation, TurnError> {
        let mut session_id = match session_id {
            Some(id) => id,
            None => self.create_session().await.map_err(TurnError::Session)?,
        };
        let mut retries = 0;

        loop {
            match self.assistant.message(&session_id, message).await {
                Ok(response) => {
                    let timestamp = timestamp_now();

                    if let Some(variables) = response.user_defined() {
                        self.recorder
                            .record_context_variables(user_id, &session_id, variables)
                            .await
                            .map_err(TurnError::Recorder)?;
                    }

                    let normalizer = ResponseNormalizer::new(
                        &self.synthesizer,
                        &self.recorder,
                        &self.default_error_message,
                    );
                    let answers = normalizer
                        .normalize(
                            &response.output.generic,
                            user_id,
                            &session_id,
                            is_audio_input,
                            &timestamp,
                        )
                        .await?;

                    return Ok(Conversation {
                        session_id,
                        answers,
                    });
                }
                Err(e) if e.is_session_expired() && retries < MAX_SESSION_RETRIES => {
                    warn!(
                        "Session {session_id} expired for user {user_id}: {e}. Creating a new one"
                    );
                    session_id = self.create_session().await.map_err(TurnError::Session)?;
                    retries += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
