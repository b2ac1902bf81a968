#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Adapter between a remote conversational assistant and the application's
//! messaging and persistence layers.
//!
//! The crate owns the reply normalization and session-expiry handling. The
//! assistant service, speech synthesis and the conversation store are
//! consumed through the [`AssistantApi`], [`SpeechSynthesizer`] and
//! [`TurnRecorder`] traits.

use async_trait::async_trait;
use std::sync::Arc;

pub mod adapter;
pub mod error;
pub mod normalizer;
pub mod reply;
pub mod text;
pub mod turn;

pub use adapter::{Conversation, ConversationAdapter, MAX_SESSION_RETRIES};
pub use error::{AssistantError, TurnError};
pub use normalizer::ResponseNormalizer;
pub use reply::{ContextVariables, MessageResponse, ReplyItem, MAIN_SKILL};
pub use text::clean_text;
pub use turn::{Speaker, Turn, TurnContent, format_timestamp, timestamp_now};

/// Remote assistant service.
///
/// Implementations are bound to one assistant instance; session ids are
/// opaque and never validated locally.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Mint a new session.
    async fn create_session(&self) -> Result<String, AssistantError>;

    /// Send user text with context return enabled.
    async fn message(&self, session_id: &str, text: &str)
    -> Result<MessageResponse, AssistantError>;

    async fn delete_session(&self, session_id: &str) -> Result<(), AssistantError>;
}

/// Text-to-speech collaborator. Returns a link to the synthesized audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, user_id: &str, text: &str) -> anyhow::Result<String>;
}

/// Conversation store collaborator.
#[async_trait]
pub trait TurnRecorder: Send + Sync {
    async fn record_turn(&self, turn: &Turn) -> anyhow::Result<()>;

    async fn record_context_variables(
        &self,
        user_id: &str,
        session_id: &str,
        variables: &ContextVariables,
    ) -> anyhow::Result<()>;
}

#[async_trait]
impl<T: AssistantApi + ?Sized> AssistantApi for Arc<T> {
    async fn create_session(&self) -> Result<String, AssistantError> {
        (**self).create_session().await
    }

    async fn message(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<MessageResponse, AssistantError> {
        (**self).message(session_id, text).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), AssistantError> {
        (**self).delete_session(session_id).await
    }
}

#[async_trait]
impl<T: SpeechSynthesizer + ?Sized> SpeechSynthesizer for Arc<T> {
    async fn synthesize(&self, user_id: &str, text: &str) -> anyhow::Result<String> {
        (**self).synthesize(user_id, text).await
    }
}

#[async_trait]
impl<T: TurnRecorder + ?Sized> TurnRecorder for Arc<T> {
    async fn record_turn(&self, turn: &Turn) -> anyhow::Result<()> {
        (**self).record_turn(turn).await
    }

    async fn record_context_variables(
        &self,
        user_id: &str,
        session_id: &str,
        variables: &ContextVariables,
    ) -> anyhow::Result<()> {
        (**self)
            .record_context_variables(user_id, session_id, variables)
            .await
    }
}
