//! Wire shapes of the assistant's message response.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Skill whose `user_defined` variables are forwarded to the store.
pub const MAIN_SKILL: &str = "main skill";

/// Opaque context variables, forwarded verbatim.
pub type ContextVariables = serde_json::Map<String, serde_json::Value>;

/// One unit of the assistant's generic output, tagged by `response_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "response_type", rename_all = "lowercase")]
pub enum ReplyItem {
    Text { text: String },
    Audio { source: String },
    Video { source: String },
    Image { source: String },
    /// Options, suggestions, pauses and anything else this adapter does not relay.
    #[serde(other)]
    Unknown,
}

impl ReplyItem {
    /// Source URI of an audio, video or image item.
    #[must_use]
    pub fn media_source(&self) -> Option<&str> {
        match self {
            Self::Audio { source } | Self::Video { source } | Self::Image { source } => {
                Some(source)
            }
            Self::Text { .. } | Self::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageOutput {
    #[serde(default)]
    pub generic: Vec<ReplyItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_defined: Option<ContextVariables>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageContext {
    #[serde(default)]
    pub skills: HashMap<String, SkillContext>,
}

/// Result of a message call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub output: MessageOutput,
    #[serde(default)]
    pub context: MessageContext,
}

impl MessageResponse {
    /// `context.skills["main skill"].user_defined`, when the service sent it.
    #[must_use]
    pub fn user_defined(&self) -> Option<&ContextVariables> {
        self.context
            .skills
            .get(MAIN_SKILL)
            .and_then(|skill| skill.user_defined.as_ref())
    }
}
