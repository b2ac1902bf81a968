//! Conversions between entity models and core turn types.

use chatbridge_core::{Speaker, Turn};
use chatbridge_entities::conversation_turns;

pub fn speaker_from_str(value: &str) -> anyhow::Result<Speaker> {
    match value {
        "user" => Ok(Speaker::User),
        "chatbot" => Ok(Speaker::Chatbot),
        other => anyhow::bail!("Unknown speaker in conversation store: {other}"),
    }
}

pub fn model_to_turn(model: conversation_turns::Model) -> anyhow::Result<Turn> {
    Ok(Turn {
        speaker: speaker_from_str(&model.speaker)?,
        content: serde_json::from_value(model.content)?,
        user_id: model.user_id,
        session_id: model.session_id,
        timestamp: model.timestamp,
    })
}
