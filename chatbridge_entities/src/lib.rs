//! Database entities for recorded conversations.

pub mod context_variables;
pub mod conversation_turns;
