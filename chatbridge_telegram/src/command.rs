use teloxide::types::BotCommand;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Reset,
    Help,
}

impl Command {
    fn all() -> Vec<BotCommand> {
        vec![
            BotCommand {
                command: "start".to_string(),
                description: "Start talking to the assistant".to_string(),
            },
            BotCommand {
                command: "reset".to_string(),
                description: "Start a new conversation".to_string(),
            },
            BotCommand {
                command: "help".to_string(),
                description: "Show help".to_string(),
            },
        ]
    }

    #[must_use]
    pub fn bot_commands() -> Vec<BotCommand> {
        Self::all()
    }

    #[must_use]
    pub fn parse_from_text(text: &str) -> Option<Self> {
        let text = text.trim().to_lowercase();

        // Remove bot mention if present (e.g., "/start@my_bot")
        let text = text.split('@').next().unwrap_or(&text).to_string();

        match text.as_str() {
            "/start" => Some(Self::Start),
            "/reset" => Some(Self::Reset),
            "/help" => Some(Self::Help),
            _ => None,
        }
    }

    #[must_use]
    pub const fn help_text() -> &'static str {
        r"
🤖 chatbridge

Commands:
/start - Start talking to the assistant
/reset - Start a new conversation
/help  - Show this help

Just send a message to chat!
"
    }

    #[must_use]
    pub const fn welcome_text() -> &'static str {
        r"
👋 Welcome!

Send me a message and the assistant will answer.
Send /help to see the command list.
"
    }

    #[must_use]
    pub const fn reset_text() -> &'static str {
        "Conversation reset. Your next message starts a new session."
    }
}
