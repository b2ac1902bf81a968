use crate::{Command, Result, TelegramBot};
use teloxide::{requests::Requester, types::Message};
use tracing::{debug, info};

/// Handle bot commands
pub async fn handle_command(bot: TelegramBot, msg: Message, cmd: Command) -> Result<()> {
    let chat_id = msg.chat.id.0;
    let username = msg
        .from
        .as_ref()
        .and_then(|u| u.username.as_deref())
        .unwrap_or("unknown");

    match cmd {
        Command::Start => {
            info!("[@{username}] Command: /start");
            bot.bot
                .send_message(msg.chat.id, Command::welcome_text())
                .await?;
        }
        Command::Reset => {
            info!("[@{username}] Command: /reset");
            bot.reset_session(chat_id).await;
            bot.bot
                .send_message(msg.chat.id, Command::reset_text())
                .await?;
        }
        Command::Help => {
            info!("[@{username}] Command: /help");
            bot.bot
                .send_message(msg.chat.id, Command::help_text())
                .await?;
        }
    }

    Ok(())
}

/// Handle any message (commands or regular text)
pub async fn handle_message(bot: TelegramBot, msg: Message) -> Result<()> {
    let chat_id = msg.chat.id.0;
    let Some(text) = msg.text() else {
        debug!("Ignoring non-text message in chat {chat_id}");
        return Ok(());
    };
    let username = msg
        .from
        .as_ref()
        .and_then(|u| u.username.as_deref())
        .unwrap_or("unknown");

    if let Some(cmd) = Command::parse_from_text(text) {
        return handle_command(bot, msg, cmd).await;
    }

    info!("[@{username}] Message: {text}");

    bot.bot
        .send_chat_action(msg.chat.id, teloxide::types::ChatAction::Typing)
        .await?;

    let answers = bot.process_message(chat_id, text.to_string()).await?;

    for answer in answers {
        info!("[@{username}] Response: {answer}");
        bot.bot.send_message(msg.chat.id, answer).await?;
    }

    Ok(())
}
