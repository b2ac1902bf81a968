use crate::{Command, Error, Result};
use chatbridge_core::{
    AssistantApi, ConversationAdapter, Speaker, Turn, TurnRecorder, timestamp_now,
};
use std::{collections::HashMap, sync::Arc, time::Duration};
use teloxide::prelude::*;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Telegram front end for the conversation adapter.
#[derive(Clone)]
pub struct TelegramBot {
    /// Teloxide bot instance
    pub bot: Bot,
    adapter: Arc<ConversationAdapter>,
    /// Assistant session per chat: `chat_id` -> `session_id`
    sessions: Arc<tokio::sync::Mutex<HashMap<i64, String>>>,
    /// Allowed chat IDs; empty allows everyone
    allowed_chats: Vec<i64>,
}

impl TelegramBot {
    pub fn new(
        token: String,
        adapter: Arc<ConversationAdapter>,
        allowed_chats: &[String],
    ) -> Self {
        let allowed_chats = allowed_chats
            .iter()
            .filter_map(|s| s.parse::<i64>().ok())
            .collect();

        Self {
            bot: Bot::new(token),
            adapter,
            sessions: Arc::new(tokio::sync::Mutex::new(HashMap::new())),
            allowed_chats,
        }
    }

    #[must_use]
    pub fn is_allowed(&self, chat_id: i64) -> bool {
        self.allowed_chats.is_empty() || self.allowed_chats.contains(&chat_id)
    }

    /// Session for a chat, minting one on first contact.
    async fn session_for(&self, chat_id: i64) -> Result<String> {
        if let Some(session_id) = self.sessions.lock().await.get(&chat_id) {
            return Ok(session_id.clone());
        }

        let session_id = self.adapter.create_session().await?;
        self.sessions
            .lock()
            .await
            .insert(chat_id, session_id.clone());
        Ok(session_id)
    }

    /// Forget the chat's session and delete it remotely, best effort.
    pub async fn reset_session(&self, chat_id: i64) {
        let session_id = self.sessions.lock().await.remove(&chat_id);

        if let Some(id) = session_id {
            if let Err(e) = self.adapter.assistant().delete_session(&id).await {
                warn!("Could not delete session {id}: {e}");
            }
        }
    }

    /// Run one turn for a chat and return the messages to send back.
    ///
    /// Failures after the allow-list check are logged and answered with the
    /// default error message.
    pub async fn process_message(&self, chat_id: i64, text: String) -> Result<Vec<String>> {
        if !self.is_allowed(chat_id) {
            return Err(Error::Unauthorized(chat_id));
        }

        match self.run_turn(chat_id, &text).await {
            Ok(answers) => Ok(answers),
            Err(e) => {
                error!("Conversation turn failed for chat {chat_id}: {e}");
                Ok(vec![self.adapter.default_error_message().to_string()])
            }
        }
    }

    async fn run_turn(&self, chat_id: i64, text: &str) -> Result<Vec<String>> {
        let user_id = chat_id.to_string();
        let received_at = timestamp_now();
        let session_id = self.session_for(chat_id).await?;

        let turn = Turn::new(
            &user_id,
            &session_id,
            Speaker::User,
            text.to_string(),
            received_at,
        );
        self.adapter
            .recorder()
            .record_turn(&turn)
            .await
            .map_err(Error::Store)?;

        let conversation = self
            .adapter
            .converse(text, &user_id, Some(session_id), false)
            .await?;
        self.sessions
            .lock()
            .await
            .insert(chat_id, conversation.session_id);
        Ok(conversation.answers)
    }

    /// Test connection to Telegram API with incremental backoff retry.
    /// Starts at 2s, increases by 2s each attempt, max 10s delay.
    /// Retries indefinitely until connection succeeds.
    async fn test_connection(&self) {
        const INITIAL_DELAY_SECS: u64 = 2;
        const MAX_DELAY_SECS: u64 = 10;

        let mut attempt = 1u64;
        loop {
            match self.bot.get_me().await {
                Ok(bot_user) => {
                    info!(
                        "Connected to Telegram API: @{} (id: {})",
                        bot_user
                            .user
                            .username
                            .unwrap_or_else(|| "no username".to_string()),
                        bot_user.user.id
                    );
                    return;
                }
                Err(e) => {
                    let delay_secs = (INITIAL_DELAY_SECS * attempt).min(MAX_DELAY_SECS);

                    warn!(
                        "Connection attempt {attempt} failed: {e}. Retrying in {delay_secs}s..."
                    );

                    if attempt == 1 {
                        warn!("This may be due to:");
                        warn!("  - Network connectivity issues");
                        warn!("  - Firewall blocking api.telegram.org");
                        warn!("  - Invalid bot token");
                    }

                    sleep(Duration::from_secs(delay_secs)).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Run the bot
    pub async fn run(self) -> Result<()> {
        use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
        use teloxide::dptree;
        use teloxide::types::Update;

        self.test_connection().await;

        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            warn!("Could not register bot commands: {e}");
        }

        let bot = self.bot.clone();

        let schema = dptree::entry().branch(Update::filter_message().endpoint({
            let bot_clone = self.clone();
            move |_bot: Bot, msg: teloxide::types::Message| {
                let bot_clone = bot_clone.clone();
                async move { crate::handler::handle_message(bot_clone, msg).await }
            }
        }));

        Dispatcher::builder(bot, schema)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chatbridge_core::{
        AssistantError, ContextVariables, MessageResponse, ReplyItem,
        SpeechSynthesizer, TurnContent,
    };
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Mints `s-1`, `s-2`, ... and answers 404 for sessions listed as expired.
    #[derive(Default)]
    struct FakeAssistant {
        minted: AtomicUsize,
        expired: Mutex<Vec<String>>,
        deleted: Mutex<Vec<String>>,
        fail_with: Mutex<Option<u16>>,
        sessions_down: AtomicBool,
    }

    #[async_trait]
    impl AssistantApi for FakeAssistant {
        async fn create_session(&self) -> std::result::Result<String, AssistantError> {
            if self.sessions_down.load(Ordering::SeqCst) {
                return Err(AssistantError::Api {
                    status: 503,
                    message: "Service Unavailable".to_string(),
                });
            }
            let n = self.minted.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("s-{n}"))
        }

        async fn message(
            &self,
            session_id: &str,
            text: &str,
        ) -> std::result::Result<MessageResponse, AssistantError> {
            if let Some(status) = *self.fail_with.lock().unwrap() {
                return Err(AssistantError::Api {
                    status,
                    message: "boom".to_string(),
                });
            }
            if self.expired.lock().unwrap().iter().any(|s| s == session_id) {
                return Err(AssistantError::Api {
                    status: 404,
                    message: "Invalid Session".to_string(),
                });
            }
            let mut response = MessageResponse::default();
            response.output.generic = vec![ReplyItem::Text {
                text: format!("echo: {text}"),
            }];
            Ok(response)
        }

        async fn delete_session(
            &self,
            session_id: &str,
        ) -> std::result::Result<(), AssistantError> {
            self.deleted.lock().unwrap().push(session_id.to_string());
            Ok(())
        }
    }

    struct NoSpeech;

    #[async_trait]
    impl SpeechSynthesizer for NoSpeech {
        async fn synthesize(&self, _user_id: &str, _text: &str) -> anyhow::Result<String> {
            anyhow::bail!("no speech in tests")
        }
    }

    #[derive(Default)]
    struct Log {
        turns: Mutex<Vec<Turn>>,
        down: AtomicBool,
    }

    #[async_trait]
    impl TurnRecorder for Log {
        async fn record_turn(&self, turn: &Turn) -> anyhow::Result<()> {
            if self.down.load(Ordering::SeqCst) {
                anyhow::bail!("db down");
            }
            self.turns.lock().unwrap().push(turn.clone());
            Ok(())
        }

        async fn record_context_variables(
            &self,
            _user_id: &str,
            _session_id: &str,
            _variables: &ContextVariables,
        ) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn bot(allowed: &[&str]) -> (TelegramBot, Arc<FakeAssistant>, Arc<Log>) {
        let assistant = Arc::new(FakeAssistant::default());
        let log = Arc::new(Log::default());
        let adapter = ConversationAdapter::new(
            assistant.clone() as Arc<dyn AssistantApi>,
            Arc::new(NoSpeech) as Arc<dyn SpeechSynthesizer>,
            log.clone() as Arc<dyn TurnRecorder>,
            "Sorry, something went wrong",
        );
        let allowed: Vec<String> = allowed.iter().map(ToString::to_string).collect();
        let bot = TelegramBot::new("123:TEST".to_string(), Arc::new(adapter), &allowed);
        (bot, assistant, log)
    }

    #[tokio::test]
    async fn keeps_one_session_per_chat() {
        let (bot, assistant, _log) = bot(&[]);

        assert_eq!(
            bot.process_message(7, "hi".to_string()).await.unwrap(),
            vec!["echo: hi".to_string()]
        );
        bot.process_message(7, "again".to_string()).await.unwrap();
        bot.process_message(8, "other".to_string()).await.unwrap();

        assert_eq!(assistant.minted.load(Ordering::SeqCst), 2);
        let sessions = bot.sessions.lock().await;
        assert_eq!(sessions.get(&7).map(String::as_str), Some("s-1"));
        assert_eq!(sessions.get(&8).map(String::as_str), Some("s-2"));
    }

    #[tokio::test]
    async fn records_user_then_chatbot_turn() {
        let (bot, _assistant, log) = bot(&[]);

        bot.process_message(7, "hello".to_string()).await.unwrap();

        let turns = log.turns.lock().unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker, Speaker::User);
        assert_eq!(turns[0].user_id, "7");
        assert_eq!(turns[0].content, TurnContent::Single("hello".to_string()));
        assert_eq!(turns[1].speaker, Speaker::Chatbot);
        assert_eq!(turns[1].session_id, "s-1");
    }

    #[tokio::test]
    async fn renewed_session_replaces_cached_one() {
        let (bot, assistant, _log) = bot(&[]);
        bot.process_message(7, "hi".to_string()).await.unwrap();
        assistant.expired.lock().unwrap().push("s-1".to_string());

        let answers = bot.process_message(7, "still there?".to_string()).await.unwrap();

        assert_eq!(answers, vec!["echo: still there?".to_string()]);
        assert_eq!(
            bot.sessions.lock().await.get(&7).map(String::as_str),
            Some("s-2")
        );
    }

    #[tokio::test]
    async fn failures_answer_with_default_message() {
        let (bot, assistant, _log) = bot(&[]);
        *assistant.fail_with.lock().unwrap() = Some(500);

        let answers = bot.process_message(7, "hi".to_string()).await.unwrap();

        assert_eq!(answers, vec!["Sorry, something went wrong".to_string()]);
    }

    #[tokio::test]
    async fn store_failure_answers_with_default_message() {
        let (bot, _assistant, log) = bot(&[]);
        log.down.store(true, Ordering::SeqCst);

        let answers = bot.process_message(7, "hi".to_string()).await.unwrap();

        assert_eq!(answers, vec!["Sorry, something went wrong".to_string()]);
        assert!(log.turns.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn session_failure_answers_with_default_message() {
        let (bot, assistant, _log) = bot(&[]);
        assistant.sessions_down.store(true, Ordering::SeqCst);

        let answers = bot.process_message(7, "hi".to_string()).await.unwrap();

        assert_eq!(answers, vec!["Sorry, something went wrong".to_string()]);
        assert!(bot.sessions.lock().await.get(&7).is_none());

        assistant.sessions_down.store(false, Ordering::SeqCst);
        let answers = bot.process_message(7, "hi".to_string()).await.unwrap();
        assert_eq!(answers, vec!["echo: hi".to_string()]);
    }

    #[tokio::test]
    async fn rejects_chats_outside_allow_list() {
        let (bot, assistant, _log) = bot(&["42"]);

        let err = bot.process_message(7, "hi".to_string()).await.unwrap_err();

        assert!(matches!(err, Error::Unauthorized(7)));
        assert_eq!(assistant.minted.load(Ordering::SeqCst), 0);
        assert!(bot.is_allowed(42));
    }

    #[tokio::test]
    async fn reset_drops_and_deletes_session() {
        let (bot, assistant, _log) = bot(&[]);
        bot.process_message(7, "hi".to_string()).await.unwrap();

        bot.reset_session(7).await;

        assert!(bot.sessions.lock().await.get(&7).is_none());
        assert_eq!(*assistant.deleted.lock().unwrap(), vec!["s-1".to_string()]);
    }
}
