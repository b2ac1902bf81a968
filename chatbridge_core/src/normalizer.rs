//! Flattening of assistant replies into user-facing strings.

use tracing::{debug, warn};

use crate::error::TurnError;
use crate::reply::ReplyItem;
use crate::text::clean_text;
use crate::turn::{Speaker, Turn, TurnContent};
use crate::{SpeechSynthesizer, TurnRecorder};

/// Maps reply items to the strings sent back to the user and records the
/// chatbot turn, exactly once per call.
pub struct ResponseNormalizer<'a, S: ?Sized, R: ?Sized> {
    synthesizer: &'a S,
    recorder: &'a R,
    default_error_message: &'a str,
}

impl<'a, S, R> ResponseNormalizer<'a, S, R>
where
    S: SpeechSynthesizer + ?Sized,
    R: TurnRecorder + ?Sized,
{
    #[must_use]
    pub const fn new(
        synthesizer: &'a S,
        recorder: &'a R,
        default_error_message: &'a str,
    ) -> Self {
        Self {
            synthesizer,
            recorder,
            default_error_message,
        }
    }

    /// Normalize `replies` for the user and record them as one chatbot turn.
    ///
    /// - no items, or a single unrecognized item: the default error message
    /// - one plain text or media item: recorded as a single string
    /// - text during an audio turn: `[audio_link, text]` returned,
    ///   `[cleaned_text, audio_link, text]` recorded
    /// - several items: unrecognized items are dropped, the rest recorded as a list
    pub async fn normalize(
        &self,
        replies: &[ReplyItem],
        user_id: &str,
        session_id: &str,
        is_audio_input: bool,
        timestamp: &str,
    ) -> Result<Vec<String>, TurnError> {
        let (answers, recorded) = match replies {
            [] => {
                debug!("Assistant returned no reply items for user {user_id}");
                self.fallback()
            }
            [single] => match single {
                ReplyItem::Text { text } if is_audio_input => {
                    let (answers, recorded) = self.speak(user_id, text).await?;
                    (answers, TurnContent::Many(recorded))
                }
                ReplyItem::Text { text } => {
                    (vec![text.clone()], TurnContent::Single(text.clone()))
                }
                ReplyItem::Audio { source }
                | ReplyItem::Video { source }
                | ReplyItem::Image { source } => {
                    (vec![source.clone()], TurnContent::Single(source.clone()))
                }
                ReplyItem::Unknown => {
                    warn!(
                        "Unsupported single reply item for user {user_id}, answering with default message"
                    );
                    self.fallback()
                }
            },
            many => {
                let mut answers = Vec::with_capacity(many.len());
                let mut recorded = Vec::with_capacity(many.len());
                for item in many {
                    match item {
                        ReplyItem::Text { text } if is_audio_input => {
                            let (spoken, spoken_record) = self.speak(user_id, text).await?;
                            answers.extend(spoken);
                            recorded.extend(spoken_record);
                        }
                        ReplyItem::Text { text } => {
                            answers.push(text.clone());
                            recorded.push(text.clone());
                        }
                        ReplyItem::Audio { source }
                        | ReplyItem::Video { source }
                        | ReplyItem::Image { source } => {
                            answers.push(source.clone());
                            recorded.push(source.clone());
                        }
                        ReplyItem::Unknown => {
                            debug!("Dropping unsupported reply item");
                        }
                    }
                }
                (answers, TurnContent::Many(recorded))
            }
        };

        let turn = Turn::new(user_id, session_id, Speaker::Chatbot, recorded, timestamp);
        self.recorder
            .record_turn(&turn)
            .await
            .map_err(TurnError::Recorder)?;

        Ok(answers)
    }

    fn fallback(&self) -> (Vec<String>, TurnContent) {
        let message = self.default_error_message.to_string();
        (vec![message.clone()], TurnContent::Single(message))
    }

    /// Returns `(answers, recorded)` for a text item in an audio turn.
    async fn speak(
        &self,
        user_id: &str,
        text: &str,
    ) -> Result<(Vec<String>, Vec<String>), TurnError> {
        let phrase = clean_text(text);
        let audio_link = self
            .synthesizer
            .synthesize(user_id, &phrase)
            .await
            .map_err(TurnError::Synthesis)?;

        let answers = vec![audio_link.clone(), text.to_string()];
        let recorded = vec![phrase, audio_link, text.to_string()];
        Ok((answers, recorded))
    }
}
