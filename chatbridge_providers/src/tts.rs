use async_trait::async_trait;
use chatbridge_core::SpeechSynthesizer;
use reqwest::Client;
use serde_json::json;
use tracing::info;

/// Speech collaborator reached over HTTP.
///
/// Posts `{"user_id", "text"}` and expects `{"audio_link"}` back.
#[derive(Clone)]
pub struct HttpSpeechSynthesizer {
    client: Client,
    url: String,
}

impl HttpSpeechSynthesizer {
    pub fn new(url: String) -> Self {
        info!("Creating HttpSpeechSynthesizer for {url}");
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSpeechSynthesizer {
    async fn synthesize(&self, user_id: &str, text: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({
                "user_id": user_id,
                "text": text,
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        audio_link(&response)
    }
}

fn audio_link(response: &serde_json::Value) -> anyhow::Result<String> {
    response["audio_link"]
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing audio_link"))
}

/// Used when no speech service is configured; every audio turn fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSpeechSynthesizer;

#[async_trait]
impl SpeechSynthesizer for DisabledSpeechSynthesizer {
    async fn synthesize(&self, _user_id: &str, _text: &str) -> anyhow::Result<String> {
        anyhow::bail!("Speech synthesis is not configured. Set \"tts.url\" in config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_audio_link() {
        let response = json!({ "audio_link": "https://cdn.test/u1/123.ogg" });
        assert_eq!(audio_link(&response).unwrap(), "https://cdn.test/u1/123.ogg");
    }

    #[test]
    fn missing_audio_link_is_an_error() {
        let response = json!({ "url": "https://cdn.test/u1/123.ogg" });
        assert!(audio_link(&response).is_err());
    }

    #[tokio::test]
    async fn disabled_synthesizer_always_fails() {
        let err = DisabledSpeechSynthesizer
            .synthesize("u1", "hello")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("tts.url"));
    }
}
