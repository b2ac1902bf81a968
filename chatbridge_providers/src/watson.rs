use async_trait::async_trait;
use chatbridge_core::{AssistantApi, AssistantError, MessageResponse};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::http::{check_status, transport};
use crate::iam::IamAuthenticator;

pub const DEFAULT_API_VERSION: &str = "2021-11-27";

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session_id: String,
}

/// Client for the assistant service v2 REST API, bound to one assistant.
pub struct WatsonAssistant {
    client: Client,
    auth: IamAuthenticator,
    service_url: String,
    assistant_id: String,
    version: String,
}

impl WatsonAssistant {
    pub fn new(api_key: String, assistant_id: String, service_url: String) -> Self {
        info!("Creating WatsonAssistant for assistant {assistant_id}");
        let client = Client::new();
        Self {
            auth: IamAuthenticator::new(client.clone(), api_key),
            client,
            service_url: service_url.trim_end_matches('/').to_string(),
            assistant_id,
            version: DEFAULT_API_VERSION.to_string(),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: String) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_iam_url(mut self, iam_url: String) -> Self {
        self.auth = self.auth.with_url(iam_url);
        self
    }

    fn sessions_url(&self) -> String {
        format!(
            "{}/v2/assistants/{}/sessions",
            self.service_url, self.assistant_id
        )
    }

    fn session_url(&self, session_id: &str) -> String {
        format!("{}/{session_id}", self.sessions_url())
    }

    /// Authenticate, version and send a request; non-2xx becomes an API error.
    async fn send(&self, request: RequestBuilder) -> Result<Response, AssistantError> {
        let token = self.auth.bearer_token().await?;
        let response = request
            .bearer_auth(token)
            .query(&[("version", self.version.as_str())])
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await
    }
}

#[async_trait]
impl AssistantApi for WatsonAssistant {
    async fn create_session(&self) -> Result<String, AssistantError> {
        let response = self.send(self.client.post(self.sessions_url())).await?;
        let session = response
            .json::<SessionResponse>()
            .await
            .map_err(transport)?;
        Ok(session.session_id)
    }

    async fn message(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<MessageResponse, AssistantError> {
        let body = json!({
            "input": {
                "text": text,
                "options": { "return_context": true }
            }
        });

        debug!("Sending message to assistant session {session_id}");
        let request = self
            .client
            .post(format!("{}/message", self.session_url(session_id)))
            .json(&body);

        self.send(request)
            .await?
            .json::<MessageResponse>()
            .await
            .map_err(transport)
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), AssistantError> {
        self.send(self.client.delete(self.session_url(session_id)))
            .await?;
        info!("Deleted assistant session: {session_id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant(service_url: &str) -> WatsonAssistant {
        WatsonAssistant::new(
            "key".to_string(),
            "asst-123".to_string(),
            service_url.to_string(),
        )
    }

    #[test]
    fn builds_session_urls() {
        let client =
            assistant("https://api.us-south.assistant.watson.cloud.ibm.com/instances/abc/");
        assert_eq!(
            client.sessions_url(),
            "https://api.us-south.assistant.watson.cloud.ibm.com/instances/abc/v2/assistants/asst-123/sessions"
        );
        assert_eq!(
            client.session_url("s-1"),
            "https://api.us-south.assistant.watson.cloud.ibm.com/instances/abc/v2/assistants/asst-123/sessions/s-1"
        );
    }

    #[test]
    fn version_defaults_and_overrides() {
        let client = assistant("https://x");
        assert_eq!(client.version, DEFAULT_API_VERSION);
        let client = client.with_version("2023-06-15".to_string());
        assert_eq!(client.version, "2023-06-15");
    }

    #[test]
    fn session_response_shape() {
        let session: SessionResponse =
            serde_json::from_str(r#"{"session_id":"7f3c-42"}"#).unwrap();
        assert_eq!(session.session_id, "7f3c-42");
    }
}
