//! Status handling shared by the service clients.

use chatbridge_core::AssistantError;
use reqwest::{Response, StatusCode};

pub fn transport(err: reqwest::Error) -> AssistantError {
    AssistantError::Transport(err.into())
}

/// Pass successful responses through, turn the rest into [`AssistantError::Api`].
pub async fn check_status(response: Response) -> Result<Response, AssistantError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AssistantError::Api {
        status: status.as_u16(),
        message: api_error_message(status, &body),
    })
}

/// Human message of an error body.
///
/// The assistant service reports `{"error": "...", "code": n}`, the token
/// service `{"errorMessage": "..."}`. Anything else falls back to the raw
/// body, then the status reason phrase.
#[must_use]
pub fn api_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "errorMessage", "message"] {
            if let Some(message) = value[key].as_str() {
                return message.to_string();
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}
