use thiserror::Error;

/// Failure reported by the assistant service client.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// The service answered with a non-success status.
    #[error("WA Method failed with status code {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a usable answer (network, decoding, auth).
    #[error("Assistant transport error: {0}")]
    Transport(#[from] anyhow::Error),
}

impl AssistantError {
    /// `true` when the service reported the session as expired or unknown.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// Failure arm of a conversation turn.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("WA Method failed with status code {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Could not create an assistant session: {0}")]
    Session(#[source] AssistantError),

    #[error("{0}")]
    Assistant(#[source] AssistantError),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(#[source] anyhow::Error),

    #[error("Conversation store error: {0}")]
    Recorder(#[source] anyhow::Error),
}

impl From<AssistantError> for TurnError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::Api { status, message } => Self::Remote { status, message },
            other @ AssistantError::Transport(_) => Self::Assistant(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_formats_diagnostic() {
        let err = AssistantError::Api {
            status: 500,
            message: "Internal error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "WA Method failed with status code 500: Internal error"
        );
    }

    #[test]
    fn only_404_counts_as_expired() {
        let expired = AssistantError::Api {
            status: 404,
            message: "Invalid Session".to_string(),
        };
        let other = AssistantError::Api {
            status: 400,
            message: "Bad request".to_string(),
        };
        assert!(expired.is_session_expired());
        assert!(!other.is_session_expired());
        assert!(!AssistantError::Transport(anyhow::anyhow!("timeout")).is_session_expired());
    }

    #[test]
    fn api_error_becomes_remote_turn_error() {
        let turn: TurnError = AssistantError::Api {
            status: 401,
            message: "Unauthorized".to_string(),
        }
        .into();
        assert!(matches!(turn, TurnError::Remote { status: 401, .. }));
        assert_eq!(
            turn.to_string(),
            "WA Method failed with status code 401: Unauthorized"
        );
    }
}
