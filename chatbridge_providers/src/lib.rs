#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod http;
mod iam;
mod retry;
mod tts;
mod watson;

pub use http::api_error_message;
pub use iam::{DEFAULT_IAM_URL, IamAuthenticator};
pub use retry::retry_with_backoff;
pub use tts::{DisabledSpeechSynthesizer, HttpSpeechSynthesizer};
pub use watson::{DEFAULT_API_VERSION, WatsonAssistant};
