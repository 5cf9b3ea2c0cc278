use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::{Config, EnvelopeShape};
use crate::providers;

/// Failure categories reported by the generation adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Throttled,
    AuthFailure,
    MalformedResponse,
    Unknown,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Throttled => "throttled",
            Self::AuthFailure => "auth_failure",
            Self::MalformedResponse => "malformed_response",
            Self::Unknown => "unknown",
        }
    }
}

/// Internal generation failure. The `Display` text carries diagnostic detail
/// for the log sink and must never be shown to users; callers go through the
/// gateway, which substitutes a generic message.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(
        "generation request timed out after {timeout_secs}s while calling '{url}'; \
         increase READ_TIMEOUT_SECS or check service responsiveness"
    )]
    Timeout { url: String, timeout_secs: u64 },
    #[error("generation service throttled the request (status {status})")]
    Throttled { status: u16 },
    #[error("generation service rejected the request credentials (status {status})")]
    AuthFailure { status: u16 },
    #[error("generation response did not match the {shape} envelope shape: {detail}")]
    MalformedResponse {
        shape: &'static str,
        detail: String,
    },
    #[error("failed to call generation service at '{url}': {detail}")]
    Unknown { url: String, detail: String },
}

impl GenerationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Throttled { .. } => FailureKind::Throttled,
            Self::AuthFailure { .. } => FailureKind::AuthFailure,
            Self::MalformedResponse { .. } => FailureKind::MalformedResponse,
            Self::Unknown { .. } => FailureKind::Unknown,
        }
    }
}

pub fn compose_instruction(template: &str, language: &str) -> String {
    template.replace("{language}", language)
}

/// Builds the configured envelope, calls the remote service, and extracts the
/// generated text. The envelope shape is fixed per deployment; the two remote
/// response shapes are not interchangeable.
pub async fn invoke(
    client: &Client,
    cfg: &Config,
    language: &str,
    question: &str,
) -> Result<String, GenerationError> {
    let instruction = compose_instruction(&cfg.system_template, language);

    match cfg.envelope {
        EnvelopeShape::Legacy => {
            debug!(
                envelope = "legacy",
                model = %cfg.model_id,
                language = %language,
                "dispatching generation request"
            );
            providers::legacy::generate(client, cfg, &instruction, question).await
        }
        EnvelopeShape::Structured => {
            debug!(
                envelope = "structured",
                model = %cfg.model_id,
                language = %language,
                "dispatching generation request"
            );
            providers::converse::generate(client, cfg, &instruction, question).await
        }
    }
}
