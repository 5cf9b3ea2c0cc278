use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use tracing::error;

use crate::config::Config;
use crate::model::{self, FailureKind, GenerationError};

/// The one message callers may show when generation fails. Raw provider or
/// transport detail stays in the logs.
pub const FAILURE_MESSAGE: &str =
    "I'm experiencing technical difficulties. Please try again in a moment.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Answer(String),
    Failure { kind: FailureKind, message: String },
}

type BackendFuture<'a> = Pin<Box<dyn Future<Output = Result<String, GenerationError>> + 'a>>;

trait GenerationBackend {
    fn generate<'a>(
        &'a self,
        client: &'a Client,
        cfg: &'a Config,
        language: &'a str,
        question: &'a str,
    ) -> BackendFuture<'a>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderBackend;

impl GenerationBackend for ProviderBackend {
    fn generate<'a>(
        &'a self,
        client: &'a Client,
        cfg: &'a Config,
        language: &'a str,
        question: &'a str,
    ) -> BackendFuture<'a> {
        Box::pin(async move { model::invoke(client, cfg, language, question).await })
    }
}

/// Adapter boundary between the UI surface and the remote service. Every
/// failure is normalized here: the underlying detail goes to the log sink and
/// the caller only ever sees the generic message. No retries at this layer.
pub struct Gateway<'a, B = ProviderBackend> {
    client: &'a Client,
    cfg: &'a Config,
    backend: B,
}

impl<'a> Gateway<'a, ProviderBackend> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self {
            client,
            cfg,
            backend: ProviderBackend,
        }
    }
}

impl<'a, B> Gateway<'a, B> {
    pub fn with_backend(client: &'a Client, cfg: &'a Config, backend: B) -> Self {
        Self {
            client,
            cfg,
            backend,
        }
    }
}

impl<B> Gateway<'_, B>
where
    B: GenerationBackend,
{
    pub async fn ask(&self, language: &str, question: &str) -> GenerationOutcome {
        match self
            .backend
            .generate(self.client, self.cfg, language, question)
            .await
        {
            Ok(text) => GenerationOutcome::Answer(text),
            Err(err) => {
                error!(
                    kind = err.kind().as_str(),
                    model = %self.cfg.model_id,
                    error = %err,
                    "generation request failed"
                );
                GenerationOutcome::Failure {
                    kind: err.kind(),
                    message: FAILURE_MESSAGE.to_string(),
                }
            }
        }
    }
}
