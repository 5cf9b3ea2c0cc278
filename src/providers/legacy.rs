use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::model::GenerationError;
use crate::providers::transport;

const SHAPE: &str = "legacy";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvokeRequest {
    input_text: String,
    text_generation_config: TextGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextGenerationConfig {
    temperature: f64,
    max_token_count: u32,
    top_p: f64,
    stop_sequences: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvokeResponse {
    results: Vec<TextResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextResult {
    output_text: String,
}

fn invoke_url(endpoint: &str, model_id: &str) -> String {
    format!("{}/model/{}/invoke", endpoint.trim_end_matches('/'), model_id)
}

/// Single-turn envelope: the system instruction and user text travel as one
/// flat prompt, and the reply comes back under `results[0].outputText`.
pub async fn generate(
    client: &Client,
    cfg: &Config,
    instruction: &str,
    question: &str,
) -> Result<String, GenerationError> {
    let api_url = invoke_url(&cfg.endpoint, &cfg.model_id);
    let body = InvokeRequest {
        input_text: format!("{instruction}\n\n{question}"),
        text_generation_config: TextGenerationConfig {
            temperature: cfg.sampling.temperature,
            max_token_count: cfg.sampling.max_output_tokens,
            top_p: cfg.sampling.top_p,
            stop_sequences: Vec::new(),
        },
    };
    debug!(
        api_url = %api_url,
        model = %cfg.model_id,
        prompt_len = body.input_text.len(),
        "sending single-turn generation request"
    );

    let response = transport::post_json(client, cfg, &api_url, &body).await?;
    let parsed: InvokeResponse = transport::decode_json(response, SHAPE).await?;
    let first = parsed
        .results
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::MalformedResponse {
            shape: SHAPE,
            detail: "results array is empty".to_string(),
        })?;

    debug!(
        model = %cfg.model_id,
        response_len = first.output_text.len(),
        "received single-turn generation response"
    );
    Ok(first.output_text)
}
