use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::model::GenerationError;
use crate::providers::transport;

const SHAPE: &str = "structured";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConverseRequest {
    messages: Vec<RequestMessage>,
    system: Vec<SystemBlock>,
    inference_config: InferenceConfig,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentBlock {
    text: String,
}

#[derive(Debug, Serialize)]
struct SystemBlock {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InferenceConfig {
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
}

#[derive(Debug, Deserialize)]
struct ConverseResponse {
    output: ConverseOutput,
}

#[derive(Debug, Deserialize)]
struct ConverseOutput {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Vec<ContentBlock>,
}

fn converse_url(endpoint: &str, model_id: &str) -> String {
    format!(
        "{}/model/{}/converse",
        endpoint.trim_end_matches('/'),
        model_id
    )
}

/// Structured conversation envelope: one user-role message, the instruction in
/// a separate system field, and the reply under `output.message.content[0].text`.
pub async fn generate(
    client: &Client,
    cfg: &Config,
    instruction: &str,
    question: &str,
) -> Result<String, GenerationError> {
    let api_url = converse_url(&cfg.endpoint, &cfg.model_id);
    let body = ConverseRequest {
        messages: vec![RequestMessage {
            role: "user",
            content: vec![ContentBlock {
                text: question.to_string(),
            }],
        }],
        system: vec![SystemBlock {
            text: instruction.to_string(),
        }],
        inference_config: InferenceConfig {
            temperature: cfg.sampling.temperature,
            max_tokens: cfg.sampling.max_output_tokens,
            top_p: cfg.sampling.top_p,
        },
    };
    debug!(
        api_url = %api_url,
        model = %cfg.model_id,
        question_len = question.len(),
        "sending structured generation request"
    );

    let response = transport::post_json(client, cfg, &api_url, &body).await?;
    let parsed: ConverseResponse = transport::decode_json(response, SHAPE).await?;
    let first = parsed
        .output
        .message
        .content
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::MalformedResponse {
            shape: SHAPE,
            detail: "message content is empty".to_string(),
        })?;

    debug!(
        model = %cfg.model_id,
        response_len = first.text.len(),
        "received structured generation response"
    );
    Ok(first.text)
}
