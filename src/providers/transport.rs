use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::GenerationError;
use crate::providers::http_errors;

const BACKOFF_BASE_MS: u64 = 100;
const BACKOFF_CAP: Duration = Duration::from_secs(20);

/// Transport layer beneath the adapter. Owns the bounded retry loop: transient
/// failures (connect/timeout errors, 429, 5xx) are retried with exponential
/// backoff up to `retry.max_attempts`; everything else fails immediately.
pub(crate) async fn post_json<T: Serialize>(
    client: &Client,
    cfg: &Config,
    url: &str,
    body: &T,
) -> Result<reqwest::Response, GenerationError> {
    let max_attempts = cfg.retry.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match client.post(url).json(body).send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status();
                let response_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<failed to read response body>".to_string());
                warn!(
                    url = %url,
                    status = %status,
                    attempt,
                    response_body_len = response_body.len(),
                    "generation service returned non-success status"
                );
                if attempt >= max_attempts || !retryable_status(status) {
                    return Err(http_errors::status_error(status, &response_body, url));
                }
            }
            Err(err) => {
                warn!(url = %url, attempt, error = %err, "generation request failed to complete");
                let retryable = http_errors::is_retryable_request_error(&err);
                let mapped = http_errors::request_error(err, url, cfg.retry.read_timeout_secs);
                if attempt >= max_attempts || !retryable {
                    return Err(mapped);
                }
            }
        }

        let delay = backoff_delay(attempt);
        debug!(url = %url, attempt, delay_ms = delay.as_millis() as u64, "retrying after backoff");
        sleep(delay).await;
    }
}

/// Decodes the response body into the shape-specific envelope type. A body
/// that cannot be read or parsed counts as a malformed response.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
    shape: &'static str,
) -> Result<T, GenerationError> {
    let body = response
        .text()
        .await
        .map_err(|err| GenerationError::MalformedResponse {
            shape,
            detail: format!("failed to read response body: {err}"),
        })?;
    serde_json::from_str(&body).map_err(|err| GenerationError::MalformedResponse {
        shape,
        detail: err.to_string(),
    })
}

fn retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn backoff_delay(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(8);
    Duration::from_millis(BACKOFF_BASE_MS << exponent).min(BACKOFF_CAP)
}
