use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use askme::config::{
    Config, EnvelopeShape, RetryConfig, SamplingConfig, ValidationRules,
};
use askme::gateway::{FAILURE_MESSAGE, Gateway, GenerationOutcome};
use askme::model::{self, FailureKind};

fn test_config(endpoint: &str, envelope: EnvelopeShape) -> Config {
    Config {
        model_id: "test-model".to_string(),
        region: "us-west-2".to_string(),
        endpoint: endpoint.to_string(),
        envelope,
        system_template: "You are a helpful chatbot. Respond in {language}.".to_string(),
        languages: vec!["english".to_string(), "french".to_string()],
        sampling: SamplingConfig::default(),
        validation: ValidationRules::default(),
        access_secret: None,
        retry: RetryConfig {
            max_attempts: 1,
            connect_timeout_secs: 10,
            read_timeout_secs: 60,
        },
    }
}

#[tokio::test]
async fn structured_envelope_round_trips_generated_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/model/test-model/converse"))
        .and(body_partial_json(json!({
            "messages": [{"role": "user", "content": [{"text": "hi"}]}],
            "system": [{"text": "You are a helpful chatbot. Respond in french."}],
            "inferenceConfig": {"maxTokens": 2000}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": {"message": {"role": "assistant", "content": [{"text": "Bonjour"}]}},
            "stopReason": "end_turn"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = test_config(&server.uri(), EnvelopeShape::Structured);
    let client = reqwest::Client::new();

    let text = model::invoke(&client, &cfg, "french", "hi")
        .await
        .expect("generation should succeed");
    assert_eq!(text, "Bonjour");
}

#[tokio::test]
async fn legacy_envelope_round_trips_generated_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/model/test-model/invoke"))
        .and(body_partial_json(json!({
            "inputText": "You are a helpful chatbot. Respond in french.\n\nhi",
            "textGenerationConfig": {"maxTokenCount": 2000, "stopSequences": []}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "inputTextTokenCount": 12,
            "results": [
                {"tokenCount": 3, "outputText": "Bonjour", "completionReason": "FINISH"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = test_config(&server.uri(), EnvelopeShape::Legacy);
    let client = reqwest::Client::new();

    let text = model::invoke(&client, &cfg, "french", "hi")
        .await
        .expect("generation should succeed");
    assert_eq!(text, "Bonjour");
}

#[tokio::test]
async fn unexpected_response_shape_maps_to_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let cfg = test_config(&server.uri(), EnvelopeShape::Structured);
    let client = reqwest::Client::new();

    let err = model::invoke(&client, &cfg, "english", "hi")
        .await
        .expect_err("generation should fail");
    assert_eq!(err.kind(), FailureKind::MalformedResponse);
}

#[tokio::test]
async fn empty_results_map_to_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "inputTextTokenCount": 0,
            "results": []
        })))
        .mount(&server)
        .await;

    let cfg = test_config(&server.uri(), EnvelopeShape::Legacy);
    let client = reqwest::Client::new();

    let err = model::invoke(&client, &cfg, "english", "hi")
        .await
        .expect_err("generation should fail");
    assert_eq!(err.kind(), FailureKind::MalformedResponse);
}

#[tokio::test]
async fn throttling_status_maps_to_throttled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("ThrottlingException"))
        .mount(&server)
        .await;

    let cfg = test_config(&server.uri(), EnvelopeShape::Structured);
    let client = reqwest::Client::new();

    let err = model::invoke(&client, &cfg, "english", "hi")
        .await
        .expect_err("generation should fail");
    assert_eq!(err.kind(), FailureKind::Throttled);
}

#[tokio::test]
async fn auth_status_maps_to_auth_failure_without_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("AccessDeniedException"))
        .expect(1)
        .mount(&server)
        .await;

    let mut cfg = test_config(&server.uri(), EnvelopeShape::Structured);
    cfg.retry.max_attempts = 5;
    let client = reqwest::Client::new();

    let err = model::invoke(&client, &cfg, "english", "hi")
        .await
        .expect_err("generation should fail");
    assert_eq!(err.kind(), FailureKind::AuthFailure);
}

#[tokio::test]
async fn transient_server_errors_are_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("InternalServerException"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": {"message": {"content": [{"text": "Bonjour"}]}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cfg = test_config(&server.uri(), EnvelopeShape::Structured);
    cfg.retry.max_attempts = 3;
    let client = reqwest::Client::new();

    let text = model::invoke(&client, &cfg, "french", "hi")
        .await
        .expect("generation should succeed after retries");
    assert_eq!(text, "Bonjour");
}

#[tokio::test]
async fn gateway_never_surfaces_server_error_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string("stacktrace: secret internal detail"),
        )
        .mount(&server)
        .await;

    let cfg = test_config(&server.uri(), EnvelopeShape::Structured);
    let client = reqwest::Client::new();

    match Gateway::new(&client, &cfg).ask("english", "hi").await {
        GenerationOutcome::Failure { kind, message } => {
            assert_eq!(kind, FailureKind::Unknown);
            assert_eq!(message, FAILURE_MESSAGE);
            assert!(!message.contains("secret internal detail"));
        }
        other => panic!("expected failure outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn gateway_returns_generated_text_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/model/test-model/converse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": {"message": {"content": [{"text": "Bonjour"}]}}
        })))
        .mount(&server)
        .await;

    let cfg = test_config(&server.uri(), EnvelopeShape::Structured);
    let client = reqwest::Client::new();

    let outcome = Gateway::new(&client, &cfg).ask("french", "hi").await;
    assert_eq!(outcome, GenerationOutcome::Answer("Bonjour".to_string()));
}
