//! OpenAI-compatible chat completion client.
//!
//! Implements [`hc_core::LlmClient`] over `POST {base_url}/chat/completions` with a blocking
//! `reqwest` client. Any server speaking the same wire format (OpenAI, a local proxy) works.

use hc_core::{LlmClient, LlmConfig, LlmError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Blocking HTTP client for a chat completion endpoint.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    /// Build a client from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::HttpClient` if the underlying HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Request body for /chat/completions
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from /chat/completions
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn build_request<'a>(
    model: &'a str,
    temperature: f32,
    system: &'a str,
    prompt: &'a str,
) -> ChatCompletionRequest<'a> {
    ChatCompletionRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: prompt,
            },
        ],
        temperature,
    }
}

fn parse_completion(body: &str) -> Result<String, LlmError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(LlmError::EmptyResponse)
}

fn completion_from_reply(
    status: reqwest::StatusCode,
    model: &str,
    body: String,
) -> Result<String, LlmError> {
    if !status.is_success() {
        tracing::error!(status = status.as_u16(), model, "chat completion failed");
        return Err(LlmError::Api {
            status: status.as_u16(),
            body,
        });
    }
    parse_completion(&body)
}

impl LlmClient for OpenAiClient {
    fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let body = build_request(&self.model, self.temperature, system, prompt);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    LlmError::Timeout(self.timeout_secs)
                } else {
                    LlmError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        completion_from_reply(status, &self.model, text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LlmConfig {
        LlmConfig {
            api_key: "sk-test".into(),
            base_url: "http://localhost:9999/v1/".into(),
            model: "test-model".into(),
            temperature: 0.2,
            timeout_secs: 5,
        }
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client = OpenAiClient::new(&config()).unwrap();
        assert_eq!(client.completions_url(), "http://localhost:9999/v1/chat/completions");
        assert_eq!(client.model(), "test-model");
    }

    #[test]
    fn request_has_system_then_user() {
        let body = build_request("m", 0.5, "be brief", "hello");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "be brief");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["temperature"], 0.5);
    }

    #[test]
    fn parses_first_choice() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Rest well."}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "Rest well.");
    }

    #[test]
    fn empty_choices_is_empty_response() {
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(
            parse_completion(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(LlmError::EmptyResponse)
        ));
    }

    #[test]
    fn malformed_body_is_parse_error() {
        assert!(matches!(
            parse_completion("<html>bad gateway</html>"),
            Err(LlmError::ResponseParsing(_))
        ));
    }

    #[test]
    fn error_status_keeps_body() {
        let err = completion_from_reply(
            reqwest::StatusCode::UNAUTHORIZED,
            "m",
            r#"{"error":"bad key"}"#.into(),
        )
        .unwrap_err();
        match err {
            LlmError::Api { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("bad key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn success_status_parses_body() {
        let body = r#"{"choices":[{"message":{"content":"ok"}}]}"#.to_string();
        assert_eq!(
            completion_from_reply(reqwest::StatusCode::OK, "m", body).unwrap(),
            "ok"
        );
    }

    #[test]
    #[ignore = "needs nothing listening on 127.0.0.1:1"]
    fn unreachable_server_is_connection_error() {
        let mut cfg = config();
        cfg.base_url = "http://127.0.0.1:1".into();
        let client = OpenAiClient::new(&cfg).unwrap();
        let err = client.complete("s", "p").unwrap_err();
        assert!(matches!(err, LlmError::Connection(_) | LlmError::HttpClient(_)));
    }
}
