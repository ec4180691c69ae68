//! Language model seam.
//!
//! Core services talk to a model only through [`LlmClient`], so the chatbot and note extraction
//! stay testable without network access. The HTTP implementation lives in `hc-llm`.

use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("cannot reach language model at {0}")]
    Connection(String),
    #[error("language model request timed out after {0}s")]
    Timeout(u64),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("language model returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to parse language model response: {0}")]
    ResponseParsing(String),
    #[error("language model returned no content")]
    EmptyResponse,
}

/// A blocking chat-completion client.
///
/// Implementations perform network I/O; async callers should run them on a blocking thread.
pub trait LlmClient: Send + Sync {
    /// Send one system prompt and one user message, returning the reply text.
    fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    /// Model name used for logging.
    fn model(&self) -> &str;
}

/// Canned-response client for tests and offline runs.
///
/// Records every prompt it receives.
pub struct MockLlmClient {
    response: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A client whose every call fails with [`LlmError::HttpClient`].
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl LlmClient for MockLlmClient {
    fn complete(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.response.clone().map_err(LlmError::HttpClient)
    }

    fn model(&self) -> &str {
        "mock"
    }
}
