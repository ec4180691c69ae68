//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Request handlers never read process-wide environment variables.

use crate::constants::{
    DEFAULT_GENERATOR_MODEL, DEFAULT_GENERATOR_MODEL_TEMP, DEFAULT_LLM_BASE_URL,
    DEFAULT_LLM_TIMEOUT_SECS, DEFAULT_NOTES_FILE, DEFAULT_REST_ADDR,
};
use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Settings for the OpenAI-compatible chat completion endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    rest_addr: String,
    notes_file: PathBuf,
    llm: Option<LlmConfig>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(rest_addr: String, notes_file: PathBuf, llm: Option<LlmConfig>) -> CoreResult<Self> {
        if rest_addr.trim().is_empty() {
            return Err(CoreError::InvalidInput("rest_addr cannot be empty".into()));
        }
        if notes_file.as_os_str().is_empty() {
            return Err(CoreError::InvalidInput("notes_file cannot be empty".into()));
        }

        Ok(Self {
            rest_addr,
            notes_file,
            llm,
        })
    }

    /// Build the configuration from a variable lookup.
    ///
    /// Binaries pass `|k| std::env::var(k).ok()`; tests pass a closure over a fixed map.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let rest_addr = value("HC_REST_ADDR").unwrap_or_else(|| DEFAULT_REST_ADDR.into());
        let notes_file =
            PathBuf::from(value("NOTES_FILE").unwrap_or_else(|| DEFAULT_NOTES_FILE.into()));

        let llm = match value("OPENAI_API_KEY") {
            Some(api_key) => Some(LlmConfig {
                api_key,
                base_url: value("LLM_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.into())
                    .trim_end_matches('/')
                    .to_string(),
                model: value("GENERATOR_MODEL").unwrap_or_else(|| DEFAULT_GENERATOR_MODEL.into()),
                temperature: temperature_from_env_value(value("GENERATOR_MODEL_TEMP"))?,
                timeout_secs: timeout_from_env_value(value("LLM_TIMEOUT_SECS"))?,
            }),
            None => None,
        };

        Self::new(rest_addr, notes_file, llm)
    }

    pub fn rest_addr(&self) -> &str {
        &self.rest_addr
    }

    pub fn notes_file(&self) -> &Path {
        &self.notes_file
    }

    pub fn llm(&self) -> Option<&LlmConfig> {
        self.llm.as_ref()
    }
}

/// Parse the sampling temperature from an optional string value.
///
/// If `value` is `None`, returns the default temperature.
pub fn temperature_from_env_value(value: Option<String>) -> CoreResult<f32> {
    let Some(raw) = value else {
        return Ok(DEFAULT_GENERATOR_MODEL_TEMP);
    };
    let parsed: f32 = raw.parse().map_err(|_| {
        CoreError::InvalidInput(format!("GENERATOR_MODEL_TEMP is not a number: {raw}"))
    })?;
    if !(0.0..=2.0).contains(&parsed) {
        return Err(CoreError::InvalidInput(format!(
            "GENERATOR_MODEL_TEMP must be between 0 and 2, got {parsed}"
        )));
    }
    Ok(parsed)
}

fn timeout_from_env_value(value: Option<String>) -> CoreResult<u64> {
    match value {
        None => Ok(DEFAULT_LLM_TIMEOUT_SECS),
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(CoreError::InvalidInput(format!(
                "LLM_TIMEOUT_SECS must be a positive integer, got {raw}"
            ))),
        },
    }
}
