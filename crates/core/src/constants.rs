//! Constants used throughout the Health Companion core crate.
//!
//! Default configuration values and the fixed strings shown alongside results live here so
//! the REST layer and the CLI stay consistent.

/// Default REST bind address when `HC_REST_ADDR` is unset.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default file for note storage when no explicit path is configured.
pub const DEFAULT_NOTES_FILE: &str = "notes.txt";

/// Separator written after every stored note.
pub const NOTE_SEPARATOR: &str = "\n---\n";

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model name.
pub const DEFAULT_GENERATOR_MODEL: &str = "gpt-4o-mini";

/// Default sampling temperature.
pub const DEFAULT_GENERATOR_MODEL_TEMP: f32 = 0.0;

/// Default HTTP timeout for language model calls, in seconds.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

/// Attached to every non-sentinel disease prediction.
pub const PREDICTION_DISCLAIMER: &str =
    "This is not a medical diagnosis. Please consult a healthcare professional.";

/// Placeholder for history fields the extractor could not find.
pub const NOT_MENTIONED: &str = "Not mentioned";
