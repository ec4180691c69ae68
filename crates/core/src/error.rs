use crate::llm::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create notes directory: {0}")]
    NotesDirCreation(std::io::Error),
    #[error("failed to write note file: {0}")]
    NoteWrite(std::io::Error),
    #[error("failed to read note file: {0}")]
    NoteRead(std::io::Error),
    #[error("note store lock poisoned")]
    NoteStoreLockPoisoned,
    #[error("failed to parse extraction output: {0}")]
    ExtractionParse(serde_json::Error),
    #[error("no language model is configured")]
    LlmNotConfigured,
    #[error("language model error: {0}")]
    Llm(#[from] LlmError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
