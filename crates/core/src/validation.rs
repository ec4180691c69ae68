//! Validated text inputs.

use crate::{CoreError, CoreResult};

/// Note text that is guaranteed to contain at least one non-whitespace character.
///
/// Leading and trailing whitespace is trimmed during construction. The note separator line
/// is not allowed inside a note, since it would split the note on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteText(String);

impl NoteText {
    pub fn new(input: impl AsRef<str>) -> CoreResult<Self> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidInput("note cannot be empty".into()));
        }
        if trimmed.lines().any(|line| line.trim() == "---") {
            return Err(CoreError::InvalidInput(
                "note cannot contain a '---' separator line".into(),
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NoteText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NoteText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
