//! Append-only clinical note store.
//!
//! Notes live in a single UTF-8 text file. Each append writes the note followed by a
//! `\n---\n` separator line; reads split on that separator. The file is never rewritten.
//!
//! ```text
//! Patient reports chest pain on exertion.
//! ---
//! P: I've had a cough for two weeks.
//! D: Any fever?
//! ---
//! ```

use crate::constants::NOTE_SEPARATOR;
use crate::validation::NoteText;
use crate::{CoreError, CoreResult};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Handle to the note file. Clones share one append lock.
#[derive(Clone, Debug)]
pub struct NoteStore {
    path: PathBuf,
    append_lock: Arc<Mutex<()>>,
}

impl NoteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one note.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotesDirCreation` if the parent directory cannot be created and
    /// `CoreError::NoteWrite` if the file cannot be opened or written.
    pub fn append(&self, note: &NoteText) -> CoreResult<()> {
        let _guard = self
            .append_lock
            .lock()
            .map_err(|_| CoreError::NoteStoreLockPoisoned)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(CoreError::NotesDirCreation)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(CoreError::NoteWrite)?;

        let mut record = String::with_capacity(note.as_str().len() + NOTE_SEPARATOR.len());
        record.push_str(note.as_str());
        record.push_str(NOTE_SEPARATOR);
        file.write_all(record.as_bytes())
            .map_err(CoreError::NoteWrite)?;

        tracing::info!(path = %self.path.display(), bytes = record.len(), "stored note");
        Ok(())
    }

    /// Read every stored note, oldest first. A missing file reads as no notes.
    pub fn read_all(&self) -> CoreResult<Vec<String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CoreError::NoteRead(e)),
        };

        Ok(split_notes(&contents))
    }
}

fn split_notes(contents: &str) -> Vec<String> {
    // Files written on Windows may carry \r\n line endings.
    let normalised = contents.replace("\r\n", "\n");
    normalised
        .split(NOTE_SEPARATOR)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty() && *chunk != "---")
        .map(str::to_string)
        .collect()
}
