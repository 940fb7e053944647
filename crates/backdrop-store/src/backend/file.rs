// crates/backdrop-store/src/backend/file.rs
// ============================================================================
// Module: Backdrop File Backend
// Description: Durable file-backed storage with atomic replacement.
// Purpose: Persist store state as pretty-printed, key-sorted JSON.
// Dependencies: backdrop-core, serde_json, url
// ============================================================================

//! ## Overview
//! The file backend writes the full state to a temporary file in the same
//! directory and renames it over the target, so readers never observe a
//! partial write. A missing file loads as an empty map; an unreadable or
//! malformed file loads as an empty map with a warning; load failures never
//! escape the store boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;

use backdrop_core::BackendError;
use backdrop_core::BackendState;
use backdrop_core::StorageBackend;
use tracing::warn;
use url::Url;

use crate::backend::decode_state;
use crate::backend::encode_state;

// ============================================================================
// SECTION: File Backend
// ============================================================================

/// Durable backend persisting to a single JSON file.
#[derive(Debug)]
pub struct FileBackend {
    /// Target file path.
    path: PathBuf,
}

impl FileBackend {
    /// Creates a backend for a `file://` URL.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] when the URL is not a local file
    /// path.
    pub fn new(url: &Url) -> Result<Self, BackendError> {
        let path = url
            .to_file_path()
            .map_err(|()| BackendError::Transport(format!("not a file url: {url}")))?;
        Ok(Self {
            path,
        })
    }

    /// Creates a backend for an explicit path.
    #[must_use]
    pub const fn from_path(path: PathBuf) -> Self {
        Self {
            path,
        }
    }
}

impl StorageBackend for FileBackend {
    fn load(&self) -> Result<BackendState, BackendError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BackendState::new());
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "store file unreadable; loading empty");
                return Ok(BackendState::new());
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(decode_state(&value)),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "store file malformed; loading empty");
                Ok(BackendState::new())
            }
        }
    }

    fn save(&self, state: &BackendState) -> Result<(), BackendError> {
        let rendered = serde_json::to_string_pretty(&encode_state(state))
            .map_err(|err| BackendError::Decode(err.to_string()))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| BackendError::Transport(err.to_string()))?;
        }
        let temp = self.path.with_extension("json.tmp");
        fs::write(&temp, rendered).map_err(|err| BackendError::Transport(err.to_string()))?;
        fs::rename(&temp, &self.path).map_err(|err| BackendError::Transport(err.to_string()))
    }

    fn clear(&self) -> Result<(), BackendError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(BackendError::Transport(err.to_string())),
        }
    }

    fn supports_concurrent_access(&self) -> bool {
        false
    }
}
