// crates/backdrop-store/src/backend/prefs.rs
// ============================================================================
// Module: Backdrop User-Preferences Backend
// Description: Blob storage inside a shared preferences suite file.
// Purpose: Persist one serialized object per store key in a suite document.
// Dependencies: backdrop-core, serde_json
// ============================================================================

//! ## Overview
//! The preferences backend stores each store's state as a single bare-JSON
//! blob under the key `{app_id}.{scope}` inside a suite file shared by all
//! preference stores. The medium is not concurrent-safe; writes are
//! serialized by the owning store, and the whole suite document is re-read
//! and re-written on every save.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;

use backdrop_core::BackendError;
use backdrop_core::BackendState;
use backdrop_core::StorageBackend;
use serde_json::Map;
use serde_json::Value;
use tracing::warn;

use crate::backend::decode_state;
use crate::backend::encode_state;

// ============================================================================
// SECTION: Preferences Backend
// ============================================================================

/// Blob-per-store backend inside a preferences suite file.
#[derive(Debug)]
pub struct UserPrefsBackend {
    /// Suite file holding all preference blobs.
    suite_path: PathBuf,
    /// Blob key for this store (`{app_id}.{scope}`).
    blob_key: String,
}

impl UserPrefsBackend {
    /// Creates a backend for a suite file and blob key.
    #[must_use]
    pub const fn new(suite_path: PathBuf, blob_key: String) -> Self {
        Self {
            suite_path,
            blob_key,
        }
    }

    /// Reads the whole suite document; malformed suites load empty with a
    /// warning.
    fn read_suite(&self) -> Map<String, Value> {
        let raw = match fs::read_to_string(&self.suite_path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(err) => {
                warn!(path = %self.suite_path.display(), error = %err, "prefs suite unreadable; loading empty");
                return Map::new();
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!(path = %self.suite_path.display(), "prefs suite malformed; loading empty");
                Map::new()
            }
        }
    }

    /// Writes the whole suite document back.
    fn write_suite(&self, suite: &Map<String, Value>) -> Result<(), BackendError> {
        if let Some(parent) = self.suite_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| BackendError::Transport(err.to_string()))?;
        }
        let rendered = serde_json::to_string_pretty(&Value::Object(suite.clone()))
            .map_err(|err| BackendError::Decode(err.to_string()))?;
        fs::write(&self.suite_path, rendered)
            .map_err(|err| BackendError::Transport(err.to_string()))
    }
}

impl StorageBackend for UserPrefsBackend {
    fn load(&self) -> Result<BackendState, BackendError> {
        let suite = self.read_suite();
        Ok(suite.get(&self.blob_key).map(decode_state).unwrap_or_default())
    }

    fn save(&self, state: &BackendState) -> Result<(), BackendError> {
        let mut suite = self.read_suite();
        suite.insert(self.blob_key.clone(), encode_state(state));
        self.write_suite(&suite)
    }

    fn clear(&self) -> Result<(), BackendError> {
        let mut suite = self.read_suite();
        if suite.remove(&self.blob_key).is_none() {
            return Ok(());
        }
        self.write_suite(&suite)
    }

    fn supports_concurrent_access(&self) -> bool {
        false
    }
}
