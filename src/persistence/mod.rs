//! Key-value prefs storage
//!
//! The game only keeps integers here (the running score across reloads).
//! Backends:
//! - `MemoryPrefs`: tests and throwaway sessions
//! - `JsonFilePrefs`: native, a flat JSON object on disk
//! - `LocalStoragePrefs`: browser LocalStorage (wasm32 only)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Prefs failures
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("prefs io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("prefs json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("prefs storage unavailable")]
    Unavailable,
}

/// Minimal integer key-value store
pub trait Prefs {
    fn get_int(&self, key: &str) -> Option<i64>;
    fn set_int(&mut self, key: &str, value: i64);
    fn remove(&mut self, key: &str);
    /// Persist pending writes
    fn flush(&mut self) -> Result<(), PrefsError>;
}

/// In-memory prefs
#[derive(Debug, Clone, Default)]
pub struct MemoryPrefs {
    values: BTreeMap<String, i64>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prefs for MemoryPrefs {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn flush(&mut self) -> Result<(), PrefsError> {
        Ok(())
    }
}

/// Prefs stored as a JSON object in a file
#[derive(Debug, Clone)]
pub struct JsonFilePrefs {
    path: PathBuf,
    values: BTreeMap<String, i64>,
}

impl JsonFilePrefs {
    /// Open prefs at `path`; a missing file starts empty
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PrefsError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let json = std::fs::read_to_string(&path)?;
            serde_json::from_str(&json)?
        } else {
            BTreeMap::new()
        };
        log::debug!("Opened prefs {} ({} keys)", path.display(), values.len());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Prefs for JsonFilePrefs {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn flush(&mut self) -> Result<(), PrefsError> {
        let json = serde_json::to_string_pretty(&self.values)?;
        // tmp + rename: readers never see a partial file
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        log::debug!("Prefs saved to {}", self.path.display());
        Ok(())
    }
}

/// Browser LocalStorage prefs. Writes go straight through.
#[cfg(target_arch = "wasm32")]
pub struct LocalStoragePrefs {
    storage: web_sys::Storage,
    prefix: &'static str,
}

#[cfg(target_arch = "wasm32")]
impl LocalStoragePrefs {
    pub fn open(prefix: &'static str) -> Result<Self, PrefsError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(PrefsError::Unavailable)?;
        Ok(Self { storage, prefix })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[cfg(target_arch = "wasm32")]
impl Prefs for LocalStoragePrefs {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.storage
            .get_item(&self.key(key))
            .ok()
            .flatten()
            .and_then(|v| v.parse().ok())
    }

    fn set_int(&mut self, key: &str, value: i64) {
        let result = self.storage.set_item(&self.key(key), &value.to_string());
        warn_on_storage_error(result, "store", key);
    }

    fn remove(&mut self, key: &str) {
        let result = self.storage.remove_item(&self.key(key));
        warn_on_storage_error(result, "remove", key);
    }

    fn flush(&mut self) -> Result<(), PrefsError> {
        Ok(())
    }
}

/// Storage writes can't fail the caller; log and carry on. Returns whether
/// the write went through.
#[cfg(any(test, target_arch = "wasm32"))]
fn warn_on_storage_error<E: std::fmt::Debug>(result: Result<(), E>, action: &str, key: &str) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to {} pref {}: {:?}", action, key, e);
            false
        }
    }
}
