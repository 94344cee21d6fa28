//! Durable key-value storage for session tokens
//!
//! Keys are plain strings (`dToken`, `aToken`), values are opaque tokens.
//! Writes are synchronous and best-effort.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const TOKENS_FILE: &str = "tokens.json";

/// Durable storage backing a [`super::SessionStore`]
pub trait TokenStorage: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn store(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// Tokens kept in `tokens.json` under the data directory
pub struct FileTokenStorage {
    path: PathBuf,
    // Serializes read-modify-write of the file between roles
    write_lock: Mutex<()>,
}

impl FileTokenStorage {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(TOKENS_FILE),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> HashMap<String, String> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn write_all(&self, tokens: &HashMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(tokens)?;
        fs::write(&self.path, json)
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn store(&self, key: &str, value: &str) -> io::Result<()> {
        let _write = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut tokens = self.read_all();
        tokens.insert(key.to_string(), value.to_string());
        self.write_all(&tokens)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let _write = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut tokens = self.read_all();
        if tokens.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(&tokens)
    }
}

/// Process-local storage, for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryTokenStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        storage
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn store(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}
