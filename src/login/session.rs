//! Persisted login session
//!
//! The session is a small JSON document kept in a key-value store under
//! [`SESSION_KEY`]. The file store keeps every key of the store in one JSON
//! object, so other keys written by other tools survive a save.

use crate::error::{ClinicError, IoResultExt, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Key holding the logged-in user
pub const SESSION_KEY: &str = "cardiopix:user";

/// Logged-in user as persisted after authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Login email
    pub email: String,
    /// Selected profile
    pub profile: String,
}

/// Durable key-value store holding JSON text
pub trait SessionStore: Send + Sync {
    /// Read the raw value of a key
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write the raw value of a key
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key
    fn remove(&self, key: &str) -> Result<()>;
}

/// Save the session under [`SESSION_KEY`]
pub fn persist_session(store: &dyn SessionStore, session: &Session) -> Result<()> {
    let value = serde_json::to_string(session)?;
    store.set(SESSION_KEY, &value)
}

/// Load the session, if one was saved
pub fn load_session(store: &dyn SessionStore) -> Result<Option<Session>> {
    match store.get(SESSION_KEY)? {
        Some(value) => Ok(Some(serde_json::from_str(&value)?)),
        None => Ok(None),
    }
}

/// Forget the saved session
pub fn clear_session(store: &dyn SessionStore) -> Result<()> {
    store.remove(SESSION_KEY)
}

/// Store kept in process memory
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ClinicError::Session("store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ClinicError::Session("store lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ClinicError::Session("store lock poisoned".into()))?;
        entries.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the user's local data directory
    pub fn default_location() -> Self {
        Self::new(default_session_path())
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path).with_path(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            ClinicError::Session(format!("corrupt store {}: {e}", self.path.display()))
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_path(parent)?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content).with_path(&self.path)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// `<local data dir>/cardiopix/session.json`
pub fn default_session_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cardiopix")
        .join("session.json")
}
