//! Committed campaign snapshots, keyed by stage.
//!
//! Stores hold serialized text; [`SessionStoreExt`] layers JSON encoding on
//! top. A missing or unreadable entry reads as `None`, never as an error, so
//! the sequencer can treat "absent" and "corrupt" the same way.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::SessionError;

/// The three committed snapshots of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    Company,
    Analysis,
    Strategy,
}

impl SessionKey {
    pub const ALL: [SessionKey; 3] = [
        SessionKey::Company,
        SessionKey::Analysis,
        SessionKey::Strategy,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKey::Company => "company",
            SessionKey::Analysis => "analysis",
            SessionKey::Strategy => "strategy",
        }
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Raw key/value storage for committed snapshots.
pub trait SessionStore {
    /// Replaces the entry for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the backing cannot be written.
    fn put(&mut self, key: SessionKey, value: &str) -> Result<(), SessionError>;

    /// Returns the entry for `key`, or `None` if absent or unreadable.
    fn get(&self, key: SessionKey) -> Option<String>;

    /// Removes the entry for `key`. Clearing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the backing cannot be modified.
    fn clear(&mut self, key: SessionKey) -> Result<(), SessionError>;

    /// Removes every entry.
    ///
    /// # Errors
    ///
    /// Returns the first [`SessionError`] from [`SessionStore::clear`].
    fn clear_all(&mut self) -> Result<(), SessionError> {
        for key in SessionKey::ALL {
            self.clear(key)?;
        }
        Ok(())
    }
}

/// Typed JSON access over any [`SessionStore`].
pub trait SessionStoreExt: SessionStore {
    /// Serializes `value` and stores it under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Serialize`] if `value` cannot be encoded, or
    /// the backing's write error.
    fn put_json<T: Serialize + ?Sized>(
        &mut self,
        key: SessionKey,
        value: &T,
    ) -> Result<(), SessionError> {
        let text =
            serde_json::to_string(value).map_err(|e| SessionError::Serialize { key, source: e })?;
        self.put(key, &text)
    }

    /// Reads and decodes the entry for `key`.
    ///
    /// A corrupt entry is logged and reported as `None`.
    fn get_json<T: DeserializeOwned>(&self, key: SessionKey) -> Option<T> {
        let text = self.get(key)?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%key, error = %e, "ignoring corrupt session entry");
                None
            }
        }
    }

    fn contains(&self, key: SessionKey) -> bool {
        self.get(key).is_some()
    }
}

impl<S: SessionStore + ?Sized> SessionStoreExt for S {}

/// In-process store, used by tests and one-shot runs.
#[derive(Debug, Default, Clone)]
pub struct MemorySessionStore {
    entries: HashMap<SessionKey, String>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&mut self, key: SessionKey, value: &str) -> Result<(), SessionError> {
        self.entries.insert(key, value.to_owned());
        Ok(())
    }

    fn get(&self, key: SessionKey) -> Option<String> {
        self.entries.get(&key).cloned()
    }

    fn clear(&mut self, key: SessionKey) -> Result<(), SessionError> {
        self.entries.remove(&key);
        Ok(())
    }
}

/// One `<key>.json` file per entry inside a session directory.
///
/// Writes land in a temporary sibling file that is then renamed over the
/// target, so a reader sees either the old or the new content.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: SessionKey) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStore for FileSessionStore {
    fn put(&mut self, key: SessionKey, value: &str) -> Result<(), SessionError> {
        fs::create_dir_all(&self.dir).map_err(|e| SessionError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        let target = self.entry_path(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value).map_err(|e| SessionError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &target).map_err(|e| SessionError::Io {
            path: target.clone(),
            source: e,
        })?;

        tracing::debug!(%key, path = %target.display(), "session entry written");
        Ok(())
    }

    fn get(&self, key: SessionKey) -> Option<String> {
        let path = self.entry_path(key);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(%key, path = %path.display(), error = %e, "session entry unreadable");
                None
            }
        }
    }

    fn clear(&mut self, key: SessionKey) -> Result<(), SessionError> {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Io { path, source: e }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadgen_core::CampaignInput;

    fn acme() -> CampaignInput {
        CampaignInput {
            company_name: "Acme".to_string(),
            website: "https://acme.io".to_string(),
            industry: "SaaS".to_string(),
            ..CampaignInput::default()
        }
    }

    #[test]
    fn memory_store_round_trips_typed_value() {
        let mut store = MemorySessionStore::new();
        store.put_json(SessionKey::Company, &acme()).unwrap();

        let loaded: CampaignInput = store.get_json(SessionKey::Company).unwrap();
        assert_eq!(loaded, acme());
        assert!(store.get(SessionKey::Analysis).is_none());
    }

    #[test]
    fn corrupt_entry_reads_as_absent() {
        let mut store = MemorySessionStore::new();
        store.put(SessionKey::Company, "{not json").unwrap();

        assert!(store.get_json::<CampaignInput>(SessionKey::Company).is_none());
    }

    #[test]
    fn clear_all_removes_every_key() {
        let mut store = MemorySessionStore::new();
        for key in SessionKey::ALL {
            store.put(key, "{}").unwrap();
        }
        store.clear_all().unwrap();

        for key in SessionKey::ALL {
            assert!(!store.contains(key), "{key} should be cleared");
        }
    }

    #[test]
    fn file_store_writes_one_file_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSessionStore::new(dir.path().join("session"));
        store.put_json(SessionKey::Company, &acme()).unwrap();

        let path = dir.path().join("session").join("company.json");
        assert!(path.exists());
        assert!(!dir.path().join("session").join(".company.json.tmp").exists());

        let reopened = FileSessionStore::new(dir.path().join("session"));
        let loaded: CampaignInput = reopened.get_json(SessionKey::Company).unwrap();
        assert_eq!(loaded.company_name, "Acme");
    }

    #[test]
    fn file_store_overwrites_existing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSessionStore::new(dir.path());
        store.put(SessionKey::Strategy, "\"first\"").unwrap();
        store.put(SessionKey::Strategy, "\"second\"").unwrap();

        let value: String = store.get_json(SessionKey::Strategy).unwrap();
        assert_eq!(value, "second");
    }

    #[test]
    fn file_store_missing_dir_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("never-created"));
        assert!(store.get(SessionKey::Analysis).is_none());
    }

    #[test]
    fn file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSessionStore::new(dir.path());
        store.put(SessionKey::Analysis, "{}").unwrap();

        store.clear(SessionKey::Analysis).unwrap();
        store.clear(SessionKey::Analysis).unwrap();
        assert!(store.get(SessionKey::Analysis).is_none());
    }
}
