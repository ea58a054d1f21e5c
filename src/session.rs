//! Session lifecycle: persisted token storage and the landed location

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::auth::{self, ACCESS_TOKEN_KEY};

/// Storage key holding the access token between runs.
pub const TOKEN_STORAGE_KEY: &str = "spotify_access_token";

/// String key/value store persisted as a single JSON file.
#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = match Self::read_items(&path) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Local storage unreadable, starting empty");
                BTreeMap::new()
            }
        };
        Self { path, items }
    }

    fn read_items(path: &Path) -> Result<BTreeMap<String, String>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    /// Store `value` under `key` and write the file through.
    pub fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.items)?;
        fs::write(&self.path, content).with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

/// The address the application was opened on, e.g. the redirect URL the
/// identity provider sent the browser to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    href: String,
}

impl Location {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into().trim().to_string() }
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    /// Everything after the first `#`, or an empty string.
    pub fn fragment(&self) -> &str {
        self.href.split_once('#').map(|(_, f)| f).unwrap_or("")
    }

    /// Drop the fragment so the token does not linger in the address.
    pub fn clear_fragment(&mut self) {
        if let Some(idx) = self.href.find('#') {
            self.href.truncate(idx);
        }
    }
}

/// Client-side view of the login session. The token is opaque: expiry,
/// scope and format are never checked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
}

pub struct SessionStore {
    storage: LocalStorage,
    session: Session,
}

impl SessionStore {
    /// Start a session from whatever token storage already holds.
    pub fn restore(storage: LocalStorage) -> Self {
        let token = storage.get_item(TOKEN_STORAGE_KEY).map(str::to_string);
        if token.is_some() {
            tracing::info!("Restored access token from local storage");
        }
        Self {
            storage,
            session: Session { token },
        }
    }

    /// Pick up a token from the location fragment, if there is one.
    ///
    /// On success the token is persisted, becomes the session token and the
    /// fragment is cleared. Returns whether a new token was captured.
    pub fn capture_from_location(&mut self, location: &mut Location) -> bool {
        let params = auth::token_from_fragment(location.fragment());
        let Some(token) = params.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty()) else {
            tracing::debug!("No access token in location fragment");
            return false;
        };

        if let Err(e) = self.storage.set_item(TOKEN_STORAGE_KEY, token) {
            tracing::error!(error = %e, "Failed to persist access token");
        }
        self.session.token = Some(token.clone());
        location.clear_fragment();
        tracing::info!("Captured access token from redirect");
        true
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token.as_deref()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Storage file one level below a fresh directory, so the first write
    /// has to create its parent.
    fn temp_storage() -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join(".cache").join("local_storage.json");
        (dir, path)
    }

    #[test]
    fn location_fragment_and_clear() {
        let mut location = Location::new("http://localhost:5173/#access_token=ABC");
        assert_eq!(location.fragment(), "access_token=ABC");
        location.clear_fragment();
        assert_eq!(location.fragment(), "");
        assert_eq!(location.href(), "http://localhost:5173/");

        assert_eq!(Location::new("http://localhost:5173/").fragment(), "");
    }

    #[test]
    fn fragment_without_token_leaves_session_unset() {
        let (_dir, path) = temp_storage();
        let mut store = SessionStore::restore(LocalStorage::open(&path));
        let mut location = Location::new("http://localhost:5173/#token_type=Bearer&expires_in=3600");

        assert!(!store.capture_from_location(&mut location));
        assert_eq!(store.token(), None);
        assert_eq!(location.fragment(), "token_type=Bearer&expires_in=3600");
        assert!(!path.exists());
    }

    #[test]
    fn malformed_fragment_is_not_a_token() {
        let (_dir, path) = temp_storage();
        let mut store = SessionStore::restore(LocalStorage::open(&path));
        let mut location = Location::new("http://localhost:5173/#access_token=%ZZ");

        assert!(!store.capture_from_location(&mut location));
        assert_eq!(store.token(), None);
    }

    #[test]
    fn captured_token_survives_reload() {
        let (_dir, path) = temp_storage();
        let mut store = SessionStore::restore(LocalStorage::open(&path));
        let mut location =
            Location::new("http://localhost:5173/#access_token=ABC&token_type=Bearer&expires_in=3600");

        assert!(store.capture_from_location(&mut location));
        assert_eq!(store.token(), Some("ABC"));
        assert_eq!(location.fragment(), "");

        let reloaded = SessionStore::restore(LocalStorage::open(&path));
        assert_eq!(reloaded.token(), Some("ABC"));
        assert_eq!(reloaded.storage().get_item(TOKEN_STORAGE_KEY), Some("ABC"));
    }

    #[test]
    fn newer_token_overwrites_stored_one() {
        let (_dir, path) = temp_storage();
        let mut store = SessionStore::restore(LocalStorage::open(&path));
        store.capture_from_location(&mut Location::new("http://x/#access_token=OLD"));
        store.capture_from_location(&mut Location::new("http://x/#access_token=NEW"));
        assert_eq!(store.token(), Some("NEW"));

        let reloaded = SessionStore::restore(LocalStorage::open(&path));
        assert_eq!(reloaded.token(), Some("NEW"));
    }

    #[test]
    fn corrupt_storage_starts_empty() {
        let (_dir, path) = temp_storage();
        fs::create_dir_all(path.parent().expect("parent dir")).expect("create dir");
        fs::write(&path, "not json").expect("write");

        let store = SessionStore::restore(LocalStorage::open(&path));
        assert_eq!(store.token(), None);
    }
}
