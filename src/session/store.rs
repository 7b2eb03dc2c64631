//! Durable storage for the bearer token and the cached operator profile.
//!
//! Two named slots live in a synchronous key-value backend: `jwt` holds the
//! raw token and `user` holds the JSON-encoded profile. Both are removed
//! together on logout. A malformed profile slot is treated as absent; it is
//! never reported to callers as an error.

use super::{
    types::{Token, UserProfile},
    StoreError,
};
use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};
use tracing::{debug, warn};

pub const TOKEN_SLOT: &str = "jwt";
pub const PROFILE_SLOT: &str = "user";

/// Synchronous string key-value persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    /// Returns an error if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// # Errors
    /// Returns an error if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Removes several slots as one change.
    ///
    /// # Errors
    /// Returns the first error; the remaining slots are still attempted.
    fn remove_all(&self, keys: &[&str]) -> Result<(), StoreError> {
        keys.iter()
            .map(|key| self.remove(key))
            .fold(Ok(()), Result::and)
    }
}

/// Volatile backend, used by tests and one-shot tooling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// JSON file backend. The whole slot map is rewritten on every change through
/// a temporary file and a rename, so a crash never leaves a torn file behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    slots: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the session file, starting empty if it is missing or unreadable.
    ///
    /// # Errors
    /// Returns an error if the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let slots: BTreeMap<String, String> = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("ignoring malformed session file {}: {err}", path.display());
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };

        debug!("session file: {}", path.display());

        Ok(Self {
            path,
            slots: Mutex::new(slots),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, slots: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let contents = serde_json::to_vec_pretty(slots)?;
        let tmp = self.path.with_extension("tmp");

        let mut file = create_private(&tmp)?;
        file.write_all(&contents)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn remove_file(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(unix)]
fn create_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> std::io::Result<fs::File> {
    fs::File::create(path)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = slots.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *slots = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_all(&[key])
    }

    /// An empty result may also be reached by deleting the file, which still
    /// works when the temporary path cannot be written.
    fn remove_all(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = slots.clone();
        let mut changed = false;
        for key in keys {
            changed |= next.remove(*key).is_some();
        }
        if !changed {
            return Ok(());
        }

        if let Err(err) = self.persist(&next) {
            if !next.is_empty() {
                return Err(err);
            }
            warn!("rewriting session file failed, removing it instead: {err}");
            self.remove_file()?;
        }
        *slots = next;
        Ok(())
    }
}

/// Typed view over the two session slots. Cloning shares the same backend.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// # Errors
    /// Returns an error if the session file cannot be prepared.
    pub fn file(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self::new(FileStore::open(path)?))
    }

    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.backend
            .get(TOKEN_SLOT)
            .filter(|value| !value.is_empty())
            .map(Token::new)
    }

    /// # Errors
    /// Returns an error if the backend cannot persist the token.
    pub fn set_token(&self, token: &Token) -> Result<(), StoreError> {
        self.backend.set(TOKEN_SLOT, token.expose())
    }

    /// # Errors
    /// Returns an error if the backend cannot persist the removal.
    pub fn clear_token(&self) -> Result<(), StoreError> {
        self.backend.remove(TOKEN_SLOT)
    }

    #[must_use]
    pub fn cached_profile(&self) -> Option<UserProfile> {
        let raw = self.backend.get(PROFILE_SLOT)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(err) => {
                warn!("cached profile is not usable, ignoring it: {err}");
                None
            }
        }
    }

    /// # Errors
    /// Returns an error if the profile cannot be encoded or persisted.
    pub fn set_cached_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let raw = serde_json::to_string(profile)?;
        self.backend.set(PROFILE_SLOT, &raw)
    }

    /// # Errors
    /// Returns an error if the backend cannot persist the removal.
    pub fn clear_cached_profile(&self) -> Result<(), StoreError> {
        self.backend.remove(PROFILE_SLOT)
    }

    /// Removes the token and the cached profile together.
    ///
    /// # Errors
    /// Returns an error if the backend cannot persist the removal. A failed
    /// clear leaves the previous slots readable.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.backend.remove_all(&[TOKEN_SLOT, PROFILE_SLOT])
    }

    /// Clears both slots only if the stored token is still `token`, so a
    /// superseded operation cannot wipe a newer sign-in.
    ///
    /// # Errors
    /// Returns an error if the backend cannot persist the removal.
    pub fn discard_token(&self, token: &Token) -> Result<bool, StoreError> {
        match self.token() {
            Some(current) if current.matches(token) => self.clear().map(|()| true),
            _ => Ok(false),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backend.get(TOKEN_SLOT).is_none() && self.backend.get(PROFILE_SLOT).is_none()
    }

    /// Raw slot access for callers that need to seed or inspect the backend.
    #[must_use]
    pub fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("has_token", &self.token().is_some())
            .finish()
    }
}
