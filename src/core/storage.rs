// ─── Durable Key-Value Store ───
// String blobs keyed by name, persisted as a single JSON document in the
// launcher data directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};

/// Durable client-local storage with the same shape as a browser `localStorage`.
///
/// Calls are synchronous and may block on disk. Callers hold the app state
/// lock across them, so a mutation is durable once it returns and no other
/// command observes a half-written registry.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> LauncherResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> LauncherResult<()>;
    fn remove_item(&self, key: &str) -> LauncherResult<()>;
}

/// Key-value store backed by one JSON file. The whole document is rewritten
/// on every mutation through a temporary sibling file and a rename.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing or unreadable document starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Corrupt storage document at {:?}: {}", path, e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Cannot read storage document {:?}: {}", path, e);
                BTreeMap::new()
            }
        };

        debug!("Opened storage {:?} with {} keys", path, entries.len());
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> LauncherResult<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| LauncherError::Other("storage lock poisoned".into()))
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> LauncherResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LauncherError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|source| LauncherError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| LauncherError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_item(&self, key: &str) -> LauncherResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> LauncherResult<()> {
        let mut entries = self.lock()?;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> LauncherResult<()> {
        let mut entries = self.lock()?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }
}

/// In-memory store used by tests. Writes can be made to fail on demand.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    fail_writes: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_item(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    fn check_writable(&self) -> LauncherResult<()> {
        if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(LauncherError::Other("disk full".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> LauncherResult<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> LauncherResult<()> {
        self.check_writable()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> LauncherResult<()> {
        self.check_writable()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
