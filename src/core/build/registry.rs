// ─── Build Registry ───
// Insertion-ordered `path → BuildRecord` map mirrored into durable storage.
// Every mutation is computed on a copy, written in full, and only then
// committed in memory and broadcast to subscribers.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::model::BuildRecord;
use crate::core::error::LauncherResult;
use crate::core::storage::KeyValueStore;

/// Storage key holding the serialized registry.
pub const BUILDS_KEY: &str = "builds";

/// Snapshot of the registry in display order.
pub type BuildSnapshot = Vec<(String, BuildRecord)>;

pub struct BuildRegistry {
    store: Arc<dyn KeyValueStore>,
    builds: BuildSnapshot,
    updates: watch::Sender<BuildSnapshot>,
}

impl BuildRegistry {
    /// Rebuild the registry from `store`. A missing or corrupt blob yields an
    /// empty registry.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let builds = match store.get_item(BUILDS_KEY) {
            Ok(Some(raw)) => match deserialize(&raw) {
                Ok(builds) => builds,
                Err(e) => {
                    warn!("Corrupt build registry, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Cannot read build registry, starting empty: {}", e);
                Vec::new()
            }
        };

        info!("Loaded {} builds", builds.len());
        let (updates, _) = watch::channel(builds.clone());
        Self {
            store,
            builds,
            updates,
        }
    }

    /// Insert or overwrite the build at `path`. An overwrite keeps the
    /// original position.
    pub fn add(&mut self, path: &str, record: BuildRecord) -> LauncherResult<()> {
        let mut next = self.builds.clone();
        match next.iter_mut().find(|(p, _)| p == path) {
            Some((_, existing)) => *existing = record,
            None => next.push((path.to_string(), record)),
        }
        self.commit(next)?;
        info!("Added build {}", path);
        Ok(())
    }

    /// Remove the build at `path`. Returns whether something was removed;
    /// an absent path is not an error.
    pub fn remove(&mut self, path: &str) -> LauncherResult<bool> {
        let mut next = self.builds.clone();
        let before = next.len();
        next.retain(|(p, _)| p != path);
        let removed = next.len() != before;

        self.commit(next)?;
        if removed {
            info!("Removed build {}", path);
        }
        Ok(removed)
    }

    /// Drop every build and the persisted blob.
    pub fn clear(&mut self) -> LauncherResult<()> {
        self.store.remove_item(BUILDS_KEY)?;
        self.builds.clear();
        self.updates.send_replace(Vec::new());
        info!("Cleared all builds");
        Ok(())
    }

    pub fn list(&self) -> BuildSnapshot {
        self.builds.clone()
    }

    pub fn get(&self, path: &str) -> Option<&BuildRecord> {
        self.builds.iter().find(|(p, _)| p == path).map(|(_, b)| b)
    }

    pub fn len(&self) -> usize {
        self.builds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }

    /// Apply `f` to the build at `path` and persist. `Ok(None)` if absent.
    pub fn update<F>(&mut self, path: &str, f: F) -> LauncherResult<Option<BuildRecord>>
    where
        F: FnOnce(&mut BuildRecord),
    {
        let mut next = self.builds.clone();
        let Some((_, record)) = next.iter_mut().find(|(p, _)| p == path) else {
            return Ok(None);
        };
        f(record);
        let updated = record.clone();

        self.commit(next)?;
        Ok(Some(updated))
    }

    /// Clear `loading`/`open` on every build. Run at startup, when no game
    /// process can still be attached to this launcher.
    pub fn reset_transient_flags(&mut self) -> LauncherResult<()> {
        if !self.builds.iter().any(|(_, b)| b.loading || b.open) {
            return Ok(());
        }

        let next = self
            .builds
            .iter()
            .cloned()
            .map(|(path, mut build)| {
                build.loading = false;
                build.open = false;
                (path, build)
            })
            .collect();
        self.commit(next)?;
        debug!("Reset stale loading/open flags");
        Ok(())
    }

    /// Receive a snapshot after every committed mutation.
    pub fn subscribe(&self) -> watch::Receiver<BuildSnapshot> {
        self.updates.subscribe()
    }

    fn commit(&mut self, next: BuildSnapshot) -> LauncherResult<()> {
        let blob = serialize(&next)?;
        self.store.set_item(BUILDS_KEY, &blob)?;
        self.builds = next;
        self.updates.send_replace(self.builds.clone());
        Ok(())
    }
}

/// Registry as a JSON object keyed by path, in registry order.
pub fn serialize(builds: &[(String, BuildRecord)]) -> serde_json::Result<String> {
    let mut object = Map::with_capacity(builds.len());
    for (path, build) in builds {
        object.insert(path.clone(), serde_json::to_value(build)?);
    }
    serde_json::to_string(&Value::Object(object))
}

pub fn deserialize(raw: &str) -> serde_json::Result<BuildSnapshot> {
    let object: Map<String, Value> = serde_json::from_str(raw)?;
    object
        .into_iter()
        .map(|(path, value)| serde_json::from_value(value).map(|build| (path, build)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;

    fn record(path: &str, version: &str) -> BuildRecord {
        BuildRecord::new(path, version, &format!("{version}-CL-1"), None)
    }

    fn registry() -> (Arc<MemoryStore>, BuildRegistry) {
        let store = Arc::new(MemoryStore::default());
        let registry = BuildRegistry::load(store.clone());
        (store, registry)
    }

    fn persisted(store: &MemoryStore) -> BuildSnapshot {
        deserialize(&store.get_item(BUILDS_KEY).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn add_same_path_overwrites() {
        let (store, mut registry) = registry();
        registry.add("C:\\a", record("C:\\a", "4.50")).unwrap();
        registry.add("C:\\a", record("C:\\a", "11.40")).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("C:\\a").unwrap().version, "11.40");

        let stored = persisted(&store);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].1.version, "11.40");
    }

    #[test]
    fn remove_absent_path_is_noop() {
        let (store, mut registry) = registry();
        registry.add("C:\\a", record("C:\\a", "4.50")).unwrap();

        assert!(!registry.remove("C:\\missing").unwrap());
        assert_eq!(registry.len(), 1);
        assert_eq!(persisted(&store).len(), 1);

        assert!(registry.remove("C:\\a").unwrap());
        assert!(registry.is_empty());
        assert!(persisted(&store).is_empty());
    }

    #[test]
    fn reload_reproduces_mapping() {
        let (store, mut registry) = registry();
        registry.add("C:\\b", record("C:\\b", "9.10")).unwrap();
        registry.add("C:\\a", record("C:\\a", "4.50")).unwrap();
        let before = registry.list();
        drop(registry);

        let reloaded = BuildRegistry::load(store);
        assert_eq!(reloaded.list(), before);
    }

    #[test]
    fn insertion_order_is_kept() {
        let (_, mut registry) = registry();
        for path in ["z", "a", "m"] {
            registry.add(path, record(path, "1.0")).unwrap();
        }
        registry.add("a", record("a", "2.0")).unwrap();

        let order: Vec<_> = registry.list().into_iter().map(|(p, _)| p).collect();
        assert_eq!(order, ["z", "a", "m"]);
    }

    #[test]
    fn corrupt_blob_loads_empty() {
        let store = Arc::new(MemoryStore::with_item(BUILDS_KEY, "{\"x\": 12"));
        let registry = BuildRegistry::load(store);
        assert!(registry.is_empty());
    }

    #[test]
    fn clear_removes_blob() {
        let (store, mut registry) = registry();
        registry.add("a", record("a", "1.0")).unwrap();
        registry.clear().unwrap();

        assert!(registry.is_empty());
        assert_eq!(store.get_item(BUILDS_KEY).unwrap(), None);
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let (store, mut registry) = registry();
        registry.add("a", record("a", "1.0")).unwrap();

        store.fail_writes(true);
        assert!(registry.add("b", record("b", "2.0")).is_err());
        assert!(registry.remove("a").is_err());

        assert_eq!(registry.len(), 1);
        assert!(registry.get("b").is_none());
    }

    #[test]
    fn update_flips_flags_and_persists() {
        let (store, mut registry) = registry();
        registry.add("a", record("a", "1.0")).unwrap();

        let updated = registry.update("a", |b| b.open = true).unwrap().unwrap();
        assert!(updated.open);
        assert!(persisted(&store)[0].1.open);

        assert!(registry.update("missing", |b| b.open = true).unwrap().is_none());
    }

    #[test]
    fn reset_clears_stale_flags() {
        let (store, mut registry) = registry();
        let mut stale = record("a", "1.0");
        stale.loading = true;
        stale.open = true;
        registry.add("a", stale).unwrap();

        let mut registry = BuildRegistry::load(store.clone());
        registry.reset_transient_flags().unwrap();

        let build = registry.get("a").unwrap();
        assert!(!build.loading && !build.open);
        assert!(!persisted(&store)[0].1.open);
    }

    #[tokio::test]
    async fn subscribers_see_each_commit() {
        let (_, mut registry) = registry();
        let mut rx = registry.subscribe();

        registry.add("a", record("a", "1.0")).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        registry.remove("a").unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }
}
