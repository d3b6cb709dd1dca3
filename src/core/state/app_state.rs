use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::core::build::BuildRegistry;
use crate::core::downloader::Downloader;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::host::{AssetProtocol, NativeFs};
use crate::core::import::ImportSession;
use crate::core::storage::JsonFileStore;

const APP_DIR_NAME: &str = "Stellar";
const STORAGE_FILE: &str = "storage.json";

/// Everything the commands share, owned by the Tauri app.
pub struct AppState {
    pub registry: BuildRegistry,
    pub import: ImportSession,
    pub downloader: Arc<Downloader>,
    pub fs: NativeFs,
    pub assets: AssetProtocol,
    /// Build path → pid of the game process we started for it.
    pub running_builds: HashMap<String, u32>,
}

impl AppState {
    pub fn new(data_dir: PathBuf) -> LauncherResult<Self> {
        std::fs::create_dir_all(&data_dir).map_err(|source| LauncherError::Io {
            path: data_dir.clone(),
            source,
        })?;

        let store = Arc::new(JsonFileStore::open(storage_path(&data_dir)));
        info!("Using storage document {:?}", store.path());
        let mut registry = BuildRegistry::load(store);
        // No game process survives a launcher restart as far as we can track.
        if let Err(e) = registry.reset_transient_flags() {
            warn!("Could not reset build flags: {}", e);
        }

        Ok(Self {
            registry,
            import: ImportSession::default(),
            downloader: Arc::new(Downloader::new()?),
            fs: NativeFs,
            assets: AssetProtocol,
            running_builds: HashMap::new(),
        })
    }
}

pub fn storage_path(data_dir: &Path) -> PathBuf {
    data_dir.join(STORAGE_FILE)
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::build::BuildRecord;

    #[test]
    fn registry_survives_restart_with_flags_reset() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut state = AppState::new(dir.path().to_path_buf()).unwrap();
            let mut build = BuildRecord::new("D:\\11.40", "11.40", "11.40-CL-12345", None);
            build.open = true;
            state.registry.add("D:\\11.40", build).unwrap();
        }

        let state = AppState::new(dir.path().to_path_buf()).unwrap();
        let build = state.registry.get("D:\\11.40").unwrap();
        assert_eq!(build.release, "11.40-CL-12345");
        assert!(!build.open);
        assert!(storage_path(dir.path()).exists());
    }

    #[test]
    fn data_dir_ends_with_app_name() {
        assert!(default_data_dir().ends_with(APP_DIR_NAME));
    }
}
