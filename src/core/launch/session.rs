// ─── Play / Close ───
// Validates a registered build before launch and keeps its `loading`/`open`
// flags in step with the game process.

use std::path::Path;

use tracing::{info, warn};

use crate::core::build::{BuildRecord, BuildRegistry};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::host::{FileProbe, Notifier};
use crate::core::version::shipping_executable;

pub const NOTIFY_TITLE: &str = "Stellar";
pub const NOTIFY_SOUND: &str = "ms-winsoundevent:Notification.Default";

pub struct BuildLauncher<'a> {
    pub probe: &'a dyn FileProbe,
    pub notifier: &'a dyn Notifier,
}

impl<'a> BuildLauncher<'a> {
    /// Check that the executable of `path` is on disk and that the build is
    /// registered. Each failure is reported to the user.
    pub async fn validate(&self, registry: &BuildRegistry, path: &str) -> LauncherResult<BuildRecord> {
        let exe = shipping_executable(Path::new(path));
        let exists = match self.probe.file_exists(&exe).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!("Cannot probe {:?}: {}", exe, e);
                false
            }
        };

        if !exists {
            self.notify("Build does not exist / is corrupted!");
            return Err(LauncherError::BuildCorrupted(path.to_string()));
        }

        match registry.get(path) {
            Some(build) => Ok(build.clone()),
            None => {
                self.notify(&format!("Build with path {path} not found!"));
                Err(LauncherError::BuildNotFound(path.to_string()))
            }
        }
    }

    /// Mark `build` as loading and tell the user the game is starting.
    pub fn begin(&self, registry: &mut BuildRegistry, build: &BuildRecord) -> LauncherResult<()> {
        info!("Launching {}...", build.version);
        self.notifier.notify(
            &format!("Starting {}", build.version),
            "This may take a while so please wait while the game loads!",
            Some(NOTIFY_SOUND),
        );
        set_flags(registry, &build.path, true, false)
    }

    /// The game process is up.
    pub fn launched(&self, registry: &mut BuildRegistry, path: &str) -> LauncherResult<()> {
        set_flags(registry, path, false, true)
    }

    /// The launch did not go through.
    pub fn failed(
        &self,
        registry: &mut BuildRegistry,
        build: &BuildRecord,
        error: &LauncherError,
    ) -> LauncherResult<()> {
        warn!("Error launching {}: {}", build.version, error);
        self.notify(&format!("Failed to launch {}!", build.version));
        set_flags(registry, &build.path, false, false)
    }

    fn notify(&self, body: &str) {
        self.notifier.notify(NOTIFY_TITLE, body, Some(NOTIFY_SOUND));
    }
}

/// The game process for `path` has gone away.
pub fn mark_closed(registry: &mut BuildRegistry, path: &str) -> LauncherResult<()> {
    set_flags(registry, path, false, false)
}

fn set_flags(registry: &mut BuildRegistry, path: &str, loading: bool, open: bool) -> LauncherResult<()> {
    registry
        .update(path, |build| {
            build.loading = loading;
            build.open = open;
        })?
        .map(|_| ())
        .ok_or_else(|| LauncherError::BuildNotFound(path.to_string()))
}
