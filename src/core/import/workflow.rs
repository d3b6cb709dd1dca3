// ─── Import Workflow ───
// Glue between the version resolver, the host probes and the build registry.

use std::path::Path;

use tracing::info;

use crate::core::build::{splash_image, BuildRecord, BuildRegistry};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::host::{AssetUriResolver, BinaryScanner, FileProbe};
use crate::core::version::{ResolvedVersion, VersionResolver};

/// Host capabilities an import needs.
pub struct BuildImporter<'a> {
    pub scanner: &'a dyn BinaryScanner,
    pub probe: &'a dyn FileProbe,
    pub uris: &'a dyn AssetUriResolver,
}

impl<'a> BuildImporter<'a> {
    /// `scanning` phase: resolve version metadata of `install_root`.
    pub async fn scan(&self, install_root: &Path) -> LauncherResult<ResolvedVersion> {
        VersionResolver::new(self.scanner).resolve(install_root).await
    }

    /// Build the record for `install_root`, checking for a splash image.
    pub async fn build_record(
        &self,
        install_root: &Path,
        resolved: &ResolvedVersion,
    ) -> LauncherResult<BuildRecord> {
        let splash = splash_image(install_root);
        let splash_uri = if self.probe.file_exists(&splash).await? {
            Some(self.uris.resolve_asset_uri(&splash))
        } else {
            None
        };

        Ok(BuildRecord::new(
            install_root.to_string_lossy(),
            &resolved.version,
            &resolved.release,
            splash_uri,
        ))
    }
}

/// Write an imported `record` into `registry` under its own path.
pub fn register_build(registry: &mut BuildRegistry, record: BuildRecord) -> LauncherResult<BuildRecord> {
    let key = record.path.clone();
    registry
        .add(&key, record.clone())
        .map_err(|e| LauncherError::ImportFailure(e.to_string()))?;

    info!("Imported {} ({})", key, record.release);
    Ok(record)
}
