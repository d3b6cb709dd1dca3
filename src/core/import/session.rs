// ─── Import Session ───
// State machine behind the "Import Build" dialog:
// idle → scanning → ready → importing → success | error.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::build::BuildRecord;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::ResolvedVersion;

pub const SCAN_FAILED_MESSAGE: &str = "failed to find build version";
pub const IMPORT_FAILED_MESSAGE: &str = "failed to import build!";

/// Current step of an import, with the data that step owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportStatus {
    Idle,
    Scanning {
        path: PathBuf,
    },
    Ready {
        path: PathBuf,
        resolved: ResolvedVersion,
    },
    Importing {
        path: PathBuf,
        resolved: ResolvedVersion,
    },
    Success {
        record: BuildRecord,
    },
    Error {
        path: Option<PathBuf>,
        message: String,
    },
}

impl ImportStatus {
    pub fn name(&self) -> &'static str {
        match self {
            ImportStatus::Idle => "idle",
            ImportStatus::Scanning { .. } => "scanning",
            ImportStatus::Ready { .. } => "ready",
            ImportStatus::Importing { .. } => "importing",
            ImportStatus::Success { .. } => "success",
            ImportStatus::Error { .. } => "error",
        }
    }

    /// A native call is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            ImportStatus::Scanning { .. } | ImportStatus::Importing { .. }
        )
    }
}

/// Owns the status and enforces legal transitions.
#[derive(Debug)]
pub struct ImportSession {
    status: ImportStatus,
}

impl Default for ImportSession {
    fn default() -> Self {
        Self {
            status: ImportStatus::Idle,
        }
    }
}

impl ImportSession {
    pub fn status(&self) -> &ImportStatus {
        &self.status
    }

    /// Enter `scanning` for a freshly selected folder.
    pub fn begin_scan(&mut self, path: &Path) -> LauncherResult<()> {
        if self.status.is_busy() {
            return Err(LauncherError::ImportBusy);
        }
        self.transition(ImportStatus::Scanning {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    /// Record the resolver outcome. A scan failure becomes a user-facing error.
    pub fn complete_scan(&mut self, outcome: LauncherResult<ResolvedVersion>) -> &ImportStatus {
        let ImportStatus::Scanning { path } = &self.status else {
            warn!("Scan finished while {}; ignoring", self.status.name());
            return &self.status;
        };
        let path = path.clone();

        let next = match outcome {
            Ok(resolved) => ImportStatus::Ready { path, resolved },
            Err(e) => {
                warn!("Version scan failed: {}", e);
                ImportStatus::Error {
                    path: Some(path),
                    message: SCAN_FAILED_MESSAGE.into(),
                }
            }
        };
        self.transition(next);
        &self.status
    }

    /// Enter `importing`, handing back what the import step needs.
    pub fn begin_import(&mut self) -> LauncherResult<(PathBuf, ResolvedVersion)> {
        let ImportStatus::Ready { path, resolved } = &self.status else {
            return Err(if self.status.is_busy() {
                LauncherError::ImportBusy
            } else {
                LauncherError::ImportNotReady(self.status.name())
            });
        };
        let (path, resolved) = (path.clone(), resolved.clone());

        self.transition(ImportStatus::Importing {
            path: path.clone(),
            resolved: resolved.clone(),
        });
        Ok((path, resolved))
    }

    /// Record the import outcome.
    pub fn complete_import(&mut self, outcome: LauncherResult<BuildRecord>) -> &ImportStatus {
        let ImportStatus::Importing { path, .. } = &self.status else {
            warn!("Import finished while {}; ignoring", self.status.name());
            return &self.status;
        };
        let path = path.clone();

        let next = match outcome {
            Ok(record) => ImportStatus::Success { record },
            Err(e) => {
                warn!("Build import failed: {}", e);
                ImportStatus::Error {
                    path: Some(path),
                    message: IMPORT_FAILED_MESSAGE.into(),
                }
            }
        };
        self.transition(next);
        &self.status
    }

    /// User-initiated retry after an error.
    pub fn retry(&mut self) -> &ImportStatus {
        if matches!(self.status, ImportStatus::Error { .. }) {
            self.transition(ImportStatus::Idle);
        }
        &self.status
    }

    /// Close the dialog. Refused while a native call is in flight.
    pub fn close(&mut self) -> LauncherResult<()> {
        if self.status.is_busy() {
            return Err(LauncherError::ImportBusy);
        }
        self.transition(ImportStatus::Idle);
        Ok(())
    }

    fn transition(&mut self, next: ImportStatus) {
        debug!("Import {} -> {}", self.status.name(), next.name());
        self.status = next;
    }
}
