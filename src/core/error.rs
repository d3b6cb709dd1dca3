use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the launcher backend.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Build import ────────────────────────────────────
    #[error("Failed to scan {path:?}: {reason}")]
    ScanFailure { path: PathBuf, reason: String },

    #[error("Failed to import build: {0}")]
    ImportFailure(String),

    #[error("An import step is still running")]
    ImportBusy,

    #[error("Import is not ready (current state: {0})")]
    ImportNotReady(&'static str),

    // ── Builds ──────────────────────────────────────────
    #[error("Build with path {0} not found")]
    BuildNotFound(String),

    #[error("Build at {0} does not exist or is corrupted")]
    BuildCorrupted(String),

    #[error("Failed to launch build: {0}")]
    Launch(String),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

// ── Serialization for Tauri IPC ─────────────────────────
// Tauri commands require the error type to implement `Serialize`.
impl serde::Serialize for LauncherError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_display_string() {
        let err = LauncherError::BuildNotFound("C:\\Builds\\11.40".into());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Build with path C:\\\\Builds\\\\11.40 not found\"");
    }
}
