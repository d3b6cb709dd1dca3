use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::host::join_segments;

/// Splash image, relative to an install root.
pub const SPLASH_IMAGE: [&str; 4] = ["FortniteGame", "Content", "Splash", "Splash.bmp"];

pub const NO_SPLASH: &str = "no splash";
pub const UNRESOLVED_VERSION: &str = "?";
pub const UNRESOLVED_RELEASE: &str = "unk version";

/// One imported game installation, persisted in the build registry.
///
/// The install root path is the registry key and is repeated here so a
/// record is self-describing when sent to the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub path: String,
    pub version: String,
    pub release: String,
    /// Renderable splash URI, or [`NO_SPLASH`].
    pub splash: String,
    pub loading: bool,
    pub open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<DateTime<Utc>>,
}

impl BuildRecord {
    /// A freshly imported, idle build. Blank metadata falls back to the
    /// unresolved sentinels.
    pub fn new(path: impl Into<String>, version: &str, release: &str, splash: Option<String>) -> Self {
        Self {
            path: path.into(),
            version: non_blank_or(version, UNRESOLVED_VERSION),
            release: non_blank_or(release, UNRESOLVED_RELEASE),
            splash: splash.unwrap_or_else(|| NO_SPLASH.into()),
            loading: false,
            open: false,
            imported_at: Some(Utc::now()),
        }
    }

    pub fn has_splash(&self) -> bool {
        !self.splash.is_empty() && self.splash != NO_SPLASH
    }

    pub fn root(&self) -> &Path {
        Path::new(&self.path)
    }

    /// Numeric form of the version (`"11.40"` → `11.4`), if it has one.
    pub fn version_number(&self) -> Option<f64> {
        self.version.parse::<f64>().ok()
    }
}

/// Path of the splash image inside `install_root`.
pub fn splash_image(install_root: &Path) -> PathBuf {
    join_segments(install_root, &SPLASH_IMAGE)
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_metadata_uses_sentinels() {
        let record = BuildRecord::new("C:\\Builds\\x", "", "  ", None);
        assert_eq!(record.version, UNRESOLVED_VERSION);
        assert_eq!(record.release, UNRESOLVED_RELEASE);
        assert_eq!(record.splash, NO_SPLASH);
        assert!(!record.has_splash());
        assert!(!record.loading && !record.open);
    }

    #[test]
    fn deserializes_records_without_timestamp() {
        let json = r#"{
            "splash": "no splash",
            "release": "11.40-CL-12345",
            "version": "11.40",
            "path": "D:\\Fortnite\\11.40",
            "loading": false,
            "open": false
        }"#;
        let record: BuildRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.imported_at, None);
        assert_eq!(record.version_number(), Some(11.4));
        assert_eq!(record.root(), Path::new("D:\\Fortnite\\11.40"));
    }

    #[test]
    fn splash_lives_under_content() {
        let path = splash_image(Path::new("root"));
        assert!(path.ends_with(Path::new("FortniteGame/Content/Splash/Splash.bmp")));
    }
}
