// ─── Version Map ───
// Curated changelist → version table for Live/Cert builds, whose embedded
// release string does not carry a readable version.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::{error, info};

// Hand-curated from the changelists of known Live/Cert builds. Every release
// must end in `-CL-<key>`; extend by editing the JSON file.
const VERSION_MAP_JSON: &str = include_str!("version_map.json");

/// A single entry of the table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionMapEntry {
    #[serde(rename = "v")]
    pub version: String,
    #[serde(rename = "r")]
    pub release: String,
}

/// Read-only table keyed by changelist number.
#[derive(Debug, Default)]
pub struct VersionMap {
    entries: HashMap<u64, VersionMapEntry>,
}

impl VersionMap {
    /// Parse a JSON object keyed by stringified changelist numbers.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let by_key: HashMap<String, VersionMapEntry> = serde_json::from_str(raw)?;
        let entries = by_key
            .into_iter()
            .filter_map(|(cl, entry)| cl.trim().parse::<u64>().ok().map(|cl| (cl, entry)))
            .collect();
        Ok(Self { entries })
    }

    pub fn get(&self, changelist: u64) -> Option<&VersionMapEntry> {
        self.entries.get(&changelist)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The compiled-in table, parsed on first use.
pub fn builtin() -> &'static VersionMap {
    static MAP: OnceLock<VersionMap> = OnceLock::new();
    MAP.get_or_init(|| match VersionMap::from_json(VERSION_MAP_JSON) {
        Ok(map) => {
            info!("Loaded {} changelists into the version map", map.len());
            map
        }
        Err(e) => {
            error!("Built-in version map is invalid: {}", e);
            VersionMap::default()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_map_parses() {
        let map = builtin();
        assert!(!map.is_empty());
        let entry = map.get(3807424).unwrap();
        assert_eq!(entry.version, "2.1");
        assert_eq!(entry.release, "2.1.0-CL-3807424");
    }

    #[test]
    fn builtin_releases_carry_their_changelist() {
        let raw: HashMap<String, VersionMapEntry> = serde_json::from_str(VERSION_MAP_JSON).unwrap();
        assert_eq!(raw.len(), builtin().len());
        for (cl, entry) in raw {
            assert!(
                entry.release.ends_with(&format!("-CL-{cl}")),
                "{cl} maps to {}",
                entry.release
            );
            assert!(entry.release.starts_with(&entry.version), "{cl}");
        }
    }

    #[test]
    fn non_numeric_keys_are_skipped() {
        let map = VersionMap::from_json(
            r#"{ "12": { "v": "1.0", "r": "1.0-CL-12" }, "abc": { "v": "x", "r": "y" } }"#,
        )
        .unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.get(12).is_some());
    }
}
