// ─── Version Resolver ───
// Reads the release tag baked into a build's shipping executable and turns it
// into a human version + release identifier.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::version_map::{self, VersionMap};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::host::{join_segments, BinaryScanner};

/// Shipping executable, relative to an install root.
pub const SHIPPING_EXECUTABLE: [&str; 4] = [
    "FortniteGame",
    "Binaries",
    "Win64",
    "FortniteClient-Win64-Shipping.exe",
];

pub const UNKNOWN_VERSION: &str = "unknown";
pub const UNKNOWN_RELEASE: &str = "unknown net cl";

/// Version metadata extracted from a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedVersion {
    pub version: String,
    pub release: String,
}

impl ResolvedVersion {
    /// Placeholder used when the scan succeeded but nothing matched.
    pub fn unresolved() -> Self {
        Self {
            version: UNKNOWN_VERSION.into(),
            release: UNKNOWN_RELEASE.into(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.version != UNKNOWN_VERSION
    }
}

/// Path of the shipping executable inside `install_root`.
pub fn shipping_executable(install_root: &Path) -> PathBuf {
    join_segments(install_root, &SHIPPING_EXECUTABLE)
}

fn release_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\+\+Fortnite\+Release-(\d+\.\d+|Cert)-CL-(\d+)")
            .expect("release pattern is a valid regex")
    })
}

/// Pad a single-digit fractional part with a trailing zero (`11.4` → `11.40`).
pub fn normalize_version(raw: &str) -> String {
    match raw.split_once('.') {
        Some((_, minor)) if minor.len() == 1 => format!("{raw}0"),
        _ => raw.to_string(),
    }
}

/// Pick version metadata out of scanned strings.
///
/// Strings are visited in order:
/// - a plain release tag wins immediately;
/// - a `Live`/`Cert` tag wins only if its changelist is in `map`, otherwise
///   scanning continues.
///
/// Falls back to [`ResolvedVersion::unresolved`] when nothing qualifies.
pub fn resolve_from_strings<S: AsRef<str>>(strings: &[S], map: &VersionMap) -> ResolvedVersion {
    let pattern = release_pattern();

    for candidate in strings {
        let candidate = candidate.as_ref();
        let Some(caps) = pattern.captures(candidate) else {
            continue;
        };
        let (raw_version, cl) = (&caps[1], &caps[2]);

        if !candidate.contains("Live") && !candidate.contains("Cert") {
            let version = normalize_version(raw_version);
            let release = format!("{version}-CL-{cl}");
            debug!("Matched release tag {:?}", candidate);
            return ResolvedVersion { version, release };
        }

        match cl.parse::<u64>().ok().and_then(|cl| map.get(cl)) {
            Some(entry) => {
                debug!("Mapped obscured changelist {} from {:?}", cl, candidate);
                return ResolvedVersion {
                    version: entry.version.clone(),
                    release: entry.release.clone(),
                };
            }
            None => debug!("Changelist {} not in version map, continuing", cl),
        }
    }

    ResolvedVersion::unresolved()
}

/// Resolves versions of install roots through a [`BinaryScanner`].
pub struct VersionResolver<'a> {
    scanner: &'a dyn BinaryScanner,
    map: &'a VersionMap,
}

impl<'a> VersionResolver<'a> {
    pub fn new(scanner: &'a dyn BinaryScanner) -> Self {
        Self {
            scanner,
            map: version_map::builtin(),
        }
    }

    pub fn with_map(mut self, map: &'a VersionMap) -> Self {
        self.map = map;
        self
    }

    /// Scan the shipping executable under `install_root`.
    ///
    /// Fails with [`LauncherError::ScanFailure`] when the executable cannot be
    /// scanned; an unmatched scan is not an error.
    pub async fn resolve(&self, install_root: &Path) -> LauncherResult<ResolvedVersion> {
        let exe = shipping_executable(install_root);
        info!("Scanning {:?} for version info", exe);

        let strings = self
            .scanner
            .scan_strings(&exe)
            .await
            .map_err(|e| match e {
                err @ LauncherError::ScanFailure { .. } => err,
                other => LauncherError::ScanFailure {
                    path: exe.clone(),
                    reason: other.to_string(),
                },
            })?;

        let resolved = resolve_from_strings(strings.as_slice(), self.map);
        if resolved.is_resolved() {
            info!("Resolved {:?} as {}", install_root, resolved.release);
        } else {
            warn!("No release tag found in {:?}", exe);
        }
        Ok(resolved)
    }
}
