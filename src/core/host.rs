// ─── Host Capabilities ───
// Native services the build workflows depend on. Each one is a trait so the
// workflows can run against the real filesystem or against test doubles.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::scanner;

/// Returns every printable string embedded in a binary.
#[async_trait]
pub trait BinaryScanner: Send + Sync {
    async fn scan_strings(&self, path: &Path) -> LauncherResult<Vec<String>>;
}

/// `Ok(false)` for a missing file, `Err` only on unexpected I/O faults.
#[async_trait]
pub trait FileProbe: Send + Sync {
    async fn file_exists(&self, path: &Path) -> LauncherResult<bool>;
}

/// Maps a local path to a URI the webview can render.
pub trait AssetUriResolver: Send + Sync {
    fn resolve_asset_uri(&self, path: &Path) -> String;
}

/// Fire-and-forget desktop notification.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str, sound: Option<&str>);
}

/// Filesystem-backed scanner and probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFs;

#[async_trait]
impl BinaryScanner for NativeFs {
    async fn scan_strings(&self, path: &Path) -> LauncherResult<Vec<String>> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| LauncherError::ScanFailure {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let strings = tokio::task::spawn_blocking(move || scanner::extract_strings(&bytes))
            .await
            .map_err(|e| LauncherError::ScanFailure {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        debug!("Extracted {} strings from {:?}", strings.len(), path);
        Ok(strings)
    }
}

#[async_trait]
impl FileProbe for NativeFs {
    async fn file_exists(&self, path: &Path) -> LauncherResult<bool> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(LauncherError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Tauri `asset:` protocol URIs, as produced by `convertFileSrc` in the webview.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetProtocol;

impl AssetUriResolver for AssetProtocol {
    fn resolve_asset_uri(&self, path: &Path) -> String {
        let encoded = encode_uri_component(&path.to_string_lossy());
        if cfg!(any(target_os = "windows", target_os = "android")) {
            format!("http://asset.localhost/{encoded}")
        } else {
            format!("asset://localhost/{encoded}")
        }
    }
}

/// Percent-encode everything except the `encodeURIComponent` unreserved set.
fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Local folder behind a picker result that came back as a URL.
pub fn folder_from_url(url: &Url) -> LauncherResult<PathBuf> {
    if url.scheme() != "file" {
        return Err(LauncherError::Other(format!(
            "Selected folder is not on the local filesystem: {url}"
        )));
    }
    url.to_file_path()
        .map_err(|_| LauncherError::Other(format!("Invalid folder location: {url}")))
}

/// Join path segments onto an install root.
pub fn join_segments(root: &Path, segments: &[&str]) -> PathBuf {
    segments.iter().fold(root.to_path_buf(), |acc, s| acc.join(s))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(
            encode_uri_component("C:\\Builds\\11.40 (test)\\Splash.bmp"),
            "C%3A%5CBuilds%5C11.40%20(test)%5CSplash.bmp"
        );
        assert_eq!(encode_uri_component("/home/a/ü"), "%2Fhome%2Fa%2F%C3%BC");
    }

    #[test]
    fn asset_uri_uses_platform_scheme() {
        let uri = AssetProtocol.resolve_asset_uri(Path::new("/games/Splash.bmp"));
        if cfg!(target_os = "windows") {
            assert_eq!(uri, "http://asset.localhost/%2Fgames%2FSplash.bmp");
        } else {
            assert_eq!(uri, "asset://localhost/%2Fgames%2FSplash.bmp");
        }
    }

    #[tokio::test]
    async fn native_probe_reports_missing_files_as_false() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.bin");
        std::fs::write(&present, b"x").unwrap();

        assert!(NativeFs.file_exists(&present).await.unwrap());
        assert!(!NativeFs.file_exists(&dir.path().join("missing.bin")).await.unwrap());
        assert!(!NativeFs.file_exists(dir.path()).await.unwrap());
    }

    #[tokio::test]
    async fn native_scan_of_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = NativeFs
            .scan_strings(&dir.path().join("missing.exe"))
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::ScanFailure { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn file_url_becomes_local_folder() {
        let url = Url::parse("file:///games/11.40%20build").unwrap();
        assert_eq!(folder_from_url(&url).unwrap(), PathBuf::from("/games/11.40 build"));
    }

    #[test]
    fn non_file_url_is_rejected() {
        let url = Url::parse("content://com.android.externalstorage/tree/primary").unwrap();
        assert!(matches!(folder_from_url(&url), Err(LauncherError::Other(_))));
    }

    #[test]
    fn joins_segments_in_order() {
        let joined = join_segments(Path::new("root"), &["a", "b", "c.exe"]);
        assert_eq!(joined, Path::new("root").join("a").join("b").join("c.exe"));
    }
}
