use std::path::Path;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;

/// Payload emitted to the frontend on download progress.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DownloadProgress {
    pub downloaded: u64,
    pub total: u64,
    pub percentage: f64,
    pub file_name: String,
}

/// Streaming downloader for build archives and other large files.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new() -> LauncherResult<Self> {
        Ok(Self {
            client: build_http_client()?,
        })
    }

    /// Size reported by the server, `0` when it sends no `Content-Length`.
    pub async fn file_size(&self, url: &str) -> LauncherResult<u64> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.content_length().unwrap_or(0))
    }

    /// Stream `url` into `dest`, calling `on_progress` after every chunk.
    ///
    /// Creates parent directories as needed. Fails if the server announced a
    /// length and the body came up short.
    pub async fn download_file<F>(&self, url: &str, dest: &Path, on_progress: F) -> LauncherResult<u64>
    where
        F: Fn(DownloadProgress),
    {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let total = response.content_length().unwrap_or(0);
        let file_name = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".into());

        let mut downloaded = 0_u64;
        // Scoped so the handle is closed before returning.
        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| LauncherError::Io {
                    path: dest.to_path_buf(),
                    source: e,
                })?;

            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                file.write_all(&chunk).await.map_err(|e| LauncherError::Io {
                    path: dest.to_path_buf(),
                    source: e,
                })?;
                downloaded += chunk.len() as u64;

                on_progress(DownloadProgress {
                    downloaded,
                    total,
                    percentage: progress_percentage(downloaded, total),
                    file_name: file_name.clone(),
                });
            }

            file.flush().await.map_err(|e| LauncherError::Io {
                path: dest.to_path_buf(),
                source: e,
            })?;
        }

        if total > 0 && downloaded != total {
            return Err(LauncherError::Other(format!(
                "couldn't complete download: expected {} bytes, got {} bytes",
                total, downloaded
            )));
        }

        info!("Downloaded {} -> {:?} ({} bytes)", url, dest, downloaded);
        Ok(downloaded)
    }
}

pub fn progress_percentage(downloaded: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (downloaded as f64 / total as f64) * 100.0
    }
}

/// Delete a file. `Ok(false)` if there was nothing to delete.
pub async fn delete_file(path: &Path) -> LauncherResult<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!("Deleted {:?}", path);
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(LauncherError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_handles_unknown_total() {
        assert_eq!(progress_percentage(10, 0), 0.0);
        assert_eq!(progress_percentage(50, 200), 25.0);
        assert_eq!(progress_percentage(200, 200), 100.0);
    }

    #[tokio::test]
    async fn delete_reports_whether_file_existed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("build.zip");
        std::fs::write(&file, b"data").unwrap();

        assert!(delete_file(&file).await.unwrap());
        assert!(!file.exists());
        assert!(!delete_file(&file).await.unwrap());
    }

    #[test]
    fn client_builds() {
        assert!(Downloader::new().is_ok());
    }
}
