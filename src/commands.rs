use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager};
use tauri_plugin_dialog::{DialogExt, FilePath};
use tauri_plugin_notification::NotificationExt;
use tauri_plugin_opener::OpenerExt;
use tokio::sync::{oneshot, Mutex};
use tracing::{error, info, warn};

use crate::core::build::{chapter_and_season, BuildRecord, BuildSnapshot};
use crate::core::downloader::{self, DownloadProgress};
use crate::core::error::LauncherError;
use crate::core::host::{folder_from_url, BinaryScanner, FileProbe, Notifier};
use crate::core::import::{register_build, BuildImporter, ImportStatus};
use crate::core::launch::{self, mark_closed, BuildLauncher};
use crate::core::state::AppState;

pub type SharedState = Arc<Mutex<AppState>>;

pub const BUILDS_CHANGED_EVENT: &str = "builds-changed";
const IMPORT_STATUS_EVENT: &str = "import-status";
const BUILD_CLOSED_EVENT: &str = "build-closed";
const DOWNLOAD_PROGRESS_EVENT: &str = "download-progress";

/// A build as shown in the library.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    #[serde(flatten)]
    pub build: BuildRecord,
    pub chapter: Option<u32>,
    pub season: Option<u32>,
}

impl From<BuildRecord> for BuildInfo {
    fn from(build: BuildRecord) -> Self {
        let season = build.version_number().map(chapter_and_season);
        Self {
            chapter: season.map(|s| s.chapter),
            season: season.map(|s| s.season),
            build,
        }
    }
}

pub fn build_infos(snapshot: BuildSnapshot) -> Vec<BuildInfo> {
    snapshot
        .into_iter()
        .map(|(_, build)| BuildInfo::from(build))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
struct BuildClosedEvent {
    path: String,
}

/// Desktop notifications through the notification plugin.
pub struct TauriNotifier {
    app: AppHandle,
}

impl TauriNotifier {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl Notifier for TauriNotifier {
    fn notify(&self, title: &str, body: &str, sound: Option<&str>) {
        let mut builder = self.app.notification().builder().title(title).body(body);
        if let Some(sound) = sound {
            builder = builder.sound(sound);
        }
        if let Err(e) = builder.show() {
            warn!("Notification failed: {}", e);
        }
    }
}

fn emit_import_status(app: &AppHandle, status: &ImportStatus) {
    let _ = app.emit(IMPORT_STATUS_EVENT, status);
}

// ── Import ──────────────────────────────────────────────

#[tauri::command]
pub async fn select_build_folder(app: AppHandle) -> Result<Option<String>, LauncherError> {
    let (tx, rx) = oneshot::channel();

    app.dialog().file().pick_folder(move |folder| {
        let _ = tx.send(folder);
    });

    let folder = rx
        .await
        .map_err(|_| LauncherError::Other("folder picker closed unexpectedly".into()))?;

    let folder = match folder {
        Some(FilePath::Path(path)) => path,
        Some(FilePath::Url(url)) => folder_from_url(&url)?,
        None => return Ok(None),
    };
    Ok(Some(folder.display().to_string()))
}

#[tauri::command]
pub async fn scan_build(
    app: AppHandle,
    state: tauri::State<'_, SharedState>,
    path: String,
) -> Result<ImportStatus, LauncherError> {
    let install_root = PathBuf::from(&path);
    let (fs, assets) = {
        let mut state = state.lock().await;
        state.import.begin_scan(&install_root)?;
        emit_import_status(&app, state.import.status());
        (state.fs, state.assets)
    };

    // The lock is released while the executable is scanned.
    let importer = BuildImporter {
        scanner: &fs,
        probe: &fs,
        uris: &assets,
    };
    let outcome = importer.scan(&install_root).await;

    let mut state = state.lock().await;
    let status = state.import.complete_scan(outcome).clone();
    emit_import_status(&app, &status);
    Ok(status)
}

#[tauri::command]
pub async fn import_build(
    app: AppHandle,
    state: tauri::State<'_, SharedState>,
) -> Result<ImportStatus, LauncherError> {
    let (install_root, resolved, fs, assets) = {
        let mut state = state.lock().await;
        let (install_root, resolved) = state.import.begin_import()?;
        emit_import_status(&app, state.import.status());
        (install_root, resolved, state.fs, state.assets)
    };

    let importer = BuildImporter {
        scanner: &fs,
        probe: &fs,
        uris: &assets,
    };
    let record = importer
        .build_record(&install_root, &resolved)
        .await
        .map_err(|e| LauncherError::ImportFailure(e.to_string()));

    let mut state = state.lock().await;
    let outcome = record.and_then(|record| register_build(&mut state.registry, record));
    let status = state.import.complete_import(outcome).clone();
    emit_import_status(&app, &status);
    Ok(status)
}

#[tauri::command]
pub async fn get_import_status(
    state: tauri::State<'_, SharedState>,
) -> Result<ImportStatus, LauncherError> {
    Ok(state.lock().await.import.status().clone())
}

#[tauri::command]
pub async fn retry_import(
    app: AppHandle,
    state: tauri::State<'_, SharedState>,
) -> Result<ImportStatus, LauncherError> {
    let mut state = state.lock().await;
    let status = state.import.retry().clone();
    emit_import_status(&app, &status);
    Ok(status)
}

#[tauri::command]
pub async fn close_import(
    app: AppHandle,
    state: tauri::State<'_, SharedState>,
) -> Result<(), LauncherError> {
    let mut state = state.lock().await;
    state.import.close()?;
    emit_import_status(&app, state.import.status());
    Ok(())
}

// ── Library ─────────────────────────────────────────────

#[tauri::command]
pub async fn list_builds(
    state: tauri::State<'_, SharedState>,
) -> Result<Vec<BuildInfo>, LauncherError> {
    Ok(build_infos(state.lock().await.registry.list()))
}

#[tauri::command]
pub async fn remove_build(
    state: tauri::State<'_, SharedState>,
    path: String,
) -> Result<bool, LauncherError> {
    state.lock().await.registry.remove(&path)
}

#[tauri::command]
pub async fn clear_builds(state: tauri::State<'_, SharedState>) -> Result<(), LauncherError> {
    state.lock().await.registry.clear()
}

#[tauri::command]
pub async fn open_build_folder(app: AppHandle, path: String) -> Result<(), LauncherError> {
    app.opener()
        .open_path(path.clone(), None::<&str>)
        .map_err(|e| LauncherError::Other(format!("Could not open {path}: {e}")))
}

// ── Native probes ───────────────────────────────────────

#[tauri::command]
pub async fn search_for_version(
    state: tauri::State<'_, SharedState>,
    path: String,
) -> Result<Vec<String>, LauncherError> {
    let fs = state.lock().await.fs;
    fs.scan_strings(Path::new(&path)).await
}

#[tauri::command]
pub async fn check_file_exists(
    state: tauri::State<'_, SharedState>,
    path: String,
) -> Result<bool, LauncherError> {
    let fs = state.lock().await.fs;
    fs.file_exists(Path::new(&path)).await
}

// ── Play / close ────────────────────────────────────────

#[tauri::command]
pub async fn launch(
    app: AppHandle,
    state: tauri::State<'_, SharedState>,
    code: String,
    path: String,
) -> Result<bool, LauncherError> {
    let notifier = TauriNotifier::new(app.clone());
    let mut guard = state.lock().await;
    let fs = guard.fs;
    let launcher = BuildLauncher {
        probe: &fs,
        notifier: &notifier,
    };

    let build = launcher.validate(&guard.registry, &path).await?;
    launcher.begin(&mut guard.registry, &build)?;

    match launch::spawn_build(build.root(), &code) {
        Ok(child) => {
            launcher.launched(&mut guard.registry, &path)?;
            guard.running_builds.insert(path.clone(), child.id());
            drop(guard);

            watch_game_process(app.clone(), state.inner().clone(), path, child);
            if let Some(window) = app.get_webview_window("main") {
                let _ = window.minimize();
            }
            Ok(true)
        }
        Err(e) => {
            launcher.failed(&mut guard.registry, &build, &e)?;
            Err(e)
        }
    }
}

/// Clear the build's flags once its process exits.
fn watch_game_process(app: AppHandle, state: SharedState, path: String, child: std::process::Child) {
    tauri::async_runtime::spawn(async move {
        let pid = child.id();
        let waited = tauri::async_runtime::spawn_blocking(move || {
            let mut child = child;
            child.wait()
        })
        .await;

        match waited {
            Ok(Ok(status)) => info!("Game for {} exited with {}", path, status),
            Ok(Err(e)) => warn!("Waiting on game for {} failed: {}", path, e),
            Err(e) => warn!("Game watcher for {} failed: {}", path, e),
        }

        let mut state = state.lock().await;
        if state.running_builds.get(&path) != Some(&pid) {
            return;
        }
        state.running_builds.remove(&path);
        if let Err(e) = mark_closed(&mut state.registry, &path) {
            warn!("Could not mark {} closed: {}", path, e);
        }
        let _ = app.emit(BUILD_CLOSED_EVENT, BuildClosedEvent { path });
    });
}

#[tauri::command]
pub async fn exit_all(state: tauri::State<'_, SharedState>) -> Result<usize, LauncherError> {
    kill_running_games(state.inner()).await
}

/// Kill every game process and clear the flags of builds we started.
async fn kill_running_games(state: &SharedState) -> Result<usize, LauncherError> {
    let killed = tokio::task::spawn_blocking(launch::kill_game_processes)
        .await
        .map_err(|e| LauncherError::Other(e.to_string()))?;

    let mut state = state.lock().await;
    let running: Vec<String> = state.running_builds.drain().map(|(path, _)| path).collect();
    for path in running {
        if let Err(e) = mark_closed(&mut state.registry, &path) {
            warn!("Could not mark {} closed: {}", path, e);
        }
    }
    Ok(killed)
}

#[tauri::command]
pub async fn close_build(
    app: AppHandle,
    state: tauri::State<'_, SharedState>,
    path: String,
) -> Result<bool, LauncherError> {
    kill_running_games(state.inner()).await?;

    let notifier = TauriNotifier::new(app);
    let mut guard = state.lock().await;
    let fs = guard.fs;
    let launcher = BuildLauncher {
        probe: &fs,
        notifier: &notifier,
    };

    launcher.validate(&guard.registry, &path).await?;
    mark_closed(&mut guard.registry, &path)?;
    Ok(true)
}

// ── Downloads ───────────────────────────────────────────

#[tauri::command]
pub async fn get_file_size(
    state: tauri::State<'_, SharedState>,
    url: String,
) -> Result<u64, LauncherError> {
    let downloader = state.lock().await.downloader.clone();
    downloader.file_size(&url).await
}

#[tauri::command]
pub async fn delete_file(path: String) -> Result<bool, LauncherError> {
    downloader::delete_file(Path::new(&path)).await
}

#[tauri::command]
pub async fn download_file_command(
    state: tauri::State<'_, SharedState>,
    window: tauri::Window,
    url: String,
    dest: String,
) -> Result<(), LauncherError> {
    let downloader = state.lock().await.downloader.clone();
    downloader
        .download_file(&url, Path::new(&dest), |progress: DownloadProgress| {
            let _ = window.emit(DOWNLOAD_PROGRESS_EVENT, progress);
        })
        .await
        .map(|_| ())
        .inspect_err(|e| error!("Download of {} failed: {}", url, e))
}
