mod commands;
mod core;

use std::sync::Arc;
use tauri::{Emitter, Manager};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::core::state::{default_data_dir, AppState};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,stellar_lib=debug")),
        )
        .init();

    tracing::info!("Stellar launcher starting...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_notification::init())
        .setup(|app| {
            let state = AppState::new(default_data_dir())?;
            let mut updates = state.registry.subscribe();
            app.manage(Arc::new(Mutex::new(state)));

            // Push every registry change to the library view.
            let handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                while updates.changed().await.is_ok() {
                    let snapshot = updates.borrow_and_update().clone();
                    let builds = commands::build_infos(snapshot);
                    if let Err(e) = handle.emit(commands::BUILDS_CHANGED_EVENT, builds) {
                        tracing::warn!("Could not emit build list: {}", e);
                    }
                }
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::select_build_folder,
            commands::scan_build,
            commands::import_build,
            commands::get_import_status,
            commands::retry_import,
            commands::close_import,
            commands::list_builds,
            commands::remove_build,
            commands::clear_builds,
            commands::open_build_folder,
            commands::search_for_version,
            commands::check_file_exists,
            commands::launch,
            commands::exit_all,
            commands::close_build,
            commands::get_file_size,
            commands::delete_file,
            commands::download_file_command,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
