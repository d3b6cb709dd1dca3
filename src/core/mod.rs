// ─── Stellar Core ───
// Backend for the launcher's build library.
//
// Architecture:
//   core/
//     build/      BuildRecord model, persisted registry, season metadata
//     version/    Binary string scanner, release-tag resolver, version map
//     import/     Import state machine + scan/import workflow
//     launch/     Play/close flag handling + game process control
//     downloader/ Streaming downloads with progress
//     host        Host capability traits and native implementations
//     storage     Durable key-value store
//     state/      Application state shared by the commands

pub mod build;
pub mod downloader;
pub mod error;
pub mod host;
pub mod http;
pub mod import;
pub mod launch;
pub mod state;
pub mod storage;
pub mod version;
