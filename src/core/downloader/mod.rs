pub mod client;

pub use client::{delete_file, DownloadProgress, Downloader};
