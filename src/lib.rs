//! # imgur-dl
//!
//! Downloads Imgur albums into local directories.
//!
//! For each album the embeddable album page is fetched, the image manifest is
//! read out of the page's inline scripts, a directory named after the album
//! title is created, the manifest is saved there as `images.json`, and every
//! image is downloaded in order. Albums and images are processed one at a
//! time. A failing image does not stop the album; a failing album does not
//! stop the run.
//!
//! ## Quick Start
//!
//! ```no_run
//! use imgur_dl::{Config, ImgurDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = ImgurDownloader::new(Config::default())?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = downloader.run(["https://imgur.com/a/xyz123"]).await;
//!     println!("{} albums failed", summary.failed.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Album downloader (manifest extraction, image pipeline, orchestration)
pub mod downloader;
/// Error types
pub mod error;
/// Inline script scanning for the album manifest
pub mod scanner;
/// Core types and events
pub mod types;
/// Path naming, directory allocation and disk space helpers
pub mod utils;

// Re-export commonly used types
pub use config::{Config, DiskSpaceConfig, HttpConfig};
pub use downloader::{ImgurDownloader, MANIFEST_FILE_NAME};
pub use error::{Error, ImageError, Result};
pub use scanner::{extract_images, scan_script};
pub use types::{
    AlbumId, AlbumReport, DownloadOutcome, Event, ExtractedAlbum, ImageEntry, Manifest,
    ManifestAccumulator, RunSummary,
};
pub use utils::{allocate_album_dir, sanitize_path};
