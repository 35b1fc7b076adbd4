//! Album downloader split into focused submodules.
//!
//! The `ImgurDownloader` struct and its methods are organized by stage:
//! - [`manifest`] - Disk space check, album page fetch, manifest extraction and persistence
//! - [`images`] - Sequential image downloads with per-chunk progress
//!
//! Album orchestration (`process_album`, `run`) lives here.

mod images;
mod manifest;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use manifest::MANIFEST_FILE_NAME;

use crate::config::Config;
use crate::error::Result;
use crate::types::{AlbumReport, Event, RunSummary};
use std::sync::Arc;

/// Buffer size of the event channel
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Album downloader
///
/// Processes albums one at a time and images one at a time. Progress is
/// published as [`Event`]s on a broadcast channel; see [`subscribe`](Self::subscribe).
pub struct ImgurDownloader {
    /// Configuration (wrapped in Arc so consumers can hold it cheaply)
    pub(crate) config: Arc<Config>,
    /// HTTP client shared by page and image requests
    pub(crate) http: reqwest::Client,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl ImgurDownloader {
    /// Create a new downloader
    ///
    /// Idle connections are not pooled, so every request opens a fresh
    /// connection and nothing from a finished or failed download carries over
    /// into the next one.
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()?;

        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            config: Arc::new(config),
            http,
            event_tx,
        })
    }

    /// Subscribe to progress events
    ///
    /// Events sent before subscribing are not replayed. A subscriber that falls
    /// more than the channel capacity behind receives `RecvError::Lagged`.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Send an event to all subscribers; dropped when nobody listens
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Extract, persist and download one album
    ///
    /// Returns an error only for failures that abort the album. Failed images
    /// are listed in the returned report.
    pub async fn process_album(&self, album_url: &str) -> Result<AlbumReport> {
        let album = self.extract_album(album_url).await?;
        let outcome = self
            .download_images(&album.manifest, &album.directory)
            .await;

        tracing::info!(
            album_id = %album.album_id,
            downloaded = outcome.downloaded,
            failed = outcome.failed.len(),
            "album finished"
        );
        self.emit_event(Event::AlbumComplete {
            album_id: album.album_id.to_string(),
            downloaded: outcome.downloaded,
            failed: outcome.failed.len(),
        });

        Ok(AlbumReport {
            album_id: album.album_id,
            directory: album.directory,
            manifest_path: album.manifest_path,
            downloaded: outcome.downloaded,
            failed: outcome.failed,
        })
    }

    /// Process every album in order
    ///
    /// An album that fails is logged with its full error chain plus a one-line
    /// `failed to download: {url}` summary, and the run moves on to the next one.
    pub async fn run<I, S>(&self, album_urls: I) -> RunSummary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut summary = RunSummary::default();

        for url in album_urls {
            let url = url.as_ref();
            match self.process_album(url).await {
                Ok(report) => summary.succeeded.push(report),
                Err(e) => {
                    tracing::error!(url, code = e.error_code(), "{}", e.report());
                    tracing::error!("failed to download: {url}");
                    self.emit_event(Event::AlbumFailed {
                        url: url.to_string(),
                        code: e.error_code().to_string(),
                        error: e.to_string(),
                    });
                    summary.failed.push((url.to_string(), e.to_string()));
                }
            }
        }

        summary
    }
}
