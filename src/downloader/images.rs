//! Sequential image downloads with per-chunk progress.

use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, ImageError, Result};
use crate::types::{DownloadOutcome, Event, Manifest};

use super::ImgurDownloader;

impl ImgurDownloader {
    /// Download every image of a manifest into `directory`, in manifest order
    ///
    /// Image `i` (1-based, zero-padded to the width of `count`) is fetched from
    /// `{image_base_url}/{hash}{ext}` and written to `"{i} - {hash}{ext}"`.
    /// A failed image is reported through [`Event::ImageFailed`] and a warning,
    /// and the remaining images are still attempted. Files left behind by a
    /// failed attempt are not removed.
    pub async fn download_images(&self, manifest: &Manifest, directory: &Path) -> DownloadOutcome {
        let total = manifest.images.len();
        let width = manifest.index_width();
        let mut outcome = DownloadOutcome::default();

        for (position, image) in manifest.images.iter().enumerate() {
            let index = position + 1;
            let url = self.config.http.image_url(&image.hash, &image.ext);
            let path = directory.join(image.file_name(index, width));

            self.emit_event(Event::ImageStarted {
                index,
                total,
                url: url.clone(),
                expected_bytes: image.size,
            });

            match self.fetch_image(index, &url, &path, image.size).await {
                Ok(bytes) => {
                    tracing::debug!(index, url = %url, bytes, "image saved");
                    outcome.downloaded += 1;
                    self.emit_event(Event::ImageComplete { index, path, bytes });
                }
                Err(e) => {
                    tracing::warn!(index, url = %url, error = %e, "image download failed");
                    self.emit_event(Event::ImageFailed {
                        index,
                        url: url.clone(),
                        error: e.to_string(),
                    });
                    outcome.failed.push(ImageError {
                        index,
                        url,
                        reason: e.to_string(),
                    });
                }
            }

            self.emit_event(Event::AlbumProgress {
                completed: index,
                total,
            });
        }

        outcome
    }

    /// Stream one image to disk, emitting cumulative progress per chunk
    ///
    /// The response stream and the file handle live only for this call and are
    /// released on every exit path before the next image starts.
    async fn fetch_image(
        &self,
        index: usize,
        url: &str,
        path: &Path,
        expected_bytes: u64,
    ) -> Result<u64> {
        let mut request = self.http.get(url);
        if let Some(timeout) = self.config.http.image_timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut file = tokio::fs::File::create(path).await?;
        let mut stream = response.bytes_stream();
        let mut received: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            received += chunk.len() as u64;
            self.emit_event(Event::ImageProgress {
                index,
                received_bytes: received,
                expected_bytes,
            });
        }

        file.flush().await?;
        Ok(received)
    }
}
