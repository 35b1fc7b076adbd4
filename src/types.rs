//! Core types for imgur-dl

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::error::{Error, ImageError, Result};

/// Album identifier, the last non-empty path segment of the album URL
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlbumId(String);

impl AlbumId {
    /// Derive the identifier from an album URL or a bare identifier
    ///
    /// `https://imgur.com/a/xyz123/`, `imgur.com/a/xyz123` and `xyz123` all yield
    /// `xyz123`. Query strings and fragments are ignored.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let path = match url::Url::parse(input) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => input
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        };

        path.trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .map(|segment| Self(segment.to_string()))
            .ok_or_else(|| Error::InvalidUrl(input.to_string()))
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AlbumId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One image of an album
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Imgur image hash
    pub hash: String,
    /// File extension including the leading dot (e.g. ".jpg")
    pub ext: String,
    /// Declared size in bytes
    pub size: u64,
    /// Remaining fields from the page, written back to `images.json` untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageEntry {
    /// Local file name: `"{index} - {hash}{ext}"` with `index` zero-padded to `width`
    pub fn file_name(&self, index: usize, width: usize) -> String {
        format!("{index:0width$} - {}{}", self.hash, self.ext)
    }
}

/// Validated album manifest, persisted as `images.json`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Unsanitized page title, if the page has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Number of images; always equals `images.len()`
    pub count: u64,
    /// Images in album order
    pub images: Vec<ImageEntry>,
    /// Other top-level fields found in the page scripts
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Digits needed for the largest 1-based index
    pub fn index_width(&self) -> usize {
        self.count.to_string().len()
    }

    /// Pretty-printed JSON with 4-space indentation
    pub fn to_pretty_json(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(out)
    }
}

/// Manifest data gathered from a page's inline scripts
///
/// Each script contributes an object; same-named top-level keys of later objects
/// replace earlier ones. `title` is owned by the page title and never taken from
/// script content.
#[derive(Clone, Debug, Default)]
pub struct ManifestAccumulator {
    title: Option<String>,
    fields: Map<String, Value>,
}

impl ManifestAccumulator {
    /// Start an accumulator with the page title (unsanitized)
    pub fn new(title: Option<String>) -> Self {
        Self {
            title,
            fields: Map::new(),
        }
    }

    /// Merge one script's object, key by key
    pub fn merge(&mut self, object: Map<String, Value>) {
        for (key, value) in object {
            if key == "title" {
                continue;
            }
            self.fields.insert(key, value);
        }
    }

    /// Whether any script has supplied an `images` field yet
    pub fn has_images(&self) -> bool {
        self.fields.contains_key("images")
    }

    /// Current value of a top-level field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Validate the gathered data and build the manifest
    ///
    /// Requires `count` and `images`, with `count == images.len()`.
    pub fn into_manifest(mut self) -> Result<Manifest> {
        let count = self
            .fields
            .remove("count")
            .ok_or_else(|| Error::Validation("missing `count` field".to_string()))?;
        let images = self
            .fields
            .remove("images")
            .ok_or_else(|| Error::Validation("missing `images` field".to_string()))?;

        let count = count.as_u64().ok_or_else(|| {
            Error::Validation(format!("`count` is not a non-negative integer: {count}"))
        })?;
        let Value::Array(images) = images else {
            return Err(Error::Validation("`images` is not an array".to_string()));
        };
        if count != images.len() as u64 {
            return Err(Error::Validation(format!(
                "`count` is {count} but {} images are listed",
                images.len()
            )));
        }

        let images = images
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                serde_json::from_value::<ImageEntry>(value)
                    .map_err(|e| Error::Validation(format!("image {} is invalid: {e}", i + 1)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Manifest {
            title: self.title,
            count,
            images,
            extra: self.fields,
        })
    }
}

/// Album ready for download: manifest validated and persisted, directory created
#[derive(Clone, Debug)]
pub struct ExtractedAlbum {
    /// Album identifier
    pub album_id: AlbumId,
    /// Validated manifest
    pub manifest: Manifest,
    /// Output directory created for this album
    pub directory: PathBuf,
    /// Path of the persisted `images.json`
    pub manifest_path: PathBuf,
}

/// Result of downloading an album's images
#[derive(Clone, Debug, Default)]
pub struct DownloadOutcome {
    /// Images downloaded successfully
    pub downloaded: usize,
    /// Images that failed, in album order
    pub failed: Vec<ImageError>,
}

/// Event emitted while processing albums
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Album processing started
    AlbumStarted {
        /// Album identifier
        album_id: String,
    },

    /// Manifest validated and written to disk
    ManifestSaved {
        /// Album identifier
        album_id: String,
        /// Path of `images.json`
        path: PathBuf,
        /// Number of images in the manifest
        count: u64,
    },

    /// Image download started
    ImageStarted {
        /// 1-based position in the album
        index: usize,
        /// Number of images in the album
        total: usize,
        /// Source URL
        url: String,
        /// Size declared by the manifest
        expected_bytes: u64,
    },

    /// Chunk received for the current image
    ImageProgress {
        /// 1-based position in the album
        index: usize,
        /// Bytes received so far for this image
        received_bytes: u64,
        /// Size declared by the manifest (may differ from what the server sends)
        expected_bytes: u64,
    },

    /// Image written to disk
    ImageComplete {
        /// 1-based position in the album
        index: usize,
        /// Destination file
        path: PathBuf,
        /// Bytes written
        bytes: u64,
    },

    /// Image download failed; the album continues
    ImageFailed {
        /// 1-based position in the album
        index: usize,
        /// Source URL
        url: String,
        /// Error message
        error: String,
    },

    /// Images attempted so far in the current album
    AlbumProgress {
        /// Images attempted (success or failure)
        completed: usize,
        /// Number of images in the album
        total: usize,
    },

    /// Album finished (individual images may have failed)
    AlbumComplete {
        /// Album identifier
        album_id: String,
        /// Images downloaded successfully
        downloaded: usize,
        /// Images that failed
        failed: usize,
    },

    /// Album aborted by a fatal error
    AlbumFailed {
        /// Album URL as given
        url: String,
        /// Machine-readable error code
        code: String,
        /// Error message
        error: String,
    },
}

/// Outcome of one album
#[derive(Clone, Debug)]
pub struct AlbumReport {
    /// Album identifier
    pub album_id: AlbumId,
    /// Directory the album was written to
    pub directory: PathBuf,
    /// Path of the persisted manifest
    pub manifest_path: PathBuf,
    /// Images downloaded successfully
    pub downloaded: usize,
    /// Images that failed, in album order
    pub failed: Vec<ImageError>,
}

/// Outcome of a run over several albums
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    /// Albums that completed (possibly with failed images)
    pub succeeded: Vec<AlbumReport>,
    /// Album URLs that failed entirely, with the error message
    pub failed: Vec<(String, String)>,
}

impl RunSummary {
    /// True when no album failed entirely
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}
