//! Album page fetching, manifest extraction and persistence.

use scraper::{Html, Selector};

use crate::error::{Error, Result};
use crate::scanner::scan_script;
use crate::types::{AlbumId, Event, ExtractedAlbum, ManifestAccumulator};
use crate::utils::{allocate_album_dir, get_available_space, sanitize_path};

use super::ImgurDownloader;

/// File name of the persisted manifest inside the album directory
pub const MANIFEST_FILE_NAME: &str = "images.json";

/// Element holding the album title on the embed page
const TITLE_SELECTOR: &str = "#title-text";

/// Inline scripts only; scripts loaded from `src` carry no album data
const INLINE_SCRIPT_SELECTOR: &str = "script:not([src])";

/// What the album page yields before any script is interpreted
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct AlbumPage {
    /// Title text, unsanitized
    pub(crate) title: Option<String>,
    /// Text of every inline script, in document order
    pub(crate) scripts: Vec<String>,
}

impl ImgurDownloader {
    /// Fetch an album page and build its manifest
    ///
    /// Checks free space, fetches the embed page, creates the output
    /// directory from the page title, merges the manifest objects found in the
    /// inline scripts, validates the result and writes it to `images.json`.
    /// Nothing is written for a manifest that fails validation.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if no album identifier can be derived
    /// - [`Error::InsufficientSpace`] if free space is below the configured minimum
    /// - [`Error::HttpStatus`] / [`Error::Network`] if the page cannot be fetched
    /// - [`Error::DirectoryCreate`] if the output directory cannot be created
    /// - [`Error::ScriptParse`] if no script yields manifest data and one failed to parse
    /// - [`Error::Validation`] if `count`/`images` are missing or disagree
    pub async fn extract_album(&self, album_url: &str) -> Result<ExtractedAlbum> {
        let album_id = AlbumId::parse(album_url)?;
        tracing::info!(album_id = %album_id, "Album ID: {album_id}");
        self.emit_event(Event::AlbumStarted {
            album_id: album_id.to_string(),
        });

        self.check_disk_space()?;

        let page_url = self.config.http.album_page_url(album_id.as_str());
        let html = self.fetch_album_page(&page_url).await?;
        let page = parse_album_page(&html)?;

        let base_name = match &page.title {
            Some(title) => {
                let sanitized = sanitize_path(title);
                tracing::info!(album_id = %album_id, "Title: {sanitized}");
                sanitized
            }
            None => {
                tracing::info!(album_id = %album_id, "Gallery has no title");
                String::new()
            }
        };
        let directory =
            allocate_album_dir(&self.config.output_dir, &base_name, album_id.as_str())?;
        tracing::debug!(
            album_id = %album_id,
            path = %directory.display(),
            "created album directory"
        );

        let manifest = merge_scripts(page.title, &page.scripts)?.into_manifest()?;

        let manifest_path = directory.join(MANIFEST_FILE_NAME);
        tokio::fs::write(&manifest_path, manifest.to_pretty_json()?).await?;
        self.emit_event(Event::ManifestSaved {
            album_id: album_id.to_string(),
            path: manifest_path.clone(),
            count: manifest.count,
        });

        Ok(ExtractedAlbum {
            album_id,
            manifest,
            directory,
            manifest_path,
        })
    }

    /// Fail fast when the output directory is short on space
    pub(crate) fn check_disk_space(&self) -> Result<()> {
        let disk_space = &self.config.disk_space;
        if !disk_space.enabled {
            return Ok(());
        }

        let check_path = &self.config.output_dir;
        let available = get_available_space(check_path).map_err(|e| {
            Error::DiskSpaceCheckFailed(format!(
                "Failed to check disk space for '{}': {}",
                check_path.display(),
                e
            ))
        })?;

        if available < disk_space.min_free_space {
            return Err(Error::InsufficientSpace {
                required: disk_space.min_free_space,
                available,
            });
        }

        Ok(())
    }

    /// GET the album page with the browser User-Agent
    async fn fetch_album_page(&self, url: &str) -> Result<String> {
        let mut request = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.config.http.user_agent);
        if let Some(timeout) = self.config.http.page_timeout {
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

        Ok(response.text().await?)
    }
}

/// Read the title and the inline scripts out of an album page
///
/// A title element without any text counts as no title.
pub(crate) fn parse_album_page(html: &str) -> Result<AlbumPage> {
    let document = Html::parse_document(html);
    let title_selector = selector(TITLE_SELECTOR)?;
    let script_selector = selector(INLINE_SCRIPT_SELECTOR)?;

    let title = document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .filter(|text| !text.is_empty());

    let scripts = document
        .select(&script_selector)
        .map(|element| element.text().collect::<String>())
        .collect();

    Ok(AlbumPage { title, scripts })
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Selector(format!("{css}: {e:?}")))
}

/// Fold the manifest objects of all scripts into one accumulator
///
/// Scripts are scanned in order and every object found is merged, later keys
/// replacing earlier ones. A script that fails to parse is skipped; the first
/// such error is returned only if no script supplied an `images` field.
pub(crate) fn merge_scripts(
    title: Option<String>,
    scripts: &[String],
) -> Result<ManifestAccumulator> {
    let mut accumulator = ManifestAccumulator::new(title);
    let mut parse_errors = Vec::new();

    for (position, script) in scripts.iter().enumerate() {
        match scan_script(script) {
            Ok(Some(object)) => {
                tracing::debug!(script = position, keys = object.len(), "manifest data found");
                accumulator.merge(object);
            }
            Ok(None) => {}
            Err(e) => parse_errors.push((position, e)),
        }
    }

    if !accumulator.has_images() {
        if let Some((_, error)) = parse_errors.into_iter().next() {
            return Err(error);
        }
        return Ok(accumulator);
    }

    for (position, error) in parse_errors {
        tracing::warn!(script = position, "Non-fatal parser error: {error}");
    }
    Ok(accumulator)
}
