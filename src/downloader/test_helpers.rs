//! Shared test helpers for creating ImgurDownloader instances in tests.

use crate::config::Config;
use crate::downloader::ImgurDownloader;
use crate::types::Event;
use tempfile::{TempDir, tempdir};
use wiremock::MockServer;

/// Config writing into `output_dir` and fetching everything from `server`
pub(crate) fn test_config(output_dir: &std::path::Path, server: &MockServer) -> Config {
    let mut config = Config::default();
    config.output_dir = output_dir.to_path_buf();
    config.disk_space.min_free_space = 0;
    config.http.album_base_url = server.uri();
    config.http.image_base_url = format!("{}/i", server.uri());
    config
}

/// Helper to create a test ImgurDownloader backed by a mock server.
/// Returns the downloader, the server and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader() -> (ImgurDownloader, MockServer, TempDir) {
    let temp_dir = tempdir().unwrap();
    let server = MockServer::start().await;
    let downloader = ImgurDownloader::new(test_config(temp_dir.path(), &server)).unwrap();
    (downloader, server, temp_dir)
}

/// Embed page with an optional `#title-text` element and the given inline scripts
pub(crate) fn album_page(title: Option<&str>, scripts: &[&str]) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head><title>Imgur</title>");
    html.push_str(r#"<script src="https://s.imgur.com/min/embed.js"></script>"#);
    html.push_str("</head><body>");
    if let Some(title) = title {
        html.push_str(&format!(r#"<h1 id="title-text">{title}</h1>"#));
    }
    for script in scripts {
        html.push_str(&format!("<script>{script}</script>"));
    }
    html.push_str("</body></html>");
    html
}

/// `var images = {...}` declaration listing `(hash, ext, size)` entries
pub(crate) fn manifest_script(entries: &[(&str, &str, u64)]) -> String {
    let images: Vec<serde_json::Value> = entries
        .iter()
        .map(|(hash, ext, size)| serde_json::json!({"hash": hash, "ext": ext, "size": size}))
        .collect();
    let manifest = serde_json::json!({"count": entries.len(), "images": images});
    format!("var images = {manifest};")
}

/// Everything currently buffered on a receiver
pub(crate) fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
