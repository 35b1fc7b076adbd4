//! Album fixtures served from a mock Imgur

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One image of a fixture album: hash, extension and body
pub struct FixtureImage {
    pub hash: &'static str,
    pub ext: &'static str,
    pub body: &'static [u8],
}

/// Render an embed page the way Imgur serves it: the title in `#title-text`,
/// a tracking script, an external loader and the manifest declaration.
pub fn embed_page(title: Option<&str>, manifest_json: &str) -> String {
    let title_html = title
        .map(|t| format!(r#"<div class="post-title"><h1 id="title-text">{t}</h1></div>"#))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Imgur: The magic of the Internet</title>
  <script type="text/javascript" src="//s.imgur.com/min/embed.js"></script>
  <script type="text/javascript">
    var _gaq = _gaq || [];
    _gaq.push(['_setAccount', 'UA-0000000-1']);
  </script>
</head>
<body>
  {title_html}
  <div id="image-container"></div>
  <script type="text/javascript">
    (function(widgetFactory) {{
        var album = {{ "id": "embed" }};
        var images = {manifest_json};
        widgetFactory.mergeConfig('gallery', {{ images: images }});
    }})(_widgetFactory);
  </script>
</body>
</html>"#
    )
}

/// Manifest JSON literal for the given images, with Imgur-style extra fields
pub fn manifest_json(images: &[FixtureImage]) -> String {
    let entries: Vec<serde_json::Value> = images
        .iter()
        .map(|image| {
            serde_json::json!({
                "hash": image.hash,
                "ext": image.ext,
                "size": image.body.len(),
                "width": 640,
                "height": 480,
            })
        })
        .collect();
    serde_json::json!({"count": images.len(), "images": entries}).to_string()
}

/// Serve one album page and its images on `server`
pub async fn mount_album(
    server: &MockServer,
    album_id: &str,
    title: Option<&str>,
    images: &[FixtureImage],
) {
    Mock::given(method("GET"))
        .and(path(format!("/a/{album_id}/embed")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(embed_page(title, &manifest_json(images))),
        )
        .mount(server)
        .await;

    for image in images {
        Mock::given(method("GET"))
            .and(path(format!("/i/{}{}", image.hash, image.ext)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(image.body.to_vec()))
            .expect(1)
            .mount(server)
            .await;
    }
}

/// Downloader configured against `server`, writing into a fresh temp directory
pub async fn create_downloader() -> (imgur_dl::ImgurDownloader, MockServer, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;

    let mut config = imgur_dl::Config::default();
    config.output_dir = temp_dir.path().to_path_buf();
    config.disk_space.min_free_space = 0;
    config.http.album_base_url = server.uri();
    config.http.image_base_url = format!("{}/i", server.uri());

    let downloader = imgur_dl::ImgurDownloader::new(config).unwrap();
    (downloader, server, temp_dir)
}
