//! Configuration types for imgur-dl
//!
//! There is no config file and no environment lookup; the binary runs with
//! [`Config::default`]. The fields exist so embedders and tests can redirect
//! output and point the HTTP layer at another host.

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Minimum free space required before an album is started (100 MiB)
pub const DEFAULT_MIN_FREE_SPACE: u64 = 100 * 1024 * 1024;

/// User-Agent sent with album page requests. The embed page varies its content by client.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 4.4.2; Nexus 4 Build/KOT49H) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/34.0.1847.114 Mobile Safari/537.36";

/// Disk space check configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiskSpaceConfig {
    /// Check free space before each album (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum free bytes in the output directory (default: 100 MiB)
    #[serde(default = "default_min_free_space")]
    pub min_free_space: u64,
}

impl Default for DiskSpaceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_free_space: default_min_free_space(),
        }
    }
}

/// HTTP client configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for album page requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Base URL album pages are fetched from (default: "https://imgur.com")
    #[serde(default = "default_album_base_url")]
    pub album_base_url: String,

    /// Base URL image files are fetched from (default: "https://i.imgur.com")
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// Timeout for the album page request (default: 30s)
    #[serde(default = "default_page_timeout", with = "optional_duration_secs")]
    pub page_timeout: Option<Duration>,

    /// Timeout for a single image download (default: none)
    #[serde(default, with = "optional_duration_secs")]
    pub image_timeout: Option<Duration>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            album_base_url: default_album_base_url(),
            image_base_url: default_image_base_url(),
            page_timeout: default_page_timeout(),
            image_timeout: None,
        }
    }
}

impl HttpConfig {
    /// Embeddable page for an album: `{album_base_url}/a/{id}/embed?pub=true`
    pub fn album_page_url(&self, album_id: &str) -> String {
        format!(
            "{}/a/{}/embed?pub=true",
            self.album_base_url.trim_end_matches('/'),
            album_id
        )
    }

    /// Direct image URL: `{image_base_url}/{hash}{ext}`
    pub fn image_url(&self, hash: &str, ext: &str) -> String {
        format!(
            "{}/{}{}",
            self.image_base_url.trim_end_matches('/'),
            hash,
            ext
        )
    }
}

/// Main configuration for [`ImgurDownloader`](crate::ImgurDownloader)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Directory album directories are created in (default: ".")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Free space check
    #[serde(default)]
    pub disk_space: DiskSpaceConfig,

    /// HTTP settings
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            disk_space: DiskSpaceConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_min_free_space() -> u64 {
    DEFAULT_MIN_FREE_SPACE
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_album_base_url() -> String {
    "https://imgur.com".to_string()
}

fn default_image_base_url() -> String {
    "https://i.imgur.com".to_string()
}

fn default_page_timeout() -> Option<Duration> {
    Some(Duration::from_secs(30))
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

mod optional_duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}
