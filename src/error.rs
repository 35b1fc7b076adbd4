//! Error types for imgur-dl
//!
//! Every variant of [`Error`] is fatal for the album being processed. Failures of a
//! single image inside an album are carried by [`ImageError`] instead: they are
//! reported and collected, never propagated.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for imgur-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for imgur-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Insufficient disk space
    #[error("insufficient disk space: need {required} bytes, have {available} bytes")]
    InsufficientSpace {
        /// Number of bytes required before an album is started
        required: u64,
        /// Number of bytes currently available on disk
        available: u64,
    },

    /// Failed to check disk space
    #[error("failed to check disk space: {0}")]
    DiskSpaceCheckFailed(String),

    /// The album input does not contain an album identifier
    #[error("invalid album URL: {0}")]
    InvalidUrl(String),

    /// Server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// Status code returned by the server
        status: u16,
        /// The requested URL
        url: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Inline script could not be parsed, or the manifest initializer is not valid JSON
    #[error("script parse error: {0}")]
    ScriptParse(String),

    /// Manifest is missing required fields or is internally inconsistent
    #[error("manifest validation failed: {0}")]
    Validation(String),

    /// Album directory could not be created
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// The directory that was being created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A CSS selector used to read the album page failed to compile
    #[error("invalid selector: {0}")]
    Selector(String),
}

impl Error {
    /// Machine-readable error code, used in events and logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InsufficientSpace { .. } => "insufficient_space",
            Error::DiskSpaceCheckFailed(_) => "disk_space_check_failed",
            Error::InvalidUrl(_) => "invalid_url",
            Error::HttpStatus { .. } => "http_status",
            Error::Network(_) => "network_error",
            Error::ScriptParse(_) => "parse_error",
            Error::Validation(_) => "validation_error",
            Error::DirectoryCreate { .. } => "filesystem_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::Selector(_) => "internal_error",
        }
    }

    /// Render the error followed by its chain of sources, one per line
    pub fn report(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str("\n  caused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

/// Failure of a single image download
///
/// The pipeline keeps going after one of these; it is reported through
/// [`Event::ImageFailed`](crate::types::Event::ImageFailed) and returned in the
/// album report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("failed to download {url}: {reason}")]
pub struct ImageError {
    /// 1-based position of the image in the manifest
    pub index: usize,
    /// Source URL of the image
    pub url: String,
    /// Human-readable cause
    pub reason: String,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_follow_failure_taxonomy() {
        let cases: Vec<(Error, &str)> = vec![
            (
                Error::InsufficientSpace {
                    required: 10,
                    available: 1,
                },
                "insufficient_space",
            ),
            (
                Error::HttpStatus {
                    status: 404,
                    url: "https://imgur.com/a/x/embed?pub=true".into(),
                },
                "http_status",
            ),
            (Error::ScriptParse("unexpected token".into()), "parse_error"),
            (Error::Validation("count mismatch".into()), "validation_error"),
            (
                Error::DirectoryCreate {
                    path: "x".into(),
                    source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                },
                "filesystem_error",
            ),
        ];

        for (error, code) in cases {
            assert_eq!(error.error_code(), code, "wrong code for {error}");
        }
    }

    #[test]
    fn report_includes_source_chain() {
        let error = Error::DirectoryCreate {
            path: PathBuf::from("Album - abc"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        };

        let report = error.report();
        assert!(report.starts_with("failed to create directory Album - abc"));
        assert!(report.contains("caused by: read-only"));
    }

    #[test]
    fn image_error_names_the_url() {
        let error = ImageError {
            index: 2,
            url: "https://i.imgur.com/def.png".into(),
            reason: "HTTP 500".into(),
        };
        assert_eq!(
            error.to_string(),
            "failed to download https://i.imgur.com/def.png: HTTP 500"
        );
    }
}
