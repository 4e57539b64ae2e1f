//! Client configuration loaded from the environment

use std::{env, time::Duration};

const DEFAULT_STORE_URL: &str = "http://localhost:3002";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_FILES: usize = 10;
const DEFAULT_MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_ACCEPTED_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Connection settings for the photo store
#[derive(Debug, Clone)]
pub struct StoreClientConfig {
    /// Base URL the gallery paths are resolved against
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl StoreClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create a new StoreClientConfig from environment variables
    ///
    /// # Environment Variables
    /// - `GALLERY_STORE_URL`: base URL of the photo store (default: "http://localhost:3002")
    /// - `GALLERY_STORE_TIMEOUT`: request timeout in seconds (default: 30)
    pub fn from_env() -> Self {
        let base_url =
            env::var("GALLERY_STORE_URL").unwrap_or_else(|_| DEFAULT_STORE_URL.to_string());

        let timeout_secs = env::var("GALLERY_STORE_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            timeout_secs,
            ..Self::new(base_url)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for StoreClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_URL)
    }
}

/// Limits applied when staging files for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    /// Maximum number of entries the queue holds
    pub max_files: usize,
    /// Maximum size of a single file in bytes
    pub max_file_bytes: usize,
    /// Accepted MIME types, lowercase
    pub accepted_types: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            accepted_types: DEFAULT_ACCEPTED_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

impl UploadLimits {
    /// Create new UploadLimits from environment variables
    ///
    /// # Environment Variables
    /// - `GALLERY_UPLOAD_MAX_FILES`: files per batch (default: 10)
    /// - `GALLERY_UPLOAD_MAX_FILE_BYTES`: bytes per file (default: 10 MiB)
    /// - `GALLERY_UPLOAD_ACCEPTED_TYPES`: comma-separated MIME types
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_files = env::var("GALLERY_UPLOAD_MAX_FILES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_files);

        let max_file_bytes = env::var("GALLERY_UPLOAD_MAX_FILE_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_file_bytes);

        let accepted_types = env::var("GALLERY_UPLOAD_ACCEPTED_TYPES")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(|t| t.trim().to_ascii_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|types| !types.is_empty())
            .unwrap_or(defaults.accepted_types);

        Self {
            max_files,
            max_file_bytes,
            accepted_types,
        }
    }

    pub fn accepts(&self, content_type: &str) -> bool {
        let content_type = content_type.to_ascii_lowercase();
        self.accepted_types.iter().any(|t| *t == content_type)
    }
}
