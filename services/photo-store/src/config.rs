//! Settings for the photo store service
//!
//! Settings come from built-in defaults overridden by `PHOTO_STORE_*`
//! environment variables, e.g. `PHOTO_STORE_BIND_ADDRESS=127.0.0.1:8080`.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Where photos are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory, lost on restart
    Memory,
    /// The `photos` table in PostgreSQL
    Postgres,
}

/// Photo store settings
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Socket address the HTTP server binds to
    pub bind_address: String,
    /// Base URL clients use to reach this service, used to build asset URLs
    pub public_url: String,
    pub backend: StorageBackend,
    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
}

impl StoreSettings {
    /// Load settings from defaults and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let settings: StoreSettings = Config::builder()
            .set_default("bind_address", "0.0.0.0:3002")?
            .set_default("public_url", "http://localhost:3002")?
            .set_default("backend", "memory")?
            .set_default("max_upload_bytes", 25_i64 * 1024 * 1024)?
            .add_source(Environment::with_prefix("PHOTO_STORE").try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(settings.normalized())
    }

    fn normalized(mut self) -> Self {
        self.public_url = self.public_url.trim_end_matches('/').to_string();
        self
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3002".to_string(),
            public_url: "http://localhost:3002".to_string(),
            backend: StorageBackend::Memory,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}
