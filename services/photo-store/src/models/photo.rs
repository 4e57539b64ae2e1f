//! Photo models for the photo store

use chrono::{DateTime, Utc};
use gallery::MediaItem;
use uuid::Uuid;

/// A stored photo, without its bytes
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub caption: Option<String>,
    pub seq: u32,
    pub is_main: bool,
    pub file_name: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

impl Photo {
    /// Public URL of the photo's bytes
    pub fn asset_url(&self, public_url: &str) -> String {
        format!("{}/assets/{}", public_url.trim_end_matches('/'), self.id)
    }

    /// Wire representation served to gallery clients
    pub fn to_item(&self, public_url: &str) -> MediaItem {
        MediaItem {
            id: self.id,
            url: self.asset_url(public_url),
            caption: self.caption.clone(),
            seq: self.seq,
            is_main: self.is_main,
        }
    }
}

/// A photo received in an upload, before the store assigns id and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhoto {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub caption: Option<String>,
}

/// Stored bytes of a photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub content_type: String,
    pub bytes: Vec<u8>,
}
