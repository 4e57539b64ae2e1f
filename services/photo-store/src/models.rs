//! Photo store models for request and response payloads

use serde::Serialize;

pub mod photo;

pub use photo::{Asset, NewPhoto, Photo};

/// Acknowledgement returned by mutating endpoints
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub status: &'static str,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}
