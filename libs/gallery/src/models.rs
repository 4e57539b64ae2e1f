//! Gallery data model shared by the client core and the store wire format

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Store-assigned identifier of a media item
pub type MediaId = Uuid;

/// A persisted gallery item as reported by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: MediaId,
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
    /// Zero-based position within the gallery, dense when the list reflects the store
    pub seq: u32,
    #[serde(default)]
    pub is_main: bool,
}

/// Owner of a gallery, rendered as the relative path the store mounts it under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParentRef(String);

impl ParentRef {
    /// Create a parent reference from a raw relative path such as `offices/42`
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into().trim_matches('/').to_string())
    }

    /// Gallery of a shared-office listing
    pub fn office(office_id: Uuid) -> Self {
        Self(format!("offices/{}", office_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Explicit position for one item in a reorder payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqAssignment {
    pub id: MediaId,
    pub seq: u32,
}

/// Body of a reorder commit: the complete final order of the gallery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<MediaId>,
}

impl ReorderRequest {
    pub fn new(ids: Vec<MediaId>) -> Self {
        Self { ids }
    }
}

/// Reorder payload as accepted by the store: either an id sequence or explicit positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReorderPayload {
    Ids { ids: Vec<MediaId> },
    Positions { positions: Vec<SeqAssignment> },
}

impl From<ReorderRequest> for ReorderPayload {
    fn from(request: ReorderRequest) -> Self {
        ReorderPayload::Ids { ids: request.ids }
    }
}

/// A data-integrity problem found in a list returned by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// The `seq` values are not exactly `0..len`
    SparseSequence { expected: u32, found: u32 },
    /// More than one item carries the main flag
    MultipleMain(Vec<MediaId>),
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::SparseSequence { expected, found } => {
                write!(f, "expected seq {} but found {}", expected, found)
            }
            IntegrityIssue::MultipleMain(ids) => {
                write!(f, "{} items are flagged as main", ids.len())
            }
        }
    }
}

/// Check a store-ordered list for dense `seq` values and at most one main item
pub fn check_integrity(items: &[MediaItem]) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    let mut seqs: Vec<u32> = items.iter().map(|item| item.seq).collect();
    seqs.sort_unstable();
    if let Some((expected, found)) = seqs
        .iter()
        .enumerate()
        .map(|(index, seq)| (index as u32, *seq))
        .find(|(expected, found)| expected != found)
    {
        issues.push(IntegrityIssue::SparseSequence { expected, found });
    }

    let mains: Vec<MediaId> = items
        .iter()
        .filter(|item| item.is_main)
        .map(|item| item.id)
        .collect();
    if mains.len() > 1 {
        issues.push(IntegrityIssue::MultipleMain(mains));
    }

    issues
}
