//! Port to the authoritative photo store

use async_trait::async_trait;

use crate::{
    error::StoreResult,
    models::{MediaId, MediaItem, ParentRef, ReorderRequest},
    upload::UploadBatch,
};

/// Remote record of every gallery's items and their order
///
/// Each call either fully succeeds or fully fails; the client never
/// interprets partial success.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Items of the gallery in persisted order
    async fn list(&self, parent: &ParentRef) -> StoreResult<Vec<MediaItem>>;

    /// Store a batch of files; captions pair with files by position
    async fn upload(&self, parent: &ParentRef, batch: UploadBatch) -> StoreResult<Vec<MediaItem>>;

    /// Designate an item as the gallery's main item
    async fn mark_main(&self, parent: &ParentRef, id: MediaId) -> StoreResult<()>;

    /// Persist a complete order; the store assigns `seq` by position
    async fn reorder(&self, parent: &ParentRef, request: ReorderRequest) -> StoreResult<()>;

    async fn delete(&self, parent: &ParentRef, id: MediaId) -> StoreResult<()>;
}
