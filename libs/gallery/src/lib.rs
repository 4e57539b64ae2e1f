//! Photo gallery manager for shared-office listings
//!
//! This crate keeps a client-side ordered collection of photos consistent with
//! the photo store. The [`GalleryController`] loads a gallery, lets the user
//! reorder it by drag gesture, upload, delete and designate a main photo, and
//! reconciles with the store by reloading after every mutation.

pub mod config;
pub mod controller;
pub mod drag;
pub mod error;
pub mod http;
pub mod models;
pub mod ordering;
pub mod store;
pub mod upload;

pub use config::{StoreClientConfig, UploadLimits};
pub use controller::{GalleryController, LoadOutcome};
pub use drag::{DragOutcome, DragSession};
pub use error::{GalleryError, GalleryResult, OrderingError, StoreError, StoreResult, UploadError};
pub use http::HttpMediaStore;
pub use models::{MediaId, MediaItem, ParentRef, ReorderPayload, ReorderRequest, SeqAssignment};
pub use ordering::{OrderingEngine, display_order};
pub use store::MediaStore;
pub use upload::{PendingUpload, UploadBatch, UploadFile, UploadQueue, UploadStatus};

/// Example usage of the gallery controller
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use gallery::{GalleryController, HttpMediaStore, ParentRef, StoreClientConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = HttpMediaStore::new(&StoreClientConfig::from_env())?;
///     let controller = GalleryController::new(Arc::new(store));
///     controller.open(ParentRef::new("offices/42")).await?;
///
///     controller.drag_start(2).await?;
///     controller.drag_over(0).await?;
///     controller.drag_end().await?;
///
///     for item in controller.display_items().await {
///         println!("{} {}", item.seq, item.url);
///     }
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
