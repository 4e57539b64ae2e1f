//! Photo store service
//!
//! HTTP service persisting the photos of shared-office listings. Each office
//! has one gallery: an ordered list of photos with dense zero-based `seq`
//! values and at most one main photo. Photos are kept in memory or in
//! PostgreSQL depending on [`config::StoreSettings::backend`].

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;

pub use config::{StorageBackend, StoreSettings};
pub use routes::create_router;
pub use state::AppState;

/// Example of serving the in-memory backend
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use photo_store::{AppState, StoreSettings, create_router, repositories::MemoryPhotoRepository};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = StoreSettings::load()?;
///     let listener = tokio::net::TcpListener::bind(&settings.bind_address).await?;
///     let state = AppState::new(Arc::new(MemoryPhotoRepository::new()), settings);
///     axum::serve(listener, create_router(state)).await?;
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
