//! Application state shared across handlers

use std::sync::Arc;

use crate::{config::StoreSettings, repositories::PhotoRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn PhotoRepository>,
    pub settings: Arc<StoreSettings>,
}

impl AppState {
    pub fn new(repository: Arc<dyn PhotoRepository>, settings: StoreSettings) -> Self {
        Self {
            repository,
            settings: Arc::new(settings),
        }
    }
}
