//! In-memory photo repository

use async_trait::async_trait;
use chrono::Utc;
use gallery::ReorderPayload;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{PhotoRepository, RepositoryError, RepositoryResult, resolve_order};
use crate::models::{Asset, NewPhoto, Photo};

#[derive(Debug, Clone)]
struct StoredPhoto {
    photo: Photo,
    bytes: Vec<u8>,
}

/// Photo repository holding every gallery in process memory
///
/// Galleries are kept sorted by `seq`, so a gallery's vector index is its
/// position.
#[derive(Debug, Clone, Default)]
pub struct MemoryPhotoRepository {
    galleries: Arc<RwLock<HashMap<Uuid, Vec<StoredPhoto>>>>,
}

impl MemoryPhotoRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(photo_id: Uuid) -> RepositoryError {
    RepositoryError::NotFound(format!("Photo {} not found", photo_id))
}

fn resequence(gallery: &mut [StoredPhoto]) {
    for (seq, stored) in gallery.iter_mut().enumerate() {
        stored.photo.seq = seq as u32;
    }
}

#[async_trait]
impl PhotoRepository for MemoryPhotoRepository {
    async fn list(&self, parent_id: Uuid) -> RepositoryResult<Vec<Photo>> {
        let galleries = self.galleries.read().await;
        Ok(galleries
            .get(&parent_id)
            .map(|gallery| gallery.iter().map(|stored| stored.photo.clone()).collect())
            .unwrap_or_default())
    }

    async fn insert_batch(
        &self,
        parent_id: Uuid,
        photos: Vec<NewPhoto>,
    ) -> RepositoryResult<Vec<Photo>> {
        let mut galleries = self.galleries.write().await;
        let gallery = galleries.entry(parent_id).or_default();
        let mut needs_main = !gallery.iter().any(|stored| stored.photo.is_main);

        let mut created = Vec::with_capacity(photos.len());
        for new_photo in photos {
            let photo = Photo {
                id: Uuid::new_v4(),
                parent_id,
                caption: new_photo.caption,
                seq: gallery.len() as u32,
                is_main: needs_main,
                file_name: new_photo.file_name,
                content_type: new_photo.content_type,
                created_at: Utc::now(),
            };
            needs_main = false;

            created.push(photo.clone());
            gallery.push(StoredPhoto {
                photo,
                bytes: new_photo.bytes,
            });
        }

        info!("Stored {} photos for {}", created.len(), parent_id);
        Ok(created)
    }

    async fn set_main(&self, parent_id: Uuid, photo_id: Uuid) -> RepositoryResult<()> {
        let mut galleries = self.galleries.write().await;
        let gallery = galleries
            .get_mut(&parent_id)
            .ok_or_else(|| not_found(photo_id))?;

        if !gallery.iter().any(|stored| stored.photo.id == photo_id) {
            return Err(not_found(photo_id));
        }

        for stored in gallery.iter_mut() {
            stored.photo.is_main = stored.photo.id == photo_id;
        }
        Ok(())
    }

    async fn reorder(&self, parent_id: Uuid, payload: ReorderPayload) -> RepositoryResult<()> {
        let mut galleries = self.galleries.write().await;
        let gallery = galleries.entry(parent_id).or_default();

        let current: Vec<Uuid> = gallery.iter().map(|stored| stored.photo.id).collect();
        let ordered = resolve_order(&current, &payload)?;

        let mut by_id: HashMap<Uuid, StoredPhoto> = gallery
            .drain(..)
            .map(|stored| (stored.photo.id, stored))
            .collect();
        gallery.extend(ordered.iter().filter_map(|id| by_id.remove(id)));
        resequence(gallery);
        Ok(())
    }

    async fn delete(&self, parent_id: Uuid, photo_id: Uuid) -> RepositoryResult<()> {
        let mut galleries = self.galleries.write().await;
        let gallery = galleries
            .get_mut(&parent_id)
            .ok_or_else(|| not_found(photo_id))?;

        let index = gallery
            .iter()
            .position(|stored| stored.photo.id == photo_id)
            .ok_or_else(|| not_found(photo_id))?;

        gallery.remove(index);
        resequence(gallery);
        Ok(())
    }

    async fn asset(&self, photo_id: Uuid) -> RepositoryResult<Asset> {
        let galleries = self.galleries.read().await;
        galleries
            .values()
            .flatten()
            .find(|stored| stored.photo.id == photo_id)
            .map(|stored| Asset {
                content_type: stored.photo.content_type.clone(),
                bytes: stored.bytes.clone(),
            })
            .ok_or_else(|| not_found(photo_id))
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
