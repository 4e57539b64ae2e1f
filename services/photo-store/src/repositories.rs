//! Repositories for photo storage

use async_trait::async_trait;
use gallery::ReorderPayload;
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Asset, NewPhoto, Photo};

pub mod memory;
pub mod postgres;

pub use memory::MemoryPhotoRepository;
pub use postgres::PgPhotoRepository;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The gallery or photo does not exist
    #[error("{0}")]
    NotFound(String),

    /// A reorder payload that is not a permutation of the gallery
    #[error("{0}")]
    InvalidOrder(String),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Type alias for Result with RepositoryError
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage of photos grouped by the listing they belong to
///
/// Every implementation keeps `seq` dense and zero-based per gallery and at
/// most one main photo per gallery.
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Photos of a gallery ordered by `seq`
    async fn list(&self, parent_id: Uuid) -> RepositoryResult<Vec<Photo>>;

    /// Append photos to a gallery in the given order
    ///
    /// The first photo added to a gallery without a main photo becomes main.
    async fn insert_batch(
        &self,
        parent_id: Uuid,
        photos: Vec<NewPhoto>,
    ) -> RepositoryResult<Vec<Photo>>;

    /// Make a photo the gallery's only main photo
    async fn set_main(&self, parent_id: Uuid, photo_id: Uuid) -> RepositoryResult<()>;

    /// Assign `seq` values from a complete ordering
    async fn reorder(&self, parent_id: Uuid, payload: ReorderPayload) -> RepositoryResult<()>;

    /// Remove a photo and close the gap it leaves in `seq`
    async fn delete(&self, parent_id: Uuid, photo_id: Uuid) -> RepositoryResult<()>;

    /// Stored bytes of a photo
    async fn asset(&self, photo_id: Uuid) -> RepositoryResult<Asset>;

    /// Check backend connectivity
    async fn health_check(&self) -> RepositoryResult<bool>;
}

/// Resolve a reorder payload against the gallery's current ids
///
/// Returns the ids in their new order. The payload must name every current
/// photo exactly once; explicit positions must cover `0..len` exactly once.
pub fn resolve_order(current: &[Uuid], payload: &ReorderPayload) -> RepositoryResult<Vec<Uuid>> {
    let ordered = match payload {
        ReorderPayload::Ids { ids } => ids.clone(),
        ReorderPayload::Positions { positions } => {
            let mut slots: Vec<Option<Uuid>> = vec![None; positions.len()];
            for assignment in positions {
                let slot = slots.get_mut(assignment.seq as usize).ok_or_else(|| {
                    RepositoryError::InvalidOrder(format!(
                        "Position {} is outside the gallery",
                        assignment.seq
                    ))
                })?;
                if slot.is_some() {
                    return Err(RepositoryError::InvalidOrder(format!(
                        "Position {} is assigned twice",
                        assignment.seq
                    )));
                }
                *slot = Some(assignment.id);
            }
            slots.into_iter().flatten().collect()
        }
    };

    if ordered.len() != current.len() {
        return Err(RepositoryError::InvalidOrder(format!(
            "Reorder lists {} photos but the gallery has {}",
            ordered.len(),
            current.len()
        )));
    }

    let known: HashSet<&Uuid> = current.iter().collect();
    let mut seen = HashSet::with_capacity(ordered.len());
    for id in &ordered {
        if !known.contains(id) {
            return Err(RepositoryError::InvalidOrder(format!(
                "Photo {} is not part of this gallery",
                id
            )));
        }
        if !seen.insert(*id) {
            return Err(RepositoryError::InvalidOrder(format!(
                "Photo {} is listed more than once",
                id
            )));
        }
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery::SeqAssignment;

    fn ids(count: usize) -> Vec<Uuid> {
        (0..count).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_resolve_ids_permutation() {
        let current = ids(3);
        let payload = ReorderPayload::Ids {
            ids: vec![current[2], current[0], current[1]],
        };

        let ordered = resolve_order(&current, &payload).unwrap();
        assert_eq!(ordered, vec![current[2], current[0], current[1]]);
    }

    #[test]
    fn test_resolve_positions() {
        let current = ids(3);
        let payload = ReorderPayload::Positions {
            positions: vec![
                SeqAssignment {
                    id: current[0],
                    seq: 2,
                },
                SeqAssignment {
                    id: current[1],
                    seq: 0,
                },
                SeqAssignment {
                    id: current[2],
                    seq: 1,
                },
            ],
        };

        let ordered = resolve_order(&current, &payload).unwrap();
        assert_eq!(ordered, vec![current[1], current[2], current[0]]);
    }

    #[test]
    fn test_resolve_rejects_unknown_missing_and_duplicate_ids() {
        let current = ids(2);

        let unknown = ReorderPayload::Ids {
            ids: vec![current[0], Uuid::new_v4()],
        };
        assert!(matches!(
            resolve_order(&current, &unknown),
            Err(RepositoryError::InvalidOrder(_))
        ));

        let missing = ReorderPayload::Ids {
            ids: vec![current[0]],
        };
        assert!(matches!(
            resolve_order(&current, &missing),
            Err(RepositoryError::InvalidOrder(_))
        ));

        let duplicate = ReorderPayload::Ids {
            ids: vec![current[0], current[0]],
        };
        assert!(matches!(
            resolve_order(&current, &duplicate),
            Err(RepositoryError::InvalidOrder(_))
        ));
    }

    #[test]
    fn test_resolve_rejects_bad_positions() {
        let current = ids(2);

        let twice = ReorderPayload::Positions {
            positions: vec![
                SeqAssignment {
                    id: current[0],
                    seq: 0,
                },
                SeqAssignment {
                    id: current[1],
                    seq: 0,
                },
            ],
        };
        assert!(matches!(
            resolve_order(&current, &twice),
            Err(RepositoryError::InvalidOrder(_))
        ));

        let outside = ReorderPayload::Positions {
            positions: vec![
                SeqAssignment {
                    id: current[0],
                    seq: 0,
                },
                SeqAssignment {
                    id: current[1],
                    seq: 5,
                },
            ],
        };
        assert!(matches!(
            resolve_order(&current, &outside),
            Err(RepositoryError::InvalidOrder(_))
        ));
    }

    #[test]
    fn test_resolve_empty_gallery() {
        let ordered = resolve_order(&[], &ReorderPayload::Ids { ids: Vec::new() }).unwrap();
        assert!(ordered.is_empty());
    }
}
