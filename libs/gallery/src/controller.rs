//! Gallery controller
//!
//! Owns the local model of the displayed gallery and keeps it consistent with
//! the store. Every mutating operation ends with a reload from the store,
//! whether the mutation succeeded or not, and the reloaded list replaces the
//! local one wholesale.

use std::sync::{
    Arc,
    atomic::{AtomicU64, AtomicUsize, Ordering},
};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::{
    drag::{DragOutcome, DragSession},
    error::{GalleryError, GalleryResult, StoreError, StoreResult},
    models::{MediaId, MediaItem, ParentRef, check_integrity},
    ordering::OrderingEngine,
    store::MediaStore,
    upload::UploadQueue,
};

/// Result of a reload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The local model was replaced with this many items
    Applied { items: usize },
    /// The gallery was switched while the request was in flight; the response was dropped
    Discarded,
}

/// Identity of the gallery a request was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
struct Session {
    parent: ParentRef,
    epoch: u64,
}

#[derive(Debug, Default)]
struct GalleryState {
    session: Option<Session>,
    engine: OrderingEngine,
    drag: Option<DragSession>,
    pending_main: Option<MediaId>,
    last_error: Option<String>,
    loaded: bool,
}

/// Decrements the in-flight counter when a store call settles
struct BusyGuard(Arc<AtomicUsize>);

impl BusyGuard {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Orchestrates one displayed gallery against the store
///
/// Cloning is cheap and every clone drives the same gallery. Mutating store
/// calls are serialized through a single in-flight slot that is held until the
/// reconciling reload has been applied.
#[derive(Clone)]
pub struct GalleryController {
    store: Arc<dyn MediaStore>,
    state: Arc<RwLock<GalleryState>>,
    mutation_slot: Arc<Mutex<()>>,
    in_flight: Arc<AtomicUsize>,
    epochs: Arc<AtomicU64>,
}

impl std::fmt::Debug for GalleryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryController")
            .field("in_flight", &self.in_flight.load(Ordering::SeqCst))
            .field("epoch", &self.epochs.load(Ordering::SeqCst))
            .finish()
    }
}

impl GalleryController {
    /// Create a controller with no gallery open
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        Self {
            store,
            state: Arc::new(RwLock::new(GalleryState::default())),
            mutation_slot: Arc::new(Mutex::new(())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            epochs: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Switch to a gallery and load it
    ///
    /// Responses still in flight for the previous gallery are discarded when
    /// they arrive.
    pub async fn open(&self, parent: ParentRef) -> GalleryResult<LoadOutcome> {
        let session = {
            let mut state = self.state.write().await;
            let session = Session {
                parent,
                epoch: self.epochs.fetch_add(1, Ordering::SeqCst) + 1,
            };
            info!(
                "Opening gallery {} (session {})",
                session.parent, session.epoch
            );

            *state = GalleryState {
                session: Some(session.clone()),
                ..GalleryState::default()
            };
            session
        };

        self.reload(&session).await
    }

    /// Replace the local model with the store's current list
    pub async fn load(&self) -> GalleryResult<LoadOutcome> {
        let session = self.current_session().await?;
        self.reload(&session).await
    }

    /// Send every queued upload as one batch, then reload
    ///
    /// Returned items are not merged; the store assigns ids and positions and
    /// the reload picks them up.
    pub async fn upload(&self, queue: &mut UploadQueue) -> GalleryResult<()> {
        let session = self.current_session().await?;
        let batch = queue.begin_upload()?;
        let count = batch.len();

        let _slot = self.mutation_slot.lock().await;
        let result = {
            let _busy = self.busy();
            self.store.upload(&session.parent, batch).await
        };

        match &result {
            Ok(created) => {
                let discarded = queue.complete_upload();
                info!(
                    "Uploaded {} photos to {} ({} created)",
                    discarded,
                    session.parent,
                    created.len()
                );
            }
            Err(_) => {
                queue.fail_upload();
                warn!("Upload of {} photos to {} failed", count, session.parent);
            }
        }

        self.settle(&session, "upload", result).await
    }

    /// Delete an item, then reload
    pub async fn delete(&self, id: MediaId) -> GalleryResult<()> {
        let session = self.session_with_item(id).await?;

        let _slot = self.mutation_slot.lock().await;
        let result = {
            let _busy = self.busy();
            self.store.delete(&session.parent, id).await
        };

        self.settle(&session, "delete", result).await
    }

    /// Ask the store to make `id` the main item, then reload
    ///
    /// No flag is flipped locally; until the reload lands the request is only
    /// visible through [`GalleryController::pending_main`].
    pub async fn mark_main(&self, id: MediaId) -> GalleryResult<()> {
        let session = self.session_with_item(id).await?;
        self.state.write().await.pending_main = Some(id);

        let _slot = self.mutation_slot.lock().await;
        let result = {
            let _busy = self.busy();
            self.store.mark_main(&session.parent, id).await
        };

        let settled = self.settle(&session, "mark main", result).await;

        let mut state = self.state.write().await;
        if state.session.as_ref() == Some(&session) && state.pending_main == Some(id) {
            state.pending_main = None;
        }
        settled
    }

    /// Begin a reorder gesture on the item at `index`
    ///
    /// A previous gesture that never ended is dropped. If it had shuffled the
    /// list, the store's order is reloaded before the new gesture begins.
    pub async fn drag_start(&self, index: usize) -> GalleryResult<()> {
        let abandoned = {
            let mut state = self.state.write().await;
            let session = state.session.clone().ok_or(GalleryError::NoGallery)?;
            match state.drag.take() {
                Some(previous) if previous.moved() => Some(session),
                _ => None,
            }
        };

        if let Some(session) = abandoned {
            warn!(
                "Drag restarted on {} before the previous gesture ended; reloading",
                session.parent
            );
            let _slot = self.mutation_slot.lock().await;
            self.reload(&session).await?;
        }

        let mut state = self.state.write().await;
        if state.session.is_none() {
            return Err(GalleryError::NoGallery);
        }

        let drag = DragSession::start(&state.engine, index)?;
        debug!("Drag started at index {}", index);
        state.drag = Some(drag);
        Ok(())
    }

    /// Pointer moved over `target`; shuffles the local list for feedback
    ///
    /// Returns whether the local list changed. Nothing is sent to the store.
    pub async fn drag_over(&self, target: usize) -> GalleryResult<bool> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let drag = state.drag.as_mut().ok_or(GalleryError::NoDrag)?;
        Ok(drag.over(&mut state.engine, target)?)
    }

    /// Finish the gesture and commit the final order with a single request
    ///
    /// A gesture that leaves the order as it found it sends nothing. Any
    /// gesture that mutated the local list is followed by a reload.
    pub async fn drag_end(&self) -> GalleryResult<DragOutcome> {
        let (session, outcome) = {
            let mut state = self.state.write().await;
            let session = state.session.clone().ok_or(GalleryError::NoGallery)?;
            let outcome = match state.drag.take() {
                Some(drag) => drag.finish(&state.engine),
                None => DragOutcome::Cancelled,
            };
            (session, outcome)
        };

        match &outcome {
            DragOutcome::Unchanged | DragOutcome::Cancelled => {
                debug!("Drag ended without changes ({:?})", outcome);
            }
            DragOutcome::Settled => {
                debug!("Drag returned to its origin; reloading without commit");
                let _slot = self.mutation_slot.lock().await;
                self.reload(&session).await?;
            }
            DragOutcome::Commit(request) => {
                let _slot = self.mutation_slot.lock().await;
                let result = {
                    let _busy = self.busy();
                    self.store.reorder(&session.parent, request.clone()).await
                };
                self.settle(&session, "reorder", result).await?;
            }
        }

        Ok(outcome)
    }

    /// Abandon the current gesture, restoring the store's order if it was shuffled
    pub async fn drag_cancel(&self) -> GalleryResult<()> {
        let (session, moved) = {
            let mut state = self.state.write().await;
            let session = state.session.clone().ok_or(GalleryError::NoGallery)?;
            let moved = state.drag.take().map(|drag| drag.moved()).unwrap_or(false);
            (session, moved)
        };

        if moved {
            let _slot = self.mutation_slot.lock().await;
            self.reload(&session).await?;
        }
        Ok(())
    }

    /// Items in working order, including any shuffle of an active gesture
    pub async fn items(&self) -> Vec<MediaItem> {
        self.state.read().await.engine.items().to_vec()
    }

    /// Items in canonical display order
    pub async fn display_items(&self) -> Vec<MediaItem> {
        self.state.read().await.engine.display_items()
    }

    /// The main item as last reported by the store
    pub async fn main_item(&self) -> Option<MediaItem> {
        self.state.read().await.engine.main_item().cloned()
    }

    /// Item whose main designation has been requested but not yet observed
    pub async fn pending_main(&self) -> Option<MediaId> {
        self.state.read().await.pending_main
    }

    pub async fn parent(&self) -> Option<ParentRef> {
        self.state
            .read()
            .await
            .session
            .as_ref()
            .map(|session| session.parent.clone())
    }

    /// Whether the current gallery has been loaded at least once
    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    pub async fn is_dragging(&self) -> bool {
        self.state.read().await.drag.is_some()
    }

    /// Whether a store call is in flight; advisory only
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// User-facing message of the last failed operation
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    pub async fn clear_error(&self) {
        self.state.write().await.last_error = None;
    }

    fn busy(&self) -> BusyGuard {
        BusyGuard::new(&self.in_flight)
    }

    async fn current_session(&self) -> GalleryResult<Session> {
        self.state
            .read()
            .await
            .session
            .clone()
            .ok_or(GalleryError::NoGallery)
    }

    async fn session_with_item(&self, id: MediaId) -> GalleryResult<Session> {
        let state = self.state.read().await;
        let session = state.session.clone().ok_or(GalleryError::NoGallery)?;
        if !state.engine.contains(id) {
            return Err(GalleryError::UnknownItem(id));
        }
        Ok(session)
    }

    /// Reconcile after a mutating call: record the outcome, then reload either way
    async fn settle<T>(
        &self,
        session: &Session,
        operation: &str,
        result: StoreResult<T>,
    ) -> GalleryResult<()> {
        match result {
            Ok(_) => {
                info!("{} on {} succeeded", operation, session.parent);
                self.forget_error(session).await;
                self.reload(session).await.map(|_| ())
            }
            Err(err) => {
                warn!("{} on {} failed: {}", operation, session.parent, err);
                self.record_error(session, &err).await;

                if let Err(reload_err) = self.reload(session).await {
                    warn!(
                        "Reload after failed {} on {} also failed: {}",
                        operation, session.parent, reload_err
                    );
                    // Keep the message of the operation the user asked for
                    self.record_error(session, &err).await;
                }

                Err(err.into())
            }
        }
    }

    async fn forget_error(&self, session: &Session) {
        let mut state = self.state.write().await;
        if state.session.as_ref() == Some(session) {
            state.last_error = None;
        }
    }

    async fn record_error(&self, session: &Session, err: &StoreError) {
        let mut state = self.state.write().await;
        if state.session.as_ref() == Some(session) {
            state.last_error = Some(err.user_message());
        }
    }

    async fn reload(&self, session: &Session) -> GalleryResult<LoadOutcome> {
        let result = {
            let _busy = self.busy();
            self.store.list(&session.parent).await
        };

        let mut state = self.state.write().await;
        if state.session.as_ref() != Some(session) {
            debug!(
                "Discarding response for {} (session {}); gallery has changed",
                session.parent, session.epoch
            );
            return Ok(LoadOutcome::Discarded);
        }

        match result {
            Ok(items) => {
                for issue in check_integrity(&items) {
                    warn!("Gallery {} returned by store: {}", session.parent, issue);
                }

                if state.drag.take().is_some() {
                    warn!(
                        "Reload of {} replaced the list during a drag; gesture cancelled",
                        session.parent
                    );
                }

                let count = items.len();
                state.engine.replace(items);
                state.loaded = true;
                debug!("Loaded {} photos for {}", count, session.parent);
                Ok(LoadOutcome::Applied { items: count })
            }
            Err(err) => {
                warn!("Loading {} failed: {}", session.parent, err);
                state.last_error = Some(err.user_message());
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::UploadError,
        models::ReorderRequest,
        store::MockMediaStore,
        upload::{UploadFile, UploadStatus},
    };
    use mockall::{Sequence, predicate::eq};
    use uuid::Uuid;

    fn item(seq: u32, is_main: bool) -> MediaItem {
        MediaItem {
            id: Uuid::new_v4(),
            url: format!("http://localhost/assets/{}", seq),
            caption: None,
            seq,
            is_main,
        }
    }

    fn server_error() -> StoreError {
        StoreError::from_status(500, "Database error")
    }

    async fn opened(store: MockMediaStore) -> GalleryController {
        let controller = GalleryController::new(Arc::new(store));
        controller
            .open(ParentRef::new("offices/1"))
            .await
            .expect("open should load");
        controller
    }

    #[tokio::test]
    async fn test_operations_require_open_gallery() {
        let controller = GalleryController::new(Arc::new(MockMediaStore::new()));

        assert_eq!(controller.load().await, Err(GalleryError::NoGallery));
        assert_eq!(controller.drag_start(0).await, Err(GalleryError::NoGallery));
        assert_eq!(controller.drag_over(0).await, Err(GalleryError::NoDrag));
        assert_eq!(
            controller.delete(Uuid::new_v4()).await,
            Err(GalleryError::NoGallery)
        );
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_open_replaces_model_in_seq_order() {
        let a = item(0, false);
        let b = item(1, true);
        let listed = vec![b.clone(), a.clone()];

        let mut store = MockMediaStore::new();
        store
            .expect_list()
            .withf(|parent| parent.as_str() == "offices/1")
            .times(1)
            .returning(move |_| Ok(listed.clone()));

        let controller = opened(store).await;

        assert!(controller.is_loaded().await);
        assert_eq!(controller.items().await, vec![a.clone(), b.clone()]);
        assert_eq!(controller.display_items().await, vec![b.clone(), a]);
        assert_eq!(controller.main_item().await, Some(b));
    }

    #[tokio::test]
    async fn test_failed_delete_surfaces_error_and_still_reloads() {
        let target = item(0, false);
        let target_id = target.id;
        let listed = vec![target];

        let mut store = MockMediaStore::new();
        let mut seq = Sequence::new();
        let first = listed.clone();
        store
            .expect_list()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(first.clone()));
        store
            .expect_delete()
            .with(mockall::predicate::always(), eq(target_id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(server_error()));
        store
            .expect_list()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(listed.clone()));

        let controller = opened(store).await;
        let result = controller.delete(target_id).await;

        assert_eq!(result, Err(GalleryError::Store(server_error())));
        assert_eq!(
            controller.last_error().await.as_deref(),
            Some("Database error")
        );
        assert_eq!(controller.items().await.len(), 1);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_successful_operation_clears_previous_error() {
        let target = item(0, false);
        let target_id = target.id;
        let listed = vec![target];

        let mut store = MockMediaStore::new();
        store
            .expect_list()
            .times(3)
            .returning(move |_| Ok(listed.clone()));
        let mut seq = Sequence::new();
        store
            .expect_mark_main()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(server_error()));
        store
            .expect_mark_main()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let controller = opened(store).await;
        assert!(controller.mark_main(target_id).await.is_err());
        assert_eq!(
            controller.last_error().await.as_deref(),
            Some("Database error")
        );

        controller.mark_main(target_id).await.unwrap();
        assert_eq!(controller.last_error().await, None);
    }

    #[tokio::test]
    async fn test_delete_of_unknown_item_sends_nothing() {
        let mut store = MockMediaStore::new();
        store.expect_list().times(1).returning(|_| Ok(Vec::new()));
        store.expect_delete().never();

        let controller = opened(store).await;
        let unknown = Uuid::new_v4();
        assert_eq!(
            controller.delete(unknown).await,
            Err(GalleryError::UnknownItem(unknown))
        );
    }

    #[tokio::test]
    async fn test_mark_main_does_not_flip_flags_locally() {
        let a = item(0, true);
        let b = item(1, false);
        let b_id = b.id;
        let before = vec![a.clone(), b.clone()];

        let mut store = MockMediaStore::new();
        let mut seq = Sequence::new();
        store
            .expect_list()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(before.clone()));
        store
            .expect_mark_main()
            .with(mockall::predicate::always(), eq(b_id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(StoreError::Network("timed out".to_string())));
        let unchanged = vec![a.clone(), b];
        store
            .expect_list()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(unchanged.clone()));

        let controller = opened(store).await;
        assert!(controller.mark_main(b_id).await.is_err());

        // The failed request left the store untouched, so neither did the client
        assert_eq!(controller.main_item().await.map(|m| m.id), Some(a.id));
        assert_eq!(controller.pending_main().await, None);
        assert!(controller.last_error().await.is_some());
    }

    #[tokio::test]
    async fn test_failed_reorder_commit_reloads_authoritative_order() {
        let a = item(0, false);
        let b = item(1, false);
        let c = item(2, false);
        let original = vec![a.clone(), b.clone(), c.clone()];
        let expected = ReorderRequest::new(vec![c.id, a.id, b.id]);

        let mut store = MockMediaStore::new();
        let mut seq = Sequence::new();
        let first = original.clone();
        store
            .expect_list()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(first.clone()));
        store
            .expect_reorder()
            .with(mockall::predicate::always(), eq(expected.clone()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(StoreError::from_status(400, "Unknown photo id")));
        store
            .expect_list()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(original.clone()));

        let controller = opened(store).await;
        controller.drag_start(2).await.unwrap();
        assert!(controller.drag_over(1).await.unwrap());
        assert!(controller.drag_over(0).await.unwrap());
        assert_eq!(
            controller
                .items()
                .await
                .iter()
                .map(|i| i.id)
                .collect::<Vec<_>>(),
            expected.ids
        );

        let result = controller.drag_end().await;
        assert!(matches!(
            result,
            Err(GalleryError::Store(StoreError::Validation { status: 400, .. }))
        ));
        assert_eq!(controller.items().await, vec![a, b, c]);
        assert_eq!(
            controller.last_error().await.as_deref(),
            Some("Unknown photo id")
        );
    }

    #[tokio::test]
    async fn test_drag_without_change_sends_nothing() {
        let mut store = MockMediaStore::new();
        let listed = vec![item(0, false), item(1, false), item(2, false)];
        store
            .expect_list()
            .times(1)
            .returning(move |_| Ok(listed.clone()));
        store.expect_reorder().never();

        let controller = opened(store).await;
        controller.drag_start(1).await.unwrap();
        assert!(!controller.drag_over(1).await.unwrap());
        assert_eq!(controller.drag_end().await, Ok(DragOutcome::Unchanged));
        assert!(!controller.is_dragging().await);
    }

    #[tokio::test]
    async fn test_drag_returning_home_reloads_without_commit() {
        let mut store = MockMediaStore::new();
        let listed = vec![item(0, false), item(1, false), item(2, false)];
        store
            .expect_list()
            .times(2)
            .returning(move |_| Ok(listed.clone()));
        store.expect_reorder().never();

        let controller = opened(store).await;
        controller.drag_start(0).await.unwrap();
        controller.drag_over(2).await.unwrap();
        controller.drag_over(0).await.unwrap();
        assert_eq!(controller.drag_end().await, Ok(DragOutcome::Settled));
    }

    #[tokio::test]
    async fn test_restarted_drag_restores_shuffled_order() {
        let listed = vec![item(0, false), item(1, false), item(2, false)];
        let expected = listed.clone();

        let mut store = MockMediaStore::new();
        store
            .expect_list()
            .times(2)
            .returning(move |_| Ok(listed.clone()));
        store.expect_reorder().never();

        let controller = opened(store).await;
        controller.drag_start(0).await.unwrap();
        controller.drag_over(2).await.unwrap();
        assert_ne!(controller.items().await, expected);

        // The first gesture never ended
        controller.drag_start(1).await.unwrap();
        assert_eq!(controller.items().await, expected);
        assert!(controller.is_dragging().await);

        assert_eq!(controller.drag_end().await, Ok(DragOutcome::Unchanged));
        assert_eq!(controller.items().await, expected);
    }

    #[tokio::test]
    async fn test_restarted_drag_without_shuffle_does_not_reload() {
        let listed = vec![item(0, false), item(1, false)];

        let mut store = MockMediaStore::new();
        store
            .expect_list()
            .times(1)
            .returning(move |_| Ok(listed.clone()));

        let controller = opened(store).await;
        controller.drag_start(0).await.unwrap();
        controller.drag_start(1).await.unwrap();
        assert!(controller.is_dragging().await);
    }

    #[tokio::test]
    async fn test_drag_cancel_restores_store_order() {
        let listed = vec![item(0, false), item(1, false)];
        let expected = listed.clone();

        let mut store = MockMediaStore::new();
        store
            .expect_list()
            .times(2)
            .returning(move |_| Ok(listed.clone()));
        store.expect_reorder().never();

        let controller = opened(store).await;
        controller.drag_start(0).await.unwrap();
        controller.drag_over(1).await.unwrap();
        assert_ne!(controller.items().await, expected);

        controller.drag_cancel().await.unwrap();
        assert_eq!(controller.items().await, expected);
        assert_eq!(controller.drag_end().await, Ok(DragOutcome::Cancelled));
    }

    #[tokio::test]
    async fn test_reload_during_drag_cancels_gesture() {
        let listed = vec![item(0, false), item(1, false)];

        let mut store = MockMediaStore::new();
        store
            .expect_list()
            .times(2)
            .returning(move |_| Ok(listed.clone()));
        store.expect_reorder().never();

        let controller = opened(store).await;
        controller.drag_start(0).await.unwrap();
        controller.drag_over(1).await.unwrap();

        controller.load().await.unwrap();
        assert!(!controller.is_dragging().await);
        assert_eq!(controller.drag_end().await, Ok(DragOutcome::Cancelled));
    }

    #[tokio::test]
    async fn test_successful_upload_discards_queue_and_reloads() {
        let created = item(0, true);
        let after = vec![created.clone()];

        let mut store = MockMediaStore::new();
        let mut seq = Sequence::new();
        store
            .expect_list()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Vec::new()));
        let returned = vec![created.clone()];
        store
            .expect_upload()
            .withf(|_, batch| {
                batch.files.len() == 1 && batch.captions == vec![Some("Lobby".to_string())]
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Ok(returned.clone()));
        store
            .expect_list()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(after.clone()));

        let controller = opened(store).await;
        let mut queue = UploadQueue::default();
        queue
            .stage(
                UploadFile::new("lobby.jpg", "image/jpeg", vec![1, 2, 3]),
                Some("Lobby".to_string()),
            )
            .unwrap();

        controller.upload(&mut queue).await.unwrap();

        assert!(queue.is_empty());
        assert_eq!(controller.items().await, vec![created]);
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_entries_for_retry() {
        let mut store = MockMediaStore::new();
        store.expect_list().times(2).returning(|_| Ok(Vec::new()));
        store
            .expect_upload()
            .times(1)
            .returning(|_, _| Err(StoreError::from_status(413, "Upload too large")));

        let controller = opened(store).await;
        let mut queue = UploadQueue::default();
        queue
            .stage(UploadFile::new("a.png", "image/png", vec![1]), None)
            .unwrap();

        assert!(controller.upload(&mut queue).await.is_err());
        assert_eq!(queue.entries()[0].status, UploadStatus::Failed);
        assert_eq!(
            controller.last_error().await.as_deref(),
            Some("Upload too large")
        );

        controller.clear_error().await;
        assert_eq!(controller.last_error().await, None);
    }

    #[tokio::test]
    async fn test_upload_with_empty_queue_sends_nothing() {
        let mut store = MockMediaStore::new();
        store.expect_list().times(1).returning(|_| Ok(Vec::new()));
        store.expect_upload().never();

        let controller = opened(store).await;
        let mut queue = UploadQueue::default();
        assert_eq!(
            controller.upload(&mut queue).await,
            Err(GalleryError::Upload(UploadError::EmptyBatch))
        );
    }

    #[tokio::test]
    async fn test_failed_load_records_message() {
        let mut store = MockMediaStore::new();
        store
            .expect_list()
            .times(1)
            .returning(|_| Err(StoreError::Network("connection refused".to_string())));

        let controller = GalleryController::new(Arc::new(store));
        let result = controller.open(ParentRef::new("offices/1")).await;

        assert!(matches!(
            result,
            Err(GalleryError::Store(StoreError::Network(_)))
        ));
        assert!(!controller.is_loaded().await);
        assert!(controller.last_error().await.is_some());
    }
}
