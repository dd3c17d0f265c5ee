//! Create and delete mutations with cache invalidation.
//!
//! At most one mutation runs at a time. Its lifecycle
//! `Idle → Submitting → Succeeded | Failed` is published through a `watch`
//! channel. A successful mutation marks every cached notes list stale,
//! which in turn makes the active query refetch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use notehub_client::{NotesApi, NotesApiError};
use notehub_core::{CreateNote, Note, NoteId};
use notehub_events::{EventBus, NotesEvent};
use tokio::sync::watch;

use crate::query::{NotesCache, NOTES_NAMESPACE};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MutationError {
    #[error("Another note operation is still in progress")]
    InFlight,

    #[error(transparent)]
    Api(#[from] NotesApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationStatus {
    Idle,
    Submitting,
    Succeeded(Note),
    Failed(MutationError),
}

/// Runs note mutations against the API and keeps the query cache honest.
pub struct MutationController {
    api: Arc<dyn NotesApi>,
    cache: Arc<NotesCache>,
    bus: Arc<EventBus>,
    in_flight: AtomicBool,
    status: watch::Sender<MutationStatus>,
}

/// Clears the in-flight flag when the mutation future completes or is
/// dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl MutationController {
    pub fn new(api: Arc<dyn NotesApi>, cache: Arc<NotesCache>, bus: Arc<EventBus>) -> Self {
        let (status, _) = watch::channel(MutationStatus::Idle);
        Self {
            api,
            cache,
            bus,
            in_flight: AtomicBool::new(false),
            status,
        }
    }

    pub fn status(&self) -> MutationStatus {
        self.status.borrow().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Create a note. No optimistic insertion: lists pick the note up on
    /// refetch.
    pub async fn create(&self, body: CreateNote) -> Result<Note, MutationError> {
        let _guard = self.begin()?;
        tracing::info!(title = %body.title, tag = %body.tag, "Creating note");

        let result = self.api.create(&body).await;
        let note = self.finish(result).await?;

        tracing::info!(note_id = %note.id, "Note created");
        self.bus.publish(NotesEvent::NoteCreated {
            note_id: note.id.clone(),
        });
        Ok(note)
    }

    /// Delete a note by id.
    pub async fn delete(&self, id: &NoteId) -> Result<Note, MutationError> {
        let _guard = self.begin()?;
        tracing::info!(note_id = %id, "Deleting note");

        let result = self.api.delete(id).await;
        let note = self.finish(result).await?;

        tracing::info!(note_id = %note.id, "Note deleted");
        self.bus.publish(NotesEvent::NoteDeleted {
            note_id: note.id.clone(),
        });
        Ok(note)
    }

    /// Return to `Idle` unless a mutation is running.
    pub fn reset(&self) {
        if !self.is_submitting() {
            self.status.send_replace(MutationStatus::Idle);
        }
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, MutationError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Mutation rejected: another one is in flight");
            return Err(MutationError::InFlight);
        }
        self.status.send_replace(MutationStatus::Submitting);
        Ok(InFlightGuard(&self.in_flight))
    }

    async fn finish(&self, result: Result<Note, NotesApiError>) -> Result<Note, MutationError> {
        match result {
            Ok(note) => {
                self.cache.invalidate(NOTES_NAMESPACE).await;
                self.status
                    .send_replace(MutationStatus::Succeeded(note.clone()));
                Ok(note)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Note mutation failed");
                let err = MutationError::from(err);
                self.status.send_replace(MutationStatus::Failed(err.clone()));
                Err(err)
            }
        }
    }
}
