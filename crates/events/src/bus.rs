//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`NotesEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` between the query cache, the
//! controllers and the front end.

use notehub_core::NoteId;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// NotesEvent
// ---------------------------------------------------------------------------

/// A state change that other components may need to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesEvent {
    /// Every cached result under `namespace` was marked stale. Active
    /// queries in that namespace should refetch.
    QueryInvalidated { namespace: String },

    /// The server accepted a new note.
    NoteCreated { note_id: NoteId },

    /// The server deleted a note.
    NoteDeleted { note_id: NoteId },
}

impl NotesEvent {
    /// Whether this event invalidates queries in `namespace`.
    pub fn invalidates(&self, namespace: &str) -> bool {
        matches!(self, NotesEvent::QueryInvalidated { namespace: ns } if ns == namespace)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`NotesEvent`].
///
/// # Usage
///
/// ```rust
/// use notehub_events::bus::{EventBus, NotesEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(NotesEvent::QueryInvalidated { namespace: "notes".into() });
/// ```
pub struct EventBus {
    sender: broadcast::Sender<NotesEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: NotesEvent) {
        match self.sender.send(event) {
            Ok(receivers) => tracing::trace!(receivers, "Published notes event"),
            // Zero receivers; nothing is listening yet.
            Err(_) => tracing::trace!("Notes event published with no subscribers"),
        }
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<NotesEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
