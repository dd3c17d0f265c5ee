//! NoteHub in-process event bus.
//!
//! - [`EventBus`] — publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`NotesEvent`] — state changes other components react to, most
//!   importantly query-family invalidation after a mutation.

pub mod bus;

pub use bus::{EventBus, NotesEvent};
