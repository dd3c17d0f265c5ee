//! REST client for the remote NoteHub notes API.
//!
//! Provides the [`NotesApi`] seam consumed by the controllers, its
//! [`reqwest`]-backed implementation [`NotesClient`], and the
//! environment-driven [`ClientConfig`].

pub mod api;
pub mod config;

pub use api::{NotesApi, NotesApiError, NotesClient, DEFAULT_PAGE_SIZE};
pub use config::{ClientConfig, ConfigError};
