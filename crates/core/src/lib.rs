//! Domain types and client-side validation for NoteHub.
//!
//! This crate has no internal dependencies so it can be shared by the API
//! client, the controllers and the terminal front end.

pub mod error;
pub mod note;
pub mod types;
pub mod validation;

pub use error::CoreError;
pub use note::{CreateNote, Note, NoteDraft, NotePage, Tag};
pub use types::{NoteId, Timestamp};
pub use validation::{validate, DraftField, FieldError, FieldErrors};
