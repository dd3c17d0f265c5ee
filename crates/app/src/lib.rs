//! `notehub-app` library crate.
//!
//! Query and mutation data flow for the NoteHub client: a namespaced
//! query cache, the debounced search/pagination controller, the create and
//! delete mutation controller, the note form session, and the terminal
//! front end that drives them. The binary entrypoint lives in `main.rs`.

pub mod cache;
pub mod command;
pub mod config;
pub mod debounce;
pub mod form;
pub mod mutation;
pub mod query;
pub mod render;
pub mod session;
