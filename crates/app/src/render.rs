//! Plain-text rendering of query and form state.

use std::fmt::Write as _;

use notehub_core::{FieldErrors, NoteDraft};

use crate::query::QueryView;

pub fn render_view(view: &QueryView) -> String {
    let mut out = String::new();

    if view.search_input.is_empty() {
        out.push_str("Search: (none)\n");
    } else {
        let _ = writeln!(out, "Search: {}", view.search_input);
    }

    if view.is_loading() {
        out.push_str("Loading...\n");
        return out;
    }

    if let Some(err) = &view.error {
        let _ = writeln!(out, "Error: {err}");
    }

    let notes = view.notes();
    if notes.is_empty() && view.data.is_some() {
        out.push_str("No notes found.\n");
    }
    for note in notes {
        let _ = writeln!(out, "  [{}] {} ({})", note.tag, note.title, note.id);
    }

    if let Some(pagination) = view.pagination() {
        let _ = writeln!(
            out,
            "Page {} of {}",
            pagination.current_page, pagination.total_pages
        );
    }

    if view.is_fetching {
        out.push_str("Updating...\n");
    }

    out
}

pub fn render_draft(draft: &NoteDraft) -> String {
    format!(
        "New note\n  title:   {}\n  content: {}\n  tag:     {}\n",
        draft.title, draft.content, draft.tag
    )
}

pub fn render_field_errors(errors: &FieldErrors) -> String {
    let mut out = String::new();
    for (field, error) in errors.iter() {
        let _ = writeln!(out, "  {}: {}", field.as_str(), error.message);
    }
    out
}

pub fn help_text() -> &'static str {
    "Commands:\n\
     \x20 search [text]   filter notes (no text clears the filter)\n\
     \x20 page <n>        go to page n\n\
     \x20 next | prev     move between pages\n\
     \x20 refresh         reload the current page\n\
     \x20 new             open the note form\n\
     \x20 delete <id>     delete a note\n\
     \x20 quit            exit\n\
     Form commands:\n\
     \x20 title <text> | content <text> | tag <name> | submit | cancel\n\
     Tags: Work, Personal, Meeting, Shopping, Todo\n"
}
