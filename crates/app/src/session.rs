//! Terminal session: routes typed lines to the query handle, the mutation
//! controller or the open note form.

use std::sync::Arc;

use crate::command::{parse_browse, parse_form, BrowseCommand, FormCommand};
use crate::form::{NoteForm, SubmitOutcome};
use crate::mutation::MutationController;
use crate::query::QueryHandle;
use crate::render::{help_text, render_draft, render_field_errors};

/// What the front end should do after a line was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print the text (possibly empty) and read the next line.
    Continue(String),
    Quit,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Reply::Continue(text.into())
    }

    fn silent() -> Self {
        Reply::Continue(String::new())
    }
}

pub struct Session {
    query: QueryHandle,
    mutations: Arc<MutationController>,
    form: Option<NoteForm>,
}

impl Session {
    pub fn new(query: QueryHandle, mutations: Arc<MutationController>) -> Self {
        Self {
            query,
            mutations,
            form: None,
        }
    }

    /// Whether the note form is open.
    pub fn in_form(&self) -> bool {
        self.form.is_some()
    }

    pub fn prompt(&self) -> &'static str {
        if self.in_form() {
            "new note> "
        } else {
            "notes> "
        }
    }

    pub async fn handle_line(&mut self, line: &str) -> Reply {
        if self.form.is_some() {
            self.handle_form_line(line).await
        } else {
            self.handle_browse_line(line).await
        }
    }

    async fn handle_browse_line(&mut self, line: &str) -> Reply {
        let command = match parse_browse(line) {
            None => return Reply::silent(),
            Some(Err(err)) => return Reply::text(err.to_string()),
            Some(Ok(command)) => command,
        };

        match command {
            BrowseCommand::Search(text) => self.query.set_search(text),
            BrowseCommand::Page(page) => self.query.set_page(page),
            BrowseCommand::Next => self.query.next_page(),
            BrowseCommand::Prev => self.query.prev_page(),
            BrowseCommand::Refresh => self.query.refetch(),
            BrowseCommand::New => {
                let form = NoteForm::new(self.mutations.clone());
                let text = render_draft(form.draft());
                self.form = Some(form);
                return Reply::text(text);
            }
            BrowseCommand::Delete(id) => {
                return match self.mutations.delete(&id).await {
                    Ok(note) => Reply::text(format!("Deleted note '{}' ({})", note.title, note.id)),
                    Err(err) => Reply::text(format!("Could not delete note {id}: {err}")),
                };
            }
            BrowseCommand::Help => return Reply::text(help_text()),
            BrowseCommand::Quit => return Reply::Quit,
        }
        Reply::silent()
    }

    async fn handle_form_line(&mut self, line: &str) -> Reply {
        let command = match parse_form(line) {
            None => return Reply::silent(),
            Some(Err(err)) => return Reply::text(err.to_string()),
            Some(Ok(command)) => command,
        };

        let Some(form) = self.form.as_mut() else {
            return Reply::silent();
        };

        match command {
            FormCommand::Title(title) => form.set_title(title),
            FormCommand::Content(content) => form.set_content(content),
            FormCommand::Tag(tag) => form.set_tag(tag),
            FormCommand::Help => return Reply::text(help_text()),
            FormCommand::Cancel => {
                if let Some(form) = self.form.take() {
                    form.cancel();
                }
                return Reply::text("Note discarded");
            }
            FormCommand::Submit => {
                return match form.submit().await {
                    SubmitOutcome::Created(note) => {
                        self.form = None;
                        Reply::text(format!("Created note '{}' ({})", note.title, note.id))
                    }
                    SubmitOutcome::Invalid(errors) => Reply::text(format!(
                        "Please fix the following:\n{}",
                        render_field_errors(&errors)
                    )),
                    SubmitOutcome::Failed(err) => Reply::text(format!(
                        "Could not create note: {err}\nYour draft was kept; type 'submit' to retry"
                    )),
                };
            }
        }
        Reply::text(render_draft(form.draft()))
    }
}
