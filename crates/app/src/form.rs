//! Note creation form session.

use std::sync::Arc;

use notehub_core::{validate, CreateNote, FieldErrors, Note, NoteDraft};

use crate::mutation::{MutationController, MutationError};

/// Result of [`NoteForm::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The note was created; the form is reset and may be closed.
    Created(Note),
    /// The draft failed validation; nothing was sent.
    Invalid(FieldErrors),
    /// The request failed; the draft is kept for another attempt.
    Failed(MutationError),
}

/// One open "new note" form: a draft, the errors from the last validation,
/// and the mutation controller it submits through.
pub struct NoteForm {
    draft: NoteDraft,
    errors: FieldErrors,
    mutations: Arc<MutationController>,
}

impl NoteForm {
    pub fn new(mutations: Arc<MutationController>) -> Self {
        Self {
            draft: NoteDraft::default(),
            errors: FieldErrors::default(),
            mutations,
        }
    }

    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    /// Errors from the most recent [`validate`](Self::validate) or
    /// [`submit`](Self::submit).
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.draft.content = content.into();
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.draft.tag = tag.into();
    }

    /// Re-run validation on the current draft.
    pub fn validate(&mut self) -> &FieldErrors {
        self.errors = validate(&self.draft);
        &self.errors
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        let body = match CreateNote::try_from(&self.draft) {
            Ok(body) => body,
            Err(errors) => {
                tracing::debug!(fields = errors.len(), "Draft rejected by validation");
                self.errors = errors.clone();
                return SubmitOutcome::Invalid(errors);
            }
        };
        self.errors = FieldErrors::default();

        match self.mutations.create(body).await {
            Ok(note) => {
                self.draft = NoteDraft::default();
                SubmitOutcome::Created(note)
            }
            Err(err) => SubmitOutcome::Failed(err),
        }
    }

    /// Close the form, discarding the draft.
    pub fn cancel(self) {
        tracing::debug!(title = %self.draft.title, "Note form cancelled");
        self.mutations.reset();
    }
}
