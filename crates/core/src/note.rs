//! Note data model as served by the remote notes API.
//!
//! Wire format is camelCase JSON. [`Note`] and [`NotePage`] are owned by
//! the server and never mutated after receipt; [`NoteDraft`] is the
//! editable form state and [`CreateNote`] the validated request body built
//! from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{NoteId, Timestamp};
use crate::validation::{validate, validate_content, validate_tag, validate_title, FieldErrors};

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// Fixed set of note categories accepted by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Work,
    Personal,
    Meeting,
    Shopping,
    Todo,
}

impl Tag {
    /// Every tag, in display order.
    pub const ALL: [Tag; 5] = [
        Tag::Work,
        Tag::Personal,
        Tag::Meeting,
        Tag::Shopping,
        Tag::Todo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Work => "Work",
            Tag::Personal => "Personal",
            Tag::Meeting => "Meeting",
            Tag::Shopping => "Shopping",
            Tag::Todo => "Todo",
        }
    }

    /// Wire names of every tag.
    pub fn names() -> [&'static str; 5] {
        Self::ALL.map(Tag::as_str)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-sensitive: only the exact wire name is accepted.
impl FromStr for Tag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| CoreError::InvalidTag(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Note / NotePage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub tag: Tag,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// One page of a list query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePage {
    pub notes: Vec<Note>,
    pub total_pages: u32,
}

// ---------------------------------------------------------------------------
// Draft / request body
// ---------------------------------------------------------------------------

/// Editable state of the note creation form.
///
/// The tag is raw text because the form may hold a value outside the
/// accepted set until validation rejects it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct NoteDraft {
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[validate(custom(function = "validate_content"))]
    pub content: String,
    #[validate(custom(function = "validate_tag"))]
    pub tag: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tag: tag.into(),
        }
    }
}

/// Request body for `POST {base}`. Only constructible from a valid draft
/// or from already-typed parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNote {
    pub title: String,
    pub content: String,
    pub tag: Tag,
}

impl TryFrom<&NoteDraft> for CreateNote {
    type Error = FieldErrors;

    fn try_from(draft: &NoteDraft) -> Result<Self, Self::Error> {
        let errors = validate(draft);
        if !errors.is_empty() {
            return Err(errors);
        }

        // A draft that passed validation always carries a known tag.
        let tag = draft.tag.parse::<Tag>().map_err(|_| errors)?;

        Ok(Self {
            title: draft.title.clone(),
            content: draft.content.clone(),
            tag,
        })
    }
}
