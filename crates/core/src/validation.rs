//! Client-side validation of the note creation form.
//!
//! Field rules are attached to [`NoteDraft`] through the `validator`
//! derive and collapsed into [`FieldErrors`], one message per field, so
//! the form can show each message next to the offending input.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::note::{NoteDraft, Tag};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const TITLE_MIN_LENGTH: usize = 3;
pub const TITLE_MAX_LENGTH: usize = 50;
pub const CONTENT_MAX_LENGTH: usize = 500;

pub const CODE_REQUIRED: &str = "required";
pub const CODE_MIN_LENGTH: &str = "min_length";
pub const CODE_MAX_LENGTH: &str = "max_length";
pub const CODE_INVALID_TAG: &str = "invalid_tag";

// ---------------------------------------------------------------------------
// Field errors
// ---------------------------------------------------------------------------

/// Draft field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DraftField {
    Title,
    Content,
    Tag,
}

impl DraftField {
    pub fn as_str(self) -> &'static str {
        match self {
            DraftField::Title => "title",
            DraftField::Content => "content",
            DraftField::Tag => "tag",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(DraftField::Title),
            "content" => Some(DraftField::Content),
            "tag" => Some(DraftField::Tag),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Machine-readable rule code, e.g. `"min_length"`.
    pub code: String,
    /// Message shown next to the field.
    pub message: String,
}

/// Validation outcome keyed by field. Empty means the draft may be
/// submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<DraftField, FieldError>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: DraftField) -> Option<&FieldError> {
        self.0.get(&field)
    }

    pub fn contains(&self, field: DraftField) -> bool {
        self.0.contains_key(&field)
    }

    /// Errors in field order (title, content, tag).
    pub fn iter(&self) -> impl Iterator<Item = (DraftField, &FieldError)> {
        self.0.iter().map(|(field, error)| (*field, error))
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = BTreeMap::new();

        for (name, field_errors) in errors.field_errors() {
            let Some(field) = DraftField::from_name(&name) else {
                continue;
            };
            // Each rule function reports at most one error per field.
            if let Some(first) = field_errors.first() {
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| first.code.to_string());
                fields.insert(
                    field,
                    FieldError {
                        code: first.code.to_string(),
                        message,
                    },
                );
            }
        }

        Self(fields)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, error)| format!("{}: {}", field.as_str(), error.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

// ---------------------------------------------------------------------------
// Validation pass
// ---------------------------------------------------------------------------

/// Run every field rule against the draft.
///
/// Pure and synchronous; an empty result means the draft may be submitted.
pub fn validate(draft: &NoteDraft) -> FieldErrors {
    match draft.validate() {
        Ok(()) => FieldErrors::default(),
        Err(errors) => errors.into(),
    }
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

pub(crate) fn validate_title(title: &str) -> Result<(), ValidationError> {
    let length = title.chars().count();
    if length == 0 {
        return Err(rule_error(CODE_REQUIRED, "The title is required"));
    }
    if length < TITLE_MIN_LENGTH {
        return Err(rule_error(CODE_MIN_LENGTH, "Enter at least three characters"));
    }
    if length > TITLE_MAX_LENGTH {
        return Err(rule_error(CODE_MAX_LENGTH, "The fifty character limit exceeded"));
    }
    Ok(())
}

pub(crate) fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.chars().count() > CONTENT_MAX_LENGTH {
        return Err(rule_error(
            CODE_MAX_LENGTH,
            "Five hundred characters are allowed only",
        ));
    }
    Ok(())
}

pub(crate) fn validate_tag(tag: &str) -> Result<(), ValidationError> {
    if tag.is_empty() {
        return Err(rule_error(CODE_REQUIRED, "The tag is required"));
    }
    if tag.parse::<Tag>().is_err() {
        return Err(rule_error(CODE_INVALID_TAG, "Invalid tag"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, content: &str, tag: &str) -> NoteDraft {
        NoteDraft::new(title, content, tag)
    }

    // -- whole-draft outcomes -------------------------------------------------

    #[test]
    fn valid_draft_has_no_errors() {
        let errors = validate(&draft("Valid Title", "Some content", "Todo"));
        assert!(errors.is_empty());
    }

    #[test]
    fn short_title_is_the_only_error() {
        let errors = validate(&draft("ab", "", "Work"));
        assert_eq!(errors.len(), 1);
        let title = errors.get(DraftField::Title).expect("title error");
        assert_eq!(title.code, CODE_MIN_LENGTH);
        assert_eq!(title.message, "Enter at least three characters");
    }

    #[test]
    fn unknown_tag_is_the_only_error() {
        let errors = validate(&draft("Valid Title", "", "Invalid"));
        assert_eq!(errors.len(), 1);
        let tag = errors.get(DraftField::Tag).expect("tag error");
        assert_eq!(tag.code, CODE_INVALID_TAG);
        assert_eq!(tag.message, "Invalid tag");
    }

    #[test]
    fn empty_draft_reports_title_and_tag() {
        let errors = validate(&NoteDraft::default());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get(DraftField::Title).unwrap().code, CODE_REQUIRED);
        assert_eq!(errors.get(DraftField::Tag).unwrap().code, CODE_REQUIRED);
        assert!(!errors.contains(DraftField::Content));
    }

    #[test]
    fn errors_iterate_in_field_order() {
        let long_content = "x".repeat(CONTENT_MAX_LENGTH + 1);
        let errors = validate(&draft("", &long_content, "nope"));
        let fields: Vec<DraftField> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(
            fields,
            vec![DraftField::Title, DraftField::Content, DraftField::Tag]
        );
    }

    #[test]
    fn display_joins_field_messages() {
        let errors = validate(&draft("ab", "", ""));
        assert_eq!(
            errors.to_string(),
            "title: Enter at least three characters; tag: The tag is required"
        );
    }

    // -- title boundaries -----------------------------------------------------

    #[test]
    fn title_length_boundaries() {
        assert!(validate_title("abc").is_ok());
        assert!(validate_title(&"a".repeat(TITLE_MAX_LENGTH)).is_ok());

        let too_long = validate_title(&"a".repeat(TITLE_MAX_LENGTH + 1)).unwrap_err();
        assert_eq!(too_long.code, CODE_MAX_LENGTH);
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        // Three characters, nine bytes.
        assert!(validate_title("ééé").is_ok());
        assert!(validate_title(&"ж".repeat(TITLE_MAX_LENGTH)).is_ok());
    }

    // -- content --------------------------------------------------------------

    #[test]
    fn content_may_be_empty_or_at_limit() {
        assert!(validate_content("").is_ok());
        assert!(validate_content(&"c".repeat(CONTENT_MAX_LENGTH)).is_ok());
    }

    #[test]
    fn content_over_limit_rejected() {
        let err = validate_content(&"c".repeat(CONTENT_MAX_LENGTH + 1)).unwrap_err();
        assert_eq!(err.code, CODE_MAX_LENGTH);
    }

    // -- tag ------------------------------------------------------------------

    #[test]
    fn every_known_tag_accepted() {
        for name in Tag::names() {
            assert!(validate_tag(name).is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn tag_is_case_sensitive() {
        assert_eq!(validate_tag("work").unwrap_err().code, CODE_INVALID_TAG);
    }
}
