use crate::note::Tag;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid tag '{0}'. Must be one of: {names}", names = Tag::names().join(", "))]
    InvalidTag(String),
}
