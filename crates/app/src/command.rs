//! Line commands for the terminal front end.

use notehub_core::NoteId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    /// `search [text]`; no text clears the search.
    Search(String),
    Page(u32),
    Next,
    Prev,
    Refresh,
    New,
    Delete(NoteId),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    Title(String),
    Content(String),
    Tag(String),
    Submit,
    Cancel,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for a list of commands")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("Invalid page number '{0}'")]
    InvalidPage(String),
}

/// Split a line into its command word and the remaining text.
fn split(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start().trim_end_matches(['\r', '\n'])),
        None => (line.trim_end(), ""),
    }
}

fn required<'a>(name: &'static str, rest: &'a str) -> Result<&'a str, CommandError> {
    let arg = rest.trim();
    if arg.is_empty() {
        Err(CommandError::MissingArgument(name))
    } else {
        Ok(arg)
    }
}

/// Parse a command typed while browsing the list. `None` for a blank line.
pub fn parse_browse(line: &str) -> Option<Result<BrowseCommand, CommandError>> {
    let (word, rest) = split(line);
    if word.is_empty() {
        return None;
    }

    let command = match word {
        "search" | "s" => Ok(BrowseCommand::Search(rest.to_string())),
        "page" | "p" => required("page", rest).and_then(|arg| {
            arg.parse::<u32>()
                .map(BrowseCommand::Page)
                .map_err(|_| CommandError::InvalidPage(arg.to_string()))
        }),
        "next" | "n" => Ok(BrowseCommand::Next),
        "prev" => Ok(BrowseCommand::Prev),
        "refresh" | "r" => Ok(BrowseCommand::Refresh),
        "new" => Ok(BrowseCommand::New),
        "delete" | "rm" => {
            required("delete", rest).map(|id| BrowseCommand::Delete(NoteId::from(id)))
        }
        "help" | "?" => Ok(BrowseCommand::Help),
        "quit" | "q" | "exit" => Ok(BrowseCommand::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    };
    Some(command)
}

/// Parse a command typed while the note form is open. Field values are
/// taken verbatim so that validation sees exactly what was typed.
pub fn parse_form(line: &str) -> Option<Result<FormCommand, CommandError>> {
    let (word, rest) = split(line);
    if word.is_empty() {
        return None;
    }

    let command = match word {
        "title" => Ok(FormCommand::Title(rest.to_string())),
        "content" => Ok(FormCommand::Content(rest.to_string())),
        "tag" => Ok(FormCommand::Tag(rest.trim().to_string())),
        "submit" => Ok(FormCommand::Submit),
        "cancel" => Ok(FormCommand::Cancel),
        "help" | "?" => Ok(FormCommand::Help),
        other => Err(CommandError::Unknown(other.to_string())),
    };
    Some(command)
}
