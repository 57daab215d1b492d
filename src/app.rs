// SPDX-License-Identifier: MPL-2.0

use std::{fmt, str::FromStr};

use crate::{
    notes::{NoteCollection, StoreError},
    storage::{StorageError, WindowPlacement},
};
use thiserror::Error;

pub use search::{FindOutcome, SearchCursor, SearchHit};
pub use session::AppSession;

pub mod search;
mod session;

/// Identifies a note either by id or by its 1-based tab position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteRef {
    Id(String),
    Position(usize),
}

impl NoteRef {
    /// Resolves to a collection index.
    #[must_use]
    pub fn resolve(&self, notes: &NoteCollection) -> Option<usize> {
        match self {
            Self::Id(id) => notes.position(id),
            Self::Position(n) => n
                .checked_sub(1)
                .filter(|index| *index < notes.get_notes_count()),
        }
    }
}

impl fmt::Display for NoteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Position(n) => write!(f, "#{n}"),
        }
    }
}

/// User actions, each mapped onto one store, search or persistence call.
/// Every action applies to the active note.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddNote,
    SelectNote(NoteRef),
    RenameNote(String),
    DeleteNote,
    SetBody(String),
    SetFontSize(f64),
    ZoomIn,
    ZoomOut,
    ToggleHighlight(String),
    ToggleAlwaysOnTop,
    Save,
    FindNext(String),
    FindPrevious(String),
    SearchAll(String),
    /// Jump to a hit of the latest `SearchAll` by its 1-based number.
    OpenHit(usize),
    Close(Option<WindowPlacement>),
}

/// Result of a dispatched command, rendered as status text.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    NoteAdded { title: String },
    NoteSelected { title: String },
    Renamed { title: String },
    RenameIgnored,
    NoteDeleted { title: String, selected: String },
    BodyUpdated,
    FontSize(f64),
    Highlight { name: String, is_known: bool },
    AlwaysOnTop(bool),
    Saved,
    Find(FindOutcome),
    SearchResults(Vec<SearchHit>),
    Closed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoteAdded { title } => write!(f, "Added {title}"),
            Self::NoteSelected { title } => write!(f, "{title}"),
            Self::Renamed { title } => write!(f, "Renamed to {title}"),
            Self::RenameIgnored => write!(f, "Title is empty, nothing renamed"),
            Self::NoteDeleted { title, selected } => {
                write!(f, "Deleted {title}, now at {selected}")
            }
            Self::BodyUpdated => write!(f, "Text updated"),
            Self::FontSize(size) => write!(f, "Font size {size}"),
            Self::Highlight {
                name,
                is_known: true,
            } => write!(f, "Highlight {name}"),
            Self::Highlight {
                name,
                is_known: false,
            } => write!(f, "Highlight '{name}' not found"),
            Self::AlwaysOnTop(on) => {
                write!(f, "Always on top {}", if *on { "on" } else { "off" })
            }
            Self::Saved => write!(f, "Configuration saved"),
            Self::Find(FindOutcome::Found { offset, .. }) => {
                write!(f, "Found at position {offset}")
            }
            Self::Find(FindOutcome::NotFound) => write!(f, "Nothing found"),
            Self::Find(FindOutcome::NoQuery) => write!(f, "Nothing to find"),
            Self::SearchResults(hits) if hits.is_empty() => write!(f, "Nothing found"),
            Self::SearchResults(hits) => {
                write!(f, "{} found", hits.len())?;
                for (n, hit) in hits.iter().enumerate() {
                    write!(f, "\n  {}. {hit}", n + 1)?;
                }
                Ok(())
            }
            Self::Closed => write!(f, "Closed"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Note {0} is not found")]
    UnknownNote(NoteRef),
    #[error("Search result {0} is not found")]
    UnknownHit(usize),
    #[error("Invalid font size: {0}")]
    InvalidFontSize(f64),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    /// Parses `<verb> [argument]`; the argument is the rest of the line.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let required = |name: &'static str| {
            if rest.trim().is_empty() {
                Err(ParseCommandError::MissingArgument(name))
            } else {
                Ok(rest.to_string())
            }
        };
        let number = |name: &'static str| -> Result<usize, ParseCommandError> {
            let arg = required(name)?;
            arg.trim()
                .parse::<usize>()
                .map_err(|_| ParseCommandError::InvalidNumber(arg.trim().to_string()))
        };
        match verb {
            "" => Err(ParseCommandError::Empty),
            "add" => Ok(Self::AddNote),
            "select" => {
                let arg = required("select")?;
                let arg = arg.trim();
                Ok(Self::SelectNote(arg.parse().map_or_else(
                    |_| NoteRef::Id(arg.to_string()),
                    NoteRef::Position,
                )))
            }
            // blank titles are kept so the store decides to ignore them
            "rename" => Ok(Self::RenameNote(rest.to_string())),
            "delete" => Ok(Self::DeleteNote),
            "text" => Ok(Self::SetBody(unescape(rest))),
            "font" => {
                let arg = required("font")?;
                arg.trim()
                    .parse::<f64>()
                    .map(Self::SetFontSize)
                    .map_err(|_| ParseCommandError::InvalidNumber(arg.trim().to_string()))
            }
            "zoom+" => Ok(Self::ZoomIn),
            "zoom-" => Ok(Self::ZoomOut),
            "highlight" => {
                required("highlight").map(|name| Self::ToggleHighlight(name.trim().to_string()))
            }
            "top" => Ok(Self::ToggleAlwaysOnTop),
            "save" => Ok(Self::Save),
            "next" => Ok(Self::FindNext(rest.to_string())),
            "prev" => Ok(Self::FindPrevious(rest.to_string())),
            "search" => Ok(Self::SearchAll(rest.to_string())),
            "open" => number("open").map(Self::OpenHit),
            "close" => Ok(Self::Close(None)),
            other => Err(ParseCommandError::Unknown(other.to_string())),
        }
    }
}

// `\n` and `\t` in a one-line argument become real line breaks and tabs
fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

#[test]
fn parse_commands() {
    assert_eq!("add".parse::<Command>(), Ok(Command::AddNote));
    assert_eq!("  delete  ".parse::<Command>(), Ok(Command::DeleteNote));
    assert_eq!(
        "rename   My list ".parse::<Command>(),
        Ok(Command::RenameNote("  My list ".to_string()))
    );
    assert_eq!("rename".parse::<Command>(), Ok(Command::RenameNote(String::new())));
    assert_eq!(
        "select 2".parse::<Command>(),
        Ok(Command::SelectNote(NoteRef::Position(2)))
    );
    assert_eq!(
        "select 20250101_101010".parse::<Command>(),
        Ok(Command::SelectNote(NoteRef::Id("20250101_101010".to_string())))
    );
    assert_eq!("font 16.5".parse::<Command>(), Ok(Command::SetFontSize(16.5)));
    assert_eq!(
        "highlight Plain Text".parse::<Command>(),
        Ok(Command::ToggleHighlight("Plain Text".to_string()))
    );
    assert_eq!("next abc".parse::<Command>(), Ok(Command::FindNext("abc".to_string())));
    assert_eq!("open 3".parse::<Command>(), Ok(Command::OpenHit(3)));
    assert_eq!(
        "text first\\nsecond".parse::<Command>(),
        Ok(Command::SetBody("first\nsecond".to_string()))
    );
}

#[test]
fn parse_errors() {
    assert_eq!("".parse::<Command>(), Err(ParseCommandError::Empty));
    assert_eq!(
        "fly".parse::<Command>(),
        Err(ParseCommandError::Unknown("fly".to_string()))
    );
    assert_eq!(
        "font".parse::<Command>(),
        Err(ParseCommandError::MissingArgument("font"))
    );
    assert_eq!(
        "font big".parse::<Command>(),
        Err(ParseCommandError::InvalidNumber("big".to_string()))
    );
    assert_eq!(
        "open x".parse::<Command>(),
        Err(ParseCommandError::InvalidNumber("x".to_string()))
    );
}

#[test]
fn unescape_keeps_unknown_sequences() {
    assert_eq!(unescape("a\\tb\\\\c\\q\\"), "a\tb\\c\\q\\");
}

#[test]
fn note_ref_resolves() {
    let mut notes = NoteCollection::default();
    let id = notes.new_note();
    assert_eq!(NoteRef::Position(2).resolve(&notes), Some(1));
    assert_eq!(NoteRef::Position(0).resolve(&notes), None);
    assert_eq!(NoteRef::Position(3).resolve(&notes), None);
    assert_eq!(NoteRef::Id(id).resolve(&notes), Some(1));
    assert_eq!(NoteRef::Id("nope".to_string()).resolve(&notes), None);
}

#[test]
fn outcome_status_text() {
    assert_eq!(Outcome::Saved.to_string(), "Configuration saved");
    assert_eq!(
        Outcome::Find(FindOutcome::Found { offset: 4, len: 2 }).to_string(),
        "Found at position 4"
    );
    assert_eq!(Outcome::Find(FindOutcome::NotFound).to_string(), "Nothing found");
    assert_eq!(
        Outcome::Highlight {
            name: "Cobol".to_string(),
            is_known: false
        }
        .to_string(),
        "Highlight 'Cobol' not found"
    );
    assert_eq!(Outcome::SearchResults(Vec::new()).to_string(), "Nothing found");
}
