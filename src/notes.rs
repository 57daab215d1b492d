// SPDX-License-Identifier: MPL-2.0

pub use collection::{NoteCollection, StoreError};
pub use note_data::Note;

mod collection;
mod note_data;

pub const DEF_FONT_SIZE: f64 = 14.0;
pub const MIN_FONT_SIZE: f64 = 6.0;
pub const MAX_FONT_SIZE: f64 = 72.0;
pub const DEF_HIGHLIGHT: &str = "Markdown";
/// Sentinel highlight label meaning "no syntax highlighting".
pub const PLAIN_TEXT: &str = "Plain Text";
const ID_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Highlight modes offered to the user, `PLAIN_TEXT` first.
pub const KNOWN_HIGHLIGHTS: &[&str] = &[
    PLAIN_TEXT,
    "C++",
    "C#",
    "CSS",
    "HTML",
    "Java",
    "JavaScript",
    "Json",
    "Markdown",
    "PHP",
    "PowerShell",
    "Python",
    "Rust",
    "TeX",
    "TSQL",
    "VB",
    "XML",
];

#[must_use]
pub fn is_known_highlight(name: &str) -> bool {
    KNOWN_HIGHLIGHTS.contains(&name)
}
