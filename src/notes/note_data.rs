// SPDX-License-Identifier: MPL-2.0

use super::{DEF_FONT_SIZE, DEF_HIGHLIGHT, PLAIN_TEXT};

/// One tab of the sticky window.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct Note {
    id: String,
    title: String,
    #[serde(rename = "content")]
    body: String,
    highlight: String,
    font_size: f64,
    #[serde(skip)]
    is_dirty: bool,
}

impl Default for Note {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            body: String::new(),
            highlight: DEF_HIGHLIGHT.to_string(),
            font_size: DEF_FONT_SIZE,
            is_dirty: false,
        }
    }
}

// dirty flag is session state, not content
impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.body == other.body
            && self.highlight == other.highlight
            && self.font_size == other.font_size
    }
}

impl Note {
    #[must_use]
    pub fn new(id: String, title: String) -> Self {
        Self {
            id,
            title,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(super) fn renew_id(&mut self, id: String) {
        self.id = id;
        self.is_dirty = true;
    }

    #[must_use]
    pub fn get_title(&self) -> &str {
        &self.title
    }

    pub(super) fn set_title(&mut self, title: &str) {
        if self.title != title {
            self.title = title.to_string();
            self.is_dirty = true;
        }
    }

    #[must_use]
    pub fn get_body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: String) {
        if self.body != body {
            self.body = body;
            self.is_dirty = true;
        }
    }

    #[must_use]
    pub fn get_font_size(&self) -> f64 {
        self.font_size
    }

    pub fn set_font_size(&mut self, size: f64) {
        if self.font_size != size {
            self.font_size = size;
            self.is_dirty = true;
        }
    }

    #[must_use]
    pub fn get_highlight(&self) -> &str {
        &self.highlight
    }

    pub fn set_highlight(&mut self, name: &str) {
        if self.highlight != name {
            self.highlight = name.to_string();
            self.is_dirty = true;
        }
    }

    /// True when no syntax highlighting applies to the note.
    #[must_use]
    pub fn is_plain_text(&self) -> bool {
        self.highlight.is_empty() || self.highlight == PLAIN_TEXT
    }

    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.is_dirty
    }

    pub fn commit(&mut self) {
        self.is_dirty = false;
    }
}

#[test]
fn new_note_has_defaults() {
    let note = Note::new("20250101_120000".to_string(), "Note (1)".to_string());
    assert_eq!(note.id(), "20250101_120000");
    assert_eq!(note.get_title(), "Note (1)");
    assert!(note.get_body().is_empty());
    assert_eq!(note.get_font_size(), DEF_FONT_SIZE);
    assert_eq!(note.get_highlight(), DEF_HIGHLIGHT);
    assert!(!note.is_plain_text());
    assert!(!note.is_changed());
}

#[test]
fn setters_track_changes() {
    let mut note = Note::default();
    // same value is not a change
    note.set_font_size(DEF_FONT_SIZE);
    assert!(!note.is_changed());

    note.set_body("hello".to_string());
    assert!(note.is_changed());
    note.commit();
    assert!(!note.is_changed());

    note.set_highlight(PLAIN_TEXT);
    assert!(note.is_changed());
    assert!(note.is_plain_text());
}

#[test]
fn equality_ignores_dirty_flag() {
    let mut changed = Note::default();
    changed.set_body("text".to_string());
    let mut clean = changed.clone();
    clean.commit();
    assert_eq!(changed, clean);
}
