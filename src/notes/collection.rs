// SPDX-License-Identifier: MPL-2.0

use std::slice::Iter;

use super::{ID_FORMAT, Note};
use chrono::Local;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    // must not delete the last remaining note
    #[error("Cannot delete the last note")]
    LastNote,
    #[error("Note {0} is not found")]
    NoteNotFound(String),
}

/// Ordered notes, display order is insertion order. Never empty.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone)]
#[serde(from = "Vec<Note>", into = "Vec<Note>")]
pub struct NoteCollection {
    notes: Vec<Note>,
    is_dirty: bool,
}

impl PartialEq for NoteCollection {
    fn eq(&self, other: &Self) -> bool {
        self.notes == other.notes
    }
}

impl From<Vec<Note>> for NoteCollection {
    fn from(notes: Vec<Note>) -> Self {
        let mut instance = Self {
            notes: Vec::with_capacity(notes.len()),
            is_dirty: false,
        };
        for mut note in notes {
            // hand-edited files may omit ids or repeat them
            if note.id().is_empty() || instance.position(note.id()).is_some() {
                note.renew_id(instance.unique_id(Self::timestamp_id()));
                instance.is_dirty = true;
            }
            instance.notes.push(note);
        }
        instance.ensure_not_empty();
        instance
    }
}

impl From<NoteCollection> for Vec<Note> {
    fn from(value: NoteCollection) -> Self {
        value.notes
    }
}

#[allow(clippy::missing_errors_doc)]
impl NoteCollection {
    // Collection as itself

    pub fn is_unsaved(&self) -> bool {
        self.is_dirty || self.notes.iter().any(Note::is_changed)
    }

    pub fn commit_changes(&mut self) {
        self.notes.iter_mut().for_each(Note::commit);
        self.is_dirty = false;
    }

    // operations with notes

    #[must_use]
    pub fn get_notes_count(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn iter_notes(&self) -> Iter<'_, Note> {
        self.notes.iter()
    }

    #[must_use]
    pub fn position(&self, note_id: &str) -> Option<usize> {
        self.notes.iter().position(|note| note.id() == note_id)
    }

    #[must_use]
    pub fn get_note_at(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    /// Note at `index`, or the last note when `index` is past the end.
    #[must_use]
    pub fn get_note_at_or_last(&self, index: usize) -> &Note {
        let last = self.notes.len().saturating_sub(1);
        &self.notes[index.min(last)]
    }

    pub fn try_get_note(&self, note_id: &str) -> Result<&Note, StoreError> {
        self.notes
            .iter()
            .find(|note| note.id() == note_id)
            .ok_or_else(|| StoreError::NoteNotFound(note_id.to_string()))
    }

    pub fn try_get_note_mut(&mut self, note_id: &str) -> Result<&mut Note, StoreError> {
        self.notes
            .iter_mut()
            .find(|note| note.id() == note_id)
            .ok_or_else(|| StoreError::NoteNotFound(note_id.to_string()))
    }

    /// Appends a note titled after the new count and returns its id.
    pub fn new_note(&mut self) -> String {
        let id = self.unique_id(Self::timestamp_id());
        let title = format!("Note ({})", self.notes.len() + 1);
        debug!(%id, %title, "new note");
        self.notes.push(Note::new(id.clone(), title));
        self.is_dirty = true;
        id
    }

    /// Returns `Ok(false)` without touching the note when `title` is blank.
    pub fn rename_note(&mut self, note_id: &str, title: &str) -> Result<bool, StoreError> {
        let title = title.trim();
        let note = self.try_get_note_mut(note_id)?;
        if title.is_empty() {
            debug!(%note_id, "blank title ignored");
            return Ok(false);
        }
        note.set_title(title);
        Ok(true)
    }

    pub fn delete_note(&mut self, note_id: &str) -> Result<Note, StoreError> {
        if self.notes.len() < 2 {
            Err(StoreError::LastNote)
        } else if let Some(index) = self.position(note_id) {
            self.is_dirty = true;
            debug!(%note_id, "note deleted");
            Ok(self.notes.remove(index))
        } else {
            Err(StoreError::NoteNotFound(note_id.to_string()))
        }
    }

    // private methods

    fn timestamp_id() -> String {
        Local::now().format(ID_FORMAT).to_string()
    }

    // append -2, -3, ... while the id is taken
    fn unique_id(&self, base: String) -> String {
        if self.position(&base).is_none() {
            return base;
        }
        (2..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| self.position(candidate).is_none())
            .unwrap_or(base)
    }

    fn ensure_not_empty(&mut self) {
        if self.notes.is_empty() {
            self.new_note();
        }
    }
}

impl Default for NoteCollection {
    fn default() -> Self {
        let mut instance = Self {
            notes: Vec::new(),
            is_dirty: false,
        };
        instance.ensure_not_empty();
        instance.commit_changes();
        instance
    }
}

#[test]
fn default_collection_holds_one_note() {
    let collection = NoteCollection::default();
    assert_eq!(collection.get_notes_count(), 1);
    let note = collection.get_note_at(0).expect("first note");
    assert_eq!(note.get_title(), "Note (1)");
    assert!(note.get_body().is_empty());
    assert!(!collection.is_unsaved());
}

#[test]
fn note_at_or_last_clamps_index() {
    let mut collection = NoteCollection::default();
    let second = collection.new_note();
    assert_eq!(collection.get_note_at_or_last(0).get_title(), "Note (1)");
    assert_eq!(collection.get_note_at_or_last(1).id(), second);
    assert_eq!(collection.get_note_at_or_last(7).id(), second);
}

#[test]
fn new_notes_get_unique_ids_and_counted_titles() {
    let mut collection = NoteCollection::default();
    // created within the same second, ids must still differ
    let second = collection.new_note();
    let third = collection.new_note();
    assert_ne!(second, third);
    assert_eq!(collection.get_notes_count(), 3);
    assert_eq!(
        collection.try_get_note(&third).map(Note::get_title),
        Ok("Note (3)")
    );
    // insertion order is display order
    assert_eq!(collection.position(&second), Some(1));
    assert_eq!(collection.position(&third), Some(2));
    assert!(collection.is_unsaved());
}

#[test]
fn unique_id_appends_counter() {
    let collection = NoteCollection::from(vec![
        Note::new("20250101_000000".to_string(), "a".to_string()),
        Note::new("20250101_000000-2".to_string(), "b".to_string()),
    ]);
    assert_eq!(
        collection.unique_id("20250101_000000".to_string()),
        "20250101_000000-3"
    );
    assert_eq!(
        collection.unique_id("20250101_000001".to_string()),
        "20250101_000001"
    );
}

#[test]
fn rename_trims_and_ignores_blank() {
    let mut collection = NoteCollection::default();
    let id = collection.get_note_at(0).expect("first note").id().to_string();

    assert_eq!(collection.rename_note(&id, ""), Ok(false));
    assert_eq!(collection.rename_note(&id, "   "), Ok(false));
    assert_eq!(
        collection.try_get_note(&id).map(Note::get_title),
        Ok("Note (1)")
    );
    assert!(!collection.is_unsaved());

    assert_eq!(collection.rename_note(&id, "  Foo  "), Ok(true));
    assert_eq!(collection.try_get_note(&id).map(Note::get_title), Ok("Foo"));
    assert!(collection.is_unsaved());

    assert_eq!(
        collection.rename_note("missing", "Bar"),
        Err(StoreError::NoteNotFound("missing".to_string()))
    );
}

#[test]
fn delete_rejects_last_note() {
    let mut collection = NoteCollection::default();
    let only = collection.get_note_at(0).expect("first note").id().to_string();
    let before = collection.clone();

    assert_eq!(collection.delete_note(&only), Err(StoreError::LastNote));
    assert_eq!(collection, before);

    let second = collection.new_note();
    let removed = collection.delete_note(&only).expect("two notes, delete allowed");
    assert_eq!(removed.id(), only);
    assert_eq!(collection.get_notes_count(), 1);
    assert_eq!(collection.position(&second), Some(0));
}

#[test]
fn loading_repairs_missing_ids_and_empty_list() {
    let empty = NoteCollection::from(Vec::new());
    assert_eq!(empty.get_notes_count(), 1);

    let repaired = NoteCollection::from(vec![
        Note::new(String::new(), "untitled".to_string()),
        Note::new("x".to_string(), "first".to_string()),
        Note::new("x".to_string(), "second".to_string()),
    ]);
    assert_eq!(repaired.get_notes_count(), 3);
    let ids: Vec<&str> = repaired.iter_notes().map(Note::id).collect();
    assert!(!ids[0].is_empty());
    assert_eq!(ids[1], "x");
    assert_ne!(ids[2], "x");
    // titles and order survive
    let titles: Vec<&str> = repaired.iter_notes().map(Note::get_title).collect();
    assert_eq!(titles, ["untitled", "first", "second"]);
    assert!(repaired.is_unsaved());
}
