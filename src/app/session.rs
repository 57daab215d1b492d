// SPDX-License-Identifier: MPL-2.0

use std::path::{Path, PathBuf};

use super::{
    Command, NoteRef, Outcome, SessionError,
    search::{self, SearchCursor, SearchHit},
};
use crate::{
    notes::{MAX_FONT_SIZE, MIN_FONT_SIZE, Note, NoteCollection, is_known_highlight},
    storage::{self, AppConfig, StorageError, WindowPlacement},
};
use tracing::{debug, info};

/// Everything the presentation layer works with during a run: the loaded
/// configuration, where it lives, the active note and the search state.
#[derive(Debug)]
pub struct AppSession {
    config: AppConfig,
    path: PathBuf,
    // index into config.notes, always valid since the collection is never empty
    active: usize,
    cursor: SearchCursor,
    last_hits: Vec<SearchHit>,
}

#[allow(clippy::missing_errors_doc)]
impl AppSession {
    #[must_use]
    pub fn new(config: AppConfig, path: PathBuf) -> Self {
        Self {
            config,
            path,
            active: 0,
            cursor: SearchCursor::default(),
            last_hits: Vec::new(),
        }
    }

    /// Loads `path` and selects the first note. A load problem is handed
    /// back for the user to see; the session then runs on defaults.
    #[must_use]
    pub fn open<P: AsRef<Path>>(path: P) -> (Self, Option<StorageError>) {
        let path = path.as_ref().to_path_buf();
        let (config, error) = storage::load(&path).into_parts();
        (Self::new(config, path), error)
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn notes(&self) -> &NoteCollection {
        &self.config.notes
    }

    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    #[must_use]
    pub fn active_note(&self) -> &Note {
        self.config.notes.get_note_at_or_last(self.active)
    }

    #[must_use]
    pub fn search_offset(&self) -> usize {
        self.cursor.offset()
    }

    #[must_use]
    pub fn last_hits(&self) -> &[SearchHit] {
        &self.last_hits
    }

    #[must_use]
    pub fn is_unsaved(&self) -> bool {
        self.config.notes.is_unsaved()
    }

    // note store

    pub fn add_note(&mut self) -> &Note {
        self.config.notes.new_note();
        self.active = self.config.notes.get_notes_count() - 1;
        self.active_note()
    }

    pub fn select_note(&mut self, note: &NoteRef) -> Result<&Note, SessionError> {
        self.active = note
            .resolve(&self.config.notes)
            .ok_or_else(|| SessionError::UnknownNote(note.clone()))?;
        debug!(%note, index = self.active, "note selected");
        Ok(self.active_note())
    }

    pub fn rename_note(&mut self, note_id: &str, title: &str) -> Result<bool, SessionError> {
        Ok(self.config.notes.rename_note(note_id, title)?)
    }

    /// Deletes the note and selects the first remaining one.
    pub fn remove_note(&mut self, note_id: &str) -> Result<Note, SessionError> {
        let removed = self.config.notes.delete_note(note_id)?;
        self.active = 0;
        Ok(removed)
    }

    pub fn set_body(&mut self, note_id: &str, text: String) -> Result<(), SessionError> {
        self.config.notes.try_get_note_mut(note_id)?.set_body(text);
        Ok(())
    }

    /// Clamps `size` to the supported range and returns the size applied.
    pub fn set_font_size(&mut self, note_id: &str, size: f64) -> Result<f64, SessionError> {
        if !size.is_finite() {
            return Err(SessionError::InvalidFontSize(size));
        }
        let size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self.config
            .notes
            .try_get_note_mut(note_id)?
            .set_font_size(size);
        Ok(size)
    }

    pub fn set_highlight(&mut self, note_id: &str, name: &str) -> Result<(), SessionError> {
        self.config
            .notes
            .try_get_note_mut(note_id)?
            .set_highlight(name);
        Ok(())
    }

    // persistence

    pub fn save(&mut self) -> Result<(), StorageError> {
        storage::save(&self.config, &self.path)?;
        self.config.notes.commit_changes();
        Ok(())
    }

    /// Remembers the final window geometry and flushes without reporting failures.
    pub fn close(&mut self, placement: Option<WindowPlacement>) {
        if let Some(placement) = placement {
            self.config.placement = WindowPlacement {
                is_set: true,
                ..placement
            };
        }
        storage::save_silent(&self.config, &self.path);
        info!(path = %self.path.display(), "session closed");
    }

    // command dispatch

    pub fn dispatch(&mut self, command: Command) -> Result<Outcome, SessionError> {
        debug!(?command, "dispatch");
        let active_id = self.active_note().id().to_string();
        let outcome = match command {
            Command::AddNote => {
                let title = self.add_note().get_title().to_string();
                Outcome::NoteAdded { title }
            }
            Command::SelectNote(note) => {
                let title = self.select_note(&note)?.get_title().to_string();
                Outcome::NoteSelected { title }
            }
            Command::RenameNote(title) => {
                if self.rename_note(&active_id, &title)? {
                    self.save()?;
                    Outcome::Renamed {
                        title: self.active_note().get_title().to_string(),
                    }
                } else {
                    Outcome::RenameIgnored
                }
            }
            Command::DeleteNote => {
                let removed = self.remove_note(&active_id)?;
                Outcome::NoteDeleted {
                    title: removed.get_title().to_string(),
                    selected: self.active_note().get_title().to_string(),
                }
            }
            Command::SetBody(text) => {
                self.set_body(&active_id, text)?;
                Outcome::BodyUpdated
            }
            Command::SetFontSize(size) => self.change_font_size(&active_id, size)?,
            Command::ZoomIn => {
                let size = (self.active_note().get_font_size() + 1.0).min(MAX_FONT_SIZE);
                self.change_font_size(&active_id, size)?
            }
            Command::ZoomOut => {
                let size = (self.active_note().get_font_size() - 1.0).max(MIN_FONT_SIZE);
                self.change_font_size(&active_id, size)?
            }
            Command::ToggleHighlight(name) => {
                self.set_highlight(&active_id, &name)?;
                self.save()?;
                Outcome::Highlight {
                    is_known: is_known_highlight(&name),
                    name,
                }
            }
            Command::ToggleAlwaysOnTop => {
                self.config.always_on_top = !self.config.always_on_top;
                self.save()?;
                Outcome::AlwaysOnTop(self.config.always_on_top)
            }
            Command::Save => {
                self.save()?;
                Outcome::Saved
            }
            Command::FindNext(query) => {
                let body = self.active_note().get_body().to_string();
                Outcome::Find(self.cursor.find_next(&body, &query))
            }
            Command::FindPrevious(query) => {
                let body = self.active_note().get_body().to_string();
                Outcome::Find(self.cursor.find_previous(&body, &query))
            }
            Command::SearchAll(query) => {
                self.last_hits = search::search_all(&self.config.notes, &query);
                Outcome::SearchResults(self.last_hits.clone())
            }
            Command::OpenHit(number) => {
                let hit = number
                    .checked_sub(1)
                    .and_then(|index| self.last_hits.get(index))
                    .cloned()
                    .ok_or(SessionError::UnknownHit(number))?;
                self.reveal(&hit)?
            }
            Command::Close(placement) => {
                self.close(placement);
                Outcome::Closed
            }
        };
        Ok(outcome)
    }

    /// Selects the note of `hit` and moves the search cursor onto it.
    pub fn reveal(&mut self, hit: &SearchHit) -> Result<Outcome, SessionError> {
        self.select_note(&NoteRef::Id(hit.note_id.clone()))?;
        self.cursor.move_to(hit.offset);
        Ok(Outcome::Find(search::FindOutcome::Found {
            offset: hit.offset,
            len: hit.len,
        }))
    }

    fn change_font_size(&mut self, note_id: &str, size: f64) -> Result<Outcome, SessionError> {
        let size = self.set_font_size(note_id, size)?;
        self.save()?;
        Ok(Outcome::FontSize(size))
    }
}

#[test]
fn add_selects_new_note() {
    let mut session = AppSession::new(AppConfig::default(), PathBuf::from("unused.yaml"));
    let outcome = session.dispatch(Command::AddNote).expect("add");
    assert_eq!(
        outcome,
        Outcome::NoteAdded {
            title: "Note (2)".to_string()
        }
    );
    assert_eq!(session.active_index(), 1);
    assert_eq!(session.active_note().get_title(), "Note (2)");
}

#[test]
fn delete_selects_first_remaining() {
    let mut session = AppSession::new(AppConfig::default(), PathBuf::from("unused.yaml"));
    let first = session.active_note().id().to_string();
    session.add_note();
    session.add_note();
    assert_eq!(session.active_index(), 2);

    let outcome = session.dispatch(Command::DeleteNote).expect("delete");
    assert_eq!(
        outcome,
        Outcome::NoteDeleted {
            title: "Note (3)".to_string(),
            selected: "Note (1)".to_string()
        }
    );
    assert_eq!(session.active_index(), 0);
    assert_eq!(session.active_note().id(), first);
}

#[test]
fn last_note_cannot_be_deleted() {
    let mut session = AppSession::new(AppConfig::default(), PathBuf::from("unused.yaml"));
    let before = session.config().clone();
    let result = session.dispatch(Command::DeleteNote);
    assert!(matches!(
        result,
        Err(SessionError::Store(crate::notes::StoreError::LastNote))
    ));
    assert_eq!(session.config(), &before);
}

#[test]
fn find_uses_active_note_only() {
    let mut session = AppSession::new(AppConfig::default(), PathBuf::from("unused.yaml"));
    session
        .dispatch(Command::SetBody("abcXYZabc".to_string()))
        .expect("set body");
    session.add_note();
    session
        .dispatch(Command::SetBody("nothing here".to_string()))
        .expect("set body");

    assert_eq!(
        session.dispatch(Command::FindNext("abc".to_string())).ok(),
        Some(Outcome::Find(search::FindOutcome::NotFound))
    );

    session
        .dispatch(Command::SelectNote(NoteRef::Position(1)))
        .expect("select first");
    let found: Vec<Outcome> = (0..3)
        .map(|_| {
            session
                .dispatch(Command::FindNext("ABC".to_string()))
                .expect("find")
        })
        .collect();
    assert_eq!(
        found,
        [6, 0, 6].map(|offset| Outcome::Find(search::FindOutcome::Found { offset, len: 3 }))
    );
}

#[test]
fn select_unknown_note_fails() {
    let mut session = AppSession::new(AppConfig::default(), PathBuf::from("unused.yaml"));
    let result = session.dispatch(Command::SelectNote(NoteRef::Position(5)));
    assert!(matches!(
        result,
        Err(SessionError::UnknownNote(NoteRef::Position(5)))
    ));
    assert_eq!(session.active_index(), 0);
}

#[test]
fn open_hit_moves_selection_and_cursor() {
    let mut session = AppSession::new(AppConfig::default(), PathBuf::from("unused.yaml"));
    session.add_note();
    session
        .dispatch(Command::SetBody("the needle is here".to_string()))
        .expect("set body");
    session
        .dispatch(Command::SelectNote(NoteRef::Position(1)))
        .expect("select first");

    let Ok(Outcome::SearchResults(hits)) = session.dispatch(Command::SearchAll("needle".into()))
    else {
        panic!("search must return results");
    };
    assert_eq!(hits.len(), 1);
    assert_eq!(session.last_hits(), hits.as_slice());

    assert_eq!(
        session.dispatch(Command::OpenHit(1)).ok(),
        Some(Outcome::Find(search::FindOutcome::Found { offset: 4, len: 6 }))
    );
    assert_eq!(session.active_index(), 1);
    assert_eq!(session.search_offset(), 4);

    assert!(matches!(
        session.dispatch(Command::OpenHit(2)),
        Err(SessionError::UnknownHit(2))
    ));
}

#[test]
fn font_size_is_clamped_and_must_be_finite() {
    let mut session = AppSession::new(AppConfig::default(), PathBuf::from("unused.yaml"));
    let id = session.active_note().id().to_string();

    assert_eq!(session.set_font_size(&id, -3.0).ok(), Some(MIN_FONT_SIZE));
    assert_eq!(session.set_font_size(&id, 500.0).ok(), Some(MAX_FONT_SIZE));
    assert_eq!(session.set_font_size(&id, 18.5).ok(), Some(18.5));

    for size in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(matches!(
            session.set_font_size(&id, size),
            Err(SessionError::InvalidFontSize(_))
        ));
    }
    assert_eq!(session.active_note().get_font_size(), 18.5);
}
