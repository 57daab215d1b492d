// SPDX-License-Identifier: MPL-2.0

use tab_stickies::{
    app::{AppSession, Command, FindOutcome, NoteRef, Outcome, SessionError},
    notes::{Note, StoreError},
    storage::{self, Loaded, StorageError, WindowPlacement},
};
use tempfile::TempDir;

fn open_fresh() -> (TempDir, AppSession) {
    let dir = tempfile::tempdir().expect("temp dir");
    let (session, error) = AppSession::open(dir.path().join("sticker.yaml"));
    assert!(error.is_none());
    (dir, session)
}

fn run(session: &mut AppSession, line: &str) -> Outcome {
    let command: Command = line.parse().expect("valid command");
    session.dispatch(command).expect("command succeeds")
}

#[test]
fn first_run_creates_file_with_one_note() {
    let (_dir, session) = open_fresh();
    assert!(session.path().exists());
    assert_eq!(session.notes().get_notes_count(), 1);
    assert_eq!(session.active_note().get_title(), "Note (1)");
    assert!(!session.config().placement.is_set);
    assert!(session.config().always_on_top);
}

#[test]
fn edits_survive_reopen() {
    let (dir, mut session) = open_fresh();
    run(&mut session, "text groceries:\\n- milk");
    run(&mut session, "rename   Shopping  ");
    run(&mut session, "add");
    run(&mut session, "text fn main() {}");
    run(&mut session, "highlight Rust");
    run(&mut session, "zoom+");
    run(&mut session, "top");
    assert!(!session.is_unsaved());

    let (reopened, error) = AppSession::open(dir.path().join("sticker.yaml"));
    assert!(error.is_none());
    assert_eq!(reopened.config(), session.config());

    let titles: Vec<&str> = reopened.notes().iter_notes().map(Note::get_title).collect();
    assert_eq!(titles, ["Shopping", "Note (2)"]);
    let code = reopened.notes().get_note_at(1).expect("second note");
    assert_eq!(code.get_highlight(), "Rust");
    assert_eq!(code.get_font_size(), 15.0);
    assert!(!reopened.config().always_on_top);
}

#[test]
fn body_edits_wait_for_save() {
    let (dir, mut session) = open_fresh();
    run(&mut session, "text draft");
    assert!(session.is_unsaved());

    let Loaded::Existing(on_disk) = storage::load(dir.path().join("sticker.yaml")) else {
        panic!("file exists after first run");
    };
    assert_eq!(on_disk.notes.get_note_at(0).map(Note::get_body), Some(""));

    assert_eq!(run(&mut session, "save"), Outcome::Saved);
    assert!(!session.is_unsaved());
}

#[test]
fn close_records_placement() {
    let (dir, mut session) = open_fresh();
    let placement = WindowPlacement {
        left: 40.0,
        top: 30.0,
        width: 500.0,
        height: 320.0,
        is_set: false,
    };
    assert_eq!(
        session.dispatch(Command::Close(Some(placement))).ok(),
        Some(Outcome::Closed)
    );

    let (reopened, _) = AppSession::open(dir.path().join("sticker.yaml"));
    assert_eq!(
        reopened.config().placement,
        WindowPlacement::new(40.0, 30.0, 500.0, 320.0)
    );
}

#[test]
fn corrupt_file_is_reported_and_replaced_by_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("sticker.yaml");
    std::fs::write(&path, "tabs:\n  - id: [unclosed\n").expect("write corrupt file");

    let (session, error) = AppSession::open(&path);
    assert!(matches!(error, Some(StorageError::Load { .. })));
    assert_eq!(session.notes().get_notes_count(), 1);
}

#[test]
fn zoom_is_bounded() {
    let (_dir, mut session) = open_fresh();
    run(&mut session, "font 71");
    run(&mut session, "zoom+");
    assert_eq!(run(&mut session, "zoom+"), Outcome::FontSize(72.0));
    run(&mut session, "font 7");
    run(&mut session, "zoom-");
    assert_eq!(run(&mut session, "zoom-"), Outcome::FontSize(6.0));
}

#[test]
fn unknown_highlight_is_stored_and_flagged() {
    let (_dir, mut session) = open_fresh();
    assert_eq!(
        run(&mut session, "highlight Cobol"),
        Outcome::Highlight {
            name: "Cobol".to_string(),
            is_known: false
        }
    );
    assert_eq!(session.active_note().get_highlight(), "Cobol");
    assert_eq!(
        run(&mut session, "highlight Plain Text"),
        Outcome::Highlight {
            name: "Plain Text".to_string(),
            is_known: true
        }
    );
    assert!(session.active_note().is_plain_text());
}

#[test]
fn blank_rename_is_a_no_op() {
    let (_dir, mut session) = open_fresh();
    assert_eq!(run(&mut session, "rename    "), Outcome::RenameIgnored);
    assert_eq!(session.active_note().get_title(), "Note (1)");
}

#[test]
fn deleting_the_only_note_is_rejected() {
    let (_dir, mut session) = open_fresh();
    let result = session.dispatch(Command::DeleteNote);
    assert!(matches!(
        result,
        Err(SessionError::Store(StoreError::LastNote))
    ));
    assert_eq!(session.notes().get_notes_count(), 1);
}

#[test]
fn cross_note_search_then_continue_in_note() {
    let (_dir, mut session) = open_fresh();
    run(&mut session, "text alpha beta");
    run(&mut session, "add");
    run(&mut session, "text beta gamma beta");
    run(&mut session, "select 1");

    let Outcome::SearchResults(hits) = run(&mut session, "search BETA") else {
        panic!("search all returns results");
    };
    let found: Vec<(String, usize)> = hits
        .iter()
        .map(|hit| (hit.title.clone(), hit.offset))
        .collect();
    assert_eq!(
        found,
        [
            ("Note (1)".to_string(), 6),
            ("Note (2)".to_string(), 0),
            ("Note (2)".to_string(), 11)
        ]
    );

    run(&mut session, "open 2");
    assert_eq!(session.active_index(), 1);
    assert_eq!(
        run(&mut session, "next beta"),
        Outcome::Find(FindOutcome::Found { offset: 11, len: 4 })
    );
    assert_eq!(
        run(&mut session, "prev beta"),
        Outcome::Find(FindOutcome::Found { offset: 0, len: 4 })
    );
}

#[test]
fn select_by_id() {
    let (_dir, mut session) = open_fresh();
    let first = session.active_note().id().to_string();
    run(&mut session, "add");
    let outcome = session
        .dispatch(Command::SelectNote(NoteRef::Id(first.clone())))
        .expect("select by id");
    assert_eq!(
        outcome,
        Outcome::NoteSelected {
            title: "Note (1)".to_string()
        }
    );
    assert_eq!(session.active_note().id(), first);
}

#[test]
fn direct_font_size_stays_in_range() {
    let (dir, mut session) = open_fresh();
    assert_eq!(run(&mut session, "font -3"), Outcome::FontSize(6.0));
    assert_eq!(run(&mut session, "font 1000"), Outcome::FontSize(72.0));
    for line in ["font NaN", "font inf", "font -inf"] {
        let command: Command = line.parse().expect("valid command");
        assert!(matches!(
            session.dispatch(command),
            Err(SessionError::InvalidFontSize(_))
        ));
    }
    assert_eq!(session.active_note().get_font_size(), 72.0);

    let (reopened, error) = AppSession::open(dir.path().join("sticker.yaml"));
    assert!(error.is_none());
    assert_eq!(reopened.config(), session.config());
}

#[test]
fn failed_flush_keeps_edits_in_memory() {
    let (_dir, mut session) = open_fresh();
    // a directory in place of the file makes every write fail
    std::fs::remove_file(session.path()).expect("remove notes file");
    std::fs::create_dir(session.path()).expect("directory in its place");

    run(&mut session, "text draft");
    for line in ["save", "highlight Rust", "font 20", "rename Drafts"] {
        let command: Command = line.parse().expect("valid command");
        assert!(
            matches!(
                session.dispatch(command),
                Err(SessionError::Storage(StorageError::Save { .. }))
            ),
            "{line} must report the failed write"
        );
    }
    assert!(session.is_unsaved());
    let note = session.active_note();
    assert_eq!(note.get_body(), "draft");
    assert_eq!(note.get_highlight(), "Rust");
    assert_eq!(note.get_font_size(), 20.0);
    assert_eq!(note.get_title(), "Drafts");

    assert_eq!(
        session.dispatch(Command::Close(None)).ok(),
        Some(Outcome::Closed)
    );
    assert!(session.path().is_dir());
}
