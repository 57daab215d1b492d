// SPDX-License-Identifier: MPL-2.0

//! Case-insensitive text search over note bodies.
//!
//! Offsets are character indices into the body, not byte indices.
//! Case folding maps every character to the first char of its lowercase
//! form, so folded text keeps the same length as the original.

use std::fmt;

use crate::notes::{Note, NoteCollection};
use tracing::debug;

/// Characters of context kept on each side of a cross-note hit.
const SNIPPET_CONTEXT: usize = 20;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindOutcome {
    Found { offset: usize, len: usize },
    NotFound,
    /// Query was empty, nothing was searched.
    NoQuery,
}

/// One occurrence found by `search_all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub note_id: String,
    pub title: String,
    pub offset: usize,
    pub len: usize,
    pub snippet: String,
}

impl fmt::Display for SearchHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.snippet)
    }
}

/// In-note search position, remembered between `FindNext`/`FindPrevious` calls.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchCursor {
    offset: usize,
}

impl SearchCursor {
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn move_to(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// A miss resets the cursor to the start of the text.
    pub fn find_next(&mut self, body: &str, query: &str) -> FindOutcome {
        if query.is_empty() {
            return FindOutcome::NoQuery;
        }
        match find_next(body, query, self.offset) {
            Some(offset) => self.found(offset, query),
            None => {
                debug!(query, "not found in note, cursor back to start");
                self.offset = 0;
                FindOutcome::NotFound
            }
        }
    }

    /// A miss resets the cursor to the end of the text.
    pub fn find_previous(&mut self, body: &str, query: &str) -> FindOutcome {
        if query.is_empty() {
            return FindOutcome::NoQuery;
        }
        match find_previous(body, query, self.offset) {
            Some(offset) => self.found(offset, query),
            None => {
                self.offset = body.chars().count();
                debug!(query, offset = self.offset, "not found in note, cursor to end");
                FindOutcome::NotFound
            }
        }
    }

    fn found(&mut self, offset: usize, query: &str) -> FindOutcome {
        debug!(query, offset, "found in note");
        self.offset = offset;
        FindOutcome::Found {
            offset,
            len: query.chars().count(),
        }
    }
}

/// First match starting after `from`, wrapping around to the beginning.
#[must_use]
pub fn find_next(body: &str, query: &str, from: usize) -> Option<usize> {
    let hay = fold(body);
    let needle = fold(query);
    if needle.is_empty() {
        return None;
    }
    let mut start = from.saturating_add(1);
    if start >= hay.len() {
        start = 0;
    }
    find_forward(&hay, &needle, start).or_else(|| find_forward(&hay, &needle, 0))
}

/// Last match starting before `from`, wrapping around to the end.
#[must_use]
pub fn find_previous(body: &str, query: &str, from: usize) -> Option<usize> {
    let hay = fold(body);
    let needle = fold(query);
    if needle.is_empty() || hay.is_empty() {
        return None;
    }
    let last = hay.len() - 1;
    let start = match from.checked_sub(1) {
        Some(start) => start.min(last),
        None => last,
    };
    find_backward(&hay, &needle, start).or_else(|| find_backward(&hay, &needle, last))
}

/// Every non-overlapping occurrence of the trimmed `query`, in note order
/// and then offset order.
#[must_use]
pub fn search_all(notes: &NoteCollection, query: &str) -> Vec<SearchHit> {
    let needle = fold(query.trim());
    if needle.is_empty() {
        return Vec::new();
    }
    let hits: Vec<SearchHit> = notes
        .iter_notes()
        .flat_map(|note| search_note(note, &needle))
        .collect();
    debug!(query, hits = hits.len(), "search all notes");
    hits
}

fn search_note(note: &Note, needle: &[char]) -> Vec<SearchHit> {
    let body: Vec<char> = note.get_body().chars().collect();
    let hay: Vec<char> = body.iter().copied().map(fold_char).collect();
    let mut hits = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = find_forward(&hay, needle, cursor) {
        hits.push(SearchHit {
            note_id: note.id().to_string(),
            title: note.get_title().to_string(),
            offset,
            len: needle.len(),
            snippet: snippet(&body, offset, needle.len()),
        });
        cursor = offset + needle.len();
    }
    hits
}

fn snippet(body: &[char], offset: usize, len: usize) -> String {
    let start = offset.saturating_sub(SNIPPET_CONTEXT);
    let end = (offset + len + SNIPPET_CONTEXT).min(body.len());
    let context: String = body[start..end].iter().collect();
    format!("{ELLIPSIS}{context}{ELLIPSIS}")
}

fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn fold(text: &str) -> Vec<char> {
    text.chars().map(fold_char).collect()
}

fn matches_at(hay: &[char], needle: &[char], index: usize) -> bool {
    hay.get(index..index + needle.len()) == Some(needle)
}

fn find_forward(hay: &[char], needle: &[char], start: usize) -> Option<usize> {
    if needle.len() > hay.len() {
        return None;
    }
    (start..=hay.len() - needle.len()).find(|&index| matches_at(hay, needle, index))
}

fn find_backward(hay: &[char], needle: &[char], start: usize) -> Option<usize> {
    if needle.len() > hay.len() {
        return None;
    }
    let last = start.min(hay.len() - needle.len());
    (0..=last).rev().find(|&index| matches_at(hay, needle, index))
}

#[test]
fn find_next_wraps_to_start() {
    let body = "abcXYZabc";
    assert_eq!(find_next(body, "abc", 6), Some(0));
    assert_eq!(find_next(body, "ABC", 0), Some(6));
    assert_eq!(find_next(body, "xyz", 100), Some(3));
    assert_eq!(find_next(body, "nope", 0), None);
}

#[test]
fn find_previous_wraps_to_end() {
    let body = "abcXYZabc";
    assert_eq!(find_previous(body, "abc", 6), Some(0));
    assert_eq!(find_previous(body, "abc", 0), Some(6));
    assert_eq!(find_previous(body, "abc", 1), Some(0));
    // cursor past the end is clamped
    assert_eq!(find_previous(body, "abc", 50), Some(6));
    assert_eq!(find_previous("", "abc", 0), None);
}

#[test]
fn cursor_resets_asymmetrically_on_miss() {
    let body = "hello world";
    let mut cursor = SearchCursor::default();

    assert_eq!(
        cursor.find_next(body, "WORLD"),
        FindOutcome::Found { offset: 6, len: 5 }
    );
    assert_eq!(cursor.offset(), 6);

    assert_eq!(cursor.find_next(body, "zzz"), FindOutcome::NotFound);
    assert_eq!(cursor.offset(), 0);

    cursor.move_to(6);
    assert_eq!(cursor.find_previous(body, "zzz"), FindOutcome::NotFound);
    assert_eq!(cursor.offset(), body.len());

    // empty query leaves the cursor alone
    assert_eq!(cursor.find_next(body, ""), FindOutcome::NoQuery);
    assert_eq!(cursor.offset(), body.len());
}

#[test]
fn cursor_walks_through_matches() {
    let body = "one two one two one";
    let mut cursor = SearchCursor::default();
    let offsets: Vec<FindOutcome> = (0..4).map(|_| cursor.find_next(body, "one")).collect();
    // starts searching at offset 1, so the first "one" comes back last
    assert_eq!(
        offsets,
        [8, 16, 0, 8].map(|offset| FindOutcome::Found { offset, len: 3 })
    );
    assert_eq!(
        cursor.find_previous(body, "one"),
        FindOutcome::Found { offset: 0, len: 3 }
    );
}

#[test]
fn offsets_count_characters() {
    let body = "Привет, мир! ПРИВЕТ";
    assert_eq!(find_next(body, "привет", 0), Some(13));
    assert_eq!(find_previous(body, "МИР", 13), Some(8));
}

#[test]
fn search_all_never_overlaps() {
    let mut notes = NoteCollection::from(vec![Note::new("a".to_string(), "A".to_string())]);
    notes
        .try_get_note_mut("a")
        .expect("note exists")
        .set_body("aaaa".to_string());

    let hits = search_all(&notes, "aa");
    let offsets: Vec<usize> = hits.iter().map(|hit| hit.offset).collect();
    assert_eq!(offsets, [0, 2]);
}

#[test]
fn search_all_orders_by_note_then_offset() {
    let mut notes = NoteCollection::from(vec![
        Note::new("1".to_string(), "First".to_string()),
        Note::new("2".to_string(), "Second".to_string()),
        Note::new("3".to_string(), "Third".to_string()),
    ]);
    for (id, body) in [("1", "cat dog CAT"), ("2", "no pets"), ("3", "Cat")] {
        notes
            .try_get_note_mut(id)
            .expect("note exists")
            .set_body(body.to_string());
    }

    let hits = search_all(&notes, "  cat ");
    let found: Vec<(&str, usize)> = hits
        .iter()
        .map(|hit| (hit.note_id.as_str(), hit.offset))
        .collect();
    assert_eq!(found, [("1", 0), ("1", 8), ("3", 0)]);
    assert_eq!(hits[2].to_string(), "Third: ...Cat...");

    assert!(search_all(&notes, "").is_empty());
    assert!(search_all(&notes, "   ").is_empty());
}

#[test]
fn snippet_is_clamped_to_body() {
    let body: String = ('a'..='z').chain('a'..='z').collect();
    let mut notes = NoteCollection::from(vec![Note::new("n".to_string(), "N".to_string())]);
    notes
        .try_get_note_mut("n")
        .expect("note exists")
        .set_body(body.clone());

    let hits = search_all(&notes, "mno");
    assert_eq!(hits.len(), 2);
    // 20 chars before is clamped to the body start
    assert_eq!(hits[0].snippet, format!("...{}...", &body[..35]));
    // 20 chars after is clamped to the body end
    assert_eq!(hits[1].offset, 38);
    assert_eq!(hits[1].snippet, format!("...{}...", &body[18..]));
}
