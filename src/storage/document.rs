// SPDX-License-Identifier: MPL-2.0

use super::{AppConfig, WindowPlacement};
use crate::notes::{Note, NoteCollection};

/// On-disk shape of the notes file, flat and camelCase.
/// Every key is optional so older or hand-edited files still load.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct StickerDocument {
    pub always_on_top: bool,
    pub tabs: Vec<Note>,
    pub window_left: f64,
    pub window_top: f64,
    pub window_width: f64,
    pub window_height: f64,
    pub window_position_set: bool,
}

impl Default for StickerDocument {
    fn default() -> Self {
        AppConfig::default().into()
    }
}

impl From<AppConfig> for StickerDocument {
    fn from(value: AppConfig) -> Self {
        Self {
            always_on_top: value.always_on_top,
            tabs: value.notes.into(),
            window_left: value.placement.left,
            window_top: value.placement.top,
            window_width: value.placement.width,
            window_height: value.placement.height,
            window_position_set: value.placement.is_set,
        }
    }
}

impl From<StickerDocument> for AppConfig {
    fn from(value: StickerDocument) -> Self {
        Self {
            placement: WindowPlacement {
                left: value.window_left,
                top: value.window_top,
                width: value.window_width,
                height: value.window_height,
                is_set: value.window_position_set,
            },
            always_on_top: value.always_on_top,
            notes: NoteCollection::from(value.tabs),
        }
    }
}

#[test]
fn reads_original_layout() {
    const INPUT_FILE: &str = "test_data/sticker.yaml";

    let buf = std::fs::read_to_string(INPUT_FILE)
        .unwrap_or_else(|e| panic!("reading input file {INPUT_FILE}: {e}"));
    let config = AppConfig::try_read(&buf).expect("parse test file must succeed");

    assert!(config.always_on_top);
    assert!(config.placement.is_set);
    assert_eq!(config.placement.left, 1320.0);
    assert_eq!(config.placement.width, 480.0);
    assert_eq!(config.notes.get_notes_count(), 3);

    let titles: Vec<&str> = config.notes.iter_notes().map(Note::get_title).collect();
    assert_eq!(titles, ["Todo", "Snippets", "Scratch"]);

    let snippets = config.notes.get_note_at(1).expect("second tab");
    assert_eq!(snippets.id(), "20240312_091544");
    assert_eq!(snippets.get_highlight(), "Rust");
    assert_eq!(snippets.get_font_size(), 16.0);
    assert!(snippets.get_body().contains("fn main()"));

    // missing keys take their defaults
    let scratch = config.notes.get_note_at(2).expect("third tab");
    assert_eq!(scratch.get_highlight(), crate::notes::DEF_HIGHLIGHT);
    assert_eq!(scratch.get_font_size(), crate::notes::DEF_FONT_SIZE);
}

#[test]
fn missing_and_unknown_keys() {
    let config = AppConfig::try_read("windowTop: 42\nsomethingNew: yes\n")
        .expect("partial document must parse");
    assert_eq!(config.placement.top, 42.0);
    assert_eq!(config.placement.left, 100.0);
    assert!(!config.placement.is_set);
    assert!(config.always_on_top);
    // no tabs in the file still yields one usable note
    assert_eq!(config.notes.get_notes_count(), 1);
}

#[test]
fn writes_camel_case_keys() {
    let yaml = AppConfig::default()
        .try_write()
        .expect("serialize must succeed");
    for key in [
        "alwaysOnTop:",
        "tabs:",
        "windowLeft:",
        "windowTop:",
        "windowWidth:",
        "windowHeight:",
        "windowPositionSet:",
        "fontSize:",
        "content:",
        "highlight:",
    ] {
        assert!(yaml.contains(key), "{key} missing in:\n{yaml}");
    }
}
