// SPDX-License-Identifier: MPL-2.0

use std::path::{Path, PathBuf};

use crate::notes::NoteCollection;
use document::StickerDocument;
use thiserror::Error;
use tracing::{debug, info, warn};

mod document;

pub const DEF_CONFIG_FILE: &str = "sticker.yaml";
const DEF_WINDOW_LEFT: f64 = 100.0;
const DEF_WINDOW_TOP: f64 = 100.0;
const DEF_WINDOW_WIDTH: f64 = 600.0;
const DEF_WINDOW_HEIGHT: f64 = 400.0;

#[derive(Debug, Error)]
pub enum StorageIssue {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum StorageError {
    // Corrupt or unreadable file, defaults were used instead
    #[error("Failed loading {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        source: StorageIssue,
    },
    // In-memory state is unaffected
    #[error("Failed saving {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        source: StorageIssue,
    },
}

/// Geometry of the sticky window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowPlacement {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// false until the window was closed once; the window centers itself meanwhile
    pub is_set: bool,
}

impl Default for WindowPlacement {
    fn default() -> Self {
        Self {
            left: DEF_WINDOW_LEFT,
            top: DEF_WINDOW_TOP,
            width: DEF_WINDOW_WIDTH,
            height: DEF_WINDOW_HEIGHT,
            is_set: false,
        }
    }
}

impl WindowPlacement {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            is_set: true,
        }
    }
}

/// Unit of persistence: the whole application state.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub placement: WindowPlacement,
    pub always_on_top: bool,
    pub notes: NoteCollection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            placement: WindowPlacement::default(),
            always_on_top: true,
            notes: NoteCollection::default(),
        }
    }
}

/// How `load` obtained its configuration.
#[derive(Debug)]
pub enum Loaded {
    Existing(AppConfig),
    /// No file existed; defaults were written out.
    Created(AppConfig),
    /// Defaults were used and `error` must be shown to the user.
    Recovered {
        config: AppConfig,
        error: StorageError,
    },
}

impl Loaded {
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        match self {
            Self::Existing(config) | Self::Created(config) | Self::Recovered { config, .. } => {
                config
            }
        }
    }

    #[must_use]
    pub fn into_parts(self) -> (AppConfig, Option<StorageError>) {
        match self {
            Self::Existing(config) | Self::Created(config) => (config, None),
            Self::Recovered { config, error } => (config, Some(error)),
        }
    }
}

impl AppConfig {
    pub fn try_read(input: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str::<StickerDocument>(input).map(Into::into)
    }

    pub fn try_write(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&StickerDocument::from(self.clone()))
    }
}

/// Reads the file at `path`, falling back to defaults when it is missing or corrupt.
#[must_use]
pub fn load<P: AsRef<Path>>(path: P) -> Loaded {
    let path = path.as_ref();
    if !path.exists() {
        let config = AppConfig::default();
        info!(path = %path.display(), "no notes file, creating default");
        return match save(&config, path) {
            Ok(()) => Loaded::Created(config),
            Err(error) => Loaded::Recovered { config, error },
        };
    }
    match try_load(path) {
        Ok(config) => {
            info!(
                path = %path.display(),
                notes = config.notes.get_notes_count(),
                "notes loaded"
            );
            Loaded::Existing(config)
        }
        Err(source) => {
            warn!(path = %path.display(), %source, "notes file unusable, using defaults");
            Loaded::Recovered {
                config: AppConfig::default(),
                error: StorageError::Load {
                    path: path.to_path_buf(),
                    source,
                },
            }
        }
    }
}

#[allow(clippy::missing_errors_doc)]
pub fn save<P: AsRef<Path>>(config: &AppConfig, path: P) -> Result<(), StorageError> {
    let path = path.as_ref();
    try_save(config, path).map_err(|source| StorageError::Save {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "notes saved");
    Ok(())
}

/// Same as `save` but never fails; used on the window-close path.
pub fn save_silent<P: AsRef<Path>>(config: &AppConfig, path: P) {
    let path = path.as_ref();
    if let Err(e) = try_save(config, path) {
        warn!(path = %path.display(), "failed saving notes on close: {e}");
    } else {
        debug!(path = %path.display(), "notes saved on close");
    }
}

fn try_load(path: &Path) -> Result<AppConfig, StorageIssue> {
    let content = std::fs::read_to_string(path)?;
    Ok(AppConfig::try_read(&content)?)
}

fn try_save(config: &AppConfig, path: &Path) -> Result<(), StorageIssue> {
    let yaml = config.try_write()?;
    std::fs::write(path, yaml)?;
    Ok(())
}

#[test]
fn missing_file_is_created_with_one_note() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join(DEF_CONFIG_FILE);

    let loaded = load(&path);
    assert!(matches!(loaded, Loaded::Created(_)));
    assert!(path.exists());
    assert_eq!(loaded.config().notes.get_notes_count(), 1);

    // the file holds exactly that default config
    let written = std::fs::read_to_string(&path).expect("written file");
    let reread = AppConfig::try_read(&written).expect("written file parses");
    assert_eq!(&reread, loaded.config());
}

#[test]
fn corrupt_file_recovers_with_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join(DEF_CONFIG_FILE);
    std::fs::write(&path, "tabs: [ this is : not yaml").expect("write corrupt file");

    let (config, error) = load(&path).into_parts();
    assert!(matches!(error, Some(StorageError::Load { .. })));
    assert_eq!(config.notes.get_notes_count(), 1);
    assert_eq!(config.placement, WindowPlacement::default());
    // the corrupt file is left as is for the user to inspect
    let content = std::fs::read_to_string(&path).expect("file still there");
    assert!(content.contains("not yaml"));
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join(DEF_CONFIG_FILE);

    let mut config = AppConfig {
        placement: WindowPlacement::new(10.0, 20.5, 300.0, 250.0),
        always_on_top: false,
        notes: NoteCollection::default(),
    };
    let id = config.notes.new_note();
    config
        .notes
        .rename_note(&id, "Shopping")
        .expect("note exists");
    let note = config.notes.try_get_note_mut(&id).expect("note exists");
    note.set_body("milk\neggs: 12\n  - bread".to_string());
    note.set_font_size(18.5);
    note.set_highlight("Plain Text");

    save(&config, &path).expect("save must succeed");
    let loaded = load(&path);
    assert!(matches!(loaded, Loaded::Existing(_)));
    assert_eq!(loaded.config(), &config);
}

#[test]
fn save_reports_unwritable_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    // a directory cannot be overwritten as a file
    let result = save(&AppConfig::default(), dir.path());
    assert!(matches!(result, Err(StorageError::Save { .. })));
    // silent flavour swallows the very same failure and leaves the directory alone
    save_silent(&AppConfig::default(), dir.path());
    assert!(dir.path().is_dir());
}
