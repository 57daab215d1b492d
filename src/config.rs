// SPDX-License-Identifier: MPL-2.0

use std::path::PathBuf;

use clap::Parser;

use crate::storage::DEF_CONFIG_FILE;

/// Runtime options of the sticky notes shell.
#[derive(Debug, Clone, Parser, PartialEq, Eq)]
#[command(version, about = "Tabbed sticky notes kept in one YAML file")]
pub struct Config {
    /// Notes file, created with one empty note when missing
    #[arg(short, long, default_value = DEF_CONFIG_FILE)]
    pub file: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    /// Log directive for this crate matching the verbosity.
    #[must_use]
    pub fn log_directive(&self) -> String {
        let level = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        format!("tab_stickies={level}")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEF_CONFIG_FILE),
            verbose: 0,
        }
    }
}

#[test]
fn parses_defaults_and_flags() {
    let config = Config::parse_from(["stickies"]);
    assert_eq!(config, Config::default());
    assert_eq!(config.log_directive(), "tab_stickies=info");

    let config = Config::parse_from(["stickies", "--file", "/tmp/notes.yaml", "-vv"]);
    assert_eq!(config.file, PathBuf::from("/tmp/notes.yaml"));
    assert_eq!(config.log_directive(), "tab_stickies=trace");
}
