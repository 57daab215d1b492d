// SPDX-License-Identifier: MPL-2.0

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tab_stickies::{
    app::{AppSession, Command, Outcome},
    config::Config,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
add                 new note, becomes active
select <n|id>       activate note by tab number or id
rename <title>      rename active note
delete              delete active note
text <body>         replace active note text (\\n for line breaks)
font <size>         set font size; zoom+ / zoom- step by one
highlight <name>    set highlight mode (\"Plain Text\" for none)
top                 toggle always on top
save                write the notes file
next <q> / prev <q> find in active note
search <q>          find in all notes; open <n> jumps to a result
list / show         list notes / print active note
quit                save and exit";

fn main() -> Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                config
                    .log_directive()
                    .parse()
                    .context("invalid log directive")?,
            ),
        )
        .init();

    let (mut session, error) = AppSession::open(&config.file);
    if let Some(e) = error {
        println!("Error: {e}");
    }
    print_active(&session);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "{}> ", session.active_note().get_title())?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // end of input closes the window
            session.dispatch(Command::Close(None))?;
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        match line.trim() {
            "help" | "?" => println!("{HELP}"),
            "list" => print_list(&session),
            "show" => print_active(&session),
            "quit" | "exit" => {
                if session.is_unsaved() {
                    debug!("unsaved changes flushed on exit");
                }
                session.dispatch(Command::Close(None))?;
                break;
            }
            _ => match line.parse::<Command>() {
                Ok(command) => {
                    let is_close = matches!(command, Command::Close(_));
                    match session.dispatch(command) {
                        Ok(outcome) => print_outcome(&session, &outcome),
                        Err(e) => println!("Error: {e}"),
                    }
                    if is_close {
                        break;
                    }
                }
                Err(e) => println!("{e}, try help"),
            },
        }
    }
    Ok(())
}

fn print_outcome(session: &AppSession, outcome: &Outcome) {
    println!("{outcome}");
    if matches!(outcome, Outcome::NoteSelected { .. } | Outcome::NoteDeleted { .. }) {
        print_active(session);
    }
}

fn print_list(session: &AppSession) {
    for (index, note) in session.notes().iter_notes().enumerate() {
        let marker = if index == session.active_index() { '*' } else { ' ' };
        println!("{marker}{:>3}. {} [{}]", index + 1, note.get_title(), note.id());
    }
}

fn print_active(session: &AppSession) {
    let note = session.active_note();
    println!(
        "== {} ({}, {}pt)",
        note.get_title(),
        note.get_highlight(),
        note.get_font_size()
    );
    if !note.get_body().is_empty() {
        println!("{}", note.get_body());
    }
}
