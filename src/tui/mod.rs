pub mod app;
pub mod controller;
pub mod editor;
pub mod event;
pub mod flatten;
pub mod input;
pub mod picker;
pub mod row;
pub mod tree;
pub mod viewport;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::io;

use anyhow::Result;
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;
use rusqlite::Connection;

use crate::model::Workspace;
pub use controller::Controller;
pub use input::{Input, KeySource, ScriptedKeys, TerminalKeys};

/// Take over the terminal and run the tree view until the user quits.
///
/// The terminal is restored even when the session fails.
pub fn run(conn: &Connection, workspace: Workspace) -> Result<()> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut keys = TerminalKeys;

    let result = Controller::new(&mut terminal, &mut keys, conn, workspace)
        .and_then(|mut ctl| ctl.run());

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
