//! Terminal user interface for the lot-size calculator.
//!
//! A Ratatui front end with a calculator tab that recomputes on every
//! keystroke and an instruments tab for managing the catalog.

pub mod app;
pub mod components;
pub mod event;
pub mod input;
pub mod tabs;
pub mod terminal;
pub mod ui;

use std::time::Duration;

use tracing::info;

pub use app::App;
pub use event::Event;
pub use terminal::{Tui, restore_terminal, setup_terminal};
pub use ui::render;

use crate::{LotsizerError, Result};

/// How long to wait for input before redrawing.
const TICK_RATE: Duration = Duration::from_millis(250);

/// Runs the UI until the user quits.
///
/// The terminal is restored even when the loop fails.
///
/// # Errors
///
/// Returns [`LotsizerError::Io`] on terminal failures.
pub fn run(app: &mut App) -> Result<()> {
    let mut terminal = setup_terminal()?;
    info!("terminal UI started");

    let result = event_loop(&mut terminal, app);
    let restored = restore_terminal(&mut terminal);

    info!("terminal UI stopped");
    result.and(restored)
}

fn event_loop(terminal: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal
            .draw(|frame| render(frame, app))
            .map_err(|e| LotsizerError::Io(format!("failed to draw: {e}")))?;
        let event = event::next_event(TICK_RATE)?;
        event::update(app, event);
    }
    Ok(())
}
