//! Terminal setup and teardown utilities.

use std::io::{self, IsTerminal, Stdout};

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::{LotsizerError, Result};

/// Type alias for our terminal backend.
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Enables raw mode and switches to the alternate screen buffer.
///
/// # Errors
///
/// Returns [`LotsizerError::Io`] if stdout is not a TTY or the terminal
/// cannot be initialized.
pub fn setup_terminal() -> Result<Tui> {
    if !io::stdout().is_terminal() {
        return Err(LotsizerError::Io(
            "the calculator UI needs an interactive terminal; use a subcommand instead".to_string(),
        ));
    }

    enable_raw_mode().map_err(|e| LotsizerError::Io(format!("failed to enable raw mode: {e}")))?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| {
        let _ = disable_raw_mode();
        LotsizerError::Io(format!("failed to enter alternate screen: {e}"))
    })?;

    Terminal::new(CrosstermBackend::new(stdout)).map_err(|e| {
        let _ = disable_raw_mode();
        LotsizerError::Io(format!("failed to create terminal: {e}"))
    })
}

/// Returns the terminal to the main screen in cooked mode.
///
/// # Errors
///
/// Returns [`LotsizerError::Io`] if restoration fails.
pub fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().map_err(|e| LotsizerError::Io(e.to_string()))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| LotsizerError::Io(e.to_string()))?;
    terminal
        .show_cursor()
        .map_err(|e| LotsizerError::Io(e.to_string()))
}
