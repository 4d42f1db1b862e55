//! Event handling for the TUI.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{App, Mode, Tab};
use super::input::TextInput;
use crate::{LotsizerError, Result};

/// Events that can occur in the application.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// Terminal was resized.
    Resize(u16, u16),
    /// No input arrived within the poll interval.
    Tick,
}

/// Waits up to `timeout` for the next terminal event.
///
/// Key releases and repeats are reported as ticks so each press is handled
/// once on every platform.
///
/// # Errors
///
/// Returns [`LotsizerError::Io`] if the terminal cannot be polled or read.
pub fn next_event(timeout: Duration) -> Result<Event> {
    let ready = event::poll(timeout).map_err(|e| LotsizerError::Io(e.to_string()))?;
    if !ready {
        return Ok(Event::Tick);
    }
    match event::read().map_err(|e| LotsizerError::Io(e.to_string()))? {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
        CrosstermEvent::Resize(w, h) => Ok(Event::Resize(w, h)),
        _ => Ok(Event::Tick),
    }
}

/// Updates application state based on an event.
pub fn update(app: &mut App, event: Event) {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Resize(_, _) => {}
        Event::Tick => app.clear_stale_messages(),
    }
}

/// Handles key press events.
fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys (work in any mode)
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('q') if key.modifiers.is_empty() && app.mode == Mode::Normal => {
            app.should_quit = true;
            return;
        }
        KeyCode::Esc => {
            match app.mode {
                Mode::Insert if app.editor.is_some() => app.close_editor(),
                Mode::Confirm => app.cancel_removal(),
                _ => app.mode = Mode::Normal,
            }
            return;
        }
        _ => {}
    }

    // Mode-specific handling
    match app.mode {
        Mode::Normal => handle_normal_mode(app, key),
        Mode::Insert => handle_insert_mode(app, key),
        Mode::Confirm => handle_confirm_mode(app, key),
    }
}

/// Handles keys in normal mode.
fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Tab navigation
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.previous_tab();
            } else {
                app.next_tab();
            }
        }
        KeyCode::BackTab => app.previous_tab(),
        _ => match app.current_tab() {
            Tab::Calculator => handle_calculator_keys(app, key),
            Tab::Instruments => handle_instruments_keys(app, key),
        },
    }
}

/// Handles keys for the Calculator tab.
fn handle_calculator_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.form.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.form.select_previous(),
        KeyCode::Char('i') | KeyCode::Enter => app.mode = Mode::Insert,
        KeyCode::Char('m') => {
            app.form.risk_mode.toggle();
            app.recalculate();
        }
        KeyCode::Char(']') => app.cycle_instrument(1),
        KeyCode::Char('[') => app.cycle_instrument(-1),
        KeyCode::Char('s') => app.save_form_to_catalog(),
        _ => {}
    }
}

/// Handles keys for the Instruments tab.
fn handle_instruments_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.instrument_cursor + 1 < app.catalog.len() {
                app.instrument_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.instrument_cursor = app.instrument_cursor.saturating_sub(1);
        }
        KeyCode::Enter => {
            if let Some(name) = app.highlighted_instrument().map(str::to_string) {
                app.select_instrument(&name);
                app.show_tab(Tab::Calculator);
            }
        }
        KeyCode::Char('a') => app.open_add_editor(),
        KeyCode::Char('e') => app.open_edit_editor(),
        KeyCode::Char('d') => app.request_removal(),
        _ => {}
    }
}

/// Handles keys in insert mode (text input).
fn handle_insert_mode(app: &mut App, key: KeyEvent) {
    if let Some(editor) = app.editor.as_mut() {
        match key.code {
            KeyCode::Enter => app.submit_editor(),
            KeyCode::Tab | KeyCode::Down => editor.select_next(),
            KeyCode::BackTab | KeyCode::Up => editor.select_previous(),
            _ => {
                if let Some(input) = editor.selected_input() {
                    edit_text(input, key.code);
                }
            }
        }
        return;
    }

    match key.code {
        KeyCode::Enter => app.mode = Mode::Normal,
        KeyCode::Tab | KeyCode::Down => app.form.select_next(),
        KeyCode::BackTab | KeyCode::Up => app.form.select_previous(),
        code => {
            if edit_text(app.form.selected_input(), code) {
                app.recalculate();
            }
        }
    }
}

/// Applies an editing key to `input`. Returns whether the text changed.
fn edit_text(input: &mut TextInput, code: KeyCode) -> bool {
    match code {
        KeyCode::Char(c) => {
            input.insert(c);
            true
        }
        KeyCode::Backspace => {
            input.backspace();
            true
        }
        KeyCode::Delete => {
            input.delete();
            true
        }
        KeyCode::Left => {
            input.move_left();
            false
        }
        KeyCode::Right => {
            input.move_right();
            false
        }
        KeyCode::Home => {
            input.move_home();
            false
        }
        KeyCode::End => {
            input.move_end();
            false
        }
        _ => false,
    }
}

/// Handles keys in confirm mode (dialogs).
fn handle_confirm_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => app.confirm_removal(),
        KeyCode::Char('n') => app.cancel_removal(),
        _ => {}
    }
}
