//! Main UI rendering coordinator.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::app::{App, InstrumentEditor, Mode, Tab};
use super::components::{status_bar, tab_bar};
use super::tabs::{calculator, instruments};

/// Renders the entire application UI.
pub fn render(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Length(1), // Status bar
            Constraint::Min(8),    // Body
            Constraint::Length(1), // Keybindings help
        ])
        .split(frame.area());

    tab_bar::render(frame, main_layout[0], app);
    status_bar::render(frame, main_layout[1], app);

    match app.current_tab() {
        Tab::Calculator => calculator::render(frame, main_layout[2], app),
        Tab::Instruments => instruments::render(frame, main_layout[2], app),
    }

    render_keybindings(frame, main_layout[3], app);

    if let Some(ref editor) = app.editor {
        render_editor(frame, editor);
    }
    if let Some(ref name) = app.pending_removal {
        render_confirm(frame, app, name);
    }
}

/// Renders the keybindings help line.
fn render_keybindings(frame: &mut Frame, area: Rect, app: &App) {
    let help = match (app.mode, app.current_tab()) {
        (Mode::Insert, _) if app.editor.is_some() => {
            "[Esc]cancel [Tab]next field [Enter]save"
        }
        (Mode::Insert, _) => "[Esc]normal [Tab]next field",
        (Mode::Confirm, _) => "[y]yes [n]no",
        (Mode::Normal, Tab::Calculator) => {
            "[Tab]switch tab [j/k]field [i]edit [m]risk mode [[/]]instrument [s]save instrument [q]quit"
        }
        (Mode::Normal, Tab::Instruments) => {
            "[Tab]switch tab [j/k]move [Enter]use [a]add [e]edit [d]delete/reset [q]quit"
        }
    };

    let para = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(para, area);
}

/// Renders the add/edit instrument dialog.
fn render_editor(frame: &mut Frame, editor: &InstrumentEditor) {
    let label_width = editor
        .fields
        .iter()
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(0)
        + 4;

    let area = centered(frame.area(), 60, editor.fields.len() as u16 + 2);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(editor.title())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    for (i, (label, input)) in editor.fields.iter().enumerate() {
        let row = Rect {
            y: inner.y + i as u16,
            height: 1,
            ..inner
        };
        if row.y >= inner.bottom() {
            break;
        }
        let is_selected = i == editor.selected;
        let label_style = if is_selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let line = Line::from(vec![
            Span::styled(format!("{label:<label_width$}"), label_style),
            Span::raw(input.as_str()),
        ]);
        frame.render_widget(Paragraph::new(line), row);

        if is_selected {
            let cursor_x = row.x + label_width as u16 + input.cursor_width() as u16;
            frame.set_cursor_position((cursor_x.min(row.right().saturating_sub(1)), row.y));
        }
    }
}

/// Renders the delete/reset confirmation.
fn render_confirm(frame: &mut Frame, app: &App, name: &str) {
    let question = if app.catalog.is_default(name) {
        format!("Reset {name} to its default values? [y/n]")
    } else {
        format!("Delete {name}? [y/n]")
    };

    let area = centered(frame.area(), question.len() as u16 + 4, 3);
    frame.render_widget(Clear, area);
    let para = Paragraph::new(question).block(
        Block::default()
            .title(" Confirm ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(para, area);
}

/// A `width` × `height` rectangle centred in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    rect
}
