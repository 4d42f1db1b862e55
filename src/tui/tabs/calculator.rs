//! Calculator tab layout and rendering.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::sizing::RoundingPolicy;
use crate::sizing::breakdown::fixed;
use crate::tui::app::{App, CalcField, Mode, Outcome};

/// Width of the label column in the form.
const LABEL_WIDTH: u16 = 28;

/// Renders the calculator body.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    render_form(frame, columns[0], app);
    render_result(frame, columns[1], app);
}

fn render_form(frame: &mut Frame, area: Rect, app: &App) {
    let editing = app.mode == Mode::Insert && app.editor.is_none();
    let title = if editing {
        format!(" {} (INSERT) ", app.selected_instrument)
    } else {
        format!(" {} ", app.selected_instrument)
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing {
            Color::Yellow
        } else {
            Color::DarkGray
        }));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            CalcField::ALL
                .iter()
                .map(|_| Constraint::Length(1))
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .split(inner);

    for (row, field) in rows.iter().zip(CalcField::ALL) {
        let is_selected = app.form.selected == field;
        let input = app.form.field(field);

        let label_style = if is_selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if is_selected { "> " } else { "  " };
        let label = format!("{marker}{}", field.label(app.form.risk_mode));

        let value_span = if field == CalcField::LotSize && app.policy == RoundingPolicy::Unrounded
        {
            Span::styled(
                format!("{} (unused)", input.as_str()),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            Span::styled(input.as_str().to_string(), Style::default().fg(Color::White))
        };

        let line = Line::from(vec![
            Span::styled(
                format!("{label:<width$}", width = LABEL_WIDTH as usize),
                label_style,
            ),
            value_span,
        ]);
        frame.render_widget(Paragraph::new(line), *row);

        if editing && is_selected {
            let cursor_x = row.x + LABEL_WIDTH + input.cursor_width() as u16;
            frame.set_cursor_position((cursor_x.min(row.right().saturating_sub(1)), row.y));
        }
    }
}

fn render_result(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Recommended Volume ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = match &app.outcome {
        Outcome::Incomplete => vec![Line::from(Span::styled(
            "Enter positive values to calculate",
            Style::default().fg(Color::DarkGray),
        ))],
        Outcome::Invalid(reason) => vec![Line::from(Span::styled(
            reason.clone(),
            Style::default().fg(Color::Red),
        ))],
        Outcome::Ready { params, result } => {
            let dp = match result.policy {
                RoundingPolicy::LotFloored => 2,
                RoundingPolicy::Unrounded => 3,
            };
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(
                        format!("{} lots", fixed(result.final_volume, dp)),
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  ({})", result.policy),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]),
                Line::raw(""),
            ];
            for step in result.steps(params) {
                lines.push(Line::from(Span::styled(
                    step.label,
                    Style::default().fg(Color::Cyan),
                )));
                lines.push(Line::raw(format!("  {}", step.detail)));
            }
            lines
        }
    };

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
