//! Status bar component.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::tui::app::App;

/// Renders the status bar.
///
/// Shows the selected instrument, the rounding policy, the catalog size and
/// the latest status message.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let instrument = if app.selected_instrument.is_empty() {
        Span::styled(" no instrument ", Style::default().fg(Color::Red))
    } else {
        Span::styled(
            format!(" {} ", app.selected_instrument),
            Style::default().fg(Color::Cyan),
        )
    };

    let badge = app
        .catalog
        .entry(&app.selected_instrument)
        .map(|e| {
            let color = if e.provenance.is_user_defined() {
                Color::Yellow
            } else {
                Color::Gray
            };
            Span::styled(
                format!(" {} ", e.provenance.label()),
                Style::default().fg(color),
            )
        })
        .unwrap_or_else(|| Span::raw(""));

    let message = match app.message {
        Some(ref message) => {
            let color = if message.is_error {
                Color::Red
            } else {
                Color::Green
            };
            Span::styled(format!(" {} ", message.text), Style::default().fg(color))
        }
        None => Span::raw(""),
    };

    let spans = vec![
        instrument,
        badge,
        Span::raw("│"),
        Span::styled(
            format!(" {} ", app.policy.label()),
            Style::default().fg(Color::White),
        ),
        Span::raw("│"),
        Span::styled(
            format!(" {} instruments ", app.catalog.len()),
            Style::default().fg(Color::White),
        ),
        Span::raw("│"),
        message,
    ];

    let para = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(para, area);
}
