//! Instruments tab: the catalog as a table.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
};

use crate::catalog::Provenance;
use crate::tui::app::App;

/// Renders the instrument table.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let header = Row::new(["Name", "", "$/point", "Conversion", "Lot size"])
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .catalog
        .entries()
        .iter()
        .map(|entry| {
            let def = &entry.definition;
            let badge_color = match entry.provenance {
                Provenance::Default => Color::DarkGray,
                Provenance::Override { .. } => Color::Yellow,
                Provenance::Addition => Color::Magenta,
            };
            let name_style = if def.name == app.selected_instrument {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(def.name.clone()).style(name_style),
                Cell::from(entry.provenance.label()).style(Style::default().fg(badge_color)),
                Cell::from(def.dollar_cost_per_unit.normalize().to_string()),
                Cell::from(def.unit_to_volume_conversion.normalize().to_string()),
                Cell::from(def.standard_lot_size.normalize().to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(12),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(" Instruments ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray))
    .highlight_symbol("> ");

    let mut state = TableState::default().with_selected(Some(app.instrument_cursor));
    frame.render_stateful_widget(table, area, &mut state);
}
