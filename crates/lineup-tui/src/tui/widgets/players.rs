// Player list widget: the active side's available players or bench.

use lineup_core::player::Player;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;

use crate::tui::{ListMode, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let players = state.list();
    let label = match state.list_mode {
        ListMode::Available => "Available",
        ListMode::Bench => "Bench",
    };
    let title = format!(" {} ({}) ", label, players.len());

    let header = Row::new(vec![Cell::from("Name"), Cell::from("Pos"), Cell::from("Rtg")]).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = if players.is_empty() {
        vec![Row::new(vec![Cell::from(empty_message(state))])]
    } else {
        players.iter().map(player_row).collect()
    };

    let widths = [
        Constraint::Min(12),
        Constraint::Length(4),
        Constraint::Length(4),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut table_state =
        TableState::default().with_selected((!players.is_empty()).then_some(state.list_selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn player_row(player: &Player) -> Row<'static> {
    Row::new(vec![
        Cell::from(player.name.clone()),
        Cell::from(position_label(player)),
        Cell::from(format!("{:.0}", player.rating)),
    ])
}

/// Role abbreviation, or "?" when the position text is unrecognized.
pub fn position_label(player: &Player) -> &'static str {
    player.natural_role().map_or("?", |r| r.abbrev())
}

fn empty_message(state: &ViewState) -> &'static str {
    if state.side().team().is_none() {
        "No team selected"
    } else if state.is_loading(state.active_side) {
        "Loading roster..."
    } else {
        match state.list_mode {
            ListMode::Available => "Everyone is placed",
            ListMode::Bench => "Bench is empty",
        }
    }
}
